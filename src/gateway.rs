// Adapter over the external createBooking endpoint
//
// The gateway sends exactly one request per call. Retrying is left to the caller; the
// error only says whether a retry makes sense and how long to wait.

use crate::assembler::BookingRequest;
use crate::config::{ConfigError, GatewayConfig, RetryConfig};
use crate::offering::Category;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{info, warn};

const GENERIC_NETWORK_MESSAGE: &str =
    "Unable to reach the booking service. Please check your connection and try again.";
const GENERIC_FAILURE_MESSAGE: &str = "Booking failed. Please try again later.";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GatewayError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timeout after {0}ms")]
    Timeout(u64),

    #[error("Booking rejected: {status_code} - {message}")]
    Rejected { status_code: u16, message: String },

    #[error("Booking failed: {message}")]
    Unknown {
        status_code: Option<u16>,
        message: String,
    },
}

impl GatewayError {
    /// Only transport failures are worth retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(self, GatewayError::Network(_) | GatewayError::Timeout(_))
    }

    /// Server rejections are shown verbatim, everything else gets a generic message.
    pub fn user_message(&self) -> String {
        match self {
            GatewayError::Rejected { message, .. } => message.clone(),
            GatewayError::Network(_) | GatewayError::Timeout(_) => GENERIC_NETWORK_MESSAGE.to_string(),
            GatewayError::Unknown { .. } => GENERIC_FAILURE_MESSAGE.to_string(),
        }
    }

    /// Backoff hint for a user-triggered retry, `None` when retrying will not help.
    pub fn retry_after(&self, attempt: u32, config: &RetryConfig) -> Option<Duration> {
        if self.is_retryable() && attempt < config.max_retries {
            Some(calculate_backoff(attempt, config))
        } else {
            None
        }
    }
}

// Exponential backoff with jitter
pub fn calculate_backoff(retry_attempt: u32, config: &RetryConfig) -> Duration {
    let base_backoff_ms = (config.initial_backoff_ms as f64
        * config.backoff_multiplier.powf(retry_attempt as f64))
    .min(config.max_backoff_ms as f64);

    let jitter = rand::random::<f64>() * config.jitter_factor * base_backoff_ms;
    let backoff_ms = base_backoff_ms * (1.0 - config.jitter_factor / 2.0) + jitter;

    Duration::from_millis(backoff_ms as u64)
}

/// Identifier shaped `<PREFIX>-<8 digits>`, e.g. `FLT-00412345`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BookingNumber {
    category: Category,
    suffix: String,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("'{0}' is not a valid booking number")]
pub struct InvalidBookingNumber(pub String);

impl BookingNumber {
    pub fn category(&self) -> Category {
        self.category
    }

    pub fn prefix(&self) -> &'static str {
        self.category.booking_prefix()
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }
}

impl FromStr for BookingNumber {
    type Err = InvalidBookingNumber;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidBookingNumber(s.to_string());
        let (prefix, suffix) = s.split_once('-').ok_or_else(invalid)?;
        let category = Category::from_booking_prefix(prefix).ok_or_else(invalid)?;
        if suffix.len() != 8 || !suffix.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        Ok(Self {
            category,
            suffix: suffix.to_string(),
        })
    }
}

impl fmt::Display for BookingNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.prefix(), self.suffix)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRecord {
    #[serde(rename = "_id")]
    pub id: String,
    pub booking_number: String,
}

/// Response body of `createBooking`.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct CreateBookingEnvelope {
    pub success: bool,
    #[serde(default)]
    pub data: Option<BookingRecord>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl CreateBookingEnvelope {
    fn reason(&self) -> Option<String> {
        self.error
            .clone()
            .or_else(|| self.message.clone())
            .filter(|reason| !reason.trim().is_empty())
    }
}

/// Maps an HTTP status and raw body onto a record or a typed failure.
pub fn normalize_response(status_code: u16, body: &str) -> Result<BookingRecord, GatewayError> {
    let envelope = serde_json::from_str::<CreateBookingEnvelope>(body).ok();

    match status_code {
        200..=299 => match envelope {
            Some(CreateBookingEnvelope {
                success: true,
                data: Some(record),
                ..
            }) => Ok(record),
            Some(envelope) if !envelope.success => Err(GatewayError::Rejected {
                status_code,
                message: envelope
                    .reason()
                    .unwrap_or_else(|| "Booking was not accepted".to_string()),
            }),
            Some(_) => Err(GatewayError::Unknown {
                status_code: Some(status_code),
                message: "response is missing booking data".to_string(),
            }),
            None => Err(GatewayError::Unknown {
                status_code: Some(status_code),
                message: "response is not a booking envelope".to_string(),
            }),
        },
        400..=499 => {
            let message = envelope
                .and_then(|envelope| envelope.reason())
                .or_else(|| Some(body.trim().to_string()).filter(|text| !text.is_empty()))
                .unwrap_or_else(|| format!("request rejected with status {}", status_code));
            Err(GatewayError::Rejected {
                status_code,
                message,
            })
        }
        _ => Err(GatewayError::Unknown {
            status_code: Some(status_code),
            message: envelope
                .and_then(|envelope| envelope.reason())
                .unwrap_or_else(|| format!("server returned status {}", status_code)),
        }),
    }
}

#[async_trait]
pub trait BookingGateway: Send + Sync + 'static {
    async fn create_booking(&self, request: &BookingRequest) -> Result<BookingRecord, GatewayError>;
}

#[async_trait]
impl<G: BookingGateway + ?Sized> BookingGateway for Arc<G> {
    async fn create_booking(&self, request: &BookingRequest) -> Result<BookingRecord, GatewayError> {
        (**self).create_booking(request).await
    }
}

/// `createBooking` over HTTP.
pub struct HttpBookingGateway {
    client: reqwest::Client,
    config: GatewayConfig,
}

impl HttpBookingGateway {
    pub fn new(config: GatewayConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| ConfigError::InitError(e.to_string()))?;
        Ok(Self { client, config })
    }

    pub fn endpoint(&self) -> String {
        format!("{}/bookings", self.config.base_url.trim_end_matches('/'))
    }

    fn transport_error(&self, err: reqwest::Error) -> GatewayError {
        if err.is_timeout() {
            GatewayError::Timeout(self.config.timeout_ms)
        } else {
            GatewayError::Network(err.to_string())
        }
    }
}

#[async_trait]
impl BookingGateway for HttpBookingGateway {
    async fn create_booking(&self, request: &BookingRequest) -> Result<BookingRecord, GatewayError> {
        let started = Instant::now();
        let mut builder = self.client.post(self.endpoint()).json(request);
        if !self.config.api_key.is_empty() {
            builder = builder.bearer_auth(&self.config.api_key);
        }

        let response = builder.send().await.map_err(|e| self.transport_error(e))?;
        let status_code = response.status().as_u16();
        let body = response.text().await.map_err(|e| self.transport_error(e))?;

        let result = normalize_response(status_code, &body);
        match &result {
            Ok(record) => info!(
                service_id = %request.service_id,
                booking_number = %record.booking_number,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "booking created"
            ),
            Err(err) => warn!(
                service_id = %request.service_id,
                status_code,
                error = %err,
                "booking request failed"
            ),
        }
        result
    }
}
