// Booking pipeline: validate, price, assemble, submit
use crate::assembler::{BookingRequest, BookingRequestAssembler, SerializationError};
use crate::gateway::{BookingGateway, BookingNumber, GatewayError};
use crate::offering::{Category, ServiceOffering};
use crate::pricing::PriceBreakdown;
use crate::selection::BookingDraft;
use crate::validation::{BookingValidator, ValidatedBooking, ValidationError};
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BookingError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Serialization(#[from] SerializationError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("Expected a {expected_prefix} booking number, got '{received}'")]
    UnexpectedBookingNumber {
        expected_prefix: &'static str,
        received: String,
    },

    #[error("A booking is already being submitted")]
    SubmissionInFlight,
}

impl BookingError {
    /// The one line the UI shows.
    pub fn user_message(&self) -> String {
        match self {
            BookingError::Validation(err) => err.to_string(),
            BookingError::Gateway(err) => err.user_message(),
            BookingError::Serialization(_) | BookingError::UnexpectedBookingNumber { .. } => {
                "Booking failed. Please try again later.".to_string()
            }
            BookingError::SubmissionInFlight => self.to_string(),
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, BookingError::Gateway(err) if err.is_retryable())
    }
}

/// Price shown to the user before they confirm.
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    pub category: Category,
    pub currency: String,
    pub breakdown: PriceBreakdown,
    pub nights: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BookingConfirmation {
    pub id: String,
    pub booking_number: BookingNumber,
    pub total_price: f64,
    pub currency: String,
    pub request: BookingRequest,
}

/// Clears the in-flight flag when the submission finishes or its future is dropped.
struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// One booking flow screen's worth of pipeline. Holds at most one pending submission.
pub struct BookingFlow<G: BookingGateway> {
    gateway: G,
    validator: BookingValidator,
    assembler: BookingRequestAssembler,
    in_flight: AtomicBool,
}

impl<G: BookingGateway> BookingFlow<G> {
    pub fn new(gateway: G) -> Self {
        Self {
            gateway,
            validator: BookingValidator::new(),
            assembler: BookingRequestAssembler::new(),
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn is_submitting(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    pub fn validate(
        &self,
        draft: &BookingDraft,
        offering: &ServiceOffering,
    ) -> Result<ValidatedBooking, ValidationError> {
        self.validator.validate(draft, offering)
    }

    pub fn quote(
        &self,
        draft: &BookingDraft,
        offering: &ServiceOffering,
    ) -> Result<Quote, ValidationError> {
        let validated = self.validate(draft, offering)?;
        Ok(Quote {
            category: validated.category(),
            currency: validated.currency,
            breakdown: validated.breakdown,
            nights: validated.nights,
        })
    }

    pub async fn submit(
        &self,
        draft: &BookingDraft,
        offering: &ServiceOffering,
    ) -> Result<BookingConfirmation, BookingError> {
        let _guard = InFlightGuard::acquire(&self.in_flight).ok_or_else(|| {
            warn!(service_id = %draft.service_id, "submission already in flight");
            BookingError::SubmissionInFlight
        })?;

        let validated = self.validator.validate(draft, offering).map_err(|err| {
            warn!(service_id = %draft.service_id, reason = %err, "booking draft rejected");
            err
        })?;
        let assembled = self.assembler.assemble(&validated)?;

        info!(
            service_id = %assembled.request.service_id,
            category = %assembled.category,
            total = validated.total(),
            "submitting booking"
        );
        let record = self
            .gateway
            .create_booking(&assembled.request)
            .await
            .map_err(|err| {
                warn!(
                    service_id = %assembled.request.service_id,
                    retryable = err.is_retryable(),
                    error = %err,
                    "booking gateway failed"
                );
                err
            })?;

        let booking_number = record
            .booking_number
            .parse::<BookingNumber>()
            .ok()
            .filter(|number| number.prefix() == assembled.expected_prefix)
            .ok_or_else(|| BookingError::UnexpectedBookingNumber {
                expected_prefix: assembled.expected_prefix,
                received: record.booking_number.clone(),
            })?;

        info!(booking_number = %booking_number, "booking confirmed");
        Ok(BookingConfirmation {
            id: record.id,
            booking_number,
            total_price: validated.total(),
            currency: validated.currency,
            request: assembled.request,
        })
    }
}
