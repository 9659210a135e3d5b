// Pre-submission checks for a booking draft
use crate::dates::{nights_between, DateRangeError};
use crate::offering::{Category, ServiceOffering, ServiceType, TariffEntry};
use crate::pricing::{price_selection, PriceBreakdown, PricingError};
use crate::selection::{BookingDraft, PassengerMix, TripSelection};
use thiserror::Error;
use tracing::debug;

/// Why a draft cannot be submitted. `Display` is the single message shown to the user.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Missing Information: contact details")]
    MissingContact,

    #[error("Selected {found} service does not match {expected} offering")]
    CategoryMismatch { expected: Category, found: Category },

    #[error("Unknown option '{variant}' for {category}")]
    UnknownVariant { category: Category, variant: String },

    #[error("'{variant}' is not available")]
    UnavailableVariant { variant: String },

    #[error("At least one adult is required")]
    NoAdults,

    #[error("Number of {field} must be at least 1")]
    InvalidQuantity { field: &'static str },

    #[error("Check-out date must be after check-in date")]
    InvalidDateRange(#[from] DateRangeError),

    #[error("Price for '{variant}' is unavailable")]
    InvalidTariff { variant: String },

    #[error("Total price must be greater than zero (got {0})")]
    NonPositiveTotal(f64),

    #[error("Total price is out of range")]
    TotalOutOfRange(f64),
}

impl ValidationError {
    fn from_pricing(err: PricingError, variant: &str) -> Self {
        match err {
            PricingError::InvalidQuantity { field: "adults" } => ValidationError::NoAdults,
            PricingError::InvalidQuantity { field } => ValidationError::InvalidQuantity { field },
            PricingError::InvalidTariff(_) => ValidationError::InvalidTariff {
                variant: variant.to_string(),
            },
            PricingError::DateRange(err) => ValidationError::InvalidDateRange(err),
        }
    }
}

/// A draft that passed every check, together with its price.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedBooking {
    pub draft: BookingDraft,
    pub tariff: TariffEntry,
    pub breakdown: PriceBreakdown,
    /// Set for date-range categories.
    pub nights: Option<u32>,
    pub currency: String,
    pub service_type: ServiceType,
}

impl ValidatedBooking {
    pub fn category(&self) -> Category {
        self.draft.selection.category()
    }

    pub fn total(&self) -> f64 {
        self.breakdown.total
    }
}

#[derive(Debug, Clone, Default)]
pub struct BookingValidator {}

impl BookingValidator {
    pub fn new() -> Self {
        Self {}
    }

    /// Runs the checks in order and stops at the first failure.
    pub fn validate(
        &self,
        draft: &BookingDraft,
        offering: &ServiceOffering,
    ) -> Result<ValidatedBooking, ValidationError> {
        if !draft.contact.is_complete() {
            return Err(ValidationError::MissingContact);
        }

        let tariff = self.check_variant(&draft.selection, offering)?;
        self.check_quantities(&draft.selection)?;
        let nights = self.check_dates(&draft.selection)?;

        let breakdown = price_selection(&draft.selection, tariff.price)
            .map_err(|err| ValidationError::from_pricing(err, draft.selection.variant()))?;
        if !breakdown.total.is_finite() {
            return Err(ValidationError::TotalOutOfRange(breakdown.total));
        }
        if breakdown.total <= 0.0 {
            return Err(ValidationError::NonPositiveTotal(breakdown.total));
        }

        debug!(
            service_id = %draft.service_id,
            category = %offering.category,
            total = breakdown.total,
            "booking draft validated"
        );

        Ok(ValidatedBooking {
            draft: draft.clone(),
            tariff,
            breakdown,
            nights,
            currency: offering.currency.clone(),
            service_type: offering.service_type(),
        })
    }

    fn check_variant(
        &self,
        selection: &TripSelection,
        offering: &ServiceOffering,
    ) -> Result<TariffEntry, ValidationError> {
        let category = selection.category();
        if category != offering.category {
            return Err(ValidationError::CategoryMismatch {
                expected: offering.category,
                found: category,
            });
        }

        let variant = selection.variant();
        let entry = offering
            .tariff(variant)
            .ok_or_else(|| ValidationError::UnknownVariant {
                category,
                variant: variant.to_string(),
            })?;
        if !entry.available {
            return Err(ValidationError::UnavailableVariant {
                variant: variant.to_string(),
            });
        }
        Ok(*entry)
    }

    fn check_quantities(&self, selection: &TripSelection) -> Result<(), ValidationError> {
        fn adults(mix: &PassengerMix) -> Result<(), ValidationError> {
            if mix.adults == 0 {
                Err(ValidationError::NoAdults)
            } else {
                Ok(())
            }
        }
        fn at_least_one(value: u32, field: &'static str) -> Result<(), ValidationError> {
            if value == 0 {
                Err(ValidationError::InvalidQuantity { field })
            } else {
                Ok(())
            }
        }

        match selection {
            TripSelection::Flight(fare) | TripSelection::Train(fare) | TripSelection::Bus(fare) => {
                adults(&fare.passengers)
            }
            TripSelection::Cab(cab) => adults(&cab.passengers),
            TripSelection::Hotel(hotel) => {
                at_least_one(hotel.rooms, "rooms")?;
                adults(&hotel.guests)
            }
            TripSelection::Package(package) => {
                at_least_one(package.travelers, "travelers")?;
                at_least_one(package.nights, "nights")
            }
        }
    }

    fn check_dates(&self, selection: &TripSelection) -> Result<Option<u32>, ValidationError> {
        match selection {
            TripSelection::Hotel(hotel) => Ok(Some(nights_between(hotel.check_in, hotel.check_out)?)),
            TripSelection::Package(package) => Ok(Some(package.nights)),
            _ => Ok(None),
        }
    }
}
