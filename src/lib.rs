// Pricing and request-assembly engine for travel bookings

pub mod assembler;
pub mod config;
pub mod dates;
pub mod flow;
pub mod gateway;
pub mod offering;
pub mod pricing;
pub mod selection;
pub mod validation;

// Re-export key types for convenience
pub use assembler::{
    decode_notes, AssembledBooking, BookingRequest, BookingRequestAssembler, NotesPayload,
    SerializationError, TimeSlot,
};
pub use config::{ConfigError, EngineConfig, GatewayConfig, RetryConfig};
pub use dates::{nights_between, DateRangeError};
pub use flow::{BookingConfirmation, BookingError, BookingFlow, Quote};
pub use gateway::{
    BookingGateway, BookingNumber, BookingRecord, GatewayError, HttpBookingGateway,
};
pub use offering::{Category, ServiceOffering, ServiceType, TariffEntry};
pub use pricing::{price_selection, LineItem, PriceBreakdown, PricingError};
pub use selection::{
    BookingDraft, BookingSlot, ContactInfo, PassengerMix, PaymentMethod, TripSelection, TripType,
};
pub use validation::{BookingValidator, ValidatedBooking, ValidationError};
