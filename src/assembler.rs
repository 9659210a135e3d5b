// Builds the wire request handed to the booking backend
use crate::offering::{Category, ServiceType};
use crate::pricing::PriceBreakdown;
use crate::selection::{
    CabExtras, ContactInfo, HotelExtras, MealPlan, PackageAddons, PassengerMix, PaymentMethod,
    TripSelection, TripType,
};
use crate::validation::ValidatedBooking;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SerializationError {
    #[error("Failed to encode customer notes: {0}")]
    Encode(String),

    #[error("Failed to decode customer notes: {0}")]
    Decode(String),

    #[error("Customer notes changed after encoding")]
    RoundTripMismatch,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TimeSlot {
    pub start: String,
    pub end: String,
}

impl TimeSlot {
    pub fn from_times(start: NaiveTime, end: NaiveTime) -> Self {
        Self {
            start: start.format("%H:%M").to_string(),
            end: end.format("%H:%M").to_string(),
        }
    }
}

/// Request body of `createBooking`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    pub service_id: String,
    pub booking_date: NaiveDate,
    pub time_slot: TimeSlot,
    pub service_type: ServiceType,
    /// JSON-encoded `NotesPayload`.
    pub customer_notes: String,
    pub payment_method: PaymentMethod,
}

impl BookingRequest {
    pub fn notes(&self) -> Result<NotesPayload, SerializationError> {
        decode_notes(&self.customer_notes)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CabNotes {
    pub trip_type: TripType,
    pub vehicle_type: String,
    pub passengers: PassengerMix,
    pub extras: CabExtras,
    pub total_price: f64,
    pub currency: String,
    pub price_breakdown: PriceBreakdown,
    pub contact_info: ContactInfo,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightNotes {
    pub trip_type: TripType,
    pub flight_class: String,
    pub passengers: PassengerMix,
    pub total_price: f64,
    pub currency: String,
    pub price_breakdown: PriceBreakdown,
    pub contact_info: ContactInfo,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainNotes {
    pub trip_type: TripType,
    pub train_class: String,
    pub passengers: PassengerMix,
    pub total_price: f64,
    pub currency: String,
    pub price_breakdown: PriceBreakdown,
    pub contact_info: ContactInfo,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BusNotes {
    pub trip_type: TripType,
    pub seat_type: String,
    pub passengers: PassengerMix,
    pub total_price: f64,
    pub currency: String,
    pub price_breakdown: PriceBreakdown,
    pub contact_info: ContactInfo,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HotelNotes {
    pub room_type: String,
    pub rooms: u32,
    pub passengers: PassengerMix,
    pub check_in: DateTime<Utc>,
    pub check_out: DateTime<Utc>,
    pub nights: u32,
    pub extras: HotelExtras,
    pub total_price: f64,
    pub currency: String,
    pub price_breakdown: PriceBreakdown,
    pub contact_info: ContactInfo,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageNotes {
    pub accommodation_type: String,
    pub travelers: u32,
    pub nights: u32,
    pub meal_plan: MealPlan,
    pub addons: PackageAddons,
    pub total_price: f64,
    pub currency: String,
    pub price_breakdown: PriceBreakdown,
    pub contact_info: ContactInfo,
}

/// Category-specific booking details carried in `customerNotes`.
///
/// `totalPrice` is what the customer is charged; consumers derive display values
/// from it rather than recomputing.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "category", rename_all = "lowercase")]
pub enum NotesPayload {
    Cab(CabNotes),
    #[serde(rename = "flights")]
    Flight(FlightNotes),
    #[serde(rename = "trains")]
    Train(TrainNotes),
    Bus(BusNotes),
    #[serde(rename = "hotels")]
    Hotel(HotelNotes),
    #[serde(rename = "packages")]
    Package(PackageNotes),
}

impl NotesPayload {
    pub fn category(&self) -> Category {
        match self {
            NotesPayload::Cab(_) => Category::Cab,
            NotesPayload::Flight(_) => Category::Flight,
            NotesPayload::Train(_) => Category::Train,
            NotesPayload::Bus(_) => Category::Bus,
            NotesPayload::Hotel(_) => Category::Hotel,
            NotesPayload::Package(_) => Category::Package,
        }
    }

    pub fn total_price(&self) -> f64 {
        match self {
            NotesPayload::Cab(notes) => notes.total_price,
            NotesPayload::Flight(notes) => notes.total_price,
            NotesPayload::Train(notes) => notes.total_price,
            NotesPayload::Bus(notes) => notes.total_price,
            NotesPayload::Hotel(notes) => notes.total_price,
            NotesPayload::Package(notes) => notes.total_price,
        }
    }

    pub fn encode(&self) -> Result<String, SerializationError> {
        serde_json::to_string(self).map_err(|e| SerializationError::Encode(e.to_string()))
    }
}

pub fn decode_notes(notes: &str) -> Result<NotesPayload, SerializationError> {
    serde_json::from_str(notes).map_err(|e| SerializationError::Decode(e.to_string()))
}

/// A request ready for the gateway plus the booking-number prefix it should come back with.
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledBooking {
    pub request: BookingRequest,
    pub category: Category,
    pub expected_prefix: &'static str,
}

#[derive(Debug, Clone, Default)]
pub struct BookingRequestAssembler {}

impl BookingRequestAssembler {
    pub fn new() -> Self {
        Self {}
    }

    pub fn notes_payload(&self, booking: &ValidatedBooking) -> NotesPayload {
        let total_price = booking.breakdown.total;
        let currency = booking.currency.clone();
        let price_breakdown = booking.breakdown.clone();
        let contact_info = booking.draft.contact.clone();

        match &booking.draft.selection {
            TripSelection::Cab(cab) => NotesPayload::Cab(CabNotes {
                trip_type: cab.trip_type,
                vehicle_type: cab.vehicle_type.clone(),
                passengers: cab.passengers,
                extras: cab.extras,
                total_price,
                currency,
                price_breakdown,
                contact_info,
            }),
            TripSelection::Flight(fare) => NotesPayload::Flight(FlightNotes {
                trip_type: fare.trip_type,
                flight_class: fare.class.clone(),
                passengers: fare.passengers,
                total_price,
                currency,
                price_breakdown,
                contact_info,
            }),
            TripSelection::Train(fare) => NotesPayload::Train(TrainNotes {
                trip_type: fare.trip_type,
                train_class: fare.class.clone(),
                passengers: fare.passengers,
                total_price,
                currency,
                price_breakdown,
                contact_info,
            }),
            TripSelection::Bus(fare) => NotesPayload::Bus(BusNotes {
                trip_type: fare.trip_type,
                seat_type: fare.class.clone(),
                passengers: fare.passengers,
                total_price,
                currency,
                price_breakdown,
                contact_info,
            }),
            TripSelection::Hotel(hotel) => NotesPayload::Hotel(HotelNotes {
                room_type: hotel.room_type.clone(),
                rooms: hotel.rooms,
                passengers: hotel.guests,
                check_in: hotel.check_in,
                check_out: hotel.check_out,
                nights: booking.nights.unwrap_or(1),
                extras: hotel.extras,
                total_price,
                currency,
                price_breakdown,
                contact_info,
            }),
            TripSelection::Package(package) => NotesPayload::Package(PackageNotes {
                accommodation_type: package.accommodation_type.clone(),
                travelers: package.travelers,
                nights: package.nights,
                meal_plan: package.meal_plan,
                addons: package.addons,
                total_price,
                currency,
                price_breakdown,
                contact_info,
            }),
        }
    }

    /// Encodes the notes, proves they decode back unchanged, and builds the request.
    pub fn assemble(&self, booking: &ValidatedBooking) -> Result<AssembledBooking, SerializationError> {
        let payload = self.notes_payload(booking);
        let customer_notes = payload.encode()?;
        if decode_notes(&customer_notes)? != payload {
            return Err(SerializationError::RoundTripMismatch);
        }

        let draft = &booking.draft;
        let category = booking.category();
        let request = BookingRequest {
            service_id: draft.service_id.clone(),
            booking_date: draft.slot.date,
            time_slot: TimeSlot::from_times(draft.slot.start, draft.slot.end),
            service_type: booking.service_type,
            customer_notes,
            payment_method: draft.payment_method,
        };

        debug!(
            service_id = %request.service_id,
            category = %category,
            notes_len = request.customer_notes.len(),
            "assembled booking request"
        );

        Ok(AssembledBooking {
            request,
            category,
            expected_prefix: category.booking_prefix(),
        })
    }
}
