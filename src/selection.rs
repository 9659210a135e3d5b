// User selections collected by the booking flows
use crate::offering::Category;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct PassengerMix {
    pub adults: u32,
    #[serde(default)]
    pub children: u32,
    #[serde(default)]
    pub infants: u32,
}

impl PassengerMix {
    pub fn new(adults: u32, children: u32, infants: u32) -> Self {
        Self {
            adults,
            children,
            infants,
        }
    }

    pub fn adults(adults: u32) -> Self {
        Self::new(adults, 0, 0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TripType {
    #[default]
    OneWay,
    RoundTrip,
}

impl TripType {
    /// Number of legs the fare is charged for.
    pub fn legs(self) -> u32 {
        match self {
            TripType::OneWay => 1,
            TripType::RoundTrip => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CabExtras {
    pub driver: bool,
    pub toll_charges: bool,
    pub parking: bool,
    pub waiting_time: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HotelExtras {
    pub breakfast: bool,
    pub wifi: bool,
    pub parking: bool,
    pub late_checkout: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PackageAddons {
    pub transfers: bool,
    pub travel_insurance: bool,
    pub guide: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MealPlan {
    #[default]
    None,
    Breakfast,
    HalfBoard,
    FullBoard,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CabSelection {
    pub vehicle_type: String,
    #[serde(default)]
    pub trip_type: TripType,
    pub passengers: PassengerMix,
    #[serde(default)]
    pub extras: CabExtras,
}

/// Shared by flights (cabin class), trains (coach class) and buses (seat type).
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FareSelection {
    pub class: String,
    #[serde(default)]
    pub trip_type: TripType,
    pub passengers: PassengerMix,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HotelSelection {
    pub room_type: String,
    pub rooms: u32,
    pub guests: PassengerMix,
    pub check_in: DateTime<Utc>,
    pub check_out: DateTime<Utc>,
    #[serde(default)]
    pub extras: HotelExtras,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageSelection {
    pub accommodation_type: String,
    pub travelers: u32,
    pub nights: u32,
    #[serde(default)]
    pub meal_plan: MealPlan,
    #[serde(default)]
    pub addons: PackageAddons,
}

/// Category-specific selection, tagged by category.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "category", rename_all = "lowercase")]
pub enum TripSelection {
    Cab(CabSelection),
    #[serde(rename = "flights")]
    Flight(FareSelection),
    #[serde(rename = "trains")]
    Train(FareSelection),
    Bus(FareSelection),
    #[serde(rename = "hotels")]
    Hotel(HotelSelection),
    #[serde(rename = "packages")]
    Package(PackageSelection),
}

impl TripSelection {
    pub fn category(&self) -> Category {
        match self {
            TripSelection::Cab(_) => Category::Cab,
            TripSelection::Flight(_) => Category::Flight,
            TripSelection::Train(_) => Category::Train,
            TripSelection::Bus(_) => Category::Bus,
            TripSelection::Hotel(_) => Category::Hotel,
            TripSelection::Package(_) => Category::Package,
        }
    }

    /// The tariff key the selection points at.
    pub fn variant(&self) -> &str {
        match self {
            TripSelection::Cab(cab) => &cab.vehicle_type,
            TripSelection::Flight(fare) | TripSelection::Train(fare) | TripSelection::Bus(fare) => {
                &fare.class
            }
            TripSelection::Hotel(hotel) => &hotel.room_type,
            TripSelection::Package(package) => &package.accommodation_type,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactInfo {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl ContactInfo {
    /// A name plus at least one way to reach the customer.
    pub fn is_complete(&self) -> bool {
        let filled = |value: &Option<String>| value.as_deref().is_some_and(|v| !v.trim().is_empty());
        !self.name.trim().is_empty() && (filled(&self.email) || filled(&self.phone))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct BookingSlot {
    pub date: NaiveDate,
    pub start: NaiveTime,
    pub end: NaiveTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    #[default]
    Card,
    Upi,
    Wallet,
    Netbanking,
    Cash,
}

impl std::str::FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "card" => Ok(PaymentMethod::Card),
            "upi" => Ok(PaymentMethod::Upi),
            "wallet" => Ok(PaymentMethod::Wallet),
            "netbanking" => Ok(PaymentMethod::Netbanking),
            "cash" => Ok(PaymentMethod::Cash),
            other => Err(format!("unknown payment method '{}'", other)),
        }
    }
}

/// Everything a flow screen collects before the user taps "Book".
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingDraft {
    pub service_id: String,
    pub contact: ContactInfo,
    pub selection: TripSelection,
    pub slot: BookingSlot,
    #[serde(default)]
    pub payment_method: PaymentMethod,
}

impl BookingDraft {
    /// Parses a draft, using `default_payment` when it names no `paymentMethod`.
    pub fn from_json(json: &str, default_payment: PaymentMethod) -> serde_json::Result<Self> {
        let mut value: serde_json::Value = serde_json::from_str(json)?;
        if let Some(fields) = value.as_object_mut() {
            if !fields.contains_key("paymentMethod") {
                fields.insert(
                    "paymentMethod".to_string(),
                    serde_json::to_value(default_payment)?,
                );
            }
        }
        serde_json::from_value(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("Asha", Some("asha@example.com"), None, true; "#1 name and email")]
    #[test_case("Asha", None, Some("+91 98450 00000"), true; "#2 name and phone")]
    #[test_case("", Some("asha@example.com"), None, false; "#3 missing name")]
    #[test_case("Asha", None, None, false; "#4 no way to reach")]
    #[test_case("Asha", Some("  "), Some(""), false; "#5 blank contact fields")]
    fn test_contact_completeness(name: &str, email: Option<&str>, phone: Option<&str>, expected: bool) {
        let contact = ContactInfo {
            name: name.to_string(),
            email: email.map(str::to_string),
            phone: phone.map(str::to_string),
        };
        assert_eq!(contact.is_complete(), expected);
    }

    #[test]
    fn test_selection_tagged_by_category() {
        let json = r#"{
            "category": "flights",
            "class": "economy",
            "tripType": "round-trip",
            "passengers": { "adults": 2, "children": 1 }
        }"#;

        let selection: TripSelection = serde_json::from_str(json).unwrap();
        assert_eq!(selection.category(), Category::Flight);
        assert_eq!(selection.variant(), "economy");
        match selection {
            TripSelection::Flight(fare) => {
                assert_eq!(fare.trip_type, TripType::RoundTrip);
                assert_eq!(fare.passengers, PassengerMix::new(2, 1, 0));
            }
            other => panic!("unexpected selection {:?}", other),
        }
    }

    #[test]
    fn test_package_defaults() {
        let json = r#"{
            "category": "packages",
            "accommodationType": "premium",
            "travelers": 2,
            "nights": 3
        }"#;

        let selection: TripSelection = serde_json::from_str(json).unwrap();
        match selection {
            TripSelection::Package(package) => {
                assert_eq!(package.meal_plan, MealPlan::None);
                assert_eq!(package.addons, PackageAddons::default());
            }
            other => panic!("unexpected selection {:?}", other),
        }
    }

    const DRAFT_WITHOUT_PAYMENT: &str = r#"{
        "serviceId": "cab-blr",
        "contact": { "name": "Asha", "phone": "+91 98450 00000" },
        "selection": {
            "category": "cab",
            "vehicleType": "sedan",
            "tripType": "one-way",
            "passengers": { "adults": 1 }
        },
        "slot": { "date": "2025-06-11", "start": "09:00:00", "end": "10:00:00" }
    }"#;

    #[test]
    fn test_draft_falls_back_to_default_payment() {
        let draft = BookingDraft::from_json(DRAFT_WITHOUT_PAYMENT, PaymentMethod::Wallet).unwrap();
        assert_eq!(draft.payment_method, PaymentMethod::Wallet);
        assert_eq!(draft.selection.category(), Category::Cab);
    }

    #[test]
    fn test_draft_payment_method_wins_over_default() {
        let json = DRAFT_WITHOUT_PAYMENT.replacen(
            r#""serviceId""#,
            r#""paymentMethod": "cash", "serviceId""#,
            1,
        );
        let draft = BookingDraft::from_json(&json, PaymentMethod::Wallet).unwrap();
        assert_eq!(draft.payment_method, PaymentMethod::Cash);
    }

    #[test]
    fn test_payment_method_from_str() {
        assert_eq!("UPI".parse::<PaymentMethod>(), Ok(PaymentMethod::Upi));
        assert!("cheque".parse::<PaymentMethod>().is_err());
    }
}
