// Service offerings: the read-only tariff tables supplied by the catalog service
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The six bookable service categories.
///
/// Serialized names double as the keys of the booking-number prefix table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[serde(rename = "flights")]
    Flight,
    #[serde(rename = "hotels")]
    Hotel,
    #[serde(rename = "trains")]
    Train,
    Bus,
    Cab,
    #[serde(rename = "packages")]
    Package,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Flight,
        Category::Hotel,
        Category::Train,
        Category::Bus,
        Category::Cab,
        Category::Package,
    ];

    /// Prefix the backend puts in front of the 8-digit booking number suffix.
    pub fn booking_prefix(self) -> &'static str {
        match self {
            Category::Flight => "FLT",
            Category::Hotel => "HTL",
            Category::Train => "TRN",
            Category::Bus => "BUS",
            Category::Cab => "CAB",
            Category::Package => "PKG",
        }
    }

    pub fn from_booking_prefix(prefix: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|category| category.booking_prefix() == prefix)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Flight => "flights",
            Category::Hotel => "hotels",
            Category::Train => "trains",
            Category::Bus => "bus",
            Category::Cab => "cab",
            Category::Package => "packages",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceType {
    #[default]
    Online,
    Offline,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct TariffEntry {
    pub price: f64,
    pub available: bool,
}

// Data structure for the catalog's offering JSON
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceOffering {
    pub id: String,
    pub category: Category,
    pub name: String,
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Keyed by variant: vehicle type, cabin class, room type, coach class or accommodation tier.
    pub tariffs: BTreeMap<String, TariffEntry>,
    #[serde(default)]
    pub in_person: bool,
}

fn default_currency() -> String {
    "INR".to_string()
}

impl ServiceOffering {
    pub fn new(id: impl Into<String>, category: Category, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            category,
            name: name.into(),
            currency: default_currency(),
            tariffs: BTreeMap::new(),
            in_person: false,
        }
    }

    pub fn with_tariff(mut self, variant: impl Into<String>, price: f64, available: bool) -> Self {
        self.tariffs
            .insert(variant.into(), TariffEntry { price, available });
        self
    }

    /// Looks up a variant, falling back to a case-insensitive match ("SUV" finds "suv").
    pub fn tariff(&self, variant: &str) -> Option<&TariffEntry> {
        self.tariffs.get(variant).or_else(|| {
            self.tariffs
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(variant.trim()))
                .map(|(_, entry)| entry)
        })
    }

    pub fn service_type(&self) -> ServiceType {
        if self.in_person {
            ServiceType::Offline
        } else {
            ServiceType::Online
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
