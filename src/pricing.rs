// Pricing rules for every bookable category
//
// All rules are pure. Amounts are in the offering's currency, in full units, and are
// never rounded here.

use crate::dates::{nights_between, DateRangeError};
use crate::selection::{
    CabExtras, HotelExtras, MealPlan, PackageAddons, PassengerMix, TripSelection, TripType,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub const FLIGHT_CHILD_RATE: f64 = 0.75;
pub const FLIGHT_INFANT_RATE: f64 = 0.1;
pub const GROUND_CHILD_RATE: f64 = 0.5;

// Cab add-ons are flat, whatever the distance or head count
pub const CAB_DRIVER_FEE: f64 = 200.0;
pub const CAB_TOLL_FEE: f64 = 100.0;
pub const CAB_PARKING_FEE: f64 = 50.0;
pub const CAB_WAITING_FEE: f64 = 150.0;

// Hotel extras are per night per room, except late check-out
pub const HOTEL_BREAKFAST_RATE: f64 = 500.0;
pub const HOTEL_WIFI_RATE: f64 = 200.0;
pub const HOTEL_PARKING_RATE: f64 = 300.0;
pub const HOTEL_LATE_CHECKOUT_FEE: f64 = 1000.0;

pub const PACKAGE_TRANSFERS_FEE: f64 = 2000.0;
pub const PACKAGE_INSURANCE_PER_TRAVELER: f64 = 1000.0;
pub const PACKAGE_GUIDE_PER_NIGHT: f64 = 3000.0;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PricingError {
    #[error("{field} must be at least 1")]
    InvalidQuantity { field: &'static str },

    #[error("tariff price {0} is not a valid amount")]
    InvalidTariff(f64),

    #[error(transparent)]
    DateRange(#[from] DateRangeError),
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LineItem {
    pub label: String,
    pub amount: f64,
}

impl LineItem {
    fn new(label: impl Into<String>, amount: f64) -> Self {
        Self {
            label: label.into(),
            amount,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceBreakdown {
    pub base: f64,
    pub per_passenger_or_unit_adjustments: f64,
    pub addons_total: f64,
    pub total: f64,
    #[serde(default)]
    pub line_items: Vec<LineItem>,
}

impl PriceBreakdown {
    fn from_parts(base: f64, adjustments: f64, addons: f64, line_items: Vec<LineItem>) -> Self {
        Self {
            base,
            per_passenger_or_unit_adjustments: adjustments,
            addons_total: addons,
            total: base + adjustments + addons,
            line_items,
        }
    }
}

/// Child and infant multipliers for a passenger-scaled category.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FareRates {
    pub child: f64,
    /// `None` when the category has no infant tier.
    pub infant: Option<f64>,
}

pub const FLIGHT_FARE_RATES: FareRates = FareRates {
    child: FLIGHT_CHILD_RATE,
    infant: Some(FLIGHT_INFANT_RATE),
};

// Trains and buses have no infant tier
pub const GROUND_FARE_RATES: FareRates = FareRates {
    child: GROUND_CHILD_RATE,
    infant: None,
};

pub fn meal_rate(plan: MealPlan) -> f64 {
    match plan {
        MealPlan::None => 0.0,
        MealPlan::Breakfast => 500.0,
        MealPlan::HalfBoard => 1500.0,
        MealPlan::FullBoard => 2500.0,
    }
}

fn check_tariff(price: f64) -> Result<f64, PricingError> {
    if price.is_finite() && price >= 0.0 {
        Ok(price)
    } else {
        Err(PricingError::InvalidTariff(price))
    }
}

fn require_positive(value: u32, field: &'static str) -> Result<u32, PricingError> {
    if value == 0 {
        Err(PricingError::InvalidQuantity { field })
    } else {
        Ok(value)
    }
}

/// Flight, train and bus fares.
///
/// One way: `base*adults + base*childRate*children [+ base*infantRate*infants]`.
/// A round trip is exactly twice the one-way total; there is no return discount.
pub fn price_fare(
    rates: FareRates,
    base: f64,
    passengers: PassengerMix,
    trip_type: TripType,
) -> Result<PriceBreakdown, PricingError> {
    let base = check_tariff(base)?;
    require_positive(passengers.adults, "adults")?;
    let legs = trip_type.legs() as f64;

    let adult_fare = base * passengers.adults as f64 * legs;
    let child_fare = base * rates.child * passengers.children as f64 * legs;
    // Infants ride free on categories without an infant tier
    let infant_fare = rates
        .infant
        .map_or(0.0, |rate| base * rate * passengers.infants as f64 * legs);

    let mut line_items = vec![LineItem::new(
        format!("Adult fare x{}", passengers.adults),
        adult_fare,
    )];
    if passengers.children > 0 {
        line_items.push(LineItem::new(
            format!("Child fare x{}", passengers.children),
            child_fare,
        ));
    }
    if passengers.infants > 0 && rates.infant.is_some() {
        line_items.push(LineItem::new(
            format!("Infant fare x{}", passengers.infants),
            infant_fare,
        ));
    }

    Ok(PriceBreakdown::from_parts(
        adult_fare,
        child_fare + infant_fare,
        0.0,
        line_items,
    ))
}

pub fn price_cab(
    base: f64,
    trip_type: TripType,
    extras: CabExtras,
) -> Result<PriceBreakdown, PricingError> {
    let base = check_tariff(base)?;
    let trip_total = base * trip_type.legs() as f64;

    let mut line_items = vec![LineItem::new(
        match trip_type {
            TripType::OneWay => "Trip fare (one-way)",
            TripType::RoundTrip => "Trip fare (round-trip)",
        },
        trip_total,
    )];
    let addons = [
        (extras.driver, "Driver", CAB_DRIVER_FEE),
        (extras.toll_charges, "Toll charges", CAB_TOLL_FEE),
        (extras.parking, "Parking", CAB_PARKING_FEE),
        (extras.waiting_time, "Waiting time", CAB_WAITING_FEE),
    ];
    let mut addons_total = 0.0;
    for (selected, label, fee) in addons {
        if selected {
            addons_total += fee;
            line_items.push(LineItem::new(label, fee));
        }
    }

    Ok(PriceBreakdown::from_parts(
        trip_total,
        0.0,
        addons_total,
        line_items,
    ))
}

/// Hotel stay: `roomTariff * nights * rooms` plus extras.
pub fn price_hotel(
    room_tariff: f64,
    nights: u32,
    rooms: u32,
    extras: HotelExtras,
) -> Result<PriceBreakdown, PricingError> {
    let room_tariff = check_tariff(room_tariff)?;
    let nights = require_positive(nights, "nights")? as f64;
    let rooms = require_positive(rooms, "rooms")? as f64;

    let accommodation = room_tariff * nights * rooms;
    let mut line_items = vec![LineItem::new(
        format!("Room x{} for {} nights", rooms, nights),
        accommodation,
    )];

    let per_room_night = [
        (extras.breakfast, "Breakfast", HOTEL_BREAKFAST_RATE),
        (extras.wifi, "Wi-Fi", HOTEL_WIFI_RATE),
        (extras.parking, "Parking", HOTEL_PARKING_RATE),
    ];
    let mut addons_total = 0.0;
    for (selected, label, rate) in per_room_night {
        if selected {
            let amount = rate * nights * rooms;
            addons_total += amount;
            line_items.push(LineItem::new(label, amount));
        }
    }
    if extras.late_checkout {
        addons_total += HOTEL_LATE_CHECKOUT_FEE;
        line_items.push(LineItem::new("Late check-out", HOTEL_LATE_CHECKOUT_FEE));
    }

    Ok(PriceBreakdown::from_parts(
        accommodation,
        0.0,
        addons_total,
        line_items,
    ))
}

/// Holiday package.
///
/// The accommodation tariff already covers the whole stay per traveler, so it is not
/// multiplied by nights. Meals scale by nights and travelers.
pub fn price_package(
    accommodation_tariff: f64,
    travelers: u32,
    nights: u32,
    meal_plan: MealPlan,
    addons: PackageAddons,
) -> Result<PriceBreakdown, PricingError> {
    let accommodation_tariff = check_tariff(accommodation_tariff)?;
    let travelers = require_positive(travelers, "travelers")? as f64;
    let nights = require_positive(nights, "nights")? as f64;

    let accommodation = accommodation_tariff * travelers;
    let meals = nights * travelers * meal_rate(meal_plan);

    let mut line_items = vec![LineItem::new(
        format!("Accommodation x{}", travelers),
        accommodation,
    )];
    if meals > 0.0 {
        line_items.push(LineItem::new(format!("Meals ({:?})", meal_plan), meals));
    }

    let mut addons_total = 0.0;
    if addons.transfers {
        addons_total += PACKAGE_TRANSFERS_FEE;
        line_items.push(LineItem::new("Transfers", PACKAGE_TRANSFERS_FEE));
    }
    if addons.travel_insurance {
        let amount = PACKAGE_INSURANCE_PER_TRAVELER * travelers;
        addons_total += amount;
        line_items.push(LineItem::new("Travel insurance", amount));
    }
    if addons.guide {
        let amount = PACKAGE_GUIDE_PER_NIGHT * nights;
        addons_total += amount;
        line_items.push(LineItem::new("Guide", amount));
    }

    Ok(PriceBreakdown::from_parts(
        accommodation,
        meals,
        addons_total,
        line_items,
    ))
}

/// Prices any selection against the tariff price of its chosen variant.
pub fn price_selection(
    selection: &TripSelection,
    tariff_price: f64,
) -> Result<PriceBreakdown, PricingError> {
    let category = selection.category();
    let breakdown = match selection {
        TripSelection::Flight(fare) => {
            price_fare(FLIGHT_FARE_RATES, tariff_price, fare.passengers, fare.trip_type)?
        }
        TripSelection::Train(fare) | TripSelection::Bus(fare) => {
            price_fare(GROUND_FARE_RATES, tariff_price, fare.passengers, fare.trip_type)?
        }
        TripSelection::Cab(cab) => price_cab(tariff_price, cab.trip_type, cab.extras)?,
        TripSelection::Hotel(hotel) => {
            let nights = nights_between(hotel.check_in, hotel.check_out)?;
            price_hotel(tariff_price, nights, hotel.rooms, hotel.extras)?
        }
        TripSelection::Package(package) => price_package(
            tariff_price,
            package.travelers,
            package.nights,
            package.meal_plan,
            package.addons,
        )?,
    };

    debug!(
        category = %category,
        variant = selection.variant(),
        tariff = tariff_price,
        total = breakdown.total,
        "priced selection"
    );
    Ok(breakdown)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::{FareSelection, HotelSelection};
    use chrono::{TimeZone, Utc};
    use test_case::test_case;

    fn flight() -> FareRates {
        FLIGHT_FARE_RATES
    }

    fn ground() -> FareRates {
        GROUND_FARE_RATES
    }

    #[test_case(flight(), 5000.0, PassengerMix::new(2, 1, 0), TripType::OneWay, 13_750.0; "#1 flight one-way")]
    #[test_case(flight(), 5000.0, PassengerMix::new(2, 1, 0), TripType::RoundTrip, 27_500.0; "#2 flight round-trip")]
    #[test_case(flight(), 5000.0, PassengerMix::new(1, 0, 1), TripType::OneWay, 5_500.0; "#3 flight with infant")]
    #[test_case(ground(), 1200.0, PassengerMix::new(2, 1, 0), TripType::OneWay, 3_000.0; "#4 train")]
    #[test_case(ground(), 800.0, PassengerMix::new(2, 1, 0), TripType::OneWay, 2_000.0; "#5 bus one-way")]
    #[test_case(ground(), 800.0, PassengerMix::new(2, 1, 0), TripType::RoundTrip, 4_000.0; "#6 bus round-trip")]
    #[test_case(ground(), 800.0, PassengerMix::new(1, 0, 2), TripType::OneWay, 800.0; "#7 bus infants ride free")]
    fn test_fare_totals(
        rates: FareRates,
        base: f64,
        passengers: PassengerMix,
        trip_type: TripType,
        expected: f64,
    ) {
        let breakdown = price_fare(rates, base, passengers, trip_type).unwrap();
        assert_eq!(breakdown.total, expected);
        assert_eq!(breakdown.addons_total, 0.0);
    }

    #[test]
    fn test_round_trip_is_exactly_double() {
        for (rates, base) in [(flight(), 4321.17), (ground(), 987.65)] {
            let passengers = PassengerMix::new(3, 2, 1);
            let one_way = price_fare(rates, base, passengers, TripType::OneWay).unwrap();
            let round_trip = price_fare(rates, base, passengers, TripType::RoundTrip).unwrap();
            assert_eq!(round_trip.total, one_way.total * 2.0);
        }
    }

    #[test]
    fn test_fare_formula() {
        let base = 5000.0;
        let breakdown = price_fare(flight(), base, PassengerMix::new(2, 1, 1), TripType::OneWay).unwrap();
        assert_eq!(breakdown.base, base * 2.0);
        assert_eq!(
            breakdown.per_passenger_or_unit_adjustments,
            base * FLIGHT_CHILD_RATE + base * FLIGHT_INFANT_RATE
        );
        assert_eq!(breakdown.line_items.len(), 3);
    }

    #[test]
    fn test_fare_requires_an_adult() {
        let result = price_fare(flight(), 5000.0, PassengerMix::new(0, 2, 0), TripType::OneWay);
        assert_eq!(result, Err(PricingError::InvalidQuantity { field: "adults" }));
    }

    #[test_case(TripType::OneWay, CabExtras { driver: true, toll_charges: true, ..Default::default() }, 1_100.0; "#1 one-way driver and tolls")]
    #[test_case(TripType::RoundTrip, CabExtras::default(), 1_600.0; "#2 round-trip no extras")]
    #[test_case(TripType::RoundTrip, CabExtras { driver: true, toll_charges: true, parking: true, waiting_time: true }, 2_100.0; "#3 round-trip all extras stay flat")]
    fn test_cab_totals(trip_type: TripType, extras: CabExtras, expected: f64) {
        let breakdown = price_cab(800.0, trip_type, extras).unwrap();
        assert_eq!(breakdown.total, expected);
    }

    #[test]
    fn test_hotel_extras_scale_per_room_night() {
        let extras = HotelExtras {
            breakfast: true,
            wifi: true,
            parking: true,
            late_checkout: true,
        };
        let breakdown = price_hotel(3000.0, 3, 2, extras).unwrap();

        assert_eq!(breakdown.base, 18_000.0);
        // (500 + 200 + 300) * 3 nights * 2 rooms + 1000 flat
        assert_eq!(breakdown.addons_total, 7_000.0);
        assert_eq!(breakdown.total, 25_000.0);
    }

    #[test]
    fn test_hotel_total_non_decreasing() {
        let extras_sets = [
            HotelExtras::default(),
            HotelExtras { breakfast: true, ..Default::default() },
            HotelExtras { breakfast: true, wifi: true, ..Default::default() },
            HotelExtras { breakfast: true, wifi: true, parking: true, ..Default::default() },
            HotelExtras { breakfast: true, wifi: true, parking: true, late_checkout: true },
        ];

        let mut previous_by_extras = 0.0;
        for extras in extras_sets {
            let total = price_hotel(2500.0, 2, 1, extras).unwrap().total;
            assert!(total >= previous_by_extras);
            previous_by_extras = total;

            let mut previous = 0.0;
            for nights in 1..=7 {
                let total = price_hotel(2500.0, nights, 1, extras).unwrap().total;
                assert!(total >= previous);
                previous = total;
            }
            let mut previous = 0.0;
            for rooms in 1..=5 {
                let total = price_hotel(2500.0, 2, rooms, extras).unwrap().total;
                assert!(total >= previous);
                previous = total;
            }
        }
    }

    #[test_case(0, 1, "nights")]
    #[test_case(2, 0, "rooms")]
    fn test_hotel_rejects_zero_counts(nights: u32, rooms: u32, field: &'static str) {
        assert_eq!(
            price_hotel(2500.0, nights, rooms, HotelExtras::default()),
            Err(PricingError::InvalidQuantity { field })
        );
    }

    #[test_case(PackageAddons { transfers: true, travel_insurance: true, guide: true }, 86_000.0; "#1 all add-ons")]
    #[test_case(PackageAddons { transfers: true, ..Default::default() }, 71_000.0; "#2 transfers only")]
    #[test_case(PackageAddons::default(), 69_000.0; "#3 no add-ons")]
    fn test_package_totals(addons: PackageAddons, expected: f64) {
        let breakdown = price_package(13_000.0, 3, 4, MealPlan::FullBoard, addons).unwrap();
        assert_eq!(breakdown.base, 39_000.0);
        assert_eq!(breakdown.per_passenger_or_unit_adjustments, 30_000.0);
        assert_eq!(breakdown.total, expected);
    }

    #[test]
    fn test_meal_plan_does_not_touch_accommodation() {
        let plans = [
            MealPlan::None,
            MealPlan::Breakfast,
            MealPlan::HalfBoard,
            MealPlan::FullBoard,
        ];
        for plan in plans {
            let breakdown = price_package(13_000.0, 3, 4, plan, PackageAddons::default()).unwrap();
            assert_eq!(breakdown.base, 39_000.0);
            assert_eq!(breakdown.per_passenger_or_unit_adjustments, 4.0 * 3.0 * meal_rate(plan));
        }
    }

    #[test]
    fn test_total_matches_components_and_line_items() {
        let breakdown = price_package(
            13_000.0,
            3,
            4,
            MealPlan::HalfBoard,
            PackageAddons { transfers: true, travel_insurance: true, guide: true },
        )
        .unwrap();

        let components = breakdown.base + breakdown.per_passenger_or_unit_adjustments + breakdown.addons_total;
        let items: f64 = breakdown.line_items.iter().map(|item| item.amount).sum();
        assert_eq!(breakdown.total, components);
        assert_eq!(breakdown.total, items);
    }

    #[test]
    fn test_invalid_tariff_is_rejected() {
        assert_eq!(
            price_cab(-1.0, TripType::OneWay, CabExtras::default()),
            Err(PricingError::InvalidTariff(-1.0))
        );
        assert!(price_cab(f64::NAN, TripType::OneWay, CabExtras::default()).is_err());
    }

    #[test]
    fn test_price_selection_dispatch() {
        let train = TripSelection::Train(FareSelection {
            class: "3A".to_string(),
            trip_type: TripType::OneWay,
            passengers: PassengerMix::new(2, 1, 0),
        });
        assert_eq!(price_selection(&train, 1200.0).unwrap().total, 3_000.0);

        let hotel = TripSelection::Hotel(HotelSelection {
            room_type: "deluxe".to_string(),
            rooms: 1,
            guests: PassengerMix::adults(2),
            check_in: Utc.with_ymd_and_hms(2025, 6, 1, 14, 0, 0).unwrap(),
            check_out: Utc.with_ymd_and_hms(2025, 6, 3, 11, 0, 0).unwrap(),
            extras: HotelExtras::default(),
        });
        assert_eq!(price_selection(&hotel, 4000.0).unwrap().total, 8_000.0);
    }

    #[test]
    fn test_price_selection_rejects_inverted_stay() {
        let hotel = TripSelection::Hotel(HotelSelection {
            room_type: "deluxe".to_string(),
            rooms: 1,
            guests: PassengerMix::adults(2),
            check_in: Utc.with_ymd_and_hms(2025, 6, 3, 14, 0, 0).unwrap(),
            check_out: Utc.with_ymd_and_hms(2025, 6, 1, 11, 0, 0).unwrap(),
            extras: HotelExtras::default(),
        });
        assert!(matches!(
            price_selection(&hotel, 4000.0),
            Err(PricingError::DateRange(_))
        ));
    }
}
