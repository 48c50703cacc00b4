//! Motor and battery sizing.
//!
//! Closed-form estimates only; every function here is pure.

use serde::Serialize;

use crate::form::{FormData, TripDuration, WaterType};
use crate::product::{Motor, MotorCatalog};

const FEET_PER_METER: f64 = 3.28084;
const KMH_PER_KNOT: f64 = 1.852;
const HULL_SPEED_COEFFICIENT: f64 = 1.34;
const CRUISE_FRACTION: f64 = 0.7;
const BATTERY_RESERVE: f64 = 1.2;
const CRUISE_LOAD: f64 = 0.7;

/// Hull speed in km/h from the waterline length in meters.
///
/// Negative lengths produce NaN; callers pass a clamped length.
pub fn hull_speed(length_m: f64) -> f64 {
    let length_ft = length_m * FEET_PER_METER;
    HULL_SPEED_COEFFICIENT * length_ft.sqrt() * KMH_PER_KNOT
}

pub fn cruising_speed(length_m: f64) -> f64 {
    hull_speed(length_m) * CRUISE_FRACTION
}

/// Continuous power estimate in kW, before matching against the catalog.
pub fn required_power(weight_kg: f64, length_m: f64, water: Option<WaterType>) -> f64 {
    let base = weight_kg / 500.0 + length_m * 0.5;
    base * water.map_or(1.0, WaterType::power_factor)
}

/// Battery size in kWh, rounded up, with a 20% reserve.
pub fn battery_capacity(motor_power: f64, trip: Option<TripDuration>) -> u32 {
    let hours = trip.map_or(TripDuration::FALLBACK_HOURS, TripDuration::hours);
    (motor_power * hours * BATTERY_RESERVE).ceil() as u32
}

/// First motor in catalog order that covers power, weight and length.
///
/// Falls back to the last entry; never fails.
pub fn select_motor<'a>(
    required_power: f64,
    weight_kg: f64,
    length_m: f64,
    catalog: &'a MotorCatalog,
) -> &'a Motor {
    catalog
        .motors()
        .iter()
        .find(|m| m.fits(required_power, weight_kg, length_m))
        .unwrap_or_else(|| catalog.largest())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub motor: Motor,
    pub required_power: f64,
    pub hull_speed: f64,
    pub cruising_speed: f64,
    pub battery_capacity: u32,
    pub estimated_cruising_time: u32,
}

impl Recommendation {
    /// One decimal, the way results and submissions show it.
    pub fn cruising_speed_label(&self) -> String {
        format!("{:.1}", self.cruising_speed)
    }
}

pub fn recommend(form: &FormData, catalog: &MotorCatalog) -> Recommendation {
    let length = form.boat_length;
    let weight = form.boat_weight;

    let required = required_power(weight, length, form.water_type);
    let motor = select_motor(required, weight, length, catalog);
    let battery = battery_capacity(motor.power, form.trip_duration);
    let cruising_time = (f64::from(battery) / (motor.power * CRUISE_LOAD)).round() as u32;

    Recommendation {
        motor: motor.clone(),
        required_power: required,
        hull_speed: hull_speed(length),
        cruising_speed: cruising_speed(length),
        battery_capacity: battery,
        estimated_cruising_time: cruising_time,
    }
}
