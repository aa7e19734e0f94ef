use crate::core::units::{DAYS_PER_YEAR, MEGAJOULES_PER_GIGAJOULE};
use crate::errors::{WohError, WohResult};
use crate::input::ClimateZone;
use serde::Serialize;

/// Hot water delivered per occupant on a winter peak day, in litres
pub const WINTER_PEAK_LITRES_PER_OCCUPANT: f64 = 40.;

/// Ratio of annual average daily hot water demand to winter peak daily demand
pub const ANNUAL_TO_WINTER_PEAK_RATIO: f64 = 0.904521;

/// Litres of hot water per MJ of delivered energy for each hot water climate zone. Colder zones
/// have colder mains water, so each MJ heats fewer litres.
fn litres_per_megajoule(zone: &ClimateZone) -> WohResult<f64> {
    match zone.0 {
        1 => Ok(6.144),
        2 => Ok(5.482),
        3 => Ok(5.107),
        4 => Ok(4.746),
        5 => Ok(4.514),
        _ => Err(WohError::UnknownClimateZone(zone.to_string())),
    }
}

/// Reference hot water demand for a household in a climate zone.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ReferenceHotWaterDemand {
    pub occupants: f64,
    /// litres/day
    pub winter_peak_daily_volume: f64,
    /// litres/year
    pub annual_volume: f64,
    /// MJ/day
    pub winter_peak_daily_energy: f64,
    /// GJ/year
    pub annual_energy: f64,
}

impl ReferenceHotWaterDemand {
    pub fn new(occupants: f64, zone: &ClimateZone) -> WohResult<Self> {
        let winter_peak_daily_volume = WINTER_PEAK_LITRES_PER_OCCUPANT * occupants;
        let winter_peak_daily_energy = winter_peak_daily_volume / litres_per_megajoule(zone)?;

        Ok(Self {
            occupants,
            winter_peak_daily_volume,
            annual_volume: reference_annual_volume(occupants),
            winter_peak_daily_energy,
            annual_energy: winter_peak_daily_energy
                * DAYS_PER_YEAR as f64
                * ANNUAL_TO_WINTER_PEAK_RATIO
                / MEGAJOULES_PER_GIGAJOULE,
        })
    }
}

/// Annual reference hot water draw volume, in litres
pub fn reference_annual_volume(occupants: f64) -> f64 {
    WINTER_PEAK_LITRES_PER_OCCUPANT * occupants * DAYS_PER_YEAR as f64 * ANNUAL_TO_WINTER_PEAK_RATIO
}
