use crate::core::heating_systems::storage_tank::TankState;
use crate::results::ProfileKey;
use thiserror::Error;

pub type WohResult<T> = Result<T, WohError>;

#[derive(Debug, Error)]
pub enum WohError {
    #[error("Invalid household composition: {0}")]
    InvalidHouseholdComposition(String),
    #[error("Invalid dwelling profile: {0}")]
    InvalidDwellingProfile(String),
    #[error("Climate zone '{0}' is not known to the climate reference provider")]
    UnknownClimateZone(String),
    #[error("No hot water simulation strategy is registered for heater type '{0}'")]
    UnsupportedHeaterType(String),
    #[error("Methodology revision '{0}' is not implemented")]
    UnsupportedRevision(String),
    #[error("Invalid hot water system configuration: {0}")]
    InvalidHotWaterSystem(String),
    #[error("Thermal simulation diverged at hour {hour}: {reason} (state: {snapshot:?})")]
    ThermalDivergence {
        hour: usize,
        snapshot: Box<TankState>,
        reason: String,
    },
    #[error("Profile {key} has {length} hourly values, expected {expected}")]
    IncompleteProfile {
        key: ProfileKey,
        length: usize,
        expected: usize,
    },
    #[error("Profile {key} has invalid value {value} at hour {hour}")]
    InvalidProfileValue {
        key: ProfileKey,
        hour: usize,
        value: f64,
    },
    #[error("Error reading reference data: {0}")]
    ReferenceData(#[from] anyhow::Error),
}

impl WohError {
    /// Whether the error comes from bad caller input (as opposed to an internal defect or a
    /// mid-simulation failure).
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            WohError::InvalidHouseholdComposition(_)
                | WohError::InvalidDwellingProfile(_)
                | WohError::UnknownClimateZone(_)
                | WohError::UnsupportedHeaterType(_)
                | WohError::UnsupportedRevision(_)
                | WohError::InvalidHotWaterSystem(_)
        )
    }
}
