use crate::core::heating_systems::common::{HeatSource, HourInputs, StepOutcome};
use crate::core::heating_systems::storage_tank::StorageTank;
use crate::core::units::celsius_to_kelvin;
use crate::errors::WohResult;
use anyhow::bail;

// This module provides objects to represent air-source heat pump water heaters. The compressor
// CoP follows the Carnot CoP between ambient air and the tank setpoint, scaled by an exergetic
// efficiency calibrated so the unit achieves its rated CoP at the rating ambient temperature.

/// Ambient temperature at which the rated CoP is declared, in ºC
const RATING_AMBIENT_TEMPERATURE: f64 = 20.;

/// Below this ambient temperature (ºC) the compressor is locked out and the backup element runs
const MIN_OPERATING_AMBIENT_TEMPERATURE: f64 = -10.;

/// Lower limit on the source-to-outlet temperature lift used in the Carnot CoP, in K
const TEMP_DIFF_LIMIT_LOW: f64 = 10.;

/// Calculate Carnot CoP based on source and outlet temperatures (in Kelvin)
fn carnot_cop(temp_source: f64, temp_outlet: f64, temp_diff_limit_low: Option<f64>) -> f64 {
    let mut temp_diff = temp_outlet - temp_source;
    if let Some(low_limit) = temp_diff_limit_low {
        temp_diff = temp_diff.max(low_limit);
    }
    temp_outlet / temp_diff
}

#[derive(Clone, Debug, PartialEq)]
pub struct HeatPumpUnit {
    /// Compressor thermal capacity, in kW
    capacity: f64,
    /// Backup element capacity, in kW
    backup_capacity: f64,
    /// Outlet (condensing) temperature, in K
    temp_outlet: f64,
    exergetic_efficiency: f64,
}

impl HeatPumpUnit {
    pub fn new(
        rated_cop: f64,
        capacity: f64,
        backup_capacity: f64,
        setpoint: f64,
    ) -> anyhow::Result<Self> {
        if !(rated_cop.is_finite() && rated_cop >= 1.) {
            bail!("Heat pump rated CoP must be at least 1, got {rated_cop}");
        }
        let temp_outlet = celsius_to_kelvin(setpoint)?;
        let rating_carnot_cop = carnot_cop(
            celsius_to_kelvin(RATING_AMBIENT_TEMPERATURE)?,
            temp_outlet,
            Some(TEMP_DIFF_LIMIT_LOW),
        );
        let exergetic_efficiency = rated_cop / rating_carnot_cop;
        if exergetic_efficiency > 1. {
            bail!(
                "Heat pump rated CoP {rated_cop} exceeds the Carnot limit of {rating_carnot_cop} at a setpoint of {setpoint}ºC"
            );
        }

        Ok(Self {
            capacity,
            backup_capacity,
            temp_outlet,
            exergetic_efficiency,
        })
    }

    /// Compressor CoP at the given ambient temperature (ºC), or None when the compressor
    /// cannot operate and the backup element takes over
    pub fn cop(&self, ambient_temperature: f64) -> Option<f64> {
        if ambient_temperature < MIN_OPERATING_AMBIENT_TEMPERATURE {
            return None;
        }
        let temp_source = celsius_to_kelvin(ambient_temperature).ok()?;
        Some(
            (self.exergetic_efficiency
                * carnot_cop(temp_source, self.temp_outlet, Some(TEMP_DIFF_LIMIT_LOW)))
            .max(1.),
        )
    }
}

impl HeatSource for HeatPumpUnit {
    fn max_heat_output(&self, inputs: &HourInputs) -> f64 {
        match self.cop(inputs.ambient_temperature) {
            Some(_) => self.capacity,
            None => self.backup_capacity,
        }
    }

    fn energy_input_for_heat(&self, heat: f64, inputs: &HourInputs) -> f64 {
        match self.cop(inputs.ambient_temperature) {
            Some(cop) => heat / cop,
            None => heat,
        }
    }
}

/// Heat pump water heater: a storage tank heated by an air-source heat pump.
#[derive(Clone, Debug)]
pub struct HeatPumpWaterHeater {
    tank: StorageTank,
    unit: HeatPumpUnit,
}

impl HeatPumpWaterHeater {
    pub fn new(tank: StorageTank, unit: HeatPumpUnit) -> Self {
        Self { tank, unit }
    }

    pub fn tank(&self) -> &StorageTank {
        &self.tank
    }

    pub fn step(&mut self, inputs: &HourInputs) -> WohResult<StepOutcome> {
        self.tank.step_with(inputs, &self.unit)
    }
}
