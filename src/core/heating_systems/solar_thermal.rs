use crate::climate::ClimateSeries;
use crate::core::heating_systems::common::{HourInputs, StepOutcome, WaterHeater};
use crate::core::units::{HOURS_PER_DAY, WATTS_PER_KILOWATT};
use crate::core::water_heat_demand::misc::water_demand_to_kwh;
use crate::errors::WohResult;

/// Highest share of a day's water heating load the preheat stage is credited with
const MAX_SOLAR_FRACTION: f64 = 0.85;

/// Collector optical efficiency at zero heat loss
const PEAK_COLLECTOR_EFFICIENCY: f64 = 0.7;

/// Collector heat loss coefficient, in W/(m2.K)
const COLLECTOR_HEAT_LOSS_COEFFICIENT: f64 = 4.;

/// Simplified daily solar-fraction preheat.
///
/// Each day the collector's useful yield is compared with the day's water heating load; the
/// resulting fraction raises the inlet temperature seen by the downstream heater. This is an
/// approximation of the methodology's solar treatment, not a full collector loop model.
#[derive(Clone, Debug, PartialEq)]
pub struct SolarPreheat {
    /// m2
    collector_area: f64,
    /// Circulation pump power, in kW
    pump_power: f64,
}

impl SolarPreheat {
    pub fn new(collector_area: f64, pump_power: f64) -> Self {
        Self {
            collector_area,
            pump_power,
        }
    }

    /// Useful collector yield over one day, in kWh
    fn daily_yield(&self, climate: &ClimateSeries, day: usize, setpoint: f64) -> f64 {
        let hours = day * HOURS_PER_DAY as usize..(day + 1) * HOURS_PER_DAY as usize;
        let daylight_hours = hours
            .clone()
            .filter(|h| climate.global_irradiance(*h) > 0.)
            .collect::<Vec<_>>();
        if daylight_hours.is_empty() {
            return 0.;
        }

        let mean_ambient = daylight_hours
            .iter()
            .map(|h| climate.ambient_temperature(*h))
            .sum::<f64>()
            / daylight_hours.len() as f64;
        let mean_mains = hours.map(|h| climate.mains_temperature(h)).sum::<f64>()
            / HOURS_PER_DAY as f64;
        let mean_collector_temperature = (mean_mains + setpoint) / 2.;

        let absorbed = PEAK_COLLECTOR_EFFICIENCY * climate.daily_irradiation(day);
        let lost = COLLECTOR_HEAT_LOSS_COEFFICIENT
            * (mean_collector_temperature - mean_ambient)
            * daylight_hours.len() as f64
            / WATTS_PER_KILOWATT as f64;

        self.collector_area * (absorbed - lost).max(0.)
    }

    /// Share of each day's water heating load met by the preheat stage.
    pub fn daily_fractions(
        &self,
        daily_draw_volumes: &[f64],
        climate: &ClimateSeries,
        setpoint: f64,
    ) -> Vec<f64> {
        daily_draw_volumes
            .iter()
            .enumerate()
            .map(|(day, volume)| {
                let start = day * HOURS_PER_DAY as usize;
                let mean_mains = (start..start + HOURS_PER_DAY as usize)
                    .map(|h| climate.mains_temperature(h))
                    .sum::<f64>()
                    / HOURS_PER_DAY as f64;
                let load = water_demand_to_kwh(*volume, setpoint, mean_mains);
                if load <= 0. {
                    return 0.;
                }
                (self.daily_yield(climate, day, setpoint) / load).min(MAX_SOLAR_FRACTION)
            })
            .collect()
    }
}

/// A base water heater with a solar preheat stage in front of it.
#[derive(Clone, Debug)]
pub struct SolarBoostedWaterHeater {
    preheat: SolarPreheat,
    daily_fractions: Vec<f64>,
    setpoint: f64,
    base: Box<WaterHeater>,
}

impl SolarBoostedWaterHeater {
    pub fn new(
        preheat: SolarPreheat,
        daily_fractions: Vec<f64>,
        setpoint: f64,
        base: WaterHeater,
    ) -> Self {
        Self {
            preheat,
            daily_fractions,
            setpoint,
            base: Box::new(base),
        }
    }

    pub fn base(&self) -> &WaterHeater {
        &self.base
    }

    pub fn step(&mut self, inputs: &HourInputs) -> WohResult<StepOutcome> {
        let day = inputs.hour / HOURS_PER_DAY as usize;
        let fraction = self.daily_fractions.get(day).copied().unwrap_or(0.);
        let preheated = inputs.inlet_temperature
            + fraction * (self.setpoint - inputs.inlet_temperature).max(0.);

        let solar_heat = inputs
            .draws
            .iter()
            .map(|draw| water_demand_to_kwh(draw.volume, preheated, inputs.inlet_temperature))
            .sum::<f64>();

        let mut outcome = self.base.step(&HourInputs {
            inlet_temperature: preheated,
            ..*inputs
        })?;

        outcome.solar_heat = solar_heat;
        outcome.heat_delivered += solar_heat;
        if fraction > 0. && inputs.irradiance > 0. {
            outcome.auxiliary_energy += self.preheat.pump_power;
        }
        Ok(outcome)
    }
}
