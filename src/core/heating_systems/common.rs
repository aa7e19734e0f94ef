use crate::core::heating_systems::heat_pump::HeatPumpWaterHeater;
use crate::core::heating_systems::point_of_use::InstantaneousWaterHeater;
use crate::core::heating_systems::solar_thermal::SolarBoostedWaterHeater;
use crate::core::heating_systems::storage_tank::{StorageWaterHeater, TankState};
use crate::core::water_heat_demand::draw_events::HotWaterDrawEvent;
use crate::errors::WohResult;

/// Everything a water heater sees in one hour of the annual simulation.
#[derive(Clone, Copy, Debug)]
pub struct HourInputs<'a> {
    pub hour: usize,
    pub hour_of_day: u32,
    pub draws: &'a [HotWaterDrawEvent],
    /// Cold mains temperature, in ºC
    pub mains_temperature: f64,
    /// Temperature of the water entering the heater, in ºC. Equal to the mains temperature
    /// unless a preheat stage sits in front of the heater.
    pub inlet_temperature: f64,
    /// Air temperature around the heater, in ºC
    pub ambient_temperature: f64,
    /// Global horizontal irradiance, in W/m2
    pub irradiance: f64,
}

impl HourInputs<'_> {
    pub fn draw_volume(&self) -> f64 {
        self.draws.iter().map(|d| d.volume).sum()
    }
}

/// Energy flows for one hour of one water heater, all in kWh.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StepOutcome {
    /// Heat carried away by draws, relative to the water heater inlet temperature
    pub heat_delivered: f64,
    /// Heat added to the water by the heater
    pub heat_input: f64,
    /// Energy drawn from the heater's own carrier (electricity or gas)
    pub energy_input: f64,
    /// Electricity for controls, ignition and pumps
    pub auxiliary_energy: f64,
    /// Net heat lost from stored water to its surroundings
    pub standby_loss: f64,
    /// Heat contributed by a solar preheat stage
    pub solar_heat: f64,
    /// Heat that would have been needed to bring all draws up to their delivery temperature
    pub unmet_energy: f64,
    /// Whether heater capacity limited the heat delivered to draws this hour
    pub capacity_shortfall: bool,
    pub tank: Option<TankState>,
}

/// Something that heats stored water: an element, a burner or a heat pump.
pub trait HeatSource {
    /// Most heat (kWh) the source can put into the water this hour
    fn max_heat_output(&self, inputs: &HourInputs) -> f64;

    /// Energy (kWh of the source's carrier) needed to put `heat` kWh into the water
    fn energy_input_for_heat(&self, heat: f64, inputs: &HourInputs) -> f64;
}

/// A resistive element or gas burner with a fixed thermal capacity and efficiency.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DirectHeater {
    /// kW
    capacity: f64,
    efficiency: f64,
}

impl DirectHeater {
    pub fn new(capacity: f64, efficiency: f64) -> Self {
        Self {
            capacity,
            efficiency,
        }
    }
}

impl HeatSource for DirectHeater {
    fn max_heat_output(&self, _inputs: &HourInputs) -> f64 {
        self.capacity
    }

    fn energy_input_for_heat(&self, heat: f64, _inputs: &HourInputs) -> f64 {
        heat / self.efficiency
    }
}

/// The simulation strategy selected for a dwelling's water heater. Every variant implements the
/// same hourly step.
#[derive(Clone, Debug)]
pub enum WaterHeater {
    Storage(StorageWaterHeater),
    Instantaneous(InstantaneousWaterHeater),
    HeatPump(HeatPumpWaterHeater),
    SolarBoosted(SolarBoostedWaterHeater),
}

impl WaterHeater {
    pub fn step(&mut self, inputs: &HourInputs) -> WohResult<StepOutcome> {
        match self {
            WaterHeater::Storage(heater) => heater.step(inputs),
            WaterHeater::Instantaneous(heater) => Ok(heater.step(inputs)),
            WaterHeater::HeatPump(heater) => heater.step(inputs),
            WaterHeater::SolarBoosted(heater) => heater.step(inputs),
        }
    }

    pub fn tank_state(&self) -> Option<&TankState> {
        match self {
            WaterHeater::Storage(heater) => Some(heater.tank().state()),
            WaterHeater::Instantaneous(_) => None,
            WaterHeater::HeatPump(heater) => Some(heater.tank().state()),
            WaterHeater::SolarBoosted(heater) => heater.base().tank_state(),
        }
    }

    /// Whether results from this strategy are a simplified approximation of the methodology
    pub fn is_approximate(&self) -> bool {
        matches!(self, WaterHeater::SolarBoosted(_))
    }
}
