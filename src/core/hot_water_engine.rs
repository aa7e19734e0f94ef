use crate::climate::ClimateSeries;
use crate::core::end_uses::{EndUseGenerator, GenerationContext, GeneratorOutput};
use crate::core::heating_systems::common::{DirectHeater, HourInputs, StepOutcome, WaterHeater};
use crate::core::heating_systems::heat_pump::{HeatPumpUnit, HeatPumpWaterHeater};
use crate::core::heating_systems::point_of_use::InstantaneousWaterHeater;
use crate::core::heating_systems::solar_thermal::{SolarBoostedWaterHeater, SolarPreheat};
use crate::core::heating_systems::storage_tank::{
    default_standby_loss, StorageTank, StorageWaterHeater,
};
use crate::core::occupancy::OccupancyDiversitySeries;
use crate::core::units::{HOURS_PER_YEAR, WATTS_PER_KILOWATT};
use crate::core::water_heat_demand::dhw_demand::ReferenceHotWaterDemand;
use crate::core::water_heat_demand::draw_events::{
    DrawEventGenerator, DrawEventKind, DrawSchedule,
};
use crate::errors::{WohError, WohResult};
use crate::input::{
    EnergisationSchedule, EnergyCarrier, HotWaterFixtures, HotWaterSystem, HotWaterSystemType,
    SimulationSettings,
};
use crate::results::{EndUse, EndUseProfile, HotWaterDiagnostics, ProfileKey};
use crate::simulation_time::SimulationTime;
use tracing::{debug, instrument, warn};

// default heater capacities, in kW
const DEFAULT_ELECTRIC_ELEMENT_CAPACITY: f64 = 3.6;
const DEFAULT_GAS_STORAGE_BURNER_CAPACITY: f64 = 7.;
const DEFAULT_ELECTRIC_INSTANTANEOUS_CAPACITY: f64 = 27.;
const DEFAULT_GAS_INSTANTANEOUS_CAPACITY: f64 = 40.;
const DEFAULT_HEAT_PUMP_CAPACITY: f64 = 3.;
const HEAT_PUMP_BACKUP_ELEMENT_CAPACITY: f64 = 3.;

// default auxiliary electrical loads, in W
const GAS_INSTANTANEOUS_AUXILIARY_POWER: f64 = 10.;
const DEFAULT_SOLAR_PUMP_POWER: f64 = 40.;

/// m2
const DEFAULT_SOLAR_COLLECTOR_AREA: f64 = 4.;

const SOLAR_APPROXIMATION_NOTE: &str =
    "hot water solar preheat uses a simplified daily solar fraction model";

/// The hourly simulation strategy registered for a hot water system type.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum HeaterStrategy {
    Storage,
    Instantaneous,
    HeatPump,
    /// Solar preheat ahead of an electric storage tank
    SolarBoostedStorage,
    /// Solar preheat ahead of a gas instantaneous heater
    SolarBoostedInstantaneous,
}

/// Select the strategy and energy carrier for a system type, failing for types that have no
/// registered strategy.
pub fn select_strategy(
    system_type: HotWaterSystemType,
) -> WohResult<(HeaterStrategy, EnergyCarrier)> {
    Ok(match system_type {
        HotWaterSystemType::ElectricStorage | HotWaterSystemType::ElectricStorageLarge => {
            (HeaterStrategy::Storage, EnergyCarrier::Electricity)
        }
        HotWaterSystemType::GasStorage => (HeaterStrategy::Storage, EnergyCarrier::Gas),
        HotWaterSystemType::ElectricInstantaneous => {
            (HeaterStrategy::Instantaneous, EnergyCarrier::Electricity)
        }
        HotWaterSystemType::GasInstantaneous => (HeaterStrategy::Instantaneous, EnergyCarrier::Gas),
        HotWaterSystemType::HeatPump => (HeaterStrategy::HeatPump, EnergyCarrier::Electricity),
        HotWaterSystemType::SolarElectric => (
            HeaterStrategy::SolarBoostedStorage,
            EnergyCarrier::Electricity,
        ),
        HotWaterSystemType::SolarGas => {
            (HeaterStrategy::SolarBoostedInstantaneous, EnergyCarrier::Gas)
        }
        HotWaterSystemType::SolidFuel => {
            return Err(WohError::UnsupportedHeaterType(system_type.to_string()))
        }
    })
}

/// Hourly results of the annual hot water simulation.
#[derive(Clone, Debug, PartialEq)]
pub struct HotWaterSimulation {
    pub carrier: EnergyCarrier,
    /// Heater energy input on `carrier`, in kWh
    pub energy_input: Vec<f64>,
    /// Electricity for controls, ignition and pumps, in kWh
    pub auxiliary_electricity: Vec<f64>,
    pub diagnostics: HotWaterDiagnostics,
    pub approximate: bool,
}

impl HotWaterSimulation {
    fn new(carrier: EnergyCarrier) -> Self {
        Self {
            carrier,
            energy_input: Vec::with_capacity(HOURS_PER_YEAR),
            auxiliary_electricity: Vec::with_capacity(HOURS_PER_YEAR),
            diagnostics: Default::default(),
            approximate: false,
        }
    }

    fn record(&mut self, outcome: StepOutcome) {
        self.energy_input.push(outcome.energy_input);
        self.auxiliary_electricity.push(outcome.auxiliary_energy);

        let diagnostics = &mut self.diagnostics;
        diagnostics.heat_delivered += outcome.heat_delivered;
        diagnostics.heat_input += outcome.heat_input;
        diagnostics.standby_loss += outcome.standby_loss;
        diagnostics.solar_heat += outcome.solar_heat;
        diagnostics.unmet_energy += outcome.unmet_energy;
        if outcome.capacity_shortfall {
            diagnostics.shortfall_hours += 1;
        }
        if let Some(tank) = &outcome.tank {
            diagnostics.min_tank_temperature = Some(
                diagnostics
                    .min_tank_temperature
                    .map_or(tank.temperature, |t| t.min(tank.temperature)),
            );
            diagnostics.max_tank_temperature = Some(
                diagnostics
                    .max_tank_temperature
                    .map_or(tank.temperature, |t| t.max(tank.temperature)),
            );
        }
    }

    pub fn profiles(&self) -> Vec<EndUseProfile> {
        let mut profiles = vec![EndUseProfile::new(
            ProfileKey::new(EndUse::HotWater, self.carrier),
            self.energy_input.clone(),
        )];
        if self.auxiliary_electricity.iter().any(|energy| *energy > 0.) {
            profiles.push(EndUseProfile::new(
                ProfileKey::new(EndUse::HotWater, EnergyCarrier::Electricity),
                self.auxiliary_electricity.clone(),
            ));
        }
        profiles
    }
}

/// Two-stage hot water simulation for one dwelling's water heater: stochastic draw generation
/// followed by a sequential hourly fold over the heater's thermal state.
///
/// The heater strategy and its parameters are validated on construction, so configuration
/// errors surface before any draw is generated or any tank state is created.
#[derive(Clone, Debug)]
pub struct HotWaterSimulationEngine {
    system: HotWaterSystem,
    fixtures: HotWaterFixtures,
    strategy: HeaterStrategy,
    carrier: EnergyCarrier,
}

impl HotWaterSimulationEngine {
    pub fn new(
        system: &HotWaterSystem,
        fixtures: &HotWaterFixtures,
        settings: &SimulationSettings,
        climate: &ClimateSeries,
    ) -> WohResult<Self> {
        let (strategy, carrier) = select_strategy(system.system_type)?;
        let engine = Self {
            system: system.clone(),
            fixtures: fixtures.clone(),
            strategy,
            carrier,
        };
        engine.validate(settings, climate)?;
        Ok(engine)
    }

    pub fn strategy(&self) -> HeaterStrategy {
        self.strategy
    }

    pub fn carrier(&self) -> EnergyCarrier {
        self.carrier
    }

    fn invalid(message: String) -> WohError {
        WohError::InvalidHotWaterSystem(message)
    }

    fn validate(&self, settings: &SimulationSettings, climate: &ClimateSeries) -> WohResult<()> {
        let system = &self.system;
        let system_type = system.system_type;

        if !(system.rated_efficiency.is_finite() && system.rated_efficiency > 0.) {
            return Err(Self::invalid(format!(
                "rated efficiency of {system_type} must be positive, got {}",
                system.rated_efficiency
            )));
        }
        if self.strategy != HeaterStrategy::HeatPump && system.rated_efficiency > 1. {
            return Err(Self::invalid(format!(
                "rated efficiency of {system_type} cannot exceed 1, got {}",
                system.rated_efficiency
            )));
        }

        let max_mains = climate
            .mains_temperatures()
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max);
        let min_setpoint = max_mains.max(DrawEventKind::max_delivery_temperature());
        if !(system.setpoint.is_finite()
            && system.setpoint > max_mains
            && system.setpoint >= min_setpoint
            && system.setpoint <= settings.tank_cutoff_temperature)
        {
            return Err(Self::invalid(format!(
                "setpoint of {}ºC must be above the highest mains temperature ({max_mains}ºC), at least the hottest delivery temperature ({}ºC) and no more than the cutoff of {}ºC",
                system.setpoint,
                DrawEventKind::max_delivery_temperature(),
                settings.tank_cutoff_temperature
            )));
        }

        if self.is_storage() {
            self.storage_volume()?;
        }
        for (name, value) in [
            ("heater capacity", system.heater_capacity),
            ("solar collector area", system.solar_collector_area),
        ] {
            if let Some(value) = value {
                if !(value.is_finite() && value > 0.) {
                    return Err(Self::invalid(format!("{name} must be positive, got {value}")));
                }
            }
        }
        for (name, value) in [
            ("standby loss", system.standby_loss),
            ("auxiliary power", system.auxiliary_power),
        ] {
            if let Some(value) = value {
                if !(value.is_finite() && value >= 0.) {
                    return Err(Self::invalid(format!(
                        "{name} cannot be negative, got {value}"
                    )));
                }
            }
        }

        // only electric storage tanks (incl. heat pumps and solar electric) can be restricted
        // to off-peak or daytime energisation
        let schedulable = self.is_storage() && self.carrier == EnergyCarrier::Electricity;
        if !schedulable && system.energisation != EnergisationSchedule::Continuous {
            return Err(Self::invalid(format!(
                "{system_type} must be continuously energised, got {:?}",
                system.energisation
            )));
        }

        // large tanks have no load-following control and only run on a restricted tariff
        if system_type == HotWaterSystemType::ElectricStorageLarge
            && system.energisation == EnergisationSchedule::Continuous
        {
            return Err(Self::invalid(format!(
                "{system_type} must be energised daytime or overnight, not continuously"
            )));
        }

        if self.strategy == HeaterStrategy::HeatPump {
            self.heat_pump_unit()?;
        }

        self.validate_fixtures()
    }

    fn validate_fixtures(&self) -> WohResult<()> {
        let fixtures = &self.fixtures;
        // bath-sized events also stand in for showers when there are none
        let bath_volume_used = fixtures.baths > 0 || fixtures.showers == 0;
        for (name, value, used) in [
            ("shower flow rate", fixtures.shower_flow_rate, fixtures.showers > 0),
            ("bath fill volume", fixtures.bath_fill_volume, bath_volume_used),
        ] {
            if !(value.is_finite() && value >= 0.) || (used && value == 0.) {
                return Err(Self::invalid(format!("{name} must be positive, got {value}")));
            }
        }
        Ok(())
    }

    fn is_storage(&self) -> bool {
        matches!(
            self.strategy,
            HeaterStrategy::Storage | HeaterStrategy::HeatPump | HeaterStrategy::SolarBoostedStorage
        )
    }

    fn storage_volume(&self) -> WohResult<f64> {
        match self.system.storage_volume {
            Some(volume) if volume.is_finite() && volume > 0. => Ok(volume),
            Some(volume) => Err(Self::invalid(format!(
                "storage volume must be positive, got {volume}"
            ))),
            None => Err(Self::invalid(format!(
                "{} requires a storage volume",
                self.system.system_type
            ))),
        }
    }

    fn heater_capacity(&self) -> f64 {
        self.system
            .heater_capacity
            .unwrap_or(match (self.strategy, self.carrier) {
                (HeaterStrategy::Storage, EnergyCarrier::Gas) => DEFAULT_GAS_STORAGE_BURNER_CAPACITY,
                (HeaterStrategy::Storage | HeaterStrategy::SolarBoostedStorage, _) => {
                    DEFAULT_ELECTRIC_ELEMENT_CAPACITY
                }
                (HeaterStrategy::Instantaneous, EnergyCarrier::Electricity) => {
                    DEFAULT_ELECTRIC_INSTANTANEOUS_CAPACITY
                }
                (HeaterStrategy::Instantaneous | HeaterStrategy::SolarBoostedInstantaneous, _) => {
                    DEFAULT_GAS_INSTANTANEOUS_CAPACITY
                }
                (HeaterStrategy::HeatPump, _) => DEFAULT_HEAT_PUMP_CAPACITY,
            })
    }

    fn heat_pump_unit(&self) -> WohResult<HeatPumpUnit> {
        HeatPumpUnit::new(
            self.system.rated_efficiency,
            self.heater_capacity(),
            HEAT_PUMP_BACKUP_ELEMENT_CAPACITY,
            self.system.setpoint,
        )
        .map_err(|e| Self::invalid(e.to_string()))
    }

    fn storage_tank(&self, settings: &SimulationSettings) -> WohResult<StorageTank> {
        let volume = self.storage_volume()?;
        Ok(StorageTank::new(
            volume,
            self.system.setpoint,
            self.system
                .standby_loss
                .unwrap_or_else(|| default_standby_loss(volume)),
            self.system.energisation,
            settings.tank_cutoff_temperature,
            settings.energy_balance_tolerance,
        ))
    }

    fn instantaneous_heater(&self) -> InstantaneousWaterHeater {
        // a standalone gas instantaneous unit takes its continuous load from the configured
        // auxiliary power; behind a solar preheat that setting is the pump
        let auxiliary_power = match (self.strategy, self.carrier) {
            (HeaterStrategy::Instantaneous, EnergyCarrier::Gas) => self
                .system
                .auxiliary_power
                .unwrap_or(GAS_INSTANTANEOUS_AUXILIARY_POWER),
            (HeaterStrategy::SolarBoostedInstantaneous, _) => GAS_INSTANTANEOUS_AUXILIARY_POWER,
            _ => self.system.auxiliary_power.unwrap_or(0.),
        };
        InstantaneousWaterHeater::new(
            self.heater_capacity(),
            self.system.rated_efficiency,
            self.system.setpoint,
            auxiliary_power / WATTS_PER_KILOWATT as f64,
        )
    }

    fn build_heater(
        &self,
        schedule: &DrawSchedule,
        climate: &ClimateSeries,
        settings: &SimulationSettings,
    ) -> WohResult<WaterHeater> {
        let direct_heater = || DirectHeater::new(self.heater_capacity(), self.system.rated_efficiency);

        Ok(match self.strategy {
            HeaterStrategy::Storage => WaterHeater::Storage(StorageWaterHeater::new(
                self.storage_tank(settings)?,
                direct_heater(),
            )),
            HeaterStrategy::Instantaneous => WaterHeater::Instantaneous(self.instantaneous_heater()),
            HeaterStrategy::HeatPump => WaterHeater::HeatPump(HeatPumpWaterHeater::new(
                self.storage_tank(settings)?,
                self.heat_pump_unit()?,
            )),
            HeaterStrategy::SolarBoostedStorage | HeaterStrategy::SolarBoostedInstantaneous => {
                let base = if self.strategy == HeaterStrategy::SolarBoostedStorage {
                    WaterHeater::Storage(StorageWaterHeater::new(
                        self.storage_tank(settings)?,
                        direct_heater(),
                    ))
                } else {
                    WaterHeater::Instantaneous(self.instantaneous_heater())
                };
                let preheat = SolarPreheat::new(
                    self.system
                        .solar_collector_area
                        .unwrap_or(DEFAULT_SOLAR_COLLECTOR_AREA),
                    self.system
                        .auxiliary_power
                        .unwrap_or(DEFAULT_SOLAR_PUMP_POWER)
                        / WATTS_PER_KILOWATT as f64,
                );
                let daily_fractions =
                    preheat.daily_fractions(&schedule.daily_volumes(), climate, self.system.setpoint);
                WaterHeater::SolarBoosted(SolarBoostedWaterHeater::new(
                    preheat,
                    daily_fractions,
                    self.system.setpoint,
                    base,
                ))
            }
        })
    }

    /// Run both stages over the rating year.
    #[instrument(skip_all, fields(system_type = %self.system.system_type))]
    pub fn simulate(
        &self,
        diversity: &OccupancyDiversitySeries,
        climate: &ClimateSeries,
        settings: &SimulationSettings,
    ) -> WohResult<HotWaterSimulation> {
        // Stage A
        let schedule = DrawEventGenerator::new(&self.fixtures, settings, self.system.setpoint)
            .generate(diversity, climate)?;

        // Stage B, each hour depending on the heater state left by the previous one
        let mut heater = self.build_heater(&schedule, climate, settings)?;
        let mut simulation = SimulationTime::rating_year().iter().try_fold(
            HotWaterSimulation::new(self.carrier),
            |mut simulation, t_it| {
                let hour = t_it.index;
                let mains_temperature = climate.mains_temperature(hour);
                let outcome = heater.step(&HourInputs {
                    hour,
                    hour_of_day: t_it.hour_of_day(),
                    draws: schedule.events_in_hour(hour),
                    mains_temperature,
                    inlet_temperature: mains_temperature,
                    ambient_temperature: climate.ambient_temperature(hour),
                    irradiance: climate.global_irradiance(hour),
                })?;
                simulation.record(outcome);
                Ok::<_, WohError>(simulation)
            },
        )?;

        simulation.approximate = heater.is_approximate();
        let diagnostics = &mut simulation.diagnostics;
        diagnostics.final_tank_state = heater.tank_state().cloned();
        diagnostics.drawn_volume = schedule.total_volume();
        diagnostics.reference_volume = schedule.reference_volume();
        diagnostics.draw_events = schedule.event_count();
        diagnostics.rescale_factor = schedule.rescale_factor();
        diagnostics.reference_demand =
            match ReferenceHotWaterDemand::new(diversity.occupants(), climate.zone()) {
                Ok(demand) => Some(demand),
                Err(_) => {
                    debug!(zone = %climate.zone(), "no reference hot water demand for zone");
                    None
                }
            };

        if diagnostics.shortfall_hours > 0 {
            warn!(
                shortfall_hours = diagnostics.shortfall_hours,
                unmet_energy = diagnostics.unmet_energy,
                "water heater capacity was insufficient in some hours; draws were delivered below their required temperature"
            );
        }
        debug!(
            energy_input = simulation.energy_input.iter().sum::<f64>(),
            heat_delivered = simulation.diagnostics.heat_delivered,
            standby_loss = simulation.diagnostics.standby_loss,
            "hot water simulation complete"
        );

        Ok(simulation)
    }
}

impl EndUseGenerator for HotWaterSimulationEngine {
    fn end_use(&self) -> EndUse {
        EndUse::HotWater
    }

    fn generate(&self, context: &GenerationContext) -> WohResult<GeneratorOutput> {
        let simulation = self.simulate(context.diversity, context.climate, context.settings)?;
        Ok(GeneratorOutput {
            profiles: simulation.profiles(),
            approximations: if simulation.approximate {
                vec![SOLAR_APPROXIMATION_NOTE.to_string()]
            } else {
                vec![]
            },
            hot_water: Some(simulation.diagnostics),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::end_uses::tests::{dwelling, ContextInputs};
    use approx::assert_relative_eq;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[fixture]
    fn inputs() -> ContextInputs {
        ContextInputs::new(dwelling(3.))
    }

    fn engine_for(inputs: &ContextInputs, system: &HotWaterSystem) -> WohResult<HotWaterSimulationEngine> {
        HotWaterSimulationEngine::new(
            system,
            &inputs.dwelling.hot_water_fixtures,
            &inputs.settings,
            &inputs.climate,
        )
    }

    fn run(inputs: &ContextInputs, system: &HotWaterSystem) -> HotWaterSimulation {
        engine_for(inputs, system)
            .unwrap()
            .simulate(&inputs.diversity, &inputs.climate, &inputs.settings)
            .unwrap()
    }

    fn system(system_type: HotWaterSystemType, storage_volume: Option<f64>, efficiency: f64) -> HotWaterSystem {
        HotWaterSystem {
            system_type,
            storage_volume,
            rated_efficiency: efficiency,
            setpoint: 60.,
            heater_capacity: None,
            standby_loss: None,
            energisation: EnergisationSchedule::Continuous,
            solar_collector_area: None,
            auxiliary_power: None,
        }
    }

    #[rstest]
    #[case(HotWaterSystemType::ElectricStorage, HeaterStrategy::Storage, EnergyCarrier::Electricity)]
    #[case(HotWaterSystemType::ElectricStorageLarge, HeaterStrategy::Storage, EnergyCarrier::Electricity)]
    #[case(HotWaterSystemType::GasStorage, HeaterStrategy::Storage, EnergyCarrier::Gas)]
    #[case(HotWaterSystemType::GasInstantaneous, HeaterStrategy::Instantaneous, EnergyCarrier::Gas)]
    #[case(HotWaterSystemType::HeatPump, HeaterStrategy::HeatPump, EnergyCarrier::Electricity)]
    #[case(HotWaterSystemType::SolarGas, HeaterStrategy::SolarBoostedInstantaneous, EnergyCarrier::Gas)]
    fn should_select_strategy(
        #[case] system_type: HotWaterSystemType,
        #[case] strategy: HeaterStrategy,
        #[case] carrier: EnergyCarrier,
    ) {
        assert_eq!(select_strategy(system_type).unwrap(), (strategy, carrier));
    }

    #[rstest]
    fn should_reject_solid_fuel_before_simulating(inputs: ContextInputs) {
        let result = engine_for(&inputs, &system(HotWaterSystemType::SolidFuel, Some(250.), 0.6));
        assert!(matches!(result, Err(WohError::UnsupportedHeaterType(_))));
    }

    #[rstest]
    #[case::missing_volume(system(HotWaterSystemType::ElectricStorage, None, 1.))]
    #[case::efficiency_above_one(system(HotWaterSystemType::GasStorage, Some(135.), 1.2))]
    #[case::heat_pump_beyond_carnot(system(HotWaterSystemType::HeatPump, Some(250.), 12.))]
    #[case::setpoint_above_cutoff(HotWaterSystem { setpoint: 95., ..system(HotWaterSystemType::ElectricStorage, Some(250.), 1.) })]
    #[case::setpoint_below_mains(HotWaterSystem { setpoint: 15., ..system(HotWaterSystemType::ElectricStorage, Some(250.), 1.) })]
    #[case::gas_on_off_peak(HotWaterSystem { energisation: EnergisationSchedule::Overnight, ..system(HotWaterSystemType::GasStorage, Some(135.), 0.8) })]
    #[case::instantaneous_on_off_peak(HotWaterSystem { energisation: EnergisationSchedule::Daytime, ..system(HotWaterSystemType::ElectricInstantaneous, None, 1.) })]
    #[case::large_storage_continuous(system(HotWaterSystemType::ElectricStorageLarge, Some(315.), 1.))]
    #[case::setpoint_below_kitchen_tap(HotWaterSystem { setpoint: 45., ..system(HotWaterSystemType::ElectricStorage, Some(250.), 1.) })]
    fn should_reject_invalid_system(inputs: ContextInputs, #[case] system: HotWaterSystem) {
        assert!(matches!(
            engine_for(&inputs, &system),
            Err(WohError::InvalidHotWaterSystem(_))
        ));
    }

    #[rstest]
    #[case::negative_shower_flow(HotWaterFixtures { shower_flow_rate: -9., ..Default::default() })]
    #[case::zero_shower_flow(HotWaterFixtures { shower_flow_rate: 0., ..Default::default() })]
    #[case::negative_bath_fill(HotWaterFixtures { bath_fill_volume: -80., ..Default::default() })]
    #[case::nan_bath_fill(HotWaterFixtures { bath_fill_volume: f64::NAN, ..Default::default() })]
    #[case::no_fixtures_and_no_bath_volume(HotWaterFixtures {
        showers: 0,
        baths: 0,
        basin_taps: 0,
        kitchen_taps: 0,
        bath_fill_volume: 0.,
        ..Default::default()
    })]
    fn should_reject_invalid_fixtures(inputs: ContextInputs, #[case] fixtures: HotWaterFixtures) {
        let result = HotWaterSimulationEngine::new(
            &inputs.dwelling.hot_water,
            &fixtures,
            &inputs.settings,
            &inputs.climate,
        );
        assert!(matches!(result, Err(WohError::InvalidHotWaterSystem(_))));
    }

    #[rstest]
    fn should_accept_unused_zero_bath_volume(inputs: ContextInputs) {
        let fixtures = HotWaterFixtures {
            baths: 0,
            bath_fill_volume: 0.,
            ..Default::default()
        };
        assert!(HotWaterSimulationEngine::new(
            &inputs.dwelling.hot_water,
            &fixtures,
            &inputs.settings,
            &inputs.climate,
        )
        .is_ok());
    }

    #[rstest]
    fn should_run_large_storage_overnight(inputs: ContextInputs) {
        let large = HotWaterSystem {
            energisation: EnergisationSchedule::Overnight,
            heater_capacity: Some(4.8),
            ..system(HotWaterSystemType::ElectricStorageLarge, Some(315.), 1.)
        };
        let simulation = run(&inputs, &large);

        assert_eq!(simulation.carrier, EnergyCarrier::Electricity);
        // no heating between 07:00 and 21:00
        assert!(simulation
            .energy_input
            .iter()
            .enumerate()
            .filter(|(hour, _)| (7..22).contains(&(hour % 24)))
            .all(|(_, energy)| *energy == 0.));
        assert!(simulation.energy_input.iter().sum::<f64>() > 0.);
    }

    #[rstest]
    fn should_simulate_electric_storage_for_a_year(inputs: ContextInputs) {
        let simulation = run(&inputs, &inputs.dwelling.hot_water);
        let diagnostics = &simulation.diagnostics;

        assert_eq!(simulation.energy_input.len(), 8760);
        assert!(simulation.energy_input.iter().all(|e| *e >= 0.));
        assert!(simulation.auxiliary_electricity.iter().all(|e| *e == 0.));
        assert_eq!(simulation.profiles().len(), 1);
        assert!(!simulation.approximate);
        assert_eq!(diagnostics.final_tank_state.as_ref().unwrap().volume, 250.);

        let min_temperature = diagnostics.min_tank_temperature.unwrap();
        let max_temperature = diagnostics.max_tank_temperature.unwrap();
        assert!(max_temperature <= 60. + 1e-9);
        assert!(min_temperature >= inputs.climate.mains_temperatures().iter().copied().fold(f64::INFINITY, f64::min));

        // resistive heating: electricity in equals heat in
        assert_relative_eq!(
            simulation.energy_input.iter().sum::<f64>(),
            diagnostics.heat_input,
            max_relative = 1e-9
        );
        assert_relative_eq!(
            diagnostics.drawn_volume,
            diagnostics.reference_volume,
            max_relative = 0.02
        );
    }

    #[rstest]
    fn should_report_auxiliary_electricity_for_gas_instantaneous(inputs: ContextInputs) {
        let simulation = run(&inputs, &system(HotWaterSystemType::GasInstantaneous, None, 0.8));
        let profiles = simulation.profiles();

        assert_eq!(
            profiles.iter().map(|p| p.key.carrier).collect::<Vec<_>>(),
            vec![EnergyCarrier::Gas, EnergyCarrier::Electricity]
        );
        // 10 W around the clock
        assert_relative_eq!(profiles[1].annual_kwh(), 87.6, max_relative = 1e-9);
        assert_eq!(simulation.diagnostics.min_tank_temperature, None);
    }

    #[rstest]
    fn should_use_less_electricity_with_heat_pump(inputs: ContextInputs) {
        let storage = run(&inputs, &system(HotWaterSystemType::ElectricStorage, Some(250.), 1.));
        let heat_pump = run(&inputs, &system(HotWaterSystemType::HeatPump, Some(250.), 3.));

        assert!(
            heat_pump.energy_input.iter().sum::<f64>()
                < 0.6 * storage.energy_input.iter().sum::<f64>()
        );
    }

    #[rstest]
    fn should_flag_solar_boost_as_approximate(inputs: ContextInputs) {
        let solar = run(&inputs, &system(HotWaterSystemType::SolarElectric, Some(300.), 1.));
        let plain = run(&inputs, &system(HotWaterSystemType::ElectricStorage, Some(300.), 1.));

        assert!(solar.approximate);
        assert!(solar.diagnostics.solar_heat > 0.);
        assert!(solar.energy_input.iter().sum::<f64>() < plain.energy_input.iter().sum::<f64>());
    }

    #[rstest]
    fn should_be_reproducible(inputs: ContextInputs) {
        let first = run(&inputs, &inputs.dwelling.hot_water);
        let second = run(&inputs, &inputs.dwelling.hot_water);
        assert_eq!(first, second);
    }
}
