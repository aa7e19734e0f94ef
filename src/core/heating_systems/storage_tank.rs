use crate::core::heating_systems::common::{DirectHeater, HeatSource, HourInputs, StepOutcome};
use crate::core::material_properties::WATER;
use crate::core::units::{HOURS_PER_DAY, WATTS_PER_KILOWATT};
use crate::errors::{WohError, WohResult};
use crate::input::EnergisationSchedule;
use serde::Serialize;

// reference temperatures for the standardised cylinder standby loss test (BS EN 12897)
const STANDBY_TEST_TEMP_SET: f64 = 65.;
const STANDBY_TEST_TEMP_AMB: f64 = 20.;

// allowance for rounding when checking temperature bounds, in K
const TEMPERATURE_BOUND_TOLERANCE: f64 = 1e-9;

/// Default measured standby loss for a tank of the given volume (litres), in kWh/24h
pub fn default_standby_loss(volume: f64) -> f64 {
    0.5 + 0.0056 * volume
}

/// Thermal state of a fully mixed storage tank.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TankState {
    /// litres
    pub volume: f64,
    /// Mean water temperature, in ºC
    pub temperature: f64,
    /// Net standby loss over the last simulated hour, in kWh
    pub standby_loss: f64,
}

/// A hot water storage tank modelled as a single fully mixed volume.
///
/// Each hour, draws are replaced by water at the inlet temperature, the tank exchanges heat with
/// its surroundings, and then (if energised) the heat source restores the setpoint within its
/// capacity.
#[derive(Clone, Debug)]
pub struct StorageTank {
    setpoint: f64,
    cutoff_temperature: f64,
    /// W/K
    standby_loss_coefficient: f64,
    energisation: EnergisationSchedule,
    energy_balance_tolerance: f64,
    state: TankState,
}

impl StorageTank {
    pub fn new(
        volume: f64,
        setpoint: f64,
        standby_loss: f64,
        energisation: EnergisationSchedule,
        cutoff_temperature: f64,
        energy_balance_tolerance: f64,
    ) -> Self {
        Self {
            setpoint,
            cutoff_temperature,
            standby_loss_coefficient: stand_by_losses_coefficient(standby_loss),
            energisation,
            energy_balance_tolerance,
            state: TankState {
                volume,
                temperature: setpoint,
                standby_loss: 0.,
            },
        }
    }

    pub fn state(&self) -> &TankState {
        &self.state
    }

    /// Heat capacity of the stored water, in kWh/K
    fn heat_capacity(&self) -> f64 {
        WATER.heat_capacity_kwh_per_kelvin(self.state.volume)
    }

    /// Heat stored relative to 0ºC, in kWh
    pub fn stored_energy(&self) -> f64 {
        self.heat_capacity() * self.state.temperature
    }

    fn divergence(&self, hour: usize, temperature: f64, reason: String) -> WohError {
        WohError::ThermalDivergence {
            hour,
            snapshot: Box::new(TankState {
                temperature,
                ..self.state.clone()
            }),
            reason,
        }
    }

    /// Advance the tank by one hour, heated by `source`.
    pub fn step_with(
        &mut self,
        inputs: &HourInputs,
        source: &impl HeatSource,
    ) -> WohResult<StepOutcome> {
        let capacity = self.heat_capacity();
        let volume = self.state.volume;
        let inlet = inputs.inlet_temperature;
        let energy_before = self.stored_energy();
        let temp_start = self.state.temperature;

        if ![inlet, inputs.mains_temperature, inputs.ambient_temperature]
            .iter()
            .all(|t| t.is_finite())
        {
            return Err(self.divergence(
                inputs.hour,
                temp_start,
                "non-finite inlet, mains or ambient temperature".into(),
            ));
        }

        // draws, each displacing hot water with water at the inlet temperature
        let mut temperature = temp_start;
        let mut unmet_energy = 0.;
        for draw in inputs.draws {
            let temp_after = inlet + (temperature - inlet) * (-draw.volume / volume).exp();
            if draw.volume > 0. {
                let temp_outlet_mean = inlet + (temperature - temp_after) * volume / draw.volume;
                if temp_outlet_mean < draw.delivery_temperature {
                    unmet_energy += WATER.volumetric_energy_content_kwh_per_litre(
                        draw.delivery_temperature,
                        temp_outlet_mean,
                    ) * draw.volume;
                }
            }
            temperature = temp_after;
        }
        let heat_delivered = capacity * (temp_start - temperature);

        // standby exchange, never taking the tank below the mains temperature; a tank already
        // below a preheated inlet only warms through draws
        let standby_raw = self.standby_loss_coefficient
            * (temperature - inputs.ambient_temperature)
            / WATTS_PER_KILOWATT as f64;
        let standby_loss =
            standby_raw.min((capacity * (temperature - inputs.mains_temperature)).max(0.));
        let temp_after_standby = temperature - standby_loss / capacity;

        // heating, only within permitted hours and never beyond the setpoint
        let heat_required = if self.energisation.is_energised(inputs.hour_of_day) {
            (capacity * (self.setpoint - temp_after_standby)).max(0.)
        } else {
            0.
        };
        let max_heat_output = source.max_heat_output(inputs);
        let heat_input = heat_required.min(max_heat_output);
        let temp_end = temp_after_standby + heat_input / capacity;

        if !temp_end.is_finite() || temp_end < 0. {
            return Err(self.divergence(
                inputs.hour,
                temp_end,
                format!("tank temperature became {temp_end}"),
            ));
        }
        if temp_end > self.cutoff_temperature + TEMPERATURE_BOUND_TOLERANCE {
            return Err(self.divergence(
                inputs.hour,
                temp_end,
                format!(
                    "tank temperature {temp_end} exceeds cutoff {}",
                    self.cutoff_temperature
                ),
            ));
        }
        if temp_end < inputs.mains_temperature - TEMPERATURE_BOUND_TOLERANCE {
            return Err(self.divergence(
                inputs.hour,
                temp_end,
                format!(
                    "tank temperature {temp_end} is below mains temperature {}",
                    inputs.mains_temperature
                ),
            ));
        }

        let energy_after = capacity * temp_end;
        let residual = energy_before + heat_input - (heat_delivered + standby_loss + energy_after);
        if residual.abs() > self.energy_balance_tolerance {
            return Err(self.divergence(
                inputs.hour,
                temp_end,
                format!("energy balance residual of {residual} kWh"),
            ));
        }

        self.state.temperature = temp_end;
        self.state.standby_loss = standby_loss;

        Ok(StepOutcome {
            heat_delivered,
            heat_input,
            energy_input: source.energy_input_for_heat(heat_input, inputs),
            auxiliary_energy: 0.,
            standby_loss,
            solar_heat: 0.,
            unmet_energy,
            capacity_shortfall: heat_required > max_heat_output,
            tank: Some(self.state.clone()),
        })
    }
}

/// Standby heat loss coefficient (W/K) from the measured loss at standardised conditions, in
/// kWh/24h
pub fn stand_by_losses_coefficient(q_std_ls_ref: f64) -> f64 {
    (WATTS_PER_KILOWATT as f64 * q_std_ls_ref)
        / (HOURS_PER_DAY as f64 * (STANDBY_TEST_TEMP_SET - STANDBY_TEST_TEMP_AMB))
}

/// Storage water heater with an electric element or gas burner.
#[derive(Clone, Debug)]
pub struct StorageWaterHeater {
    tank: StorageTank,
    heater: DirectHeater,
}

impl StorageWaterHeater {
    pub fn new(tank: StorageTank, heater: DirectHeater) -> Self {
        Self { tank, heater }
    }

    pub fn tank(&self) -> &StorageTank {
        &self.tank
    }

    pub fn step(&mut self, inputs: &HourInputs) -> WohResult<StepOutcome> {
        self.tank.step_with(inputs, &self.heater)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::heating_systems::common::tests::{draw, hour_inputs};
    use approx::assert_relative_eq;
    use pretty_assertions::assert_eq;
    use rstest::*;

    fn tank(energisation: EnergisationSchedule) -> StorageTank {
        StorageTank::new(250., 60., default_standby_loss(250.), energisation, 90., 1e-9)
    }

    #[fixture]
    fn heater() -> StorageWaterHeater {
        StorageWaterHeater::new(
            tank(EnergisationSchedule::Continuous),
            DirectHeater::new(3.6, 1.),
        )
    }

    #[rstest]
    fn should_calc_standby_loss_coefficient() {
        assert_relative_eq!(stand_by_losses_coefficient(1.68), 1.5555555555555556);
    }

    #[rstest]
    fn should_start_at_setpoint(heater: StorageWaterHeater) {
        assert_eq!(
            heater.tank().state(),
            &TankState {
                volume: 250.,
                temperature: 60.,
                standby_loss: 0.
            }
        );
    }

    #[rstest]
    fn should_replace_standby_loss_when_idle(mut heater: StorageWaterHeater) {
        let outcome = heater.step(&hour_inputs(0, &[])).unwrap();

        // 1.9 kWh/24h at 65ºC/20ºC is 1.7593 W/K; 40K above ambient for one hour
        let expected_loss = 1.9 / 24. / 45. * 40.;
        assert_relative_eq!(outcome.standby_loss, expected_loss, max_relative = 1e-9);
        assert_relative_eq!(outcome.heat_input, expected_loss, max_relative = 1e-9);
        assert_relative_eq!(outcome.energy_input, expected_loss, max_relative = 1e-9);
        assert_eq!(outcome.heat_delivered, 0.);
        assert_relative_eq!(heater.tank().state().temperature, 60., epsilon = 1e-9);
    }

    #[rstest]
    fn should_conserve_energy_through_a_draw(mut heater: StorageWaterHeater) {
        let draws = [draw(7, 60.), draw(7, 40.)];
        let inputs = hour_inputs(7, &draws);
        let before = heater.tank().stored_energy();

        let outcome = heater.step(&inputs).unwrap();

        let after = heater.tank().stored_energy();
        assert_relative_eq!(
            outcome.heat_input + before,
            outcome.heat_delivered + outcome.standby_loss + after,
            epsilon = 1e-9
        );
        // fully mixed tank delivers a little less than 100 litres at 60ºC would
        let plug_flow = WATER.volumetric_energy_content_kwh_per_litre(60., 15.) * 100.;
        assert!(outcome.heat_delivered < plug_flow);
        assert!(outcome.heat_delivered > 0.9 * plug_flow);
    }

    #[rstest]
    fn should_limit_heating_to_capacity(mut heater: StorageWaterHeater) {
        let draws = [draw(7, 250.)];
        let outcome = heater.step(&hour_inputs(7, &draws)).unwrap();

        assert_relative_eq!(outcome.heat_input, 3.6);
        assert!(outcome.capacity_shortfall);
        assert!(heater.tank().state().temperature < 60.);
    }

    #[rstest]
    fn should_only_heat_in_energised_hours() {
        let mut heater = StorageWaterHeater::new(
            tank(EnergisationSchedule::Overnight),
            DirectHeater::new(3.6, 1.),
        );
        let draws = [draw(12, 80.)];
        let outcome = heater.step(&hour_inputs(12, &draws)).unwrap();
        assert_eq!(outcome.heat_input, 0.);

        let outcome = heater.step(&hour_inputs(23, &[])).unwrap();
        assert!(outcome.heat_input > 0.);
    }

    #[rstest]
    fn should_never_fall_below_mains() {
        let mut heater = StorageWaterHeater::new(
            tank(EnergisationSchedule::Daytime),
            DirectHeater::new(3.6, 1.),
        );
        let draws = [draw(0, 2_000.)];
        let mut inputs = hour_inputs(0, &draws);
        inputs.ambient_temperature = 2.;
        heater.step(&inputs).unwrap();
        assert!(heater.tank().state().temperature >= 15. - 1e-9);

        for hour in 1..6 {
            let mut inputs = hour_inputs(hour, &[]);
            inputs.ambient_temperature = 2.;
            heater.step(&inputs).unwrap();
            assert!(heater.tank().state().temperature >= inputs.mains_temperature - 1e-9);
        }
    }

    #[rstest]
    fn should_not_gain_heat_from_a_warmer_inlet_without_draws() {
        let mut heater = StorageWaterHeater::new(
            tank(EnergisationSchedule::Daytime),
            DirectHeater::new(3.6, 1.),
        );
        let draws = [draw(0, 2_000.)];
        let mut inputs = hour_inputs(0, &draws);
        inputs.ambient_temperature = 10.;
        heater.step(&inputs).unwrap();
        let drained = heater.tank().state().temperature;
        assert!(drained < 20.);

        // preheated inlet well above the tank, outside the energised hours
        let mut inputs = hour_inputs(1, &[]);
        inputs.ambient_temperature = 10.;
        inputs.inlet_temperature = 50.;
        let outcome = heater.step(&inputs).unwrap();

        assert_eq!(outcome.heat_input, 0.);
        assert!(outcome.standby_loss >= 0.);
        assert!(heater.tank().state().temperature <= drained);
        assert!(heater.tank().state().temperature >= inputs.mains_temperature - 1e-9);
    }

    #[rstest]
    fn should_record_unmet_energy_from_depleted_tank() {
        let mut heater = StorageWaterHeater::new(
            tank(EnergisationSchedule::Daytime),
            DirectHeater::new(3.6, 1.),
        );
        let draws = [draw(0, 600.), draw(0, 100.)];
        let outcome = heater.step(&hour_inputs(0, &draws)).unwrap();
        assert!(outcome.unmet_energy > 0.);
    }

    #[rstest]
    fn should_report_divergence_with_snapshot() {
        let mut tank = StorageTank::new(
            250.,
            60.,
            default_standby_loss(250.),
            EnergisationSchedule::Continuous,
            90.,
            1e-9,
        );
        let mut inputs = hour_inputs(42, &[]);
        inputs.ambient_temperature = f64::NAN;

        let result = tank.step_with(&inputs, &DirectHeater::new(3.6, 1.));
        assert!(matches!(
            result,
            Err(WohError::ThermalDivergence { hour: 42, ref snapshot, .. }) if snapshot.volume == 250.
        ));
        // failed step leaves the state untouched
        assert_eq!(tank.state().temperature, 60.);
    }

    #[rstest]
    fn should_fail_rather_than_clamp_above_cutoff() {
        let mut tank = StorageTank::new(
            250.,
            60.,
            default_standby_loss(250.),
            EnergisationSchedule::Continuous,
            50.,
            1e-9,
        );
        assert!(matches!(
            tank.step_with(&hour_inputs(3, &[]), &DirectHeater::new(3.6, 1.)),
            Err(WohError::ThermalDivergence { hour: 3, .. })
        ));
    }
}
