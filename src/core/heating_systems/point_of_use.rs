use crate::core::heating_systems::common::{HourInputs, StepOutcome};
use crate::core::water_heat_demand::misc::water_demand_to_kwh;

/// Instantaneous (continuous flow) water heater with no stored water.
///
/// Heat output within an hour is limited by the rated capacity. Draws beyond it are delivered
/// cooler than the setpoint and the missing heat is reported as unmet, not carried over.
#[derive(Clone, Debug)]
pub struct InstantaneousWaterHeater {
    /// kW
    capacity: f64,
    efficiency: f64,
    setpoint: f64,
    /// Continuous electrical load for controls and ignition, in kW
    auxiliary_power: f64,
}

impl InstantaneousWaterHeater {
    pub fn new(capacity: f64, efficiency: f64, setpoint: f64, auxiliary_power: f64) -> Self {
        Self {
            capacity,
            efficiency,
            setpoint,
            auxiliary_power,
        }
    }

    pub fn step(&self, inputs: &HourInputs) -> StepOutcome {
        let inlet = inputs.inlet_temperature;
        let heat_demand = inputs
            .draws
            .iter()
            .map(|draw| water_demand_to_kwh(draw.volume, self.setpoint, inlet))
            .sum::<f64>()
            .max(0.);

        let heat_delivered = heat_demand.min(self.capacity);
        let capacity_shortfall = heat_demand > self.capacity;

        // outlet temperature actually achieved across the hour's draws
        let temp_outlet = if capacity_shortfall {
            inlet + (self.setpoint - inlet) * heat_delivered / heat_demand
        } else {
            self.setpoint
        };
        let unmet_energy = inputs
            .draws
            .iter()
            .filter(|draw| draw.delivery_temperature > temp_outlet)
            .map(|draw| water_demand_to_kwh(draw.volume, draw.delivery_temperature, temp_outlet))
            .sum::<f64>()
            + (heat_demand - heat_delivered);

        StepOutcome {
            heat_delivered,
            heat_input: heat_delivered,
            energy_input: self.demand_energy(heat_delivered),
            auxiliary_energy: self.auxiliary_power,
            standby_loss: 0.,
            solar_heat: 0.,
            unmet_energy,
            capacity_shortfall,
            tank: None,
        }
    }

    /// Fuel (kWh) needed to supply `energy_demand` kWh of heat
    pub fn demand_energy(&self, energy_demand: f64) -> f64 {
        energy_demand / self.efficiency
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::heating_systems::common::tests::{draw, hour_inputs};
    use approx::assert_relative_eq;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[fixture]
    fn point_of_use() -> InstantaneousWaterHeater {
        InstantaneousWaterHeater::new(24., 0.8, 55., 0.01)
    }

    #[rstest]
    fn test_demand_hot_water(point_of_use: InstantaneousWaterHeater) {
        let draws = [draw(0, 60.)];
        let outcome = point_of_use.step(&hour_inputs(0, &draws));

        // 60 litres from 15ºC to 55ºC
        assert_relative_eq!(outcome.heat_delivered, 2.7893333333333334);
        assert_relative_eq!(outcome.energy_input, 2.7893333333333334 / 0.8);
        assert_relative_eq!(outcome.auxiliary_energy, 0.01);
        assert_eq!(outcome.unmet_energy, 0.);
        assert!(!outcome.capacity_shortfall);
        assert_eq!(outcome.tank, None);
    }

    #[rstest]
    fn test_demand_energy(point_of_use: InstantaneousWaterHeater) {
        assert_relative_eq!(point_of_use.demand_energy(2.0), 2.5);
    }

    #[rstest]
    fn should_run_auxiliary_load_with_no_draws(point_of_use: InstantaneousWaterHeater) {
        let outcome = point_of_use.step(&hour_inputs(3, &[]));
        assert_eq!(outcome.energy_input, 0.);
        assert_relative_eq!(outcome.auxiliary_energy, 0.01);
    }

    #[rstest]
    fn should_record_shortfall_beyond_capacity() {
        let heater = InstantaneousWaterHeater::new(2., 1., 55., 0.);
        let draws = [draw(7, 60.)];
        let outcome = heater.step(&hour_inputs(7, &draws));

        assert_relative_eq!(outcome.heat_delivered, 2.);
        assert!(outcome.capacity_shortfall);
        assert!(outcome.unmet_energy > 2.7893333333333334 - 2.);
    }
}
