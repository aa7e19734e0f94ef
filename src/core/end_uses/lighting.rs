use crate::core::end_uses::{distribute_annual, EndUseGenerator, GenerationContext, GeneratorOutput};
use crate::core::schedule::DiversityCategory;
use crate::core::units::{DAYS_PER_YEAR, WATTS_PER_KILOWATT};
use crate::errors::WohResult;
use crate::input::{EnergyCarrier, LightingControl, LightingFixture};
use crate::results::{EndUse, EndUseProfile, ProfileKey};
use tracing::debug;

/// Installed lighting power assumed when no fixtures are listed, in W/m2 of floor area
const DEFAULT_LIGHTING_POWER_DENSITY: f64 = 5.;

/// Reference hours of use per day at full installed power
const REFERENCE_DAILY_HOURS: f64 = 1.6;

fn control_factor(control: LightingControl) -> f64 {
    match control {
        LightingControl::Standard => 1.,
        LightingControl::Dimmer => 0.85,
        LightingControl::MotionSensor => 0.75,
        LightingControl::DaylightSensor => 0.8,
    }
}

/// Installed power after control adjustments, in W
fn effective_installed_power(fixtures: &[LightingFixture], floor_area: f64) -> f64 {
    if fixtures.is_empty() {
        return DEFAULT_LIGHTING_POWER_DENSITY * floor_area;
    }
    fixtures
        .iter()
        .map(|fixture| fixture.count as f64 * fixture.wattage * control_factor(fixture.control))
        .sum()
}

#[derive(Clone, Copy, Debug, Default)]
pub struct LightingProfileGenerator;

impl EndUseGenerator for LightingProfileGenerator {
    fn end_use(&self) -> EndUse {
        EndUse::Lighting
    }

    fn generate(&self, context: &GenerationContext) -> WohResult<GeneratorOutput> {
        let dwelling = context.dwelling;
        let installed_power = effective_installed_power(&dwelling.lighting, dwelling.floor_area);
        let annual_kwh = installed_power / WATTS_PER_KILOWATT as f64
            * REFERENCE_DAILY_HOURS
            * DAYS_PER_YEAR as f64;
        debug!(installed_power, annual_kwh, "lighting");

        Ok(EndUseProfile::new(
            ProfileKey::new(EndUse::Lighting, EnergyCarrier::Electricity),
            distribute_annual(
                annual_kwh,
                context.diversity.factors(DiversityCategory::Lighting),
            ),
        )
        .into())
    }
}
