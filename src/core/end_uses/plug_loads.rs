use crate::core::end_uses::{distribute_annual, EndUseGenerator, GenerationContext, GeneratorOutput};
use crate::core::schedule::DiversityCategory;
use crate::core::units::{mj_to_kwh, DAYS_PER_YEAR, HOURS_PER_YEAR, WATTS_PER_KILOWATT};
use crate::errors::WohResult;
use crate::input::{EnergyCarrier, PlugLoadAppliance, UsageFrequency};
use crate::results::{EndUse, EndUseProfile, ProfileKey};
use itertools::Itertools;
use tracing::debug;

// default annual plug load relation, in MJ/yr
const DEFAULT_ANNUAL_MJ_CONSTANT: f64 = 7022.4;
const DEFAULT_ANNUAL_MJ_PER_OCCUPANT: f64 = 441.65;

/// Hours per day an appliance runs at rated power
fn daily_hours(usage: UsageFrequency) -> f64 {
    match usage {
        UsageFrequency::Low => 0.5,
        UsageFrequency::Medium => 2.,
        UsageFrequency::High => 6.,
        UsageFrequency::AlwaysOn => 24.,
    }
}

pub fn default_annual_plug_load_kwh(occupants: f64) -> f64 {
    mj_to_kwh(DEFAULT_ANNUAL_MJ_CONSTANT + DEFAULT_ANNUAL_MJ_PER_OCCUPANT * occupants)
}

/// Hourly energy (kWh) for an explicit appliance inventory. Always-on appliances draw a flat
/// load; everything else follows the plug load diversity series.
fn inventory_profile(appliances: &[PlugLoadAppliance], factors: &[f64]) -> Vec<f64> {
    let (always_on, scheduled): (Vec<_>, Vec<_>) = appliances
        .iter()
        .partition(|appliance| appliance.usage == UsageFrequency::AlwaysOn);

    let base_load = always_on
        .iter()
        .map(|appliance| appliance.rated_power / WATTS_PER_KILOWATT as f64)
        .sum::<f64>();
    let scheduled_annual_kwh = scheduled
        .iter()
        .map(|appliance| {
            appliance.rated_power / WATTS_PER_KILOWATT as f64
                * daily_hours(appliance.usage)
                * DAYS_PER_YEAR as f64
        })
        .sum::<f64>();

    distribute_annual(scheduled_annual_kwh, factors)
        .into_iter()
        .map(|energy| energy + base_load)
        .collect_vec()
}

#[derive(Clone, Copy, Debug, Default)]
pub struct PlugLoadProfileGenerator;

impl EndUseGenerator for PlugLoadProfileGenerator {
    fn end_use(&self) -> EndUse {
        EndUse::PlugLoads
    }

    fn generate(&self, context: &GenerationContext) -> WohResult<GeneratorOutput> {
        let factors = context.diversity.factors(DiversityCategory::PlugLoads);
        let appliances = &context.dwelling.plug_loads;

        let hourly_kwh = if appliances.is_empty() {
            distribute_annual(
                default_annual_plug_load_kwh(context.diversity.occupants()),
                factors,
            )
        } else {
            inventory_profile(appliances, factors)
        };
        debug_assert_eq!(hourly_kwh.len(), HOURS_PER_YEAR);
        debug!(appliances = appliances.len(), "plug loads");

        Ok(EndUseProfile::new(
            ProfileKey::new(EndUse::PlugLoads, EnergyCarrier::Electricity),
            hourly_kwh,
        )
        .into())
    }
}
