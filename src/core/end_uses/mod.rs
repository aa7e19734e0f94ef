pub mod cooking;
pub mod lighting;
pub mod plug_loads;

use crate::climate::ClimateSeries;
use crate::core::occupancy::OccupancyDiversitySeries;
use crate::errors::WohResult;
use crate::input::{DwellingProfile, MethodologyRevision, SimulationSettings};
use crate::results::{EndUse, EndUseProfile, HotWaterDiagnostics};

/// Shared, read-only inputs for every end-use generator of one dwelling.
#[derive(Clone, Copy, Debug)]
pub struct GenerationContext<'a> {
    pub dwelling: &'a DwellingProfile,
    pub climate: &'a ClimateSeries,
    pub diversity: &'a OccupancyDiversitySeries,
    pub revision: MethodologyRevision,
    pub settings: &'a SimulationSettings,
}

/// What a generator hands to the profile assembler.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GeneratorOutput {
    pub profiles: Vec<EndUseProfile>,
    pub hot_water: Option<HotWaterDiagnostics>,
    pub approximations: Vec<String>,
}

impl From<EndUseProfile> for GeneratorOutput {
    fn from(profile: EndUseProfile) -> Self {
        Self {
            profiles: vec![profile],
            ..Default::default()
        }
    }
}

/// Produces hourly energy for one end use. Generators do not depend on one another, so a
/// dwelling's generators may run in any order or in parallel.
pub trait EndUseGenerator: Send + Sync {
    fn end_use(&self) -> EndUse;

    fn generate(&self, context: &GenerationContext) -> WohResult<GeneratorOutput>;
}

/// Spread an annual total across the year in proportion to hourly diversity factors.
pub(crate) fn distribute_annual(annual_total: f64, factors: &[f64]) -> Vec<f64> {
    let factor_total = factors.iter().sum::<f64>();
    if factor_total <= 0. {
        return vec![0.; factors.len()];
    }
    factors
        .iter()
        .map(|factor| annual_total * factor / factor_total)
        .collect()
}
