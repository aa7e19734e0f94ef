use crate::core::end_uses::GeneratorOutput;
use crate::core::units::HOURS_PER_YEAR;
use crate::errors::{WohError, WohResult};
use crate::input::SimulationSettings;
use crate::results::{EndUse, EndUseProfile, Provenance, SanityWarning, WholeOfHomeResult};
use indexmap::IndexMap;
use itertools::Itertools;
use strum::IntoEnumIterator;
use tracing::{debug, warn};

/// Typical annual energy (kWh, all carriers) for each end use. Dwellings outside these ranges
/// are reported, not rejected.
fn typical_annual_range(end_use: EndUse) -> (f64, f64) {
    match end_use {
        EndUse::Lighting => (50., 3_000.),
        EndUse::PlugLoads => (500., 8_000.),
        EndUse::HotWater => (300., 12_000.),
        EndUse::Cooking => (0., 3_500.),
    }
}

/// Merges generator outputs into a [`WholeOfHomeResult`], enforcing hour-count completeness and
/// non-negativity and reporting annual totals outside typical ranges.
#[derive(Clone, Copy, Debug)]
pub struct ProfileAssembler {
    sanity_checks: bool,
}

impl ProfileAssembler {
    pub fn new(settings: &SimulationSettings) -> Self {
        Self {
            sanity_checks: settings.sanity_checks,
        }
    }

    pub fn assemble(
        &self,
        mut provenance: Provenance,
        outputs: Vec<GeneratorOutput>,
    ) -> WohResult<WholeOfHomeResult> {
        let mut profiles: IndexMap<_, EndUseProfile> = IndexMap::new();
        let mut hot_water = None;

        for output in outputs {
            for profile in output.profiles {
                check_profile(&profile)?;
                match profiles.get_mut(&profile.key) {
                    Some(existing) => {
                        for (total, value) in existing.hourly_kwh.iter_mut().zip(&profile.hourly_kwh) {
                            *total += value;
                        }
                    }
                    None => {
                        profiles.insert(profile.key, profile);
                    }
                }
            }
            hot_water = hot_water.or(output.hot_water);
            provenance.approximations.extend(output.approximations);
        }
        profiles.sort_keys();

        let mut result = WholeOfHomeResult {
            provenance,
            profiles,
            hot_water,
            warnings: vec![],
        };
        result.warnings = self.sanity_warnings(&result);
        for warning in &result.warnings {
            warn!(dwelling_id = %result.provenance.dwelling_id, "{warning}");
        }
        debug!(profiles = result.profiles.len(), "assembled whole-of-home result");

        Ok(result)
    }

    /// Re-run the assembler checks on an existing result, returning any warnings it does not
    /// already carry. The result itself is never modified.
    pub fn revalidate(&self, result: &WholeOfHomeResult) -> WohResult<Vec<SanityWarning>> {
        for profile in result.profiles() {
            check_profile(profile)?;
        }
        Ok(self
            .sanity_warnings(result)
            .into_iter()
            .filter(|warning| !result.warnings.contains(warning))
            .collect_vec())
    }

    fn sanity_warnings(&self, result: &WholeOfHomeResult) -> Vec<SanityWarning> {
        if !self.sanity_checks {
            return vec![];
        }
        EndUse::iter()
            .filter(|end_use| result.profiles().any(|p| p.key.end_use == *end_use))
            .filter_map(|end_use| {
                let annual_kwh = result.annual_end_use_kwh(end_use);
                let (typical_min_kwh, typical_max_kwh) = typical_annual_range(end_use);
                let outside = (annual_kwh < typical_min_kwh
                    && !is_close!(annual_kwh, typical_min_kwh, rel_tol = 1e-9))
                    || (annual_kwh > typical_max_kwh
                        && !is_close!(annual_kwh, typical_max_kwh, rel_tol = 1e-9));
                outside.then_some(SanityWarning {
                    end_use,
                    annual_kwh,
                    typical_min_kwh,
                    typical_max_kwh,
                })
            })
            .collect()
    }
}

fn check_profile(profile: &EndUseProfile) -> WohResult<()> {
    if profile.hourly_kwh.len() != HOURS_PER_YEAR {
        return Err(WohError::IncompleteProfile {
            key: profile.key,
            length: profile.hourly_kwh.len(),
            expected: HOURS_PER_YEAR,
        });
    }
    if let Some((hour, value)) = profile
        .hourly_kwh
        .iter()
        .find_position(|value| !(value.is_finite() && **value >= 0.))
    {
        return Err(WohError::InvalidProfileValue {
            key: profile.key,
            hour,
            value: *value,
        });
    }
    Ok(())
}
