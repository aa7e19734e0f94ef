use crate::core::end_uses::{distribute_annual, EndUseGenerator, GenerationContext, GeneratorOutput};
use crate::core::schedule::DiversityCategory;
use crate::core::units::mj_to_kwh;
use crate::errors::WohResult;
use crate::input::{CookingApplianceType, EnergyCarrier};
use crate::results::{EndUse, EndUseProfile, ProfileKey};
use indexmap::IndexMap;
use itertools::Itertools;
use tracing::debug;

/// Annual cooking energy for one appliance type as `(constant, per occupant)`, in MJ/yr
fn annual_load_coefficients(appliance_type: CookingApplianceType) -> (f64, f64) {
    match appliance_type {
        CookingApplianceType::GasCooktop => (700., 300.),
        CookingApplianceType::ElectricCooktop => (455., 194.),
        CookingApplianceType::InductionCooktop => (311., 134.),
        CookingApplianceType::GasOven => (800., 300.),
        CookingApplianceType::ElectricOven => (403., 150.),
    }
}

/// Annual energy of one appliance type, in MJ. Several appliances of a type share this load.
pub fn annual_cooking_mj(appliance_type: CookingApplianceType, occupants: f64) -> f64 {
    let (constant, per_occupant) = annual_load_coefficients(appliance_type);
    constant + per_occupant * occupants
}

#[derive(Clone, Copy, Debug, Default)]
pub struct CookingProfileGenerator;

impl EndUseGenerator for CookingProfileGenerator {
    fn end_use(&self) -> EndUse {
        EndUse::Cooking
    }

    fn generate(&self, context: &GenerationContext) -> WohResult<GeneratorOutput> {
        let occupants = context.diversity.occupants();
        let factors = context.diversity.factors(DiversityCategory::Cooking);

        let mut annual_kwh_by_carrier: IndexMap<EnergyCarrier, f64> = IndexMap::new();
        for appliance_type in context
            .dwelling
            .cooking
            .iter()
            .filter(|appliance| appliance.count > 0)
            .map(|appliance| appliance.appliance_type)
            .unique()
        {
            *annual_kwh_by_carrier
                .entry(appliance_type.carrier())
                .or_default() += mj_to_kwh(annual_cooking_mj(appliance_type, occupants));
        }
        if annual_kwh_by_carrier.is_empty() {
            // no cooking appliances still gives a (zero) cooking series
            annual_kwh_by_carrier.insert(EnergyCarrier::Electricity, 0.);
        }
        annual_kwh_by_carrier.sort_keys();
        debug!(?annual_kwh_by_carrier, "cooking");

        Ok(GeneratorOutput {
            profiles: annual_kwh_by_carrier
                .into_iter()
                .map(|(carrier, annual_kwh)| {
                    EndUseProfile::new(
                        ProfileKey::new(EndUse::Cooking, carrier),
                        distribute_annual(annual_kwh, factors),
                    )
                })
                .collect(),
            ..Default::default()
        })
    }
}
