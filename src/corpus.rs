use crate::assembler::ProfileAssembler;
use crate::climate::{ClimateReferenceProvider, ClimateSeries};
use crate::core::end_uses::cooking::CookingProfileGenerator;
use crate::core::end_uses::lighting::LightingProfileGenerator;
use crate::core::end_uses::plug_loads::PlugLoadProfileGenerator;
use crate::core::end_uses::{EndUseGenerator, GenerationContext, GeneratorOutput};
use crate::core::hot_water_engine::HotWaterSimulationEngine;
use crate::core::occupancy::{OccupancyDiversityEngine, OccupancyDiversitySeries};
use crate::errors::WohResult;
use crate::input::{DwellingProfile, MethodologyRevision, SimulationSettings};
use crate::results::{Provenance, WholeOfHomeResult};
use rayon::prelude::*;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Everything needed to calculate one dwelling, resolved and validated up front.
///
/// Building a corpus performs every configuration check (dwelling quantities, revision, climate
/// zone, household composition, water heater and fixtures) so that a calculation either fails before any simulation starts
/// or runs to completion.
pub struct Corpus<'a> {
    dwelling: &'a DwellingProfile,
    settings: &'a SimulationSettings,
    revision: MethodologyRevision,
    climate: Arc<ClimateSeries>,
    diversity: OccupancyDiversitySeries,
    generators: Vec<Box<dyn EndUseGenerator>>,
}

impl<'a> Corpus<'a> {
    #[instrument(skip_all, fields(dwelling_id = %dwelling.dwelling_id))]
    pub fn from_inputs(
        dwelling: &'a DwellingProfile,
        climate_provider: &ClimateReferenceProvider,
        settings: &'a SimulationSettings,
    ) -> WohResult<Self> {
        dwelling.validate()?;
        let diversity_engine = OccupancyDiversityEngine::new(&dwelling.revision)?;
        let climate = climate_provider.lookup(&dwelling.climate_zone)?;
        let diversity = diversity_engine.derive(&dwelling.household, dwelling.floor_area)?;
        let hot_water = HotWaterSimulationEngine::new(
            &dwelling.hot_water,
            &dwelling.hot_water_fixtures,
            settings,
            &climate,
        )?;
        debug!(
            occupants = diversity.occupants(),
            strategy = ?hot_water.strategy(),
            "dwelling inputs resolved"
        );

        Ok(Self {
            dwelling,
            settings,
            revision: diversity_engine.revision(),
            climate,
            diversity,
            generators: vec![
                Box::new(LightingProfileGenerator),
                Box::new(PlugLoadProfileGenerator),
                Box::new(hot_water),
                Box::new(CookingProfileGenerator),
            ],
        })
    }

    /// Add a further end-use generator to run alongside the standard ones.
    pub fn with_generator(mut self, generator: Box<dyn EndUseGenerator>) -> Self {
        self.generators.push(generator);
        self
    }

    pub fn occupants(&self) -> f64 {
        self.diversity.occupants()
    }

    pub fn diversity(&self) -> &OccupancyDiversitySeries {
        &self.diversity
    }

    #[instrument(skip_all, fields(dwelling_id = %self.dwelling.dwelling_id))]
    pub fn run(&self) -> WohResult<WholeOfHomeResult> {
        let context = GenerationContext {
            dwelling: self.dwelling,
            climate: &self.climate,
            diversity: &self.diversity,
            revision: self.revision,
            settings: self.settings,
        };

        // generators are independent of one another once the shared series exist
        let outputs = self
            .generators
            .par_iter()
            .map(|generator| {
                debug!(end_use = %generator.end_use(), "generating profile");
                generator.generate(&context)
            })
            .collect::<WohResult<Vec<GeneratorOutput>>>()?;

        ProfileAssembler::new(self.settings).assemble(
            Provenance {
                revision: self.revision,
                climate_zone: self.dwelling.climate_zone.clone(),
                dwelling_id: self.dwelling.dwelling_id.clone(),
                occupants: self.diversity.occupants(),
                approximations: vec![],
            },
            outputs,
        )
    }
}

/// Calculate hourly whole-of-home energy profiles for one dwelling.
pub fn calculate_whole_of_home(
    dwelling: &DwellingProfile,
    climate_provider: &ClimateReferenceProvider,
    settings: &SimulationSettings,
) -> WohResult<WholeOfHomeResult> {
    Corpus::from_inputs(dwelling, climate_provider, settings)?.run()
}
