#![allow(clippy::too_many_arguments)]

pub mod assembler;
pub mod batch;
pub mod climate;
pub mod core;
pub mod corpus;
pub mod errors;
pub mod input;
pub mod results;
mod simulation_time;
mod statistics;

#[cfg(test)]
mod tests;

#[macro_use]
extern crate is_close;

pub use crate::batch::{calculate_batch, BatchOutcome, BatchStatus};
pub use crate::climate::{ClimateReferenceProvider, ClimateSeries, MonthlyClimate};
pub use crate::corpus::{calculate_whole_of_home, Corpus};
pub use crate::errors::{WohError, WohResult};
pub use crate::input::{DwellingProfile, RevisionTag, SimulationSettings};
pub use crate::results::{
    EndUse, EndUseProfile, HotWaterDiagnostics, ProfileKey, SanityWarning, WholeOfHomeResult,
};
