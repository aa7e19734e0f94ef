use crate::climate::ClimateReferenceProvider;
use crate::corpus::calculate_whole_of_home;
use crate::errors::WohError;
use crate::input::{DwellingProfile, SimulationSettings};
use crate::results::WholeOfHomeResult;
use rayon::prelude::*;
use smartstring::alias::String as SmartString;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{error, info};

#[derive(Debug)]
pub enum BatchStatus {
    Completed(Box<WholeOfHomeResult>),
    Failed(WohError),
    /// Not started because the batch was cancelled first
    Cancelled,
}

#[derive(Debug)]
pub struct BatchOutcome {
    pub dwelling_id: SmartString,
    pub status: BatchStatus,
}

/// Calculate many dwellings in parallel against one shared climate provider.
///
/// A failing dwelling is logged and recorded without stopping the rest. Setting `cancel` stops
/// dwellings that have not yet started; ones already running finish. Outcomes are returned in
/// input order.
pub fn calculate_batch(
    dwellings: &[DwellingProfile],
    climate_provider: &ClimateReferenceProvider,
    settings: &SimulationSettings,
    cancel: &AtomicBool,
) -> Vec<BatchOutcome> {
    let outcomes = dwellings
        .par_iter()
        .map(|dwelling| {
            let status = if cancel.load(Ordering::SeqCst) {
                BatchStatus::Cancelled
            } else {
                match calculate_whole_of_home(dwelling, climate_provider, settings) {
                    Ok(result) => BatchStatus::Completed(Box::new(result)),
                    Err(e) => {
                        error!(dwelling_id = %dwelling.dwelling_id, "calculation failed: {e}");
                        BatchStatus::Failed(e)
                    }
                }
            };
            BatchOutcome {
                dwelling_id: dwelling.dwelling_id.clone(),
                status,
            }
        })
        .collect::<Vec<_>>();

    let completed = outcomes
        .iter()
        .filter(|outcome| matches!(outcome.status, BatchStatus::Completed(_)))
        .count();
    info!(
        dwellings = dwellings.len(),
        completed,
        "batch calculation finished"
    );
    outcomes
}
