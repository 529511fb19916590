//! Subset-sum decoding of a combined signal.
//!
//! Each device pattern collapses to a scalar strength, the received signal to
//! a scalar target, and a pruned depth-first search over the strengths (in
//! ascending order) yields every device subset whose total lands in
//! `[target, target + tolerance]`. Qualifying subsets are then expanded back
//! into per-sample sums.

pub mod aggregate;
pub mod reconstruct;
pub mod search;
pub mod types;

use std::time::Instant;

pub use search::{DuplicatePolicy, SearchBudget, SearchOutcome};
pub use types::{
    Candidate, DecodeRequest, DecodeResponse, DecodeResult, DeviceMap, DeviceStrength,
    SearchStatus, StopReason,
};

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("internal invariant violated: {0}")]
    InternalInvariant(String),
}

pub fn decode(
    request: &DecodeRequest,
    budget: &SearchBudget,
) -> Result<DecodeResponse, DecodeError> {
    let tolerance = aggregate::validate_tolerance(request.tolerance)?;
    let mut aggregated = aggregate::aggregate(&request.devices, &request.received_signal)?;
    if aggregated.target.checked_add(tolerance).is_none() {
        return Err(DecodeError::InvalidInput(
            "tolerance is too large for this signal".to_string(),
        ));
    }
    aggregate::order_by_strength(&mut aggregated.strengths);

    let policy = if request.exhaustive {
        DuplicatePolicy::Exhaustive
    } else {
        DuplicatePolicy::SuppressEqualStrength
    };

    tracing::debug!(
        devices = aggregated.strengths.len(),
        target = aggregated.target,
        tolerance,
        ?policy,
        "starting subset search"
    );
    let started = Instant::now();
    let outcome = search::search(
        &aggregated.strengths,
        aggregated.target,
        tolerance,
        policy,
        budget,
    );
    let solve_time = started.elapsed();
    let status = outcome.status();

    let mut solutions = outcome
        .candidates
        .iter()
        .map(|candidate| {
            reconstruct::reconstruct(candidate, &request.devices, aggregated.signal_length)
        })
        .collect::<Result<Vec<_>, _>>()?;
    if policy == DuplicatePolicy::Exhaustive {
        solutions = reconstruct::dedup_by_signal(solutions);
    }

    if let Some(reason) = outcome.stopped {
        tracing::warn!(
            %reason,
            status = status.as_str(),
            solutions = solutions.len(),
            nodes = outcome.nodes_visited,
            elapsed_ms = solve_time.as_millis() as u64,
            "subset search stopped early"
        );
    } else {
        tracing::info!(
            devices = aggregated.strengths.len(),
            solutions = solutions.len(),
            nodes = outcome.nodes_visited,
            elapsed_ms = solve_time.as_millis() as u64,
            "decode complete"
        );
    }

    Ok(reconstruct::assemble(
        solutions,
        status,
        solve_time,
        aggregated.target,
        tolerance,
    ))
}
