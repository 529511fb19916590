use std::collections::{BTreeMap, HashSet};
use std::time::Duration;

use super::types::{Candidate, DecodeResponse, DecodeResult, DeviceMap, SearchStatus};
use super::DecodeError;

/// Expands a candidate back into full patterns plus their element-wise sum.
pub fn reconstruct(
    candidate: &Candidate,
    devices: &DeviceMap,
    signal_length: usize,
) -> Result<DecodeResult, DecodeError> {
    let mut computed_sum = vec![0i64; signal_length];
    let mut decoded_signals = BTreeMap::new();

    for device_id in &candidate.devices {
        let pattern = devices.get(device_id).ok_or_else(|| {
            DecodeError::InternalInvariant(format!(
                "candidate references unknown device {device_id}"
            ))
        })?;
        if pattern.len() != signal_length {
            return Err(DecodeError::InternalInvariant(format!(
                "device {device_id} pattern length changed during decode"
            )));
        }
        for (slot, sample) in computed_sum.iter_mut().zip(pattern) {
            // Bounded by the aggregate total, which was checked for overflow.
            *slot += *sample;
        }
        decoded_signals.insert(device_id.clone(), pattern.clone());
    }

    Ok(DecodeResult {
        transmitting_devices: candidate.devices.clone(),
        decoded_signals,
        computed_sum,
        strength: candidate.strength,
        exact_match: candidate.exact,
    })
}

/// Keeps the first result for each distinct computed signal.
pub fn dedup_by_signal(results: Vec<DecodeResult>) -> Vec<DecodeResult> {
    let mut seen: HashSet<Vec<i64>> = HashSet::with_capacity(results.len());
    results
        .into_iter()
        .filter(|result| seen.insert(result.computed_sum.clone()))
        .collect()
}

pub fn assemble(
    solutions: Vec<DecodeResult>,
    status: SearchStatus,
    solve_time: Duration,
    target: u64,
    tolerance: u64,
) -> DecodeResponse {
    DecodeResponse {
        solution_count: solutions.len(),
        solutions,
        solve_time_ms: solve_time.as_millis() as u64,
        status,
        target,
        tolerance,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn devices() -> DeviceMap {
        [
            ("A".to_string(), vec![1, 2]),
            ("B".to_string(), vec![3, 4]),
            ("C".to_string(), vec![0, 1]),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn sums_member_patterns_element_wise() {
        let candidate = Candidate {
            devices: vec!["C".to_string(), "B".to_string()],
            strength: 8,
            exact: true,
        };
        let result = reconstruct(&candidate, &devices(), 2).unwrap();
        assert_eq!(result.computed_sum, vec![3, 5]);
        assert_eq!(result.transmitting_devices, vec!["C", "B"]);
        assert_eq!(result.decoded_signals.len(), 2);
        assert_eq!(result.decoded_signals["B"], vec![3, 4]);
        assert!(result.exact_match);
    }

    #[test]
    fn empty_candidate_reconstructs_to_silence() {
        let candidate = Candidate {
            devices: Vec::new(),
            strength: 0,
            exact: true,
        };
        let result = reconstruct(&candidate, &devices(), 3).unwrap();
        assert_eq!(result.computed_sum, vec![0, 0, 0]);
        assert!(result.decoded_signals.is_empty());
    }

    #[test]
    fn unknown_device_is_an_invariant_violation() {
        let candidate = Candidate {
            devices: vec!["ghost".to_string()],
            strength: 1,
            exact: false,
        };
        let err = reconstruct(&candidate, &devices(), 2).unwrap_err();
        assert!(matches!(err, DecodeError::InternalInvariant(_)));
    }

    #[test]
    fn dedup_keeps_first_of_each_signal() {
        let make = |ids: &[&str], sum: Vec<i64>| DecodeResult {
            transmitting_devices: ids.iter().map(|id| id.to_string()).collect(),
            decoded_signals: BTreeMap::new(),
            computed_sum: sum,
            strength: 4,
            exact_match: true,
        };
        let results = vec![
            make(&["A", "B"], vec![2, 2]),
            make(&["A", "C"], vec![2, 2]),
            make(&["B", "C"], vec![1, 3]),
        ];
        let kept = dedup_by_signal(results);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].transmitting_devices, vec!["A", "B"]);
        assert_eq!(kept[1].transmitting_devices, vec!["B", "C"]);
    }

    #[test]
    fn assemble_counts_solutions() {
        let response = assemble(Vec::new(), SearchStatus::Complete, Duration::from_millis(12), 8, 0);
        assert_eq!(response.solution_count, 0);
        assert_eq!(response.solve_time_ms, 12);
        assert_eq!(response.status, SearchStatus::Complete);
    }
}
