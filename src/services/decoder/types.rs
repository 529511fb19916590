use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Device identifier -> sampled pattern. Ordered so that strength ties always
/// resolve the same way for a given request.
pub type DeviceMap = BTreeMap<String, Vec<i64>>;

#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
pub struct DecodeRequest {
    pub devices: BTreeMap<String, Vec<i64>>,
    pub received_signal: Vec<i64>,
    #[serde(default)]
    pub tolerance: i64,
    /// Enumerate every equal-strength device instead of only the first one
    /// per search position; results are then collapsed by computed signal.
    #[serde(default)]
    pub exhaustive: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceStrength {
    pub device_id: String,
    pub strength: u64,
}

/// A qualifying subset emitted by the search, devices in exploration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub devices: Vec<String>,
    pub strength: u64,
    pub exact: bool,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct DecodeResult {
    pub transmitting_devices: Vec<String>,
    pub decoded_signals: BTreeMap<String, Vec<i64>>,
    pub computed_sum: Vec<i64>,
    pub strength: u64,
    pub exact_match: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SearchStatus {
    #[default]
    Complete,
    Partial,
    Aborted,
}

impl SearchStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SearchStatus::Complete => "complete",
            SearchStatus::Partial => "partial",
            SearchStatus::Aborted => "aborted",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Deadline,
    Cancelled,
    SolutionLimit,
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            StopReason::Deadline => "deadline",
            StopReason::Cancelled => "cancelled",
            StopReason::SolutionLimit => "solution_limit",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct DecodeResponse {
    pub solutions: Vec<DecodeResult>,
    pub solution_count: usize,
    pub solve_time_ms: u64,
    pub status: SearchStatus,
    pub target: u64,
    pub tolerance: u64,
}
