use std::ops::ControlFlow;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

use super::types::{Candidate, DeviceStrength, SearchStatus, StopReason};

/// Nodes visited between deadline/cancellation checks.
const BUDGET_CHECK_INTERVAL: u64 = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    /// Only the first device of a given strength is tried at each position.
    #[default]
    SuppressEqualStrength,
    /// Every device is tried; callers collapse duplicates afterwards.
    Exhaustive,
}

#[derive(Debug, Clone, Default)]
pub struct SearchBudget {
    pub deadline: Option<Instant>,
    pub cancel: Option<CancellationToken>,
    pub max_solutions: Option<usize>,
}

impl SearchBudget {
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Some(Instant::now() + timeout);
        self
    }

    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn with_max_solutions(mut self, max_solutions: usize) -> Self {
        self.max_solutions = Some(max_solutions);
        self
    }

    fn interrupted(&self) -> Option<StopReason> {
        if self
            .cancel
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
        {
            return Some(StopReason::Cancelled);
        }
        if self.deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            return Some(StopReason::Deadline);
        }
        None
    }
}

#[derive(Debug, Clone, Default)]
pub struct SearchOutcome {
    pub candidates: Vec<Candidate>,
    pub stopped: Option<StopReason>,
    pub nodes_visited: u64,
}

impl SearchOutcome {
    pub fn status(&self) -> SearchStatus {
        match (self.stopped, self.candidates.is_empty()) {
            (None, _) => SearchStatus::Complete,
            (Some(_), false) => SearchStatus::Partial,
            (Some(_), true) => SearchStatus::Aborted,
        }
    }
}

/// Depth-first enumeration of every subset of `sorted` whose strength lands in
/// `[target, target + tolerance]`.
///
/// `sorted` must be ascending by strength: the loop at each level stops at
/// the first device stronger than the slack left, which is only sound when
/// every later device is at least as strong. Callers guarantee
/// `target + tolerance` does not overflow.
pub fn search(
    sorted: &[DeviceStrength],
    target: u64,
    tolerance: u64,
    policy: DuplicatePolicy,
    budget: &SearchBudget,
) -> SearchOutcome {
    debug_assert!(sorted.windows(2).all(|w| w[0].strength <= w[1].strength));

    let band_top = target.saturating_add(tolerance);
    let mut search = SubsetSearch {
        sorted,
        tolerance,
        band_top,
        policy,
        budget,
        partial: Vec::with_capacity(sorted.len()),
        outcome: SearchOutcome::default(),
    };
    if let ControlFlow::Break(reason) = search.run() {
        search.outcome.stopped = Some(reason);
    }
    search.outcome
}

/// One open search node: the devices from `next` onwards are still to be
/// tried on top of the current partial subset.
#[derive(Debug, Clone, Copy)]
struct Frame {
    next: usize,
    remaining: u64,
    last_value: u64,
}

struct SubsetSearch<'a> {
    sorted: &'a [DeviceStrength],
    tolerance: u64,
    band_top: u64,
    policy: DuplicatePolicy,
    budget: &'a SearchBudget,
    partial: Vec<usize>,
    outcome: SearchOutcome,
}

impl SubsetSearch<'_> {
    /// Walks the tree with an explicit frame stack so depth is bounded by
    /// heap, not by the thread stack. `partial` always holds one device per
    /// frame above the root.
    fn run(&mut self) -> ControlFlow<StopReason> {
        let mut frames: Vec<Frame> = Vec::with_capacity(self.sorted.len() + 1);
        match self.enter(0, self.band_top) {
            ControlFlow::Break(reason) => return ControlFlow::Break(reason),
            ControlFlow::Continue(Some(root)) => frames.push(root),
            ControlFlow::Continue(None) => return ControlFlow::Continue(()),
        }

        while let Some(frame) = frames.last_mut() {
            let Some((idx, remaining)) = self.next_child(frame) else {
                frames.pop();
                self.partial.pop();
                continue;
            };

            self.partial.push(idx);
            match self.enter(idx + 1, remaining) {
                ControlFlow::Break(reason) => return ControlFlow::Break(reason),
                ControlFlow::Continue(Some(child)) => frames.push(child),
                ControlFlow::Continue(None) => {
                    self.partial.pop();
                }
            }
        }
        ControlFlow::Continue(())
    }

    /// `remaining` is the strength still allowed before the band is exceeded,
    /// so the partial subset is in band once `remaining <= tolerance`. In-band
    /// nodes are emitted and not expanded.
    fn enter(&mut self, start: usize, remaining: u64) -> ControlFlow<StopReason, Option<Frame>> {
        self.outcome.nodes_visited += 1;
        if self.outcome.nodes_visited % BUDGET_CHECK_INTERVAL == 0 {
            if let Some(reason) = self.budget.interrupted() {
                return ControlFlow::Break(reason);
            }
        }

        if remaining <= self.tolerance {
            return match self.emit(remaining == self.tolerance, remaining) {
                ControlFlow::Break(reason) => ControlFlow::Break(reason),
                ControlFlow::Continue(()) => ControlFlow::Continue(None),
            };
        }
        ControlFlow::Continue(Some(Frame {
            next: start,
            remaining,
            last_value: 0,
        }))
    }

    /// Advances `frame` to its next explorable device, returning the device
    /// index and the slack left once it is added.
    fn next_child(&self, frame: &mut Frame) -> Option<(usize, u64)> {
        while frame.next < self.sorted.len() {
            let idx = frame.next;
            frame.next += 1;
            let value = self.sorted[idx].strength;
            if value > frame.remaining {
                frame.next = self.sorted.len();
                return None;
            }
            if self.policy == DuplicatePolicy::SuppressEqualStrength {
                if value == frame.last_value {
                    continue;
                }
                frame.last_value = value;
            }
            return Some((idx, frame.remaining - value));
        }
        None
    }

    fn emit(&mut self, exact: bool, remaining: u64) -> ControlFlow<StopReason> {
        let devices = self
            .partial
            .iter()
            .map(|&idx| self.sorted[idx].device_id.clone())
            .collect();
        self.outcome.candidates.push(Candidate {
            devices,
            strength: self.band_top - remaining,
            exact,
        });
        match self.budget.max_solutions {
            Some(max) if self.outcome.candidates.len() >= max => {
                ControlFlow::Break(StopReason::SolutionLimit)
            }
            _ => ControlFlow::Continue(()),
        }
    }
}
