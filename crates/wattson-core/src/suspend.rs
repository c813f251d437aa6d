//! Suspend overlay: freeze per-core state while the system is suspended.
//!
//! Frequency and idle sampling is unreliable during suspend, so every
//! suspended interval reports the per-core components of the last interval
//! observed while active. Cache deltas are left alone.

use log::debug;

use crate::state::{ConsolidatedInterval, CoreState};

/// Whether live per-core sampling is currently trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuspendPhase {
    Active,
    Suspended,
}

/// Sequential state threaded through the sweep.
#[derive(Debug, Clone)]
pub struct SuspendOverlay {
    phase: SuspendPhase,
    /// Per-core state of the most recent non-suspended interval.
    last_active: Option<Vec<CoreState>>,
}

impl Default for SuspendOverlay {
    fn default() -> Self {
        Self::new()
    }
}

impl SuspendOverlay {
    pub fn new() -> Self {
        Self {
            phase: SuspendPhase::Active,
            last_active: None,
        }
    }

    pub fn phase(&self) -> SuspendPhase {
        self.phase
    }

    /// Feed the next interval in timestamp order, rewriting it in place if
    /// it is suspended.
    pub fn apply(&mut self, interval: &mut ConsolidatedInterval) {
        if interval.state.suspended {
            if self.phase == SuspendPhase::Active {
                debug!("suspend entered at ts={}", interval.ts);
                self.phase = SuspendPhase::Suspended;
            }
            let cores = interval.state.cores.len();
            match &self.last_active {
                Some(frozen) => {
                    interval.state.cores.clone_from(frozen);
                    interval.state.cores.resize(cores, CoreState::default());
                }
                // Nothing was observed before suspend: the state is unknown.
                None => interval.state.cores = vec![CoreState::default(); cores],
            }
        } else {
            if self.phase == SuspendPhase::Suspended {
                debug!("suspend exited at ts={}", interval.ts);
                self.phase = SuspendPhase::Active;
            }
            self.last_active
                .get_or_insert_with(Vec::new)
                .clone_from(&interval.state.cores);
        }
    }
}

/// Apply the overlay to an already merged sequence, returning a new one.
pub fn apply_suspend_overlay(intervals: &[ConsolidatedInterval]) -> Vec<ConsolidatedInterval> {
    let mut overlay = SuspendOverlay::new();
    intervals
        .iter()
        .cloned()
        .map(|mut iv| {
            overlay.apply(&mut iv);
            iv
        })
        .collect()
}
