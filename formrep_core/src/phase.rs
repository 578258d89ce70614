//! Hysteresis rep-phase state machine shared by the exercise analyzers.
//!
//! A rep is counted on the DOWN → UP crossing. The enter-DOWN threshold is
//! well below the exit-to-UP threshold so that jitter around a single
//! boundary cannot produce double counts.

use crate::Phase;
use serde::{Deserialize, Serialize};

/// Pair of governing-angle thresholds in degrees
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hysteresis {
    /// UP → DOWN when the angle drops strictly below this
    pub descend_below: f64,
    /// DOWN → UP (rep complete) when the angle rises strictly above this
    pub ascend_above: f64,
}

/// Owned per-analyzer state: current phase plus completed rep count
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RepState {
    pub phase: Phase,
    pub rep_count: u32,
}

impl RepState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one angle sample; returns the next state and, when this sample
    /// completes a rep, the 1-based id of that rep.
    pub fn transition(self, angle: f64, thresholds: &Hysteresis) -> (RepState, Option<u32>) {
        match self.phase {
            Phase::Up if angle < thresholds.descend_below => (
                RepState {
                    phase: Phase::Down,
                    ..self
                },
                None,
            ),
            Phase::Down if angle > thresholds.ascend_above => {
                let rep_count = self.rep_count + 1;
                (
                    RepState {
                        phase: Phase::Up,
                        rep_count,
                    },
                    Some(rep_count),
                )
            }
            _ => (self, None),
        }
    }
}
