//! Common contract of the per-exercise rep analyzers.

use crate::phase::RepState;
use crate::{ExerciseKind, FormIssue, FrameLandmarks};

/// Outcome of feeding one frame to an analyzer
#[derive(Clone, Debug, PartialEq)]
pub struct FrameAnalysis {
    /// This frame completed a rep
    pub rep_completed: bool,
    /// Governing joint angle in degrees (0 when the frame was skipped)
    pub angle: f64,
    /// Form issues of the completed rep; always empty otherwise
    pub issues: Vec<FormIssue>,
    /// The aggregator should count this frame as a rep
    pub should_count: bool,
}

impl FrameAnalysis {
    /// A frame missing one of the required joints
    pub fn skipped() -> Self {
        Self {
            rep_completed: false,
            angle: 0.0,
            issues: Vec::new(),
            should_count: false,
        }
    }

    /// A frame that was measured but did not complete a rep
    pub fn in_progress(angle: f64) -> Self {
        Self {
            angle,
            ..Self::skipped()
        }
    }

    pub fn completed(angle: f64, issues: Vec<FormIssue>) -> Self {
        Self {
            rep_completed: true,
            angle,
            issues,
            should_count: true,
        }
    }
}

/// A rep-counting state machine for one exercise
pub trait ExerciseAnalyzer {
    fn kind(&self) -> ExerciseKind;

    /// Advance the state machine by one frame
    fn analyze(&mut self, frame: &FrameLandmarks) -> FrameAnalysis;

    fn state(&self) -> RepState;

    fn rep_count(&self) -> u32 {
        self.state().rep_count
    }
}
