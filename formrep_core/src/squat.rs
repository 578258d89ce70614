//! Squat rep analyzer.
//!
//! The governing angle is the knee angle (hip, knee, ankle). Form is only
//! judged on the frame that completes a rep:
//! - `INSUFFICIENT_DEPTH` when the completing knee angle exceeds `depth_max_angle`
//! - `KNEE_OVER_TOE` when the knee drifts horizontally past the ankle

use crate::analyzer::{ExerciseAnalyzer, FrameAnalysis};
use crate::config::SquatConfig;
use crate::geometry::joint_angle;
use crate::phase::RepState;
use crate::{ExerciseKind, FormIssue, FrameLandmarks, Joint, JointPosition, Phase, Side};

/// Rep counter and form checker for squats on one body side
#[derive(Clone, Debug)]
pub struct SquatAnalyzer {
    side: Side,
    config: SquatConfig,
    state: RepState,
}

impl SquatAnalyzer {
    pub fn new(side: Side, config: SquatConfig) -> Self {
        Self {
            side,
            config,
            state: RepState::new(),
        }
    }

    pub fn side(&self) -> Side {
        self.side
    }
}

impl Default for SquatAnalyzer {
    fn default() -> Self {
        Self::new(Side::default(), SquatConfig::default())
    }
}

impl ExerciseAnalyzer for SquatAnalyzer {
    fn kind(&self) -> ExerciseKind {
        ExerciseKind::Squat
    }

    fn analyze(&mut self, frame: &FrameLandmarks) -> FrameAnalysis {
        let (Some(hip), Some(knee), Some(ankle)) = (
            frame.joint(self.side, Joint::Hip),
            frame.joint(self.side, Joint::Knee),
            frame.joint(self.side, Joint::Ankle),
        ) else {
            tracing::trace!("Squat: required joints missing, frame skipped");
            return FrameAnalysis::skipped();
        };

        let knee_angle = joint_angle(hip.point(), knee.point(), ankle.point());
        let previous = self.state.phase;
        let (next, completed) = self.state.transition(knee_angle, &self.config.hysteresis());
        self.state = next;

        match completed {
            Some(rep_id) => {
                let issues = squat_form_issues(knee_angle, knee, ankle, &self.config);
                tracing::debug!(
                    "Squat rep {} completed at knee angle {:.1} with issues {:?}",
                    rep_id,
                    knee_angle,
                    issues
                );
                FrameAnalysis::completed(knee_angle, issues)
            }
            None => {
                if previous == Phase::Up && next.phase == Phase::Down {
                    tracing::debug!("Squat descent detected at knee angle {:.1}", knee_angle);
                }
                FrameAnalysis::in_progress(knee_angle)
            }
        }
    }

    fn state(&self) -> RepState {
        self.state
    }
}

/// Form rules evaluated on a rep-completing frame
pub fn squat_form_issues(
    knee_angle: f64,
    knee: &JointPosition,
    ankle: &JointPosition,
    config: &SquatConfig,
) -> Vec<FormIssue> {
    let mut issues = Vec::new();

    if knee_angle > config.depth_max_angle {
        issues.push(FormIssue::InsufficientDepth);
    }
    if (knee.x - ankle.x).abs() > config.knee_over_toe_max {
        issues.push(FormIssue::KneeOverToe);
    }

    issues
}
