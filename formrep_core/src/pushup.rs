//! Pushup rep analyzer.
//!
//! The governing angle is the elbow angle (shoulder, elbow, wrist). On the
//! rep-completing frame the body line is measured as the angle between the
//! shoulder→hip and hip→ankle segments.

use crate::analyzer::{ExerciseAnalyzer, FrameAnalysis};
use crate::config::PushupConfig;
use crate::geometry::{joint_angle, vector_angle};
use crate::phase::RepState;
use crate::{ExerciseKind, FormIssue, FrameLandmarks, Joint, JointPosition, Phase, Side};

/// Rep counter and form checker for pushups on one body side
#[derive(Clone, Debug)]
pub struct PushupAnalyzer {
    side: Side,
    config: PushupConfig,
    state: RepState,
}

impl PushupAnalyzer {
    pub fn new(side: Side, config: PushupConfig) -> Self {
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

impl Default for PushupAnalyzer {
    fn default() -> Self {
        Self::new(Side::default(), PushupConfig::default())
    }
}

impl ExerciseAnalyzer for PushupAnalyzer {
    fn kind(&self) -> ExerciseKind {
        ExerciseKind::Pushup
    }

    fn analyze(&mut self, frame: &FrameLandmarks) -> FrameAnalysis {
        let side = self.side;
        let (Some(shoulder), Some(elbow), Some(wrist), Some(hip), Some(ankle)) = (
            frame.joint(side, Joint::Shoulder),
            frame.joint(side, Joint::Elbow),
            frame.joint(side, Joint::Wrist),
            frame.joint(side, Joint::Hip),
            frame.joint(side, Joint::Ankle),
        ) else {
            tracing::trace!("Pushup: required joints missing, frame skipped");
            return FrameAnalysis::skipped();
        };

        let elbow_angle = joint_angle(shoulder.point(), elbow.point(), wrist.point());
        let previous = self.state.phase;
        let (next, completed) = self
            .state
            .transition(elbow_angle, &self.config.hysteresis());
        self.state = next;

        let Some(rep_id) = completed else {
            if previous == Phase::Up && next.phase == Phase::Down {
                tracing::debug!("Pushup descent detected at elbow angle {:.1}", elbow_angle);
            }
            return FrameAnalysis::in_progress(elbow_angle);
        };

        let issues = pushup_form_issues(elbow_angle, shoulder, hip, ankle, &self.config);
        tracing::debug!(
            "Pushup rep {} completed at elbow angle {:.1} with issues {:?}",
            rep_id,
            elbow_angle,
            issues
        );
        FrameAnalysis::completed(elbow_angle, issues)
    }

    fn state(&self) -> RepState {
        self.state
    }
}

/// Angle between the shoulder→hip and hip→ankle segments, in degrees
pub fn body_line_angle(shoulder: &JointPosition, hip: &JointPosition, ankle: &JointPosition) -> f64 {
    vector_angle(hip.point() - shoulder.point(), ankle.point() - hip.point())
}

/// Form rules evaluated on a rep-completing frame
pub fn pushup_form_issues(
    elbow_angle: f64,
    shoulder: &JointPosition,
    hip: &JointPosition,
    ankle: &JointPosition,
    config: &PushupConfig,
) -> Vec<FormIssue> {
    let mut issues = Vec::new();

    let body_line = body_line_angle(shoulder, hip, ankle);
    if (body_line - 180.0).abs() > config.body_line_tolerance {
        issues.push(FormIssue::BodyLineBreak);
    }
    if elbow_angle < config.elbow_flare_below {
        issues.push(FormIssue::ElbowFlare);
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Arm with the upper arm pointing up from the elbow and the forearm
    /// rotated `elbow` degrees away from it, plus the given hip and ankle.
    fn plank(elbow: f64, hip: (f64, f64), ankle: (f64, f64)) -> FrameLandmarks {
        let e = (0.3, 0.5);
        let theta = elbow.to_radians();
        FrameLandmarks::new()
            .with(Side::Left, Joint::Shoulder, e.0, e.1 - 0.2)
            .with(Side::Left, Joint::Elbow, e.0, e.1)
            .with(
                Side::Left,
                Joint::Wrist,
                e.0 + 0.2 * theta.sin(),
                e.1 - 0.2 * theta.cos(),
            )
            .with(Side::Left, Joint::Hip, hip.0, hip.1)
            .with(Side::Left, Joint::Ankle, ankle.0, ankle.1)
    }

    /// Hip and ankle placed so the two body segments point in opposite
    /// directions (body line angle of 180°).
    fn folded(elbow: f64) -> FrameLandmarks {
        plank(elbow, (0.6, 0.3), (0.3, 0.3))
    }

    #[test]
    fn test_vertical_arm_does_not_count() {
        let mut analyzer = PushupAnalyzer::default();
        let frame = FrameLandmarks::new()
            .with(Side::Left, Joint::Shoulder, 0.5, 0.2)
            .with(Side::Left, Joint::Elbow, 0.5, 0.4)
            .with(Side::Left, Joint::Wrist, 0.5, 0.6)
            .with(Side::Left, Joint::Hip, 0.5, 0.8)
            .with(Side::Left, Joint::Ankle, 0.5, 1.0);

        let result = analyzer.analyze(&frame);

        assert!(!result.should_count);
        assert!(result.issues.is_empty());
        assert!(result.angle > 160.0);
        assert_eq!(analyzer.state().phase, Phase::Up);
    }

    #[test]
    fn test_sweep_counts_one_rep() {
        let mut analyzer = PushupAnalyzer::default();

        assert!(!analyzer.analyze(&folded(170.0)).should_count);
        assert!(!analyzer.analyze(&folded(80.0)).should_count);
        assert_eq!(analyzer.state().phase, Phase::Down);

        let top = analyzer.analyze(&folded(170.0));
        assert!(top.rep_completed);
        assert!(top.should_count);
        assert!(top.issues.is_empty());
        assert_eq!(analyzer.rep_count(), 1);
    }

    #[test]
    fn test_descent_needs_angle_below_90() {
        let mut analyzer = PushupAnalyzer::default();
        analyzer.analyze(&folded(95.0));
        assert_eq!(analyzer.state().phase, Phase::Up);

        analyzer.analyze(&folded(89.0));
        assert_eq!(analyzer.state().phase, Phase::Down);
    }

    #[test]
    fn test_body_line_measured_between_segment_vectors() {
        let shoulder = JointPosition::new(0.2, 0.5);
        let hip = JointPosition::new(0.5, 0.5);

        let same_direction = JointPosition::new(0.8, 0.5);
        assert!(body_line_angle(&shoulder, &hip, &same_direction) < 0.5);

        let reversed = JointPosition::new(0.2, 0.5);
        assert!((body_line_angle(&shoulder, &hip, &reversed) - 180.0).abs() < 0.5);
    }

    #[test]
    fn test_body_line_break_flagged() {
        let mut analyzer = PushupAnalyzer::default();
        analyzer.analyze(&plank(80.0, (0.6, 0.3), (0.9, 0.3)));
        let top = analyzer.analyze(&plank(170.0, (0.6, 0.3), (0.9, 0.3)));

        assert!(top.should_count);
        assert_eq!(top.issues, vec![FormIssue::BodyLineBreak]);
    }

    #[test]
    fn test_body_line_tolerance_is_strict() {
        let config = PushupConfig::default();
        let shoulder = JointPosition::new(0.3, 0.3);
        let hip = JointPosition::new(0.6, 0.3);

        // Second segment bent 10° off the reversed direction: within tolerance
        let bend = 10.0_f64.to_radians();
        let ankle = JointPosition::new(0.6 - 0.3 * bend.cos(), 0.3 + 0.3 * bend.sin());
        assert!(pushup_form_issues(170.0, &shoulder, &hip, &ankle, &config).is_empty());

        // 20° off: outside tolerance
        let bend = 20.0_f64.to_radians();
        let ankle = JointPosition::new(0.6 - 0.3 * bend.cos(), 0.3 + 0.3 * bend.sin());
        assert_eq!(
            pushup_form_issues(170.0, &shoulder, &hip, &ankle, &config),
            vec![FormIssue::BodyLineBreak]
        );
    }

    #[test]
    fn test_elbow_flare_rule() {
        let config = PushupConfig::default();
        let shoulder = JointPosition::new(0.3, 0.3);
        let hip = JointPosition::new(0.6, 0.3);
        let ankle = JointPosition::new(0.3, 0.3);

        assert_eq!(
            pushup_form_issues(55.0, &shoulder, &hip, &ankle, &config),
            vec![FormIssue::ElbowFlare]
        );
        assert!(pushup_form_issues(60.0, &shoulder, &hip, &ankle, &config).is_empty());
    }

    #[test]
    fn test_missing_hip_is_skipped() {
        let mut analyzer = PushupAnalyzer::default();
        let frame = FrameLandmarks::new()
            .with(Side::Left, Joint::Shoulder, 0.3, 0.3)
            .with(Side::Left, Joint::Elbow, 0.3, 0.5)
            .with(Side::Left, Joint::Wrist, 0.5, 0.5)
            .with(Side::Left, Joint::Ankle, 0.9, 0.3);

        for _ in 0..3 {
            assert_eq!(analyzer.analyze(&frame), FrameAnalysis::skipped());
        }
        assert_eq!(analyzer.state(), RepState::new());
    }
}
