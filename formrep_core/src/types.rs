//! Core domain types for formrep.
//!
//! This module defines the fundamental types used throughout the system:
//! - The closed joint/landmark vocabulary and per-frame landmark sets
//! - Exercise kinds, phases and form issue codes
//! - Rep events and the session result handed to report renderers

use crate::geometry::Point;
use crate::Error;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Joint Vocabulary
// ============================================================================

/// Anatomical joint tracked by the pose extractor
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Joint {
    Shoulder,
    Elbow,
    Wrist,
    Hip,
    Knee,
    Ankle,
}

impl Joint {
    pub const ALL: [Joint; 6] = [
        Joint::Shoulder,
        Joint::Elbow,
        Joint::Wrist,
        Joint::Hip,
        Joint::Knee,
        Joint::Ankle,
    ];

    fn landmark_suffix(&self) -> &'static str {
        match self {
            Joint::Shoulder => "SHOULDER",
            Joint::Elbow => "ELBOW",
            Joint::Wrist => "WRIST",
            Joint::Hip => "HIP",
            Joint::Knee => "KNEE",
            Joint::Ankle => "ANKLE",
        }
    }
}

/// Body side a landmark belongs to
#[derive(
    Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord,
)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    #[default]
    Left,
    Right,
}

impl Side {
    fn landmark_prefix(&self) -> &'static str {
        match self {
            Side::Left => "LEFT",
            Side::Right => "RIGHT",
        }
    }
}

impl FromStr for Side {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "left" => Ok(Side::Left),
            "right" => Ok(Side::Right),
            other => Err(Error::InvalidInput(format!(
                "unknown body side '{}' (expected left or right)",
                other
            ))),
        }
    }
}

/// A landmark name from the fixed vocabulary, e.g. `LEFT_HIP`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LandmarkName {
    pub side: Side,
    pub joint: Joint,
}

impl LandmarkName {
    pub const fn new(side: Side, joint: Joint) -> Self {
        Self { side, joint }
    }
}

impl fmt::Display for LandmarkName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}_{}",
            self.side.landmark_prefix(),
            self.joint.landmark_suffix()
        )
    }
}

impl FromStr for LandmarkName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || Error::InvalidInput(format!("unknown landmark name '{}'", s));

        let (side, joint) = s.split_once('_').ok_or_else(unknown)?;
        let side = match side {
            "LEFT" => Side::Left,
            "RIGHT" => Side::Right,
            _ => return Err(unknown()),
        };
        let joint = Joint::ALL
            .into_iter()
            .find(|j| j.landmark_suffix() == joint)
            .ok_or_else(unknown)?;

        Ok(LandmarkName::new(side, joint))
    }
}

// ============================================================================
// Landmark Types
// ============================================================================

/// Normalized position of one joint in a frame
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct JointPosition {
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<f64>,
}

impl JointPosition {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            z: None,
            visibility: None,
        }
    }

    /// The 2D point used for angle computation
    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// The landmarks detected in one video frame
///
/// On the wire this is a map from landmark name to position. Names outside
/// the tracked vocabulary (face, hands, feet) are dropped while parsing.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(
    from = "HashMap<String, JointPosition>",
    into = "BTreeMap<String, JointPosition>"
)]
pub struct FrameLandmarks {
    joints: HashMap<LandmarkName, JointPosition>,
}

impl FrameLandmarks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert of a single landmark
    pub fn with(mut self, side: Side, joint: Joint, x: f64, y: f64) -> Self {
        self.insert(LandmarkName::new(side, joint), JointPosition::new(x, y));
        self
    }

    pub fn insert(&mut self, name: LandmarkName, position: JointPosition) {
        self.joints.insert(name, position);
    }

    pub fn get(&self, name: LandmarkName) -> Option<&JointPosition> {
        self.joints.get(&name)
    }

    pub fn joint(&self, side: Side, joint: Joint) -> Option<&JointPosition> {
        self.get(LandmarkName::new(side, joint))
    }

    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    pub fn len(&self) -> usize {
        self.joints.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&LandmarkName, &JointPosition)> {
        self.joints.iter()
    }
}

impl From<HashMap<String, JointPosition>> for FrameLandmarks {
    fn from(raw: HashMap<String, JointPosition>) -> Self {
        let joints = raw
            .into_iter()
            .filter_map(|(name, position)| {
                name.parse::<LandmarkName>()
                    .ok()
                    .map(|name| (name, position))
            })
            .collect();
        Self { joints }
    }
}

impl From<FrameLandmarks> for BTreeMap<String, JointPosition> {
    fn from(frame: FrameLandmarks) -> Self {
        frame
            .joints
            .into_iter()
            .map(|(name, position)| (name.to_string(), position))
            .collect()
    }
}

// ============================================================================
// Exercise Types
// ============================================================================

/// Exercise evaluated by a rep analyzer
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseKind {
    Squat,
    Pushup,
}

impl ExerciseKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExerciseKind::Squat => "squat",
            ExerciseKind::Pushup => "pushup",
        }
    }

    /// Joint whose angle governs the rep cycle
    pub fn measured_joint(&self) -> Joint {
        match self {
            ExerciseKind::Squat => Joint::Knee,
            ExerciseKind::Pushup => Joint::Elbow,
        }
    }
}

impl fmt::Display for ExerciseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Half-cycle of a rep (UP = extended, DOWN = flexed)
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Up,
    Down,
}

/// Technique fault attached to a completed rep
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FormIssue {
    InsufficientDepth,
    KneeOverToe,
    BodyLineBreak,
    ElbowFlare,
}

impl FormIssue {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormIssue::InsufficientDepth => "INSUFFICIENT_DEPTH",
            FormIssue::KneeOverToe => "KNEE_OVER_TOE",
            FormIssue::BodyLineBreak => "BODY_LINE_BREAK",
            FormIssue::ElbowFlare => "ELBOW_FLARE",
        }
    }
}

impl fmt::Display for FormIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Session Result Types
// ============================================================================

/// One completed repetition, as logged in `frame_data`
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RepEvent {
    pub frame_index: usize,
    pub exercise: ExerciseKind,
    pub rep_id: u32,
    pub is_form_ok: bool,
    pub angles: BTreeMap<Joint, f64>,
    pub issues: Vec<FormIssue>,
}

impl RepEvent {
    pub fn new(
        frame_index: usize,
        exercise: ExerciseKind,
        rep_id: u32,
        angle: f64,
        issues: Vec<FormIssue>,
    ) -> Self {
        let mut angles = BTreeMap::new();
        angles.insert(exercise.measured_joint(), angle);

        Self {
            frame_index,
            exercise,
            rep_id,
            is_form_ok: issues.is_empty(),
            angles,
            issues,
        }
    }

    /// The governing joint angle recorded at the completing frame
    pub fn angle(&self) -> Option<f64> {
        self.angles.get(&self.exercise.measured_joint()).copied()
    }
}

/// Per-exercise counters
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct ExerciseSummary {
    pub total_reps: u32,
    pub good_form_reps: u32,
    pub common_issues: Vec<FormIssue>,
}

impl ExerciseSummary {
    /// Count one completed rep with the issues it was flagged with
    pub fn record(&mut self, issues: &[FormIssue]) {
        self.total_reps += 1;
        if issues.is_empty() {
            self.good_form_reps += 1;
        } else {
            self.common_issues.extend_from_slice(issues);
        }
    }

    pub fn bad_form_reps(&self) -> u32 {
        self.total_reps - self.good_form_reps
    }
}

/// Summary block keyed by the plural exercise name
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct SessionSummary {
    pub squats: ExerciseSummary,
    pub pushups: ExerciseSummary,
}

impl SessionSummary {
    pub fn get(&self, kind: ExerciseKind) -> &ExerciseSummary {
        match kind {
            ExerciseKind::Squat => &self.squats,
            ExerciseKind::Pushup => &self.pushups,
        }
    }

    pub fn get_mut(&mut self, kind: ExerciseKind) -> &mut ExerciseSummary {
        match kind {
            ExerciseKind::Squat => &mut self.squats,
            ExerciseKind::Pushup => &mut self.pushups,
        }
    }
}

/// Everything accumulated over one video's analysis
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct SessionResult {
    pub summary: SessionSummary,
    pub frame_data: Vec<RepEvent>,
}

impl SessionResult {
    pub fn events_for(&self, kind: ExerciseKind) -> impl Iterator<Item = &RepEvent> {
        self.frame_data.iter().filter(move |e| e.exercise == kind)
    }
}
