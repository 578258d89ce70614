#![forbid(unsafe_code)]

//! Core domain model and analysis logic for formrep.
//!
//! This crate provides:
//! - Domain types (joints, landmarks, issue codes, rep events, summaries)
//! - Angle math
//! - Per-exercise rep state machines (squat, pushup) and form scoring
//! - Session aggregation over a frame stream
//! - Landmark stream reading, smoothing and report output

pub mod types;
pub mod error;
pub mod geometry;
pub mod config;
pub mod logging;
pub mod phase;
pub mod analyzer;
pub mod squat;
pub mod pushup;
pub mod session;
pub mod smoothing;
pub mod source;
pub mod report;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
pub use analyzer::{ExerciseAnalyzer, FrameAnalysis};
pub use phase::{Hysteresis, RepState};
pub use squat::SquatAnalyzer;
pub use pushup::PushupAnalyzer;
pub use session::{analyze_session, FrameStats, SessionAggregator};
pub use smoothing::LandmarkSmoother;
pub use source::{read_landmark_stream, LandmarkStream};
pub use report::{AnalysisReport, FileReportSink, ReportPaths, ReportSink};
