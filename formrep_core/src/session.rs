//! Session aggregation: drives a frame stream through both analyzers.
//!
//! Both state machines see every detected frame. There is no attempt to
//! classify which exercise is being performed; whichever analyzer completes
//! a rep gets it logged. Within a frame the squat analyzer runs first.

use crate::analyzer::ExerciseAnalyzer;
use crate::pushup::PushupAnalyzer;
use crate::smoothing::LandmarkSmoother;
use crate::squat::SquatAnalyzer;
use crate::{Config, FrameLandmarks, RepEvent, Result, SessionResult};
use serde::Serialize;

/// Frame counters kept alongside the session result
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct FrameStats {
    pub frames_total: usize,
    pub frames_with_pose: usize,
}

/// Owns one squat and one pushup analyzer for the analysis of one video
#[derive(Clone, Debug, Default)]
pub struct SessionAggregator {
    squat: SquatAnalyzer,
    pushup: PushupAnalyzer,
    result: SessionResult,
    stats: FrameStats,
}

impl SessionAggregator {
    pub fn new(squat: SquatAnalyzer, pushup: PushupAnalyzer) -> Self {
        Self {
            squat,
            pushup,
            result: SessionResult::default(),
            stats: FrameStats::default(),
        }
    }

    /// Analyzers for the configured body side and thresholds
    pub fn from_config(config: &Config) -> Self {
        let side = config.pose.side;
        Self::new(
            SquatAnalyzer::new(side, config.squat.clone()),
            PushupAnalyzer::new(side, config.pushup.clone()),
        )
    }

    /// Feed one frame; returns the rep events it produced.
    ///
    /// A frame without a pose (or with an empty landmark set) is skipped
    /// without touching either analyzer.
    pub fn process_frame(
        &mut self,
        frame_index: usize,
        frame: Option<&FrameLandmarks>,
    ) -> &[RepEvent] {
        self.stats.frames_total += 1;
        let start = self.result.frame_data.len();

        let Some(frame) = frame.filter(|f| !f.is_empty()) else {
            tracing::trace!("Frame {}: no pose detected", frame_index);
            return &self.result.frame_data[start..];
        };
        self.stats.frames_with_pose += 1;

        record(&mut self.squat, &mut self.result, frame_index, frame);
        record(&mut self.pushup, &mut self.result, frame_index, frame);

        &self.result.frame_data[start..]
    }

    /// Run a whole frame sequence; frame index is the position in `frames`
    pub fn analyze_frames<I>(&mut self, frames: I)
    where
        I: IntoIterator<Item = Option<FrameLandmarks>>,
    {
        for (frame_index, frame) in frames.into_iter().enumerate() {
            self.process_frame(frame_index, frame.as_ref());
        }
    }

    /// Run a fallible frame source, optionally smoothing detected frames.
    ///
    /// Stops at the first error; the frames before it stay accounted for.
    pub fn analyze_stream<I>(
        &mut self,
        frames: I,
        mut smoother: Option<&mut LandmarkSmoother>,
    ) -> Result<()>
    where
        I: IntoIterator<Item = Result<Option<FrameLandmarks>>>,
    {
        for (frame_index, frame) in frames.into_iter().enumerate() {
            let frame = match (frame?, smoother.as_deref_mut()) {
                (Some(frame), Some(smoother)) if !frame.is_empty() => Some(smoother.smooth(frame)),
                (frame, _) => frame,
            };
            self.process_frame(frame_index, frame.as_ref());
        }
        Ok(())
    }

    pub fn result(&self) -> &SessionResult {
        &self.result
    }

    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    pub fn squat(&self) -> &SquatAnalyzer {
        &self.squat
    }

    pub fn pushup(&self) -> &PushupAnalyzer {
        &self.pushup
    }

    /// Consume the aggregator and hand back the accumulated result
    pub fn finish(self) -> SessionResult {
        if self.stats.frames_total > 0 && self.stats.frames_with_pose == 0 {
            tracing::warn!(
                "No pose detected in any of {} frames",
                self.stats.frames_total
            );
        }
        tracing::info!(
            "Session complete: {} frames ({} with pose), {} squats ({} good), {} pushups ({} good)",
            self.stats.frames_total,
            self.stats.frames_with_pose,
            self.result.summary.squats.total_reps,
            self.result.summary.squats.good_form_reps,
            self.result.summary.pushups.total_reps,
            self.result.summary.pushups.good_form_reps,
        );
        self.result
    }
}

/// Analyze a frame sequence with default thresholds on the left side
pub fn analyze_session<I>(frames: I) -> SessionResult
where
    I: IntoIterator<Item = Option<FrameLandmarks>>,
{
    let mut aggregator = SessionAggregator::default();
    aggregator.analyze_frames(frames);
    aggregator.finish()
}

fn record<A: ExerciseAnalyzer>(
    analyzer: &mut A,
    result: &mut SessionResult,
    frame_index: usize,
    frame: &FrameLandmarks,
) {
    let analysis = analyzer.analyze(frame);
    if !analysis.should_count {
        return;
    }

    let kind = analyzer.kind();
    result.summary.get_mut(kind).record(&analysis.issues);
    result.frame_data.push(RepEvent::new(
        frame_index,
        kind,
        analyzer.rep_count(),
        analysis.angle,
        analysis.issues,
    ));
}
