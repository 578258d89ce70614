//! Exponential moving average over successive landmark sets.
//!
//! This is the extractor-side jitter filter: it runs before frames reach the
//! analyzers, which do no filtering of their own.

use crate::{Error, FrameLandmarks, JointPosition, Result};

/// Per-landmark EMA: `s = alpha * current + (1 - alpha) * previous`
#[derive(Clone, Debug)]
pub struct LandmarkSmoother {
    alpha: f64,
    previous: Option<FrameLandmarks>,
}

impl LandmarkSmoother {
    pub fn new(alpha: f64) -> Result<Self> {
        if !(alpha > 0.0 && alpha <= 1.0) {
            return Err(Error::Config(format!(
                "smoothing alpha must be in (0, 1], got {}",
                alpha
            )));
        }
        Ok(Self {
            alpha,
            previous: None,
        })
    }

    /// Smooth one detected frame and remember it as the new history.
    ///
    /// Frames without a pose should not be passed in; the history then
    /// carries over to the next detected frame.
    pub fn smooth(&mut self, current: FrameLandmarks) -> FrameLandmarks {
        let smoothed = match &self.previous {
            None => current,
            Some(previous) => {
                let mut smoothed = FrameLandmarks::new();
                for (name, position) in current.iter() {
                    let prior = previous.get(*name).unwrap_or(position);
                    smoothed.insert(*name, self.blend(position, prior));
                }
                smoothed
            }
        };

        self.previous = Some(smoothed.clone());
        smoothed
    }

    fn blend(&self, current: &JointPosition, prior: &JointPosition) -> JointPosition {
        let mix = |c: f64, p: f64| self.alpha * c + (1.0 - self.alpha) * p;
        JointPosition {
            x: mix(current.x, prior.x),
            y: mix(current.y, prior.y),
            z: match (current.z, prior.z) {
                (Some(c), Some(p)) => Some(mix(c, p)),
                (c, _) => c,
            },
            visibility: current.visibility,
        }
    }
}
