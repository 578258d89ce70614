//! Recorded landmark streams (JSON Lines).
//!
//! One line per video frame, in frame order. A line holds either `null`
//! (no person detected) or an object mapping landmark names to positions.
//! Blank lines are ignored and do not consume a frame index.

use crate::{Error, FrameLandmarks, Result};
use fs2::FileExt;
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;

/// Iterator over the frames of a landmark stream
pub struct LandmarkStream<R> {
    lines: Lines<R>,
    line_num: usize,
}

impl<R: BufRead> LandmarkStream<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_num: 0,
        }
    }
}

impl<R: BufRead> Iterator for LandmarkStream<R> {
    type Item = Result<Option<FrameLandmarks>>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(Error::Io(e))),
            };
            self.line_num += 1;

            if line.trim().is_empty() {
                continue;
            }

            return Some(parse_frame_line(&line, self.line_num));
        }
    }
}

/// Parse a single stream line; `line_num` is 1-based and only used in errors
pub fn parse_frame_line(line: &str, line_num: usize) -> Result<Option<FrameLandmarks>> {
    serde_json::from_str::<Option<FrameLandmarks>>(line)
        .map_err(|e| Error::InvalidInput(format!("landmark stream line {}: {}", line_num, e)))
}

/// Read every frame of a landmark stream file under a shared lock
pub fn read_landmark_stream(path: &Path) -> Result<Vec<Option<FrameLandmarks>>> {
    let file = File::open(path)?;
    // Acquire shared lock for reading
    file.lock_shared()?;

    let frames: Result<Vec<_>> = LandmarkStream::new(BufReader::new(&file)).collect();

    file.unlock()?;

    let frames = frames?;
    tracing::debug!("Read {} frames from {:?}", frames.len(), path);
    Ok(frames)
}
