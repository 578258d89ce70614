//! Report output for analyzed sessions.
//!
//! A session is exported as two files named after the video id:
//! - `<video_id>_summary.json`: the pretty-printed summary block
//! - `<video_id>_results.csv`: one row per rep event
//!
//! Renderers downstream (PDF, dashboards) consume these files.

use crate::session::FrameStats;
use crate::{Error, RepEvent, Result, SessionResult};
use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use uuid::Uuid;

const CSV_HEADERS: [&str; 6] = [
    "frame_index",
    "exercise",
    "rep_id",
    "is_form_ok",
    "angles",
    "issues",
];

/// Full analysis output for one video
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub video_id: String,
    pub analyzed_at: DateTime<Utc>,
    pub frames_total: usize,
    pub frames_with_pose: usize,
    #[serde(flatten)]
    pub result: SessionResult,
}

impl AnalysisReport {
    pub fn new(video_id: impl Into<String>, stats: FrameStats, result: SessionResult) -> Self {
        Self {
            video_id: video_id.into(),
            analyzed_at: Utc::now(),
            frames_total: stats.frames_total,
            frames_with_pose: stats.frames_with_pose,
            result,
        }
    }

    /// Report with a freshly generated video id
    pub fn with_random_id(stats: FrameStats, result: SessionResult) -> Self {
        Self::new(Uuid::new_v4().to_string(), stats, result)
    }
}

/// Paths of the files written for one report
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportPaths {
    pub summary: PathBuf,
    pub results: PathBuf,
}

/// Report sink trait for exporting analyzed sessions
pub trait ReportSink {
    fn write(&mut self, report: &AnalysisReport) -> Result<ReportPaths>;
}

/// Writes JSON summary and CSV results into a directory
pub struct FileReportSink {
    output_dir: PathBuf,
}

impl FileReportSink {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Paths the report for `video_id` would be written to
    pub fn paths_for(&self, video_id: &str) -> ReportPaths {
        ReportPaths {
            summary: self.output_dir.join(format!("{}_summary.json", video_id)),
            results: self.output_dir.join(format!("{}_results.csv", video_id)),
        }
    }
}

impl ReportSink for FileReportSink {
    fn write(&mut self, report: &AnalysisReport) -> Result<ReportPaths> {
        validate_video_id(&report.video_id)?;
        std::fs::create_dir_all(&self.output_dir)?;

        // Stage both files, then replace the CSV before the summary
        let summary = stage_summary(&self.output_dir, report)?;
        let results = stage_results_csv(&self.output_dir, &report.result.frame_data)?;

        let paths = self.paths_for(&report.video_id);
        results.persist(&paths.results).map_err(|e| Error::Io(e.error))?;
        summary.persist(&paths.summary).map_err(|e| Error::Io(e.error))?;

        tracing::info!(
            "Wrote report for {} to {:?}",
            report.video_id,
            self.output_dir
        );
        Ok(paths)
    }
}

/// Video ids end up in file names, so they must be a single path component
fn validate_video_id(video_id: &str) -> Result<()> {
    let valid = !video_id.is_empty()
        && video_id != "."
        && video_id != ".."
        && !video_id.contains(['/', '\\']);
    if valid {
        Ok(())
    } else {
        Err(Error::InvalidInput(format!(
            "video id '{}' cannot be used as a file name",
            video_id
        )))
    }
}

/// Write the summary into a locked, synced temp file in `dir`
fn stage_summary(dir: &Path, report: &AnalysisReport) -> Result<NamedTempFile> {
    let temp = NamedTempFile::new_in(dir)?;
    temp.as_file().lock_exclusive()?;

    {
        let mut writer = std::io::BufWriter::new(temp.as_file());
        serde_json::to_writer_pretty(&mut writer, &report.result.summary)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
    }

    temp.as_file().sync_all()?;
    temp.as_file().unlock()?;
    Ok(temp)
}

/// A row in the CSV output
#[derive(Debug, Serialize)]
struct CsvRow {
    frame_index: usize,
    exercise: &'static str,
    rep_id: u32,
    is_form_ok: bool,
    angles: String,
    issues: String,
}

impl TryFrom<&RepEvent> for CsvRow {
    type Error = Error;

    fn try_from(event: &RepEvent) -> Result<Self> {
        Ok(CsvRow {
            frame_index: event.frame_index,
            exercise: event.exercise.as_str(),
            rep_id: event.rep_id,
            is_form_ok: event.is_form_ok,
            angles: serde_json::to_string(&event.angles)?,
            issues: serde_json::to_string(&event.issues)?,
        })
    }
}

/// Write the rep events as CSV into a locked, synced temp file in `dir`
fn stage_results_csv(dir: &Path, events: &[RepEvent]) -> Result<NamedTempFile> {
    let temp = NamedTempFile::new_in(dir)?;
    temp.as_file().lock_exclusive()?;

    {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(temp.as_file());
        writer.write_record(CSV_HEADERS)?;
        for event in events {
            writer.serialize(CsvRow::try_from(event)?)?;
        }
        writer.flush()?;
    }

    temp.as_file().sync_all()?;
    temp.as_file().unlock()?;

    tracing::debug!("Staged {} rep events for {:?}", events.len(), dir);
    Ok(temp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ExerciseKind, ExerciseSummary, FormIssue, SessionSummary};

    fn sample_result() -> SessionResult {
        let squat = RepEvent::new(
            42,
            ExerciseKind::Squat,
            1,
            171.25,
            vec![FormIssue::InsufficientDepth, FormIssue::KneeOverToe],
        );
        let pushup = RepEvent::new(97, ExerciseKind::Pushup, 1, 165.0, vec![]);

        SessionResult {
            summary: SessionSummary {
                squats: ExerciseSummary {
                    total_reps: 1,
                    good_form_reps: 0,
                    common_issues: vec![FormIssue::InsufficientDepth, FormIssue::KneeOverToe],
                },
                pushups: ExerciseSummary {
                    total_reps: 1,
                    good_form_reps: 1,
                    common_issues: vec![],
                },
            },
            frame_data: vec![squat, pushup],
        }
    }

    fn stats() -> FrameStats {
        FrameStats {
            frames_total: 120,
            frames_with_pose: 110,
        }
    }

    #[test]
    fn test_report_envelope_flattens_result() {
        let report = AnalysisReport::new("abc", stats(), sample_result());
        let value = serde_json::to_value(&report).unwrap();

        assert_eq!(value["video_id"], "abc");
        assert_eq!(value["frames_total"], 120);
        assert_eq!(value["summary"]["squats"]["total_reps"], 1);
        assert_eq!(value["frame_data"][1]["exercise"], "pushup");
        assert!(value.get("result").is_none());

        let parsed: AnalysisReport = serde_json::from_value(value).unwrap();
        assert_eq!(parsed.result, report.result);
    }

    #[test]
    fn test_random_ids_are_unique() {
        let a = AnalysisReport::with_random_id(stats(), SessionResult::default());
        let b = AnalysisReport::with_random_id(stats(), SessionResult::default());
        assert_ne!(a.video_id, b.video_id);
        assert!(Uuid::parse_str(&a.video_id).is_ok());
    }

    #[test]
    fn test_file_sink_writes_both_files() {
        let temp_dir = tempfile::tempdir().unwrap();
        let out_dir = temp_dir.path().join("reports");
        let mut sink = FileReportSink::new(&out_dir);

        let report = AnalysisReport::new("session1", stats(), sample_result());
        let paths = sink.write(&report).unwrap();

        assert_eq!(paths.summary, out_dir.join("session1_summary.json"));
        assert_eq!(paths.results, out_dir.join("session1_results.csv"));

        let summary: SessionSummary =
            serde_json::from_str(&std::fs::read_to_string(&paths.summary).unwrap()).unwrap();
        assert_eq!(summary, report.result.summary);

        let mut reader = csv::Reader::from_path(&paths.results).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers, csv::StringRecord::from(CSV_HEADERS.to_vec()));

        let rows: Vec<_> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][0], "42");
        assert_eq!(&rows[0][1], "squat");
        assert_eq!(&rows[0][3], "false");
        assert_eq!(&rows[0][4], r#"{"knee":171.25}"#);
        assert_eq!(&rows[0][5], r#"["INSUFFICIENT_DEPTH","KNEE_OVER_TOE"]"#);
        assert_eq!(&rows[1][4], r#"{"elbow":165.0}"#);
        assert_eq!(&rows[1][5], "[]");
    }

    #[test]
    fn test_empty_session_still_has_csv_header() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut sink = FileReportSink::new(temp_dir.path());

        let report = AnalysisReport::new("empty", stats(), SessionResult::default());
        let paths = sink.write(&report).unwrap();

        let contents = std::fs::read_to_string(&paths.results).unwrap();
        assert_eq!(contents.trim(), CSV_HEADERS.join(","));
    }

    #[test]
    fn test_rewrite_replaces_previous_report() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut sink = FileReportSink::new(temp_dir.path());

        sink.write(&AnalysisReport::new("v", stats(), sample_result()))
            .unwrap();
        let paths = sink
            .write(&AnalysisReport::new("v", stats(), SessionResult::default()))
            .unwrap();

        let reader = csv::Reader::from_path(&paths.results).unwrap();
        assert_eq!(reader.into_records().count(), 0);

        // No stray temp files from the atomic summary write
        let names: Vec<_> = std::fs::read_dir(temp_dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names.len(), 2, "unexpected files: {:?}", names);
    }

    #[test]
    fn test_rejects_path_like_video_ids() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut sink = FileReportSink::new(temp_dir.path());

        for bad in ["", "..", "../escape", "a/b", r"a\b"] {
            let report = AnalysisReport::new(bad, stats(), SessionResult::default());
            assert!(
                matches!(sink.write(&report), Err(Error::InvalidInput(_))),
                "accepted {:?}",
                bad
            );
        }
    }

    #[test]
    fn test_failed_results_write_keeps_previous_summary() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut sink = FileReportSink::new(temp_dir.path());

        let first = AnalysisReport::new("v", stats(), sample_result());
        let paths = sink.write(&first).unwrap();
        let saved_summary = std::fs::read_to_string(&paths.summary).unwrap();

        // A directory in place of the CSV makes the final rename fail
        std::fs::remove_file(&paths.results).unwrap();
        std::fs::create_dir(&paths.results).unwrap();

        let second = AnalysisReport::new("v", stats(), SessionResult::default());
        assert!(matches!(sink.write(&second), Err(Error::Io(_))));

        assert_eq!(std::fs::read_to_string(&paths.summary).unwrap(), saved_summary);
        let names: Vec<_> = std::fs::read_dir(temp_dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names.len(), 2, "unexpected files: {:?}", names);
    }

    #[test]
    fn test_failed_first_write_leaves_no_summary() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut sink = FileReportSink::new(temp_dir.path());
        let paths = sink.paths_for("fresh");
        std::fs::create_dir(&paths.results).unwrap();

        let report = AnalysisReport::new("fresh", stats(), sample_result());
        assert!(sink.write(&report).is_err());
        assert!(!paths.summary.exists());
    }
}
