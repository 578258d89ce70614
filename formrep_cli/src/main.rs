use clap::{Parser, Subcommand};
use formrep_core::*;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "formrep")]
#[command(about = "Squat and pushup rep counter with form checks", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Use this config file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Count reps and flag form issues in a recorded landmark stream
    Analyze {
        /// JSON Lines file with one landmark set (or null) per frame
        landmarks: PathBuf,

        /// Directory for the summary JSON and results CSV
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Name for the report files (defaults to a random UUID)
        #[arg(long)]
        video_id: Option<String>,

        /// Body side to track (left, right)
        #[arg(long)]
        side: Option<String>,

        /// Feed raw landmarks to the analyzers without EMA smoothing
        #[arg(long, conflicts_with = "alpha")]
        no_smoothing: bool,

        /// EMA weight of the current frame, in (0, 1]
        #[arg(long)]
        alpha: Option<f64>,

        /// Print the full report (with frame data) instead of the summary
        #[arg(long)]
        full: bool,

        /// Dry run - print results without writing report files
        #[arg(long)]
        dry_run: bool,
    },

    /// Print the effective configuration as TOML
    Config,
}

fn main() -> Result<()> {
    // Initialize logging
    formrep_core::logging::init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    match cli.command {
        Commands::Analyze {
            landmarks,
            output_dir,
            video_id,
            side,
            no_smoothing,
            alpha,
            full,
            dry_run,
        } => {
            let mut config = config;
            if let Some(side) = side {
                config.pose.side = side.parse()?;
            }
            if no_smoothing {
                config.pose.smoothing = false;
            }
            if let Some(alpha) = alpha {
                config.pose.smoothing_alpha = alpha;
            }
            config.validate()?;

            cmd_analyze(&config, landmarks, output_dir, video_id, full, dry_run)
        }
        Commands::Config => cmd_config(&config),
    }
}

fn cmd_analyze(
    config: &Config,
    landmarks: PathBuf,
    output_dir: Option<PathBuf>,
    video_id: Option<String>,
    full: bool,
    dry_run: bool,
) -> Result<()> {
    let frames = read_landmark_stream(&landmarks)?;
    tracing::info!("Analyzing {} frames from {:?}", frames.len(), landmarks);

    let mut smoother = if config.pose.smoothing {
        Some(LandmarkSmoother::new(config.pose.smoothing_alpha)?)
    } else {
        None
    };

    let mut aggregator = SessionAggregator::from_config(config);
    aggregator.analyze_stream(frames.into_iter().map(Ok), smoother.as_mut())?;

    let stats = aggregator.stats();
    let result = aggregator.finish();
    let report = match video_id {
        Some(id) => AnalysisReport::new(id, stats, result),
        None => AnalysisReport::with_random_id(stats, result),
    };

    if full {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", serde_json::to_string_pretty(&report.result.summary)?);
    }

    if dry_run {
        eprintln!("[Dry run - no report files written]");
        return Ok(());
    }

    let output_dir = output_dir.unwrap_or_else(|| config.report.output_dir.clone());
    let mut sink = FileReportSink::new(output_dir);
    let paths = sink.write(&report)?;

    eprintln!("✓ Report saved for video {}", report.video_id);
    eprintln!("  Summary: {}", paths.summary.display());
    eprintln!("  Results: {}", paths.results.display());

    Ok(())
}

fn cmd_config(config: &Config) -> Result<()> {
    print!("{}", config.to_toml()?);
    Ok(())
}
