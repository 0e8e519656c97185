use anyhow::{Context, Result};
use brain_lib::{
    config::AnalyzerConfig,
    detectors::{blink::BlinkEdgeDetector, pulse::analyze_samples},
    io::{recording as recording_io, text as text_io},
    metrics::rate::estimate_rate,
    session::AnalysisSession,
};
use clap::{Parser, Subcommand};
use env_logger::Env;
use log::{info, warn};
use serde_json::json;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(
    name = "brain",
    version,
    about = "Brain Analyzer: offline rPPG pulse and blink-rate tools"
)]
struct Cli {
    /// Logging verbosity (e.g., debug, info, warn)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// TOML file overriding the default analyzer configuration
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Estimate pulse from a CSV of ROI green means (columns: t, v)
    PulseEstimate {
        #[arg(long)]
        input: PathBuf,
        #[arg(long, default_value = "t")]
        time_col: String,
        #[arg(long, default_value = "v")]
        value_col: String,
    },
    /// Count blinks from a CSV of eye aspect ratios (columns: t, ear)
    BlinkRate {
        #[arg(long)]
        input: PathBuf,
        #[arg(long, default_value = "t")]
        time_col: String,
        #[arg(long, default_value = "ear")]
        value_col: String,
    },
    /// Convert newline-delimited peak timestamps (ms) into a per-minute rate
    RateFromPeaks {
        #[arg(long)]
        input: PathBuf,
    },
    /// Replay a per-frame recording (t, green, ear) through an analysis session
    Replay {
        #[arg(long)]
        input: PathBuf,
    },
    /// Print the default configuration as TOML
    ConfigDefaults,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::from_env(Env::default().default_filter_or(cli.log_level.as_str())).init();
    let cfg = load_config(cli.config.as_deref())?;
    match cli.command {
        Commands::PulseEstimate {
            input,
            time_col,
            value_col,
        } => cmd_pulse_estimate(&cfg, &input, &time_col, &value_col)?,
        Commands::BlinkRate {
            input,
            time_col,
            value_col,
        } => cmd_blink_rate(&cfg, &input, &time_col, &value_col)?,
        Commands::RateFromPeaks { input } => cmd_rate_from_peaks(&cfg, &input)?,
        Commands::Replay { input } => cmd_replay(&cfg, &input)?,
        Commands::ConfigDefaults => print!("{}", AnalyzerConfig::default().to_toml_string()?),
    }
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<AnalyzerConfig> {
    match path {
        Some(path) => {
            let cfg = AnalyzerConfig::load(path)
                .with_context(|| format!("loading config {}", path.display()))?;
            info!("using config from {}", path.display());
            Ok(cfg)
        }
        None => Ok(AnalyzerConfig::default()),
    }
}

fn cmd_pulse_estimate(
    cfg: &AnalyzerConfig,
    input: &Path,
    time_col: &str,
    value_col: &str,
) -> Result<()> {
    let samples = recording_io::read_timed_samples(input, time_col, value_col)?;
    let analysis = analyze_samples(&samples, &cfg.pulse);
    if analysis.bpm.is_none() {
        warn!("no pulse estimate from {} samples", analysis.sample_count);
    }
    println!("{}", serde_json::to_string(&analysis)?);
    Ok(())
}

fn cmd_blink_rate(
    cfg: &AnalyzerConfig,
    input: &Path,
    time_col: &str,
    value_col: &str,
) -> Result<()> {
    let samples = recording_io::read_timed_samples(input, time_col, value_col)?;
    let mut detector = BlinkEdgeDetector::new(cfg.blink);
    for sample in &samples {
        detector.update(sample.t, sample.v);
    }
    let all_events = detector.events().to_vec();
    let rate = samples
        .last()
        .map(|last| detector.rate_per_minute(last.t))
        .unwrap_or(0);
    let out = json!({
        "samples": samples.len(),
        "events": all_events,
        "blink_rate_per_minute": rate,
    });
    println!("{}", out);
    Ok(())
}

fn cmd_rate_from_peaks(cfg: &AnalyzerConfig, input: &Path) -> Result<()> {
    let peaks = text_io::read_timestamps(input)?;
    let bpm = estimate_rate(&peaks, cfg.pulse.min_bpm, cfg.pulse.max_bpm);
    let out = json!({ "peaks": peaks.len(), "bpm": bpm });
    println!("{}", out);
    Ok(())
}

fn cmd_replay(cfg: &AnalyzerConfig, input: &Path) -> Result<()> {
    let observations = recording_io::read_recording(input)?;
    let mut session = AnalysisSession::new(*cfg);
    for obs in &observations {
        if let Some(readout) = session.ingest(obs) {
            println!("{}", serde_json::to_string(&readout)?);
        }
    }
    session.stop();
    Ok(())
}
