use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::{info, warn};
use pulse_lib::{
    io::{frames as frames_io, text as text_io},
    metrics::hrv::{analyze_batch, HrvMetrics},
    FrameOutput, HeartRateMonitor, MonitorConfig,
};
use serde::Serialize;
use std::{
    io::{self, Read},
    path::{Path, PathBuf},
};

#[derive(Parser)]
#[command(
    name = "pulse",
    version,
    about = "Camera-PPG heart rate and HRV estimation tools"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a recorded frame stream through the monitoring pipeline
    Monitor {
        /// CSV frame recording (see `pulse simulate`)
        #[arg(long)]
        input: PathBuf,
        /// TOML monitor configuration; defaults apply for absent fields
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Write a synthetic PPG frame recording
    Simulate {
        #[arg(long, default_value_t = 75.0)]
        bpm: f64,
        #[arg(long, default_value_t = 60.0)]
        duration_s: f64,
        #[arg(long, default_value_t = 60.0)]
        fps: f64,
        #[arg(long, default_value_t = 0)]
        seed: u64,
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long)]
        out: PathBuf,
    },
    /// Compute HRV metrics from newline-delimited RR intervals (ms)
    HrvBatch {
        #[arg(long)]
        input: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.command {
        Commands::Monitor { input, config } => cmd_monitor(&input, config.as_deref())?,
        Commands::Simulate {
            bpm,
            duration_s,
            fps,
            seed,
            config,
            out,
        } => cmd_simulate(bpm, duration_s, fps, seed, config.as_deref(), &out)?,
        Commands::HrvBatch { input } => cmd_hrv_batch(input.as_deref())?,
    }
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<MonitorConfig> {
    match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            toml::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
        }
        None => Ok(MonitorConfig::default()),
    }
}

#[derive(Serialize)]
struct MonitorSummary {
    frames: usize,
    contact_frames: usize,
    rejected_frames: usize,
    bpm: Option<u32>,
    status: String,
    hrv: Vec<HrvMetrics>,
}

fn cmd_monitor(input: &Path, config: Option<&Path>) -> Result<()> {
    let cfg = load_config(config)?;
    let frames = frames_io::read_recording(input)?;
    let mut monitor = HeartRateMonitor::new(cfg);

    let mut summary = MonitorSummary {
        frames: frames.len(),
        contact_frames: 0,
        rejected_frames: 0,
        bpm: None,
        status: String::new(),
        hrv: Vec::new(),
    };
    let mut last_status = None;
    for frame in &frames {
        let output: FrameOutput = match monitor.process_frame(frame) {
            Ok(output) => output,
            Err(err) => {
                warn!("frame at {} ms rejected: {err}", frame.timestamp_ms);
                summary.rejected_frames += 1;
                continue;
            }
        };
        if output.contact {
            summary.contact_frames += 1;
        }
        if output.bpm.is_some() {
            summary.bpm = output.bpm;
        }
        if last_status != Some(output.status) {
            info!("status: {}", output.status);
            last_status = Some(output.status);
        }
        if let Some(metrics) = output.hrv {
            info!(
                "hrv batch ready: mean rr {:.1} ms, rmssd {:.1}",
                metrics.mean_rr, metrics.rmssd
            );
            summary.hrv.push(metrics);
        }
    }
    summary.status = monitor.status().to_string();

    println!("{}", serde_json::to_string(&summary)?);
    Ok(())
}

fn cmd_simulate(
    bpm: f64,
    duration_s: f64,
    fps: f64,
    seed: u64,
    config: Option<&Path>,
    out: &Path,
) -> Result<()> {
    let cfg = load_config(config)?;
    let spec = pulse_sim::SimSpec {
        bpm,
        duration_s,
        fps,
        seed,
        ..pulse_sim::SimSpec::default()
    };
    let frames = pulse_sim::generate_frames(&spec, cfg.image_width, cfg.image_height);
    frames_io::write_recording(out, &frames)?;
    info!("wrote {} frames to {}", frames.len(), out.display());
    Ok(())
}

fn cmd_hrv_batch(input: Option<&Path>) -> Result<()> {
    let rr = match input {
        Some(path) => text_io::read_rr_millis(path)?,
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            text_io::parse_rr_millis(&buf)?
        }
    };
    let metrics = analyze_batch(&rr).context("analyzing RR batch")?;
    println!("{}", serde_json::to_string(&metrics)?);
    Ok(())
}
