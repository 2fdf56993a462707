//! flowline-replay: replays recorded agent telemetry through the pipeline
//! core.
//!
//! Reads one JSON `TelemetryFrame` per line (stdin by default), feeds each
//! through the bridge, and interleaves simulation ticks so the particle
//! population and per-stage durations evolve the way they would on screen.
//! Prints the final snapshot as JSON on stdout; logs go to stderr.

use std::env;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use flowline_core::{PipelineSession, TelemetryBridge};
use flowline_telemetry::TelemetryFrame;

#[derive(Parser)]
#[command(name = "flowline-replay")]
#[command(about = "Replay agent telemetry into a Flowline session")]
#[command(version)]
struct Cli {
    /// Telemetry JSONL file (defaults to stdin)
    #[arg(long, value_name = "FILE")]
    input: Option<PathBuf>,

    /// Simulation ticks to run after each frame
    #[arg(long, default_value_t = 8)]
    ticks: u32,

    /// RNG seed, for reproducible particle behavior
    #[arg(long)]
    seed: Option<u64>,
}

fn main() {
    init_logging();
    let cli = Cli::parse();

    let reader: Box<dyn BufRead> = match &cli.input {
        Some(path) => match fs_err::File::open(path) {
            Ok(file) => Box::new(BufReader::new(file)),
            Err(err) => {
                error!(error = %err, "Failed to open telemetry input");
                std::process::exit(1);
            }
        },
        None => Box::new(BufReader::new(io::stdin())),
    };

    let mut session = match cli.seed {
        Some(seed) => PipelineSession::with_seed(seed),
        None => PipelineSession::new(),
    };
    let applied = replay(reader, &mut session, cli.ticks);

    info!(frames = applied, "Replay complete");
    match serde_json::to_string_pretty(session.state()) {
        Ok(json) => println!("{}", json),
        Err(err) => {
            error!(error = %err, "Failed to serialize final snapshot");
            std::process::exit(1);
        }
    }
}

/// Applies every readable frame to the session, running `ticks` simulation
/// frames after each one. Returns the number of frames applied; malformed
/// lines are skipped.
fn replay(reader: impl BufRead, session: &mut PipelineSession, ticks: u32) -> u64 {
    let mut bridge = TelemetryBridge::new();
    let mut applied = 0u64;

    for (number, line) in reader.lines().enumerate() {
        let line = match line {
            Ok(line) => line,
            Err(err) => {
                warn!(error = %err, "Failed to read telemetry input");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        let frame: TelemetryFrame = match serde_json::from_str(&line) {
            Ok(frame) => frame,
            Err(err) => {
                warn!(line = number + 1, error = %err, "Skipping malformed telemetry frame");
                continue;
            }
        };
        bridge.observe(session, &frame);
        for _ in 0..ticks {
            session.tick();
        }
        applied += 1;
    }

    applied
}

fn init_logging() {
    let debug_enabled = env::var("FLOWLINE_DEBUG_LOG")
        .map(|value| matches!(value.as_str(), "1" | "true" | "TRUE" | "yes" | "YES"))
        .unwrap_or(false);
    let filter = if debug_enabled {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}
