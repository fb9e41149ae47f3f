//! Pose Coach - Main Entry Point

use calibration::Phase;
use clap::{Parser, Subcommand};
use coach::{build_controller, init_logging, CoachConfig, CoachError, Replay, ReplayOptions};
use pose_frame::LandmarkFrame;
use std::io::{self, BufWriter};
use std::path::PathBuf;
use tokio::io::{AsyncBufRead, BufReader};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "pose-coach", version, about = "Real-time pose biofeedback coach")]
struct Cli {
    /// Configuration file (TOML); COACH__* environment variables override it
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Capture a phase's ideal pose from a single landmark frame (JSON)
    Calibrate {
        #[arg(long)]
        phase: Phase,
        frame: PathBuf,
    },
    /// Forget a phase's calibration
    Recalibrate {
        #[arg(long)]
        phase: Phase,
    },
    /// Print stored calibrations
    Show,
    /// Replay a JSON-lines landmark stream through a training session ("-" for stdin)
    Train {
        stream: PathBuf,
        /// Pace frames at the configured tick rate
        #[arg(long)]
        realtime: bool,
        /// Print every tick, not only ticks with events
        #[arg(long)]
        verbose: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        error!("{}", e);
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CoachError> {
    let config = CoachConfig::load(cli.config.as_deref())?;
    init_logging(cli.json_logs || config.log_json);

    info!("=== Pose Coach v{} ===", env!("CARGO_PKG_VERSION"));

    match cli.cmd {
        Commands::Calibrate { phase, frame } => {
            let payload = tokio::fs::read_to_string(&frame).await?;
            let frame = LandmarkFrame::from_json(&payload)?;

            let mut controller = build_controller(&config)?;
            let calibration = controller.calibrate(phase, &frame)?;
            config.calibration_file().save(controller.calibrations())?;

            println!("{}", serde_json::to_string_pretty(&calibration.to_values())?);
        }
        Commands::Recalibrate { phase } => {
            let mut controller = build_controller(&config)?;
            if controller.recalibrate(phase) {
                config.calibration_file().save(controller.calibrations())?;
                println!("Cleared calibration for {}", phase);
            } else {
                println!("No calibration stored for {}", phase);
            }
        }
        Commands::Show => {
            let store = config.calibration_file().load()?;
            for (phase, record) in store.records() {
                println!(
                    "{}: {} (captured {})",
                    phase,
                    serde_json::to_string(&record.calibration.to_values())?,
                    record.captured_at.to_rfc3339()
                );
            }
            if store.is_empty() {
                println!("No calibrations stored");
            }
        }
        Commands::Train {
            stream,
            realtime,
            verbose,
        } => {
            let mut controller = build_controller(&config)?;
            let reader: Box<dyn AsyncBufRead + Unpin> = if stream.as_os_str() == "-" {
                Box::new(BufReader::new(tokio::io::stdin()))
            } else {
                Box::new(BufReader::new(tokio::fs::File::open(&stream).await?))
            };

            let options = ReplayOptions {
                tick_interval_ms: config.tick_interval_ms(),
                realtime,
                verbose,
            };
            let mut replay = Replay::new(options, BufWriter::new(io::stdout()));
            let shutdown = async {
                // Without a signal handler there is nothing to wait for
                if tokio::signal::ctrl_c().await.is_err() {
                    std::future::pending::<()>().await;
                }
            };

            let summary = replay.run(&mut controller, reader, shutdown).await?;
            info!(
                session_id = %summary.session_id,
                completed = summary.completed,
                successes = summary.total_successes,
                "Training finished"
            );
        }
    }

    Ok(())
}
