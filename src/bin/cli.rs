//! glidetrax CLI - terminal replay of IGC flight logs
//!
//! Usage:
//!   glidetrax-cli inspect <files...>
//!   glidetrax-cli replay <files...> [--speed <x>] [--seek <percent>] [--format text|geojson]
//!
//! `replay` plays every track on one shared clock in real time, printing a
//! status line per frame (text) or one GeoJSON document per frame.

use clap::{Parser, Subcommand, ValueEnum};
use glidetrax::render::status_line;
use glidetrax::{
    GeoJsonRenderer, IngestError, IngestReport, Ingestor, ReplayConfig, ReplayPlayer,
    ReplaySession, Renderer, TextRenderer, TrackStore, format_clock,
};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "glidetrax-cli")]
#[command(about = "Replay IGC flight logs on a shared timeline", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// JSON configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose debug output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse flight logs and print a summary of each
    Inspect {
        /// IGC files
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Replay flight logs together
    Replay {
        /// IGC files
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Playback speed multiplier
        #[arg(short, long)]
        speed: Option<f64>,

        /// Start position as a percentage of the session
        #[arg(long, default_value = "0")]
        seek: f64,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Geojson,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format(|buf, record| writeln!(buf, "[{:5}] {}", record.level(), record.args()))
        .init();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Failed to load config: {}", err);
            return ExitCode::FAILURE;
        }
    };

    let result = match cli.command {
        Commands::Inspect { files } => run_inspect(&files, &config),
        Commands::Replay {
            files,
            speed,
            seek,
            format,
        } => run_replay(&files, &config, speed, seek, format),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", err);
            ExitCode::FAILURE
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<ReplayConfig, Box<dyn std::error::Error>> {
    match path {
        Some(path) => Ok(serde_json::from_str(&fs::read_to_string(path)?)?),
        None => Ok(ReplayConfig::default()),
    }
}

/// Read and parse every file; unreadable files are reported like parse failures.
fn load_files(files: &[PathBuf], config: &ReplayConfig) -> IngestReport {
    let mut ingestor = Ingestor::new(config.clone());
    let mut report = IngestReport::default();

    for path in files {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let outcome = fs::read(path)
            .map_err(IngestError::from)
            .and_then(|bytes| ingestor.parse_file(&name, &bytes));

        match outcome {
            Ok(track) => report.tracks.push(track),
            Err(error) => report
                .failures
                .push(glidetrax::IngestFailure { file_name: name, error }),
        }
    }

    for failure in &report.failures {
        eprintln!("{}", failure.message());
    }
    report
}

fn run_inspect(files: &[PathBuf], config: &ReplayConfig) -> Result<(), Box<dyn std::error::Error>> {
    let report = load_files(files, config);

    println!("\n{}", "=".repeat(60));
    println!("{:<24} {:<20} {:>7} {:>8}", "FILE", "PILOT", "FIXES", "TIME");
    println!("{}", "=".repeat(60));
    for track in &report.tracks {
        println!(
            "{:<24} {:<20} {:>7} {:>8}",
            track.name,
            track.pilot_name,
            track.len(),
            format_clock(track.duration_ms() as f64)
        );
    }
    println!(
        "\n{} parsed, {} failed",
        report.tracks.len(),
        report.failures.len()
    );
    Ok(())
}

fn run_replay(
    files: &[PathBuf],
    config: &ReplayConfig,
    speed: Option<f64>,
    seek: f64,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let report = load_files(files, config);

    let mut store = TrackStore::new();
    store.add(report.tracks);
    let session = ReplaySession::from_store(&store)?;

    let stdout = io::stdout();
    match format {
        OutputFormat::Text => {
            let renderer = TextRenderer::new(stdout.lock(), config.path_mode);
            drive(session, renderer, config, speed, seek, true)
        }
        OutputFormat::Geojson => {
            let renderer = GeoJsonRenderer::new(stdout.lock(), config.path_mode);
            drive(session, renderer, config, speed, seek, false)
        }
    }
}

fn drive<R: Renderer>(
    session: ReplaySession,
    renderer: R,
    config: &ReplayConfig,
    speed: Option<f64>,
    seek: f64,
    show_status: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut player = ReplayPlayer::start_realtime(session, renderer, config)?;
    if let Some(speed) = speed {
        player.set_speed(speed);
    }
    player.seek(seek)?;

    let mut frame = 0u64;
    player.run_to_end(|player, interval| {
        // A status line every ~second of wall time
        if show_status && frame % (1000 / interval.as_millis().max(1) as u64).max(1) == 0 {
            eprintln!("{}", status_line(&player.snapshot()));
        }
        frame += 1;
        std::thread::sleep(interval);
    })?;

    eprintln!("{}", status_line(&player.snapshot()));
    for position in player.positions() {
        eprintln!(
            "{}: {}/{}",
            position.pilot_name, position.sample_number, position.total_samples
        );
    }
    Ok(())
}
