//! XHale CLI
//!
//! Breath analysis for captured and live CO sensor data.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;
use xhale_engine::{
    capture::{read_sample_records, BatchCapture, SampleRecord},
    config::Config,
    core::{decode_words, BatchDiagnostics, BreathResult},
    stats::SessionStats,
    BreathEngine, VERSION,
};

#[derive(Parser)]
#[command(name = "xhale")]
#[command(version = VERSION)]
#[command(about = "Breath-gas analysis for CO sensor captures", long_about = None)]
struct Cli {
    /// License key (overrides the configured key)
    #[arg(long, global = true)]
    license_key: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyse a captured waveform (JSON batch capture)
    Analyze {
        /// Capture file
        file: PathBuf,

        /// Write the report here instead of the export directory
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Replay a JSON Lines sample file through the streaming path
    Replay {
        /// Sample file, one JSON record per line
        file: PathBuf,
    },

    /// Read JSON Lines samples from stdin and report periodically
    Monitor {
        /// Seconds between interim reports (defaults to the configured interval)
        #[arg(long)]
        report_interval: Option<u64>,
    },

    /// Decode raw sensor words given as hex (e.g. 01ff)
    Decode {
        #[arg(required = true)]
        words: Vec<String>,
    },

    /// Estimate battery state from a raw ADC reading
    Battery { raw_adc: f64 },

    /// Show configuration
    Config,
}

/// One analysis result as printed by the CLI.
#[derive(Serialize)]
struct Report {
    session_id: Uuid,
    analyzed_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    samples: Option<usize>,
    result: BreathResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    diagnostics: Option<BatchDiagnostics>,
}

fn main() {
    init_tracing();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("XHALE_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load().unwrap_or_else(|e| {
        tracing::warn!("Could not load config, using defaults: {e}");
        Config::default()
    });
    let license_key = cli.license_key.or_else(|| config.license_key.clone());

    match cli.command {
        Commands::Analyze { file, output } => {
            let engine = build_engine(&config, license_key.as_deref())?;
            cmd_analyze(&engine, &config, &file, output)?;
            save_stats(&engine);
        }
        Commands::Replay { file } => {
            let engine = build_engine(&config, license_key.as_deref())?;
            cmd_replay(&engine, &file)?;
            save_stats(&engine);
        }
        Commands::Monitor { report_interval } => {
            let engine = build_engine(&config, license_key.as_deref())?;
            let interval = report_interval
                .map(Duration::from_secs)
                .unwrap_or(config.report_interval);
            cmd_monitor(&engine, interval)?;
            save_stats(&engine);
        }
        Commands::Decode { words } => cmd_decode(&words)?,
        Commands::Battery { raw_adc } => {
            let engine = build_engine(&config, license_key.as_deref())?;
            print_json(&engine.battery_from_raw_adc(raw_adc))?;
        }
        Commands::Config => cmd_config(&config)?,
    }
    Ok(())
}

/// Build an engine from the configuration, initializing it when a key is known.
fn build_engine(config: &Config, license_key: Option<&str>) -> Result<BreathEngine> {
    let stats = Arc::new(SessionStats::with_persistence(config.stats_path()));
    let engine = BreathEngine::with_parts(Box::new(config.battery), stats);

    match license_key {
        Some(key) => engine
            .initialize(key)
            .context("Could not initialize engine")?,
        None => tracing::info!("No license key configured"),
    }
    Ok(engine)
}

fn save_stats(engine: &BreathEngine) {
    if let Err(e) = engine.stats().save() {
        tracing::warn!("Could not save session stats: {e}");
    }
}

fn cmd_analyze(
    engine: &BreathEngine,
    config: &Config,
    file: &Path,
    output: Option<PathBuf>,
) -> Result<()> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Could not read capture {}", file.display()))?;
    let capture = BatchCapture::from_json(&content)
        .with_context(|| format!("Invalid capture file {}", file.display()))?;

    let analysis = capture.analyze(engine)?;
    let report = Report {
        session_id: engine.session_id(),
        analyzed_at: Utc::now(),
        samples: None,
        result: analysis.result,
        diagnostics: analysis.diagnostics,
    };

    let path = match output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            path
        }
        None => {
            config
                .ensure_directories()
                .context("Could not create export directory")?;
            config.report_path(report.session_id)
        }
    };

    let json = serde_json::to_string_pretty(&report)?;
    std::fs::write(&path, &json)
        .with_context(|| format!("Could not write report to {}", path.display()))?;
    tracing::info!("Report written to {}", path.display());
    println!("{json}");
    Ok(())
}

fn cmd_replay(engine: &BreathEngine, file: &Path) -> Result<()> {
    let handle = std::fs::File::open(file)
        .with_context(|| format!("Could not open sample file {}", file.display()))?;
    let records = read_sample_records(std::io::BufReader::new(handle))?;

    for record in &records {
        record.feed(engine);
    }

    print_json(&streaming_report(engine))
}

fn cmd_monitor(engine: &BreathEngine, interval: Duration) -> Result<()> {
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })
    .context("Error setting Ctrl+C handler")?;

    // Samples are parsed on a reader thread and handed over a channel so the
    // main loop can keep reporting while stdin is idle
    let (sender, receiver) = crossbeam_channel::unbounded::<SampleRecord>();
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for (i, line) in stdin.lock().lines().enumerate() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    tracing::error!("Could not read stdin: {e}");
                    break;
                }
            };
            if line.trim().is_empty() {
                continue;
            }
            match SampleRecord::parse_line(&line) {
                Ok(record) => {
                    if sender.send(record).is_err() {
                        break;
                    }
                }
                Err(e) => tracing::warn!("Skipping line {}: {e}", i + 1),
            }
        }
    });

    eprintln!("XHale monitor v{VERSION} (session {})", engine.session_id());
    eprintln!("Reading samples from stdin. Press Ctrl+C to stop.");

    let mut last_report = Instant::now();
    while running.load(Ordering::SeqCst) {
        match receiver.recv_timeout(Duration::from_millis(100)) {
            Ok(record) => record.feed(engine),
            Err(crossbeam_channel::RecvTimeoutError::Timeout) => {}
            Err(crossbeam_channel::RecvTimeoutError::Disconnected) => {
                tracing::debug!("Input closed");
                break;
            }
        }

        if last_report.elapsed() >= interval && engine.buffered_len() > 0 {
            print_json(&streaming_report(engine))?;
            last_report = Instant::now();
        }
    }

    print_json(&streaming_report(engine))?;
    eprintln!();
    eprintln!("{}", engine.stats().summary());
    Ok(())
}

fn cmd_decode(words: &[String]) -> Result<()> {
    let bytes = words
        .iter()
        .map(|w| parse_hex(w.as_str()))
        .collect::<Result<Vec<Vec<u8>>>>()?;
    let values = decode_words(&bytes)?;
    print_json(&values)
}

fn cmd_config(config: &Config) -> Result<()> {
    println!("Config file: {:?}", Config::config_path());
    println!();
    print_json(config)
}

fn streaming_report(engine: &BreathEngine) -> Report {
    Report {
        session_id: engine.session_id(),
        analyzed_at: Utc::now(),
        samples: Some(engine.buffered_len()),
        result: engine.analyze_breath(),
        diagnostics: None,
    }
}

/// Parse a hex string (optionally `0x`-prefixed) into bytes.
fn parse_hex(word: &str) -> Result<Vec<u8>> {
    let digits = word.trim_start_matches("0x").trim_start_matches("0X");
    if !digits.is_ascii() || digits.len() % 2 != 0 {
        bail!("Hex word `{word}` must be an even number of hex digits");
    }

    (0..digits.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .with_context(|| format!("Invalid hex word `{word}`"))
        })
        .collect()
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex() {
        assert_eq!(parse_hex("01ff").unwrap(), vec![0x01, 0xFF]);
        assert_eq!(parse_hex("0x1234").unwrap(), vec![0x12, 0x34]);
        assert_eq!(parse_hex("ab").unwrap(), vec![0xAB]);
        assert!(parse_hex("abc").is_err());
        assert!(parse_hex("zz").is_err());
    }

    #[test]
    fn test_analyze_exports_report_by_default() {
        let dir = tempfile::tempdir().unwrap();
        let capture = dir.path().join("capture.json");
        std::fs::write(
            &capture,
            r#"{"co_raw": [1, 2, 3, 4], "temperature_c": [25, 25, 25, 26], "sample_period_sec": 1.0}"#,
        )
        .unwrap();
        let config = Config {
            data_path: dir.path().join("data"),
            export_path: dir.path().join("exports"),
            ..Config::default()
        };

        let engine = BreathEngine::new();
        cmd_analyze(&engine, &config, &capture, None).unwrap();

        let written = std::fs::read_to_string(config.report_path(engine.session_id())).unwrap();
        let report: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(report["result"]["estimated_ppm"], 3.75);
    }

    #[test]
    fn test_cli_parses() {
        let cli = Cli::try_parse_from(["xhale", "decode", "01ff", "--license-key", "XH-1"]).unwrap();
        assert_eq!(cli.license_key.as_deref(), Some("XH-1"));
        assert!(matches!(cli.command, Commands::Decode { ref words } if words.len() == 1));
    }
}
