//! Symptom Report - Command-line entry point
//!
//! Reads log records as JSON and writes the rendered PDF report.

use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use symptom_report::{logging, parse_input, render_with_config, to_base64, ReportConfig, ReportKind};

/// Render headache, pain, or blood-pressure logs as a paginated PDF table
#[derive(Parser, Debug)]
#[command(name = "symptom-report")]
#[command(version)]
#[command(about = "Render health log records as a paginated PDF table")]
pub struct Args {
    /// Path to a JSON input file (reads from stdin if not provided)
    pub input: Option<PathBuf>,

    /// Output file (writes to stdout if not provided)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Report title; overrides any title in the input
    #[arg(short, long)]
    pub title: Option<String>,

    /// Report kind; overrides inference from the title
    #[arg(short, long)]
    pub kind: Option<ReportKind>,

    /// Path to a TOML configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Print a sample headache log input and exit
    #[arg(long)]
    pub example: bool,

    /// Write base64 text instead of raw PDF bytes
    #[arg(long)]
    pub base64: bool,

    /// Log debug output to stderr
    #[arg(short, long)]
    pub verbose: bool,
}

const EXAMPLE_INPUT: &str = r#"{
  "title": "Headache Log",
  "records": [
    {
      "startDateTime": "2024-01-15T08:30:00",
      "durationMinutes": 150,
      "intensity": 6,
      "symptoms": ["Light sensitivity", "Nausea"],
      "triggers": ["Stress", "Screen time"],
      "medications": ["Ibuprofen"],
      "requiredLyingDown": true,
      "missedWork": false,
      "notes": "Started after a long meeting."
    },
    {
      "startDateTime": "2024-01-17T19:10:00",
      "durationMinutes": 45,
      "intensity": 3,
      "triggers": ["Skipped lunch"],
      "notes": "Eased after eating."
    }
  ]
}
"#;

fn main() -> Result<()> {
    let args = Args::parse();

    if let Err(e) = logging::init(args.verbose) {
        eprintln!("warning: {e}");
    }

    if args.example {
        print!("{EXAMPLE_INPUT}");
        return Ok(());
    }

    let config = match &args.config {
        Some(path) => ReportConfig::load(path)?,
        None => ReportConfig::default(),
    };

    let json = read_input(args.input.as_ref())?;
    let (records, mut options) = parse_input(&json)?;
    if args.title.is_some() {
        options.title = args.title.clone();
    }
    if args.kind.is_some() {
        options.kind = args.kind;
    }

    let pdf = render_with_config(&records, &options, &config)?;
    let bytes = if args.base64 {
        to_base64(&pdf).into_bytes()
    } else {
        pdf
    };

    match &args.output {
        Some(path) => {
            fs::write(path, &bytes)
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!(path = %path.display(), bytes = bytes.len(), "wrote report");
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(&bytes).context("failed to write to stdout")?;
            stdout.flush()?;
        }
    }

    Ok(())
}

fn read_input(path: Option<&PathBuf>) -> Result<String> {
    match path {
        Some(path) => {
            fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            Ok(buf)
        }
    }
}
