//! cardiorisk: score a patient from the command line.
//!
//! # Usage
//!
//! ```bash
//! cardiorisk [--preset <name> | --model <file.json>] [patient.json]
//! cardiorisk [--preset <name> | --model <file.json>] --age-curve
//! ```
//!
//! The patient is read from the given file, or from stdin when no file (or
//! `-`) is given. The assessment record is printed to stdout as JSON.

use std::io::Read;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cardiorisk::adapters::redact::RedactingMakeWriter;
use cardiorisk::application::AssessmentService;
use cardiorisk::config::{Config, LogMode, ModelSelection};
use cardiorisk::domain::AgeRiskPoint;
use cardiorisk::PatientInput;

/// Age span the dashboard charts.
const CHART_AGES: std::ops::Range<u8> = 20..80;
const CHART_STEP: u8 = 5;

struct Args {
    model: Option<ModelSelection>,
    patient: Option<PathBuf>,
    age_curve: bool,
}

fn parse_args() -> Result<Args> {
    let mut args = Args {
        model: None,
        patient: None,
        age_curve: false,
    };

    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--preset" => {
                let name = it.next().context("--preset needs a name")?;
                args.model = Some(ModelSelection::Preset(name.parse()?));
            }
            "--model" => {
                let path = it.next().context("--model needs a path")?;
                args.model = Some(ModelSelection::File(PathBuf::from(path)));
            }
            "--age-curve" => args.age_curve = true,
            "-h" | "--help" => {
                eprintln!(
                    "usage: cardiorisk [--preset dashboard|heart-rate-adjusted | --model FILE] [--age-curve] [PATIENT_JSON|-]"
                );
                std::process::exit(0);
            }
            "-" => args.patient = None,
            other if other.starts_with("--") => bail!("unknown flag {other}"),
            other => args.patient = Some(PathBuf::from(other)),
        }
    }
    Ok(args)
}

fn read_patient(path: Option<&PathBuf>) -> Result<PatientInput> {
    let raw = match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    serde_json::from_str(&raw).context("Patient JSON does not match the expected shape")
}

fn main() -> Result<()> {
    let mut config = Config::from_env()?;
    let args = parse_args()?;
    if let Some(model) = args.model {
        config = config.with_model(model);
    }

    // stdout carries results, so logs never go there.
    let (writer, _guard) = match config.log_mode {
        LogMode::Stderr => tracing_appender::non_blocking(std::io::stderr()),
        LogMode::File => {
            if let Some(parent) = config.log_file.parent() {
                // Best-effort: a missing directory surfaces as an open error below.
                let _ = std::fs::create_dir_all(parent);
            }
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&config.log_file)
                .with_context(|| format!("Failed to open log file {}", config.log_file.display()))?;
            tracing_appender::non_blocking(file)
        }
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(RedactingMakeWriter::new(writer)),
        )
        .init();

    let service = AssessmentService::from_config(&config)?;

    if args.age_curve {
        let points: Vec<AgeRiskPoint> = service.age_risk_curve(CHART_AGES, CHART_STEP)?;
        println!("{}", serde_json::to_string_pretty(&points)?);
        return Ok(());
    }

    let patient = read_patient(args.patient.as_ref())?;
    let record = service.assess(patient)?;
    println!("{}", serde_json::to_string_pretty(&record)?);

    Ok(())
}
