//! Rule table export utility.
//!
//! Writes a built-in preset as a JSON rule table and prints its fingerprint,
//! so a deployment can start from a preset, edit the weights, and pin the
//! result with `CARDIORISK_MODEL_SHA256`.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin export_model -- <preset> [output.json]
//! ```
//!
//! Without an output path the table is printed to stdout.

use std::path::PathBuf;

use anyhow::{Context, Result};

use cardiorisk::adapters::JsonModelFile;
use cardiorisk::domain::{ModelPreset, RiskFactorModel};

fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let preset: ModelPreset = args
        .next()
        .context("usage: export_model <dashboard|heart-rate-adjusted> [output.json]")?
        .parse()?;
    let output = args.next().map(PathBuf::from);

    let model = RiskFactorModel::preset(preset);
    model.validate()?;

    match output {
        Some(path) => {
            JsonModelFile::write(&path, &model)?;
            eprintln!("Wrote {} ({} rules) to {}", model.name, model.rules.len(), path.display());
        }
        None => println!("{}", serde_json::to_string_pretty(&model)?),
    }
    eprintln!("sha256: {}", model.fingerprint());

    Ok(())
}
