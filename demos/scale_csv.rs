//! Scale CSV Demo
//! Fits expanding statistics on a training CSV and applies them to an evaluation CSV
//!
//! Usage: cargo run --example scale_csv -- <train.csv> <eval.csv> [setting.json] [out_dir]

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use expanding_scaler::{init_logger, ExpandingDateScaler, Logger, ScalerSetting};
use polars::prelude::*;

fn read_csv(path: &Path) -> PolarsResult<DataFrame> {
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(10_000))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()
}

fn write_csv(df: &mut DataFrame, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let mut file = File::create(path)?;
    CsvWriter::new(&mut file).include_header(true).finish(df)?;
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 3 {
        eprintln!("usage: {} <train.csv> <eval.csv> [setting.json] [out_dir]", args[0]);
        std::process::exit(2);
    }

    let setting = match args.get(3) {
        Some(path) => ScalerSetting::load(path)?,
        None => ScalerSetting::new(),
    };
    init_logger(&setting)?;

    let logger = Logger::new("ScaleCsv");
    let scaler = ExpandingDateScaler::from_setting(&setting).with_logger(logger.clone());

    let train = read_csv(Path::new(&args[1]))?;
    let eval = read_csv(Path::new(&args[2]))?;
    logger.info(&format!(
        "Loaded {} training rows and {} evaluation rows",
        train.height(),
        eval.height()
    ));

    let (mut train_scaled, stats) = scaler.fit_transform(&train)?;
    let mut eval_scaled = scaler.transform(&eval, &stats)?;

    let out_dir = args.get(4).map(PathBuf::from).unwrap_or_else(|| PathBuf::from("scaled"));
    fs::create_dir_all(&out_dir)?;

    write_csv(&mut train_scaled.frame, &out_dir.join("train_scaled.csv"))?;
    write_csv(&mut eval_scaled.frame, &out_dir.join("eval_scaled.csv"))?;
    fs::write(out_dir.join("stats.json"), serde_json::to_string_pretty(&stats)?)?;

    println!("Fitted dates: {}", stats.len());
    println!("Features: {:?}", stats.feature_columns());
    println!(
        "Rows kept: train {}/{}, eval {}/{}",
        train_scaled.source_rows.len(),
        train.height(),
        eval_scaled.source_rows.len(),
        eval.height()
    );
    println!("Output written to {}", out_dir.display());

    Ok(())
}
