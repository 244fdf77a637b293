//! Run portfolio reports for many configuration files at once
//!
//! Usage: run_scenarios [--schedule schedule.csv] [--json out.json] config1.json config2.json ...
//!
//! Each file is evaluated independently in parallel; one summary line per file
//! is printed and failures are reported without stopping the batch.

use std::fs::File;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info};
use rayon::prelude::*;
use serde::Serialize;

use fund_commitment_model::portfolio::load_config;
use fund_commitment_model::report::{format_currency, format_multiple, format_percent};
use fund_commitment_model::{PortfolioReport, ScenarioRunner};

#[derive(Parser)]
#[command(name = "run_scenarios", about = "Evaluate many portfolio configurations in parallel")]
struct Args {
    /// Portfolio configuration JSON files
    #[arg(required = true)]
    configs: Vec<PathBuf>,

    /// Capital call schedule CSV shared by every run
    #[arg(long)]
    schedule: Option<PathBuf>,

    /// Write all successful reports to this JSON file
    #[arg(long)]
    json: Option<PathBuf>,
}

#[derive(Serialize)]
struct BatchEntry<'a> {
    source: String,
    report: &'a PortfolioReport,
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();
    let start = Instant::now();

    let runner = match &args.schedule {
        Some(path) => ScenarioRunner::from_csv_path(path).with_context(|| format!("loading {}", path.display()))?,
        None => ScenarioRunner::new(),
    };

    info!("Running {} configurations...", args.configs.len());

    let results: Vec<(PathBuf, Result<PortfolioReport>)> = args
        .configs
        .par_iter()
        .map(|path| {
            let report = load_config(path)
                .and_then(|config| runner.run(&config))
                .with_context(|| format!("running {}", path.display()));
            (path.clone(), report)
        })
        .collect();

    println!(
        "{:<32} {:>16} {:>10} {:>8}",
        "Config", "Commitment", "IRR", "MOIC"
    );
    println!("{}", "-".repeat(69));

    let mut failures = 0;
    for (path, result) in &results {
        match result {
            Ok(report) => println!(
                "{:<32} {:>16} {:>10} {:>8}",
                path.display().to_string(),
                format_currency(report.total_commitment),
                format_percent(report.portfolio_performance.irr),
                format_multiple(report.portfolio_performance.moic),
            ),
            Err(err) => {
                failures += 1;
                error!("{:#}", err);
                println!("{:<32} {}", path.display().to_string(), "failed");
            }
        }
    }

    if let Some(out) = &args.json {
        let entries: Vec<BatchEntry> = results
            .iter()
            .filter_map(|(path, result)| {
                result.as_ref().ok().map(|report| BatchEntry {
                    source: path.display().to_string(),
                    report,
                })
            })
            .collect();
        let file = File::create(out).with_context(|| format!("creating {}", out.display()))?;
        serde_json::to_writer_pretty(file, &entries)?;
        println!("\nReports written to {}", out.display());
    }

    println!(
        "\n{} succeeded, {} failed in {:?}",
        results.len() - failures,
        failures,
        start.elapsed()
    );

    Ok(())
}
