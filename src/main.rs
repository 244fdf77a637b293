//! Fund Commitment Model CLI
//!
//! Command-line interface for running portfolio projections, IRR/MOIC, and
//! the default-rate sensitivity curve

use std::fs::File;
use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::info;

use fund_commitment_model::portfolio::{load_config, load_schedule};
use fund_commitment_model::report::{
    render_report, sensitivity_table, write_projection_csv, write_sensitivity_csv, ReportEnvelope,
};
use fund_commitment_model::scenario::compute_sensitivity_on_grid;
use fund_commitment_model::{
    CapitalCallSchedule, EntityId, FundId, IrrBasis, PortfolioConfig, ScenarioRunner, SensitivityGrid,
};

/// Cash-flow projection and IRR/MOIC for a committed fund portfolio
#[derive(Parser)]
#[command(name = "fund_model", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Portfolio configuration JSON (defaults to the reference portfolio)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Capital call schedule CSV (defaults to the reference 2024-2027 schedule)
    #[arg(long, global = true)]
    schedule: Option<PathBuf>,

    /// Default rate override (%)
    #[arg(long, global = true, env = "DEFAULT_RATE_PCT")]
    default_rate: Option<f64>,

    /// Recovery rate override (%)
    #[arg(long, global = true, env = "RECOVERY_RATE_PCT")]
    recovery_rate: Option<f64>,

    /// Annual distribution yield override (%)
    #[arg(long = "yield", global = true, env = "DISTRIBUTION_YIELD_PCT")]
    distribution_yield: Option<f64>,

    /// Projection horizon override (years)
    #[arg(long, global = true, env = "HORIZON_YEARS")]
    horizon: Option<u32>,

    /// Cash-flow sequence used for IRR
    #[arg(long, global = true, value_enum)]
    irr_basis: Option<BasisArg>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "table")]
    format: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Fund table, portfolio summary, sensitivity curve, and cash flow table
    Report,
    /// Portfolio IRR across a default-rate sweep
    Sensitivity {
        #[arg(long, default_value_t = 0.0)]
        start: f64,
        #[arg(long, default_value_t = 10.0)]
        end: f64,
        #[arg(long, default_value_t = 0.5)]
        step: f64,
    },
    /// Write a stressed projection as CSV
    Export {
        /// Fund to export (portfolio when omitted)
        #[arg(long)]
        fund: Option<String>,
        /// Output file (stdout when omitted)
        #[arg(long, short)]
        out: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum BasisArg {
    Upfront,
    Net,
}

impl From<BasisArg> for IrrBasis {
    fn from(arg: BasisArg) -> Self {
        match arg {
            BasisArg::Upfront => IrrBasis::UpfrontCommitment,
            BasisArg::Net => IrrBasis::NetCashFlow,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

fn resolve_config(cli: &Cli) -> Result<PortfolioConfig> {
    let mut config = match &cli.config {
        Some(path) => load_config(path)
            .with_context(|| format!("loading portfolio config from {}", path.display()))?,
        None => PortfolioConfig::default(),
    };

    if let Some(rate) = cli.default_rate {
        config.default_rate_pct = rate;
    }
    if let Some(rate) = cli.recovery_rate {
        config.recovery_rate_pct = rate;
    }
    if let Some(rate) = cli.distribution_yield {
        config.distribution_yield_pct = rate;
    }
    if let Some(years) = cli.horizon {
        config.horizon_years = years;
    }
    if let Some(basis) = cli.irr_basis {
        config.irr_basis = basis.into();
    }

    config.validate().context("invalid portfolio configuration")?;
    Ok(config)
}

fn resolve_schedule(cli: &Cli) -> Result<CapitalCallSchedule> {
    match &cli.schedule {
        Some(path) => load_schedule(path)
            .with_context(|| format!("loading capital call schedule from {}", path.display())),
        None => Ok(CapitalCallSchedule::reference()),
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = resolve_config(&cli)?;
    let schedule = resolve_schedule(&cli)?;
    let runner = ScenarioRunner::with_schedule(schedule);

    match cli.command.as_ref().unwrap_or(&Commands::Report) {
        Commands::Report => {
            let report = runner.run(&config)?;
            match cli.format {
                OutputFormat::Table => print!("{}", render_report(&report)),
                OutputFormat::Json => println!("{}", ReportEnvelope::new(&report).to_json_pretty()?),
                OutputFormat::Csv => write_projection_csv(&report.portfolio_projection, io::stdout().lock())?,
            }
        }
        Commands::Sensitivity { start, end, step } => {
            let grid = SensitivityGrid {
                start_pct: *start,
                end_pct: *end,
                step_pct: *step,
            };
            let points = compute_sensitivity_on_grid(&config, runner.schedule(), config.recovery_rate_pct, &grid)?;
            match cli.format {
                OutputFormat::Table => print!("{}", sensitivity_table(&points)),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&points)?),
                OutputFormat::Csv => write_sensitivity_csv(&points, io::stdout().lock())?,
            }
        }
        Commands::Export { fund, out } => {
            let report = runner.run(&config)?;
            let projection = match fund {
                Some(name) => {
                    let fund: FundId = name.parse()?;
                    report
                        .fund_projections
                        .iter()
                        .find(|p| p.entity() == EntityId::Fund(fund))
                        .with_context(|| format!("no projection for {}", fund))?
                }
                None => &report.portfolio_projection,
            };

            match out {
                Some(path) => {
                    let file = File::create(path)
                        .with_context(|| format!("creating {}", path.display()))?;
                    write_projection_csv(projection, file)?;
                    info!("{} projection written to {}", projection.entity(), path.display());
                }
                None => write_projection_csv(projection, io::stdout().lock())?,
            }
        }
    }

    Ok(())
}
