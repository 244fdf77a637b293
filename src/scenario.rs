//! Default-rate sensitivity and full portfolio runs
//!
//! A run projects the portfolio and each fund, applies the stress, computes
//! IRR/MOIC, and sweeps the portfolio IRR across default rates. Runs share no
//! state, so independent configurations can be evaluated in parallel.

use log::{debug, info};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};
use crate::portfolio::{
    default_loss, loader, CapitalCallSchedule, FundId, IrrBasis, PortfolioConfig,
};
use crate::projection::{
    apply_stress, compute_performance_with_basis, irr_cash_flows, solve_irr, CashFlowProjection,
    EntityId, PerformanceResult, ProjectionEngine,
};

/// Portfolio IRR at one default rate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensitivityPoint {
    pub default_rate_pct: f64,
    pub irr: Option<f64>,
}

/// Default rates swept by the sensitivity analysis, in percent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensitivityGrid {
    pub start_pct: f64,
    pub end_pct: f64,
    pub step_pct: f64,
}

impl Default for SensitivityGrid {
    /// 0% to 10% in 0.5% steps (21 points)
    fn default() -> Self {
        Self {
            start_pct: 0.0,
            end_pct: 10.0,
            step_pct: 0.5,
        }
    }
}

impl SensitivityGrid {
    /// Grid rates in increasing order, end inclusive
    pub fn rates(&self) -> ModelResult<Vec<f64>> {
        let finite = self.start_pct.is_finite() && self.end_pct.is_finite() && self.step_pct.is_finite();
        if !finite || self.step_pct <= 0.0 || self.end_pct < self.start_pct {
            return Err(ModelError::invalid(
                "sensitivity_grid",
                format!(
                    "need finite start <= end and positive step, got {}..{} by {}",
                    self.start_pct, self.end_pct, self.step_pct
                ),
            ));
        }

        // Generated by index so the end point is not lost to accumulated rounding
        let steps = ((self.end_pct - self.start_pct) / self.step_pct + 1e-9).floor() as usize;
        Ok((0..=steps)
            .map(|i| self.start_pct + i as f64 * self.step_pct)
            .collect())
    }
}

/// Portfolio IRR across the default 0-10% grid at `recovery_rate_pct`
pub fn compute_sensitivity(
    config: &PortfolioConfig,
    schedule: &CapitalCallSchedule,
    recovery_rate_pct: f64,
) -> ModelResult<Vec<SensitivityPoint>> {
    compute_sensitivity_on_grid(config, schedule, recovery_rate_pct, &SensitivityGrid::default())
}

/// Portfolio IRR at each grid default rate, everything else held fixed.
///
/// Each scenario moves the final IRR cash flow of the already-stressed base by
/// the difference between its loss and the base loss, so the base loss is
/// never subtracted twice.
pub fn compute_sensitivity_on_grid(
    config: &PortfolioConfig,
    schedule: &CapitalCallSchedule,
    recovery_rate_pct: f64,
    grid: &SensitivityGrid,
) -> ModelResult<Vec<SensitivityPoint>> {
    let config = PortfolioConfig {
        recovery_rate_pct,
        ..config.clone()
    };
    let engine = ProjectionEngine::new(&config, schedule)?;
    let rates = grid.rates()?;

    let total = config.total_commitment()?;
    let base = apply_stress(
        &engine.project_portfolio(),
        config.default_rate_pct,
        recovery_rate_pct,
        total,
    );
    Ok(sweep_default_rates(&config, &base, total, &rates))
}

fn sweep_default_rates(
    config: &PortfolioConfig,
    base: &CashFlowProjection,
    total_commitment: f64,
    rates: &[f64],
) -> Vec<SensitivityPoint> {
    let base_loss = default_loss(total_commitment, config.default_rate_pct, config.recovery_rate_pct);
    let base_flows = irr_cash_flows(base, total_commitment, config.irr_basis);

    // The final period only appears in the upfront sequence once there is a period 1
    let final_period_in_flows = match config.irr_basis {
        IrrBasis::UpfrontCommitment => base.len() >= 2,
        IrrBasis::NetCashFlow => !base.is_empty(),
    };

    rates
        .iter()
        .map(|&default_rate_pct| {
            let irr = if total_commitment > 0.0 {
                let scenario_loss = default_loss(total_commitment, default_rate_pct, config.recovery_rate_pct);
                let mut flows = base_flows.clone();
                if final_period_in_flows {
                    if let Some(last) = flows.last_mut() {
                        *last -= scenario_loss - base_loss;
                    }
                }
                solve_irr(EntityId::Portfolio, &flows)
            } else {
                None
            };
            debug!("sensitivity {:.2}% -> {:?}", default_rate_pct, irr);
            SensitivityPoint { default_rate_pct, irr }
        })
        .collect()
}

/// Everything computed for one configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioReport {
    pub config: PortfolioConfig,
    pub start_year: i32,
    pub total_commitment: f64,

    /// Terminal write-down applied to the portfolio
    pub portfolio_loss: f64,

    /// Stressed projections
    pub portfolio_projection: CashFlowProjection,
    pub fund_projections: Vec<CashFlowProjection>,

    pub portfolio_performance: PerformanceResult,
    pub fund_performance: Vec<PerformanceResult>,

    pub sensitivity: Vec<SensitivityPoint>,
}

/// Runs portfolio reports against one capital call schedule
///
/// # Example
/// ```ignore
/// let runner = ScenarioRunner::from_csv_path(Path::new("data/capital_call_schedule.csv"))?;
///
/// for rate in [1.0, 3.0, 5.0] {
///     let config = PortfolioConfig { default_rate_pct: rate, ..Default::default() };
///     let report = runner.run(&config)?;
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct ScenarioRunner {
    schedule: CapitalCallSchedule,
    grid: SensitivityGrid,
}

impl ScenarioRunner {
    /// Create runner over the reference schedule
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_schedule(schedule: CapitalCallSchedule) -> Self {
        Self {
            schedule,
            grid: SensitivityGrid::default(),
        }
    }

    /// Create runner by loading the schedule from a CSV file
    pub fn from_csv_path(path: &std::path::Path) -> ModelResult<Self> {
        Ok(Self::with_schedule(loader::load_schedule(path)?))
    }

    pub fn with_grid(mut self, grid: SensitivityGrid) -> Self {
        self.grid = grid;
        self
    }

    pub fn schedule(&self) -> &CapitalCallSchedule {
        &self.schedule
    }

    pub fn grid(&self) -> &SensitivityGrid {
        &self.grid
    }

    /// Run the full pipeline for one configuration.
    ///
    /// Invalid input fails the whole run; undefined metrics do not.
    pub fn run(&self, config: &PortfolioConfig) -> ModelResult<PortfolioReport> {
        let engine = ProjectionEngine::new(config, &self.schedule)?;
        let rates = self.grid.rates()?;
        let total_commitment = config.total_commitment()?;
        let basis = config.irr_basis;

        let portfolio_projection = apply_stress(
            &engine.project_portfolio(),
            config.default_rate_pct,
            config.recovery_rate_pct,
            total_commitment,
        );
        let portfolio_performance =
            compute_performance_with_basis(&portfolio_projection, total_commitment, basis);

        let (fund_projections, fund_performance): (Vec<_>, Vec<_>) = FundId::ALL
            .iter()
            .map(|&fund| {
                let commitment = config.commitment(fund);
                let projection = apply_stress(
                    &engine.project_fund(fund),
                    config.default_rate_pct,
                    config.recovery_rate_pct,
                    commitment,
                );
                let performance = compute_performance_with_basis(&projection, commitment, basis);
                (projection, performance)
            })
            .unzip();

        let sensitivity = sweep_default_rates(config, &portfolio_projection, total_commitment, &rates);

        info!(
            "portfolio run: commitment {:.0}, IRR {:?}, MOIC {:?}",
            total_commitment, portfolio_performance.irr, portfolio_performance.moic
        );

        Ok(PortfolioReport {
            config: config.clone(),
            start_year: self.schedule.start_year,
            total_commitment,
            portfolio_loss: config.stress_loss(total_commitment),
            portfolio_projection,
            fund_projections,
            portfolio_performance,
            fund_performance,
            sensitivity,
        })
    }

    /// Run many independent configurations in parallel
    pub fn run_batch(&self, configs: &[PortfolioConfig]) -> Vec<ModelResult<PortfolioReport>> {
        configs.par_iter().map(|config| self.run(config)).collect()
    }
}
