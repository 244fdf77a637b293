//! Core projection engine for annual commitment cash flows

use log::debug;

use super::cashflows::{CashFlowProjection, EntityId};
use super::state::ProjectionState;
use crate::error::{ModelError, ModelResult};
use crate::portfolio::{CapitalCallSchedule, FundId, PortfolioConfig};

/// Projection engine over one validated config and schedule
#[derive(Debug, Clone, Copy)]
pub struct ProjectionEngine<'a> {
    config: &'a PortfolioConfig,
    schedule: &'a CapitalCallSchedule,
}

impl<'a> ProjectionEngine<'a> {
    /// Validate inputs and create an engine.
    ///
    /// The horizon must cover every scheduled period, otherwise scheduled
    /// calls would be dropped.
    pub fn new(config: &'a PortfolioConfig, schedule: &'a CapitalCallSchedule) -> ModelResult<Self> {
        config.validate()?;
        schedule.validate()?;

        if config.horizon_years < schedule.len() {
            return Err(ModelError::invalid(
                "horizon_years",
                format!(
                    "horizon of {} years is shorter than the {}-year call schedule",
                    config.horizon_years,
                    schedule.len()
                ),
            ));
        }

        Ok(Self { config, schedule })
    }

    pub fn config(&self) -> &PortfolioConfig {
        self.config
    }

    pub fn schedule(&self) -> &CapitalCallSchedule {
        self.schedule
    }

    /// Project the portfolio from total calls per period
    pub fn project_portfolio(&self) -> CashFlowProjection {
        self.project_entity(EntityId::Portfolio, |period| self.schedule.total_call(period))
    }

    /// Project one fund from its own call series.
    ///
    /// The fund's cumulative base is built from its own calls only, not as a
    /// share of the portfolio's cumulative call.
    pub fn project_fund(&self, fund: FundId) -> CashFlowProjection {
        self.project_entity(EntityId::Fund(fund), |period| self.schedule.call_for(fund, period))
    }

    fn project_entity<F>(&self, entity: EntityId, call_for_period: F) -> CashFlowProjection
    where
        F: Fn(u32) -> f64,
    {
        let yield_rate = self.config.distribution_yield_pct / 100.0;
        let mut state = ProjectionState::new();

        let periods = (0..self.config.horizon_years)
            .map(|period| state.record_period(call_for_period(period), yield_rate, self.schedule.year_of(period)))
            .collect::<Vec<_>>();

        debug!(
            "{} projection: {} periods, cumulative call {:.0}",
            entity,
            periods.len(),
            state.cumulative_call
        );

        CashFlowProjection::new(entity, periods)
    }
}

/// Unstressed portfolio projection
pub fn compute_portfolio_projection(
    config: &PortfolioConfig,
    schedule: &CapitalCallSchedule,
) -> ModelResult<CashFlowProjection> {
    Ok(ProjectionEngine::new(config, schedule)?.project_portfolio())
}

/// Unstressed projection for one fund
pub fn compute_fund_projection(
    fund: FundId,
    config: &PortfolioConfig,
    schedule: &CapitalCallSchedule,
) -> ModelResult<CashFlowProjection> {
    Ok(ProjectionEngine::new(config, schedule)?.project_fund(fund))
}
