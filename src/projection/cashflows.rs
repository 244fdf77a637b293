//! Cash-flow output structures for projections

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::portfolio::FundId;

/// Whose cash flows a projection or result describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityId {
    Portfolio,
    Fund(FundId),
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityId::Portfolio => f.write_str("Portfolio"),
            EntityId::Fund(fund) => write!(f, "{}", fund),
        }
    }
}

/// A single row of projection output for one year
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CashFlowPeriod {
    /// 0-based year offset from the projection start
    pub period: u32,
    pub year: i32,

    pub capital_call: f64,
    pub cumulative_call: f64,
    pub distribution: f64,

    /// distribution - capital_call
    pub net_cash_flow: f64,
}

/// Year-by-year projection for the portfolio or one fund
///
/// Rows are fixed once built; adjustments such as the stress write-down
/// produce a new projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashFlowProjection {
    entity: EntityId,
    periods: Vec<CashFlowPeriod>,
}

impl CashFlowProjection {
    pub(crate) fn new(entity: EntityId, periods: Vec<CashFlowPeriod>) -> Self {
        Self { entity, periods }
    }

    pub fn entity(&self) -> EntityId {
        self.entity
    }

    pub fn periods(&self) -> &[CashFlowPeriod] {
        &self.periods
    }

    pub fn len(&self) -> usize {
        self.periods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    /// Final period of the horizon
    pub fn last(&self) -> Option<&CashFlowPeriod> {
        self.periods.last()
    }

    pub fn net_cash_flows(&self) -> Vec<f64> {
        self.periods.iter().map(|p| p.net_cash_flow).collect()
    }

    pub fn total_distributions(&self) -> f64 {
        self.periods.iter().map(|p| p.distribution).sum()
    }

    /// Get summary statistics
    pub fn summary(&self) -> ProjectionSummary {
        let total_capital_called: f64 = self.periods.iter().map(|p| p.capital_call).sum();
        let total_net_cash_flow: f64 = self.periods.iter().map(|p| p.net_cash_flow).sum();
        let final_cumulative_call = self.periods.last().map(|p| p.cumulative_call).unwrap_or(0.0);

        ProjectionSummary {
            entity: self.entity,
            total_periods: self.periods.len() as u32,
            total_capital_called,
            total_distributions: self.total_distributions(),
            total_net_cash_flow,
            final_cumulative_call,
        }
    }
}

/// Summary statistics for a projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionSummary {
    pub entity: EntityId,
    pub total_periods: u32,
    pub total_capital_called: f64,
    pub total_distributions: f64,
    pub total_net_cash_flow: f64,
    pub final_cumulative_call: f64,
}
