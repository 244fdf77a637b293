//! Fund Commitment Model - cash-flow projection and performance engine for
//! committed private-capital fund portfolios
//!
//! This library provides:
//! - Capital call scheduling and commitment aggregation
//! - Portfolio and fund-level annual cash-flow projections
//! - Terminal-period default/recovery stress
//! - IRR and MOIC, including undefined-metric handling
//! - IRR sensitivity to the default rate
//! - Text, CSV, and JSON reporting

pub mod error;
pub mod portfolio;
pub mod projection;
pub mod scenario;
pub mod report;

// Re-export commonly used types
pub use error::{ModelError, ModelResult};
pub use portfolio::{CapitalCallSchedule, FundId, IrrBasis, PortfolioConfig};
pub use projection::{
    apply_stress, compute_fund_projection, compute_performance, compute_portfolio_projection,
    CashFlowPeriod, CashFlowProjection, EntityId, PerformanceResult, ProjectionEngine,
};
pub use scenario::{compute_sensitivity, PortfolioReport, ScenarioRunner, SensitivityGrid, SensitivityPoint};
