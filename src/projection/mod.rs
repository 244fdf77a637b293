//! Cash-flow projection, stress, and performance metrics

mod state;
mod engine;
mod cashflows;
mod stress;
mod performance;
pub mod irr;

pub use state::ProjectionState;
pub use engine::{ProjectionEngine, compute_portfolio_projection, compute_fund_projection};
pub use cashflows::{CashFlowPeriod, CashFlowProjection, EntityId, ProjectionSummary};
pub use stress::{apply_stress, apply_terminal_loss};
pub use performance::{
    PerformanceResult, compute_performance, compute_performance_with_basis, irr_cash_flows,
    moic, solve_irr,
};
pub use irr::{calculate_irr, npv};
