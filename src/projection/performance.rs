//! IRR and MOIC for a stressed projection

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::cashflows::{CashFlowProjection, EntityId};
use super::irr::calculate_irr;
use crate::error::{ModelError, ModelResult};
use crate::portfolio::IrrBasis;

/// Performance metrics for the portfolio or one fund
///
/// `None` marks an undefined metric (zero commitment, no real root, or
/// non-convergence), which is distinct from a computed zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceResult {
    pub entity: EntityId,
    pub commitment: f64,
    pub irr: Option<f64>,
    pub moic: Option<f64>,
}

/// Cash-flow sequence whose root is the IRR.
///
/// `UpfrontCommitment`: `[-commitment, distribution[1], ..., distribution[T-1]]`.
/// Period 0's distribution is replaced by the single upfront outflow.
///
/// `NetCashFlow`: each period's net cash flow.
pub fn irr_cash_flows(projection: &CashFlowProjection, commitment: f64, basis: IrrBasis) -> Vec<f64> {
    match basis {
        IrrBasis::UpfrontCommitment => std::iter::once(-commitment)
            .chain(projection.periods().iter().skip(1).map(|p| p.distribution))
            .collect(),
        IrrBasis::NetCashFlow => projection.net_cash_flows(),
    }
}

/// Sum of distributions over commitment
pub fn moic(projection: &CashFlowProjection, commitment: f64) -> ModelResult<f64> {
    check_commitment(commitment, "MOIC")?;
    Ok(projection.total_distributions() / commitment)
}

/// IRR of the projection on the given basis
pub fn irr(projection: &CashFlowProjection, commitment: f64, basis: IrrBasis) -> ModelResult<f64> {
    check_commitment(commitment, "IRR")?;
    calculate_irr(&irr_cash_flows(projection, commitment, basis))
}

/// IRR and MOIC on the default upfront-commitment basis
pub fn compute_performance(projection: &CashFlowProjection, commitment: f64) -> PerformanceResult {
    compute_performance_with_basis(projection, commitment, IrrBasis::default())
}

pub fn compute_performance_with_basis(
    projection: &CashFlowProjection,
    commitment: f64,
    basis: IrrBasis,
) -> PerformanceResult {
    let entity = projection.entity();
    PerformanceResult {
        entity,
        commitment,
        irr: defined(entity, "IRR", irr(projection, commitment, basis)),
        moic: defined(entity, "MOIC", moic(projection, commitment)),
    }
}

/// IRR of a prepared cash-flow sequence, `None` when undefined
pub fn solve_irr(entity: EntityId, cashflows: &[f64]) -> Option<f64> {
    defined(entity, "IRR", calculate_irr(cashflows))
}

fn check_commitment(commitment: f64, metric: &str) -> ModelResult<()> {
    if commitment.is_finite() && commitment > 0.0 {
        Ok(())
    } else {
        Err(ModelError::DivisionUndefined {
            context: format!("{} with commitment {}", metric, commitment),
        })
    }
}

/// Numeric failures degrade to an undefined metric
fn defined(entity: EntityId, metric: &str, result: ModelResult<f64>) -> Option<f64> {
    match result {
        Ok(value) => Some(value),
        Err(err @ ModelError::NumericNonConvergence { .. }) => {
            warn!("{} {} undefined: {}", entity, metric, err);
            None
        }
        Err(err) if err.is_numeric() => {
            debug!("{} {} undefined: {}", entity, metric, err);
            None
        }
        Err(err) => {
            warn!("{} {} failed: {}", entity, metric, err);
            None
        }
    }
}
