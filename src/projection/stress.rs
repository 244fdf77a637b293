//! Default/recovery stress
//!
//! Expected loss is realised once, as a write-down of the final period's
//! distribution. Earlier periods are left exactly as projected.

use log::debug;

use super::cashflows::CashFlowProjection;
use crate::portfolio::default_loss;

/// Apply the default/recovery loss on `basis_commitment` to the final period.
///
/// The basis is the total commitment for the portfolio projection and the
/// fund's own commitment for a fund projection.
pub fn apply_stress(
    projection: &CashFlowProjection,
    default_rate_pct: f64,
    recovery_rate_pct: f64,
    basis_commitment: f64,
) -> CashFlowProjection {
    let loss = default_loss(basis_commitment, default_rate_pct, recovery_rate_pct);
    debug!(
        "{} stress: {:.2}% default, {:.2}% recovery on {:.0} -> loss {:.2}",
        projection.entity(),
        default_rate_pct,
        recovery_rate_pct,
        basis_commitment,
        loss
    );
    apply_terminal_loss(projection, loss)
}

/// Subtract `loss` from the final period's distribution and recompute its net cash flow
pub fn apply_terminal_loss(projection: &CashFlowProjection, loss: f64) -> CashFlowProjection {
    let mut periods = projection.periods().to_vec();
    if let Some(last) = periods.last_mut() {
        last.distribution -= loss;
        last.net_cash_flow = last.distribution - last.capital_call;
    }
    CashFlowProjection::new(projection.entity(), periods)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::portfolio::{CapitalCallSchedule, PortfolioConfig};
    use crate::projection::{compute_portfolio_projection, EntityId};
    use approx::assert_relative_eq;

    fn reference_projection() -> CashFlowProjection {
        compute_portfolio_projection(&PortfolioConfig::default(), &CapitalCallSchedule::reference()).unwrap()
    }

    #[test]
    fn test_reference_loss_hits_final_year_only() {
        let base = reference_projection();
        let stressed = apply_stress(&base, 3.0, 65.0, 40_000_000.0);

        let before = base.last().unwrap();
        let after = stressed.last().unwrap();
        assert_eq!(after.year, 2035);
        assert_relative_eq!(before.distribution - after.distribution, 420_000.0, max_relative = 1e-9);
        assert_relative_eq!(after.net_cash_flow, after.distribution - after.capital_call);

        // Bit-identical earlier periods
        assert_eq!(&base.periods()[..11], &stressed.periods()[..11]);
    }

    #[test]
    fn test_input_projection_untouched() {
        let base = reference_projection();
        let snapshot = base.clone();
        let _ = apply_stress(&base, 10.0, 0.0, 40_000_000.0);
        assert_eq!(base, snapshot);
    }

    #[test]
    fn test_zero_default_is_identity() {
        let base = reference_projection();
        assert_eq!(apply_stress(&base, 0.0, 65.0, 40_000_000.0), base);
    }

    #[test]
    fn test_empty_projection_unchanged() {
        let empty = CashFlowProjection::new(EntityId::Portfolio, Vec::new());
        assert!(apply_stress(&empty, 5.0, 50.0, 1_000.0).is_empty());
    }

    #[test]
    fn test_loss_on_call_period_updates_net() {
        let config = PortfolioConfig {
            horizon_years: 4,
            ..Default::default()
        };
        let base = compute_portfolio_projection(&config, &CapitalCallSchedule::reference()).unwrap();
        let stressed = apply_terminal_loss(&base, 1_000.0);
        let last = stressed.last().unwrap();
        assert_relative_eq!(last.net_cash_flow, last.distribution - 9_750_000.0);
    }
}
