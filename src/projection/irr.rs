//! Internal Rate of Return (IRR) calculation
//!
//! Annual cash flows, one per period, with period 0 undiscounted.

use crate::error::{ModelError, ModelResult};

/// Search domain for annual rates
pub const IRR_LOWER_BOUND: f64 = -0.99;
pub const IRR_UPPER_BOUND: f64 = 10.0;

const TOLERANCE: f64 = 1e-10;
const MAX_ITERATIONS: u32 = 1000;

/// Grid points used to bracket sign changes of the NPV over the search domain
const SCAN_STEPS: u32 = 2000;

/// Calculate the Internal Rate of Return for a series of annual cash flows.
///
/// Every sign change of the NPV on a fixed grid over
/// [`IRR_LOWER_BOUND`, `IRR_UPPER_BOUND`] is refined by bisection and the root
/// nearest zero is returned. When no bracket exists (a tangential root),
/// Newton-Raphson gets one attempt from 10%.
///
/// # Arguments
/// * `cashflows` - Cash flows (positive = inflow, negative = outflow)
///
/// # Returns
/// * Annual IRR as a decimal (e.g., 0.05 for 5%)
/// * `NoRealRoot` if the flows never change sign or no root lies in the domain
/// * `NumericNonConvergence` if the iteration budget runs out
pub fn calculate_irr(cashflows: &[f64]) -> ModelResult<f64> {
    if cashflows.is_empty() {
        return Err(ModelError::NoRealRoot("empty cash-flow sequence".into()));
    }
    if cashflows.iter().any(|cf| !cf.is_finite()) {
        return Err(ModelError::NoRealRoot("non-finite cash flow".into()));
    }

    // Every rate is a root; report the one nearest zero
    if cashflows.iter().all(|&cf| cf.abs() < 1e-10) {
        return Ok(0.0);
    }

    // At least one sign change is required for IRR to exist
    let has_positive = cashflows.iter().any(|&cf| cf > 1e-10);
    let has_negative = cashflows.iter().any(|&cf| cf < -1e-10);
    if !has_positive || !has_negative {
        return Err(ModelError::NoRealRoot("cash flows do not change sign".into()));
    }

    let roots = bracketed_roots(cashflows)?;
    if let Some(nearest) = roots.into_iter().min_by(|a, b| a.abs().total_cmp(&b.abs())) {
        return Ok(nearest);
    }

    newton_raphson(cashflows)
}

/// Net present value of annual cash flows at `rate`
pub fn npv(rate: f64, cashflows: &[f64]) -> f64 {
    cashflows
        .iter()
        .enumerate()
        .map(|(t, &cf)| cf / (1.0 + rate).powi(t as i32))
        .sum()
}

/// Calculate NPV and its derivative with respect to rate
fn npv_and_derivative(cashflows: &[f64], rate: f64) -> (f64, f64) {
    let mut npv = 0.0;
    let mut dnpv = 0.0;

    for (t, &cf) in cashflows.iter().enumerate() {
        let discount = (1.0 + rate).powi(t as i32);
        npv += cf / discount;
        if t > 0 {
            dnpv -= (t as f64) * cf / (discount * (1.0 + rate));
        }
    }

    (npv, dnpv)
}

/// Roots found by bisecting every sign change on the scan grid
fn bracketed_roots(cashflows: &[f64]) -> ModelResult<Vec<f64>> {
    let width = IRR_UPPER_BOUND - IRR_LOWER_BOUND;
    let grid_rate = |i: u32| IRR_LOWER_BOUND + width * i as f64 / SCAN_STEPS as f64;

    let mut roots = Vec::new();
    let mut low = grid_rate(0);
    let mut npv_low = npv(low, cashflows);
    if npv_low == 0.0 {
        roots.push(low);
    }

    for i in 1..=SCAN_STEPS {
        let high = grid_rate(i);
        let npv_high = npv(high, cashflows);

        if npv_high == 0.0 {
            roots.push(high);
        } else if npv_low * npv_high < 0.0 {
            roots.push(bisect(cashflows, low, high)?);
        }

        low = high;
        npv_low = npv_high;
    }

    Ok(roots)
}

/// Bisection on a bracket known to contain a sign change
fn bisect(cashflows: &[f64], mut low: f64, mut high: f64) -> ModelResult<f64> {
    let mut npv_low = npv(low, cashflows);

    for _ in 0..MAX_ITERATIONS {
        let mid = (low + high) / 2.0;
        let npv_mid = npv(mid, cashflows);

        if npv_mid.abs() < TOLERANCE || (high - low) / 2.0 < TOLERANCE {
            return Ok(mid);
        }

        if npv_mid * npv_low < 0.0 {
            high = mid;
        } else {
            low = mid;
            npv_low = npv_mid;
        }
    }

    Err(ModelError::NumericNonConvergence {
        iterations: MAX_ITERATIONS,
    })
}

/// Newton-Raphson from a 10% guess, confined to the search domain
fn newton_raphson(cashflows: &[f64]) -> ModelResult<f64> {
    let scale: f64 = cashflows.iter().map(|cf| cf.abs()).sum();
    let mut rate = 0.10;

    for _ in 0..MAX_ITERATIONS {
        let (npv, dnpv) = npv_and_derivative(cashflows, rate);

        if dnpv.abs() < 1e-20 {
            break;
        }

        let new_rate = (rate - npv / dnpv).clamp(IRR_LOWER_BOUND, IRR_UPPER_BOUND);

        if (new_rate - rate).abs() < TOLERANCE {
            let residual = self::npv(new_rate, cashflows);
            if residual.abs() <= 1e-6 * scale {
                return Ok(new_rate);
            }
            return Err(ModelError::NoRealRoot(format!(
                "no root in [{}, {}]",
                IRR_LOWER_BOUND, IRR_UPPER_BOUND
            )));
        }

        rate = new_rate;
    }

    Err(ModelError::NumericNonConvergence {
        iterations: MAX_ITERATIONS,
    })
}
