//! Running state carried from one projection period to the next

use super::cashflows::CashFlowPeriod;

/// Called-capital state of one entity during projection
#[derive(Debug, Clone, Default)]
pub struct ProjectionState {
    /// Next period to record (0-indexed)
    pub period: u32,

    /// Capital called through the last recorded period
    pub cumulative_call: f64,
}

impl ProjectionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one period's call and advance.
    ///
    /// Periods must be recorded in order: the cumulative base of period t
    /// includes every call through t.
    pub fn record_period(&mut self, capital_call: f64, yield_rate: f64, year: i32) -> CashFlowPeriod {
        self.cumulative_call += capital_call;
        let distribution = self.cumulative_call * yield_rate;

        let row = CashFlowPeriod {
            period: self.period,
            year,
            capital_call,
            cumulative_call: self.cumulative_call,
            distribution,
            net_cash_flow: distribution - capital_call,
        };

        self.period += 1;
        row
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_accumulates() {
        let mut state = ProjectionState::new();
        let first = state.record_period(100.0, 0.1, 2024);
        let second = state.record_period(50.0, 0.1, 2025);

        assert_eq!(first.period, 0);
        assert_eq!(first.cumulative_call, 100.0);
        assert_eq!(first.net_cash_flow, 10.0 - 100.0);
        assert_eq!(second.period, 1);
        assert_eq!(second.cumulative_call, 150.0);
        assert_eq!(state.period, 2);
    }
}
