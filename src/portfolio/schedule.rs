//! Capital call schedule
//!
//! Fixed per-fund call amounts keyed by period (0-based year offset from the
//! projection start). Periods past the last scheduled row call nothing.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::data::{check_finite, FundId, MAX_HORIZON_YEARS};
use crate::error::{ModelError, ModelResult};

/// First calendar year of the reference schedule
pub const DEFAULT_START_YEAR: i32 = 2024;

/// Calls made by each fund in one period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledCall {
    pub period: u32,
    pub calls: BTreeMap<FundId, f64>,
}

impl ScheduledCall {
    pub fn total(&self) -> f64 {
        self.calls.values().sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapitalCallSchedule {
    /// Calendar year of period 0
    pub start_year: i32,

    /// Scheduled rows, strictly increasing by period
    pub entries: Vec<ScheduledCall>,
}

impl CapitalCallSchedule {
    /// Build a schedule and check its invariants
    pub fn new(start_year: i32, entries: Vec<ScheduledCall>) -> ModelResult<Self> {
        let schedule = Self { start_year, entries };
        schedule.validate()?;
        Ok(schedule)
    }

    /// Build from per-period rows given in fund order, one row per consecutive period
    pub fn from_rows(start_year: i32, rows: &[[f64; 4]]) -> ModelResult<Self> {
        Self::new(start_year, entries_from_rows(rows))
    }

    /// Reference 2024-2027 schedule
    pub fn reference() -> Self {
        //        Oakhill      Oaktree     CVC         Ares
        let rows = [
            [1_500_000.0, 0.0, 0.0, 0.0],
            [1_050_000.0, 6_000_000.0, 2_500_000.0, 3_500_000.0],
            [1_200_000.0, 6_000_000.0, 2_500_000.0, 3_500_000.0],
            [1_250_000.0, 3_000_000.0, 2_500_000.0, 3_000_000.0],
        ];
        Self {
            start_year: DEFAULT_START_YEAR,
            entries: entries_from_rows(&rows),
        }
    }

    /// Periods strictly increasing and within the horizon cap, amounts finite and non-negative
    pub fn validate(&self) -> ModelResult<()> {
        let mut previous: Option<u32> = None;
        for entry in &self.entries {
            if let Some(prev) = previous {
                if entry.period <= prev {
                    return Err(ModelError::invalid(
                        "schedule.period",
                        format!("period {} does not follow period {}", entry.period, prev),
                    ));
                }
            }
            previous = Some(entry.period);

            if entry.period >= MAX_HORIZON_YEARS {
                return Err(ModelError::invalid(
                    "schedule.period",
                    format!("period {} is beyond the {}-year maximum", entry.period, MAX_HORIZON_YEARS),
                ));
            }

            for (fund, &amount) in &entry.calls {
                let field = format!("schedule[{}].{}", entry.period, fund);
                check_finite(&field, amount)?;
                if amount < 0.0 {
                    return Err(ModelError::invalid(field, format!("{} is negative", amount)));
                }
            }
        }
        Ok(())
    }

    /// Number of periods the schedule spans (last scheduled period + 1)
    pub fn len(&self) -> u32 {
        self.entries.last().map(|e| e.period.saturating_add(1)).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn entry(&self, period: u32) -> Option<&ScheduledCall> {
        self.entries
            .binary_search_by_key(&period, |e| e.period)
            .ok()
            .map(|idx| &self.entries[idx])
    }

    /// Scheduled call for one fund, zero outside the schedule
    pub fn call_for(&self, fund: FundId, period: u32) -> f64 {
        self.entry(period)
            .and_then(|e| e.calls.get(&fund).copied())
            .unwrap_or(0.0)
    }

    /// Sum of all funds' calls in a period
    pub fn total_call(&self, period: u32) -> f64 {
        self.entry(period).map(ScheduledCall::total).unwrap_or(0.0)
    }

    /// Total call per period over `periods` periods
    pub fn total_calls(&self, periods: u32) -> Vec<f64> {
        (0..periods).map(|p| self.total_call(p)).collect()
    }

    /// One fund's call series over `periods` periods
    pub fn fund_calls(&self, fund: FundId, periods: u32) -> Vec<f64> {
        (0..periods).map(|p| self.call_for(fund, p)).collect()
    }

    /// Calendar year for a period index
    pub fn year_of(&self, period: u32) -> i32 {
        self.start_year + period as i32
    }
}

fn entries_from_rows(rows: &[[f64; 4]]) -> Vec<ScheduledCall> {
    rows.iter()
        .enumerate()
        .map(|(period, amounts)| ScheduledCall {
            period: period as u32,
            calls: FundId::ALL.iter().copied().zip(amounts.iter().copied()).collect(),
        })
        .collect()
}

impl Default for CapitalCallSchedule {
    fn default() -> Self {
        Self::reference()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_reference_total_calls() {
        let schedule = CapitalCallSchedule::reference();
        assert!(schedule.validate().is_ok());
        assert_eq!(schedule.len(), 4);

        let totals = schedule.total_calls(4);
        let expected = [1_500_000.0, 13_050_000.0, 13_200_000.0, 9_750_000.0];
        for (got, want) in totals.iter().zip(expected) {
            assert_relative_eq!(*got, want);
        }
    }

    #[test]
    fn test_zero_beyond_schedule() {
        let schedule = CapitalCallSchedule::reference();
        assert_eq!(schedule.total_call(4), 0.0);
        assert_eq!(schedule.call_for(FundId::Oaktree, 11), 0.0);
        assert_eq!(schedule.call_for(FundId::Oaktree, 1), 6_000_000.0);
    }

    #[test]
    fn test_gaps_call_nothing() {
        let entries = vec![
            ScheduledCall { period: 0, calls: [(FundId::Ares, 100.0)].into_iter().collect() },
            ScheduledCall { period: 3, calls: [(FundId::Ares, 50.0)].into_iter().collect() },
        ];
        let schedule = CapitalCallSchedule::new(2030, entries).unwrap();
        assert_eq!(schedule.len(), 4);
        assert_eq!(schedule.fund_calls(FundId::Ares, 5), vec![100.0, 0.0, 0.0, 50.0, 0.0]);
        assert_eq!(schedule.year_of(3), 2033);
    }

    #[test]
    fn test_non_increasing_periods_rejected() {
        let entries = vec![
            ScheduledCall { period: 1, calls: BTreeMap::new() },
            ScheduledCall { period: 1, calls: BTreeMap::new() },
        ];
        assert!(CapitalCallSchedule::new(2024, entries).is_err());
    }

    #[test]
    fn test_far_period_rejected() {
        let entries = vec![ScheduledCall { period: u32::MAX, calls: BTreeMap::new() }];
        assert!(matches!(
            CapitalCallSchedule::new(2024, entries.clone()),
            Err(ModelError::InvalidInput { .. })
        ));

        // Unvalidated schedules still report a span no horizon can cover
        let schedule = CapitalCallSchedule { start_year: 2024, entries };
        assert_eq!(schedule.len(), u32::MAX);
    }

    #[test]
    fn test_negative_call_rejected() {
        let result = CapitalCallSchedule::from_rows(2024, &[[0.0, -5.0, 0.0, 0.0]]);
        assert!(matches!(result, Err(ModelError::InvalidInput { .. })));
    }
}
