//! Fund identifiers and the per-run portfolio configuration

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};

/// Participant fund in the portfolio
///
/// Variant order is the display order of every per-fund table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FundId {
    Oakhill,
    Oaktree,
    #[serde(rename = "CVC")]
    Cvc,
    Ares,
}

impl FundId {
    pub const ALL: [FundId; 4] = [FundId::Oakhill, FundId::Oaktree, FundId::Cvc, FundId::Ares];

    /// Name as it appears in schedule headers and reports
    pub fn as_str(&self) -> &'static str {
        match self {
            FundId::Oakhill => "Oakhill",
            FundId::Oaktree => "Oaktree",
            FundId::Cvc => "CVC",
            FundId::Ares => "Ares",
        }
    }
}

impl fmt::Display for FundId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FundId {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        FundId::ALL
            .iter()
            .copied()
            .find(|fund| fund.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ModelError::invalid("fund", format!("unknown fund '{}'", trimmed)))
    }
}

/// Cash-flow sequence used as the IRR basis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IrrBasis {
    /// Whole commitment invested at t=0, followed by distributions from period 1 on.
    /// Period 0's distribution is not part of the sequence.
    #[default]
    UpfrontCommitment,
    /// Each period's net cash flow (distribution less capital call) as drawn
    NetCashFlow,
}

impl FromStr for IrrBasis {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "upfront_commitment" | "upfront" => Ok(IrrBasis::UpfrontCommitment),
            "net_cash_flow" | "net" => Ok(IrrBasis::NetCashFlow),
            other => Err(ModelError::invalid("irr_basis", format!("unknown basis '{}'", other))),
        }
    }
}

/// Reference commitments
pub const DEFAULT_COMMITMENTS: [(FundId, f64); 4] = [
    (FundId::Oakhill, 5_000_000.0),
    (FundId::Oaktree, 15_000_000.0),
    (FundId::Cvc, 10_000_000.0),
    (FundId::Ares, 10_000_000.0),
];
pub const DEFAULT_DEFAULT_RATE_PCT: f64 = 3.0;
pub const DEFAULT_RECOVERY_RATE_PCT: f64 = 65.0;
pub const DEFAULT_DISTRIBUTION_YIELD_PCT: f64 = 17.0;
pub const DEFAULT_HORIZON_YEARS: u32 = 12;

/// Longest projection (and schedule span) accepted, in years
pub const MAX_HORIZON_YEARS: u32 = 100;

/// Inputs for one computation run
///
/// All rates are in percent units (3.0 = 3%).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortfolioConfig {
    /// Committed capital per fund
    pub commitments: BTreeMap<FundId, f64>,

    /// Default rate applied to the stress basis
    pub default_rate_pct: f64,

    /// Share of defaulted exposure recovered
    pub recovery_rate_pct: f64,

    /// Annual distribution as a share of cumulative called capital
    pub distribution_yield_pct: f64,

    /// Number of annual periods to project
    pub horizon_years: u32,

    pub irr_basis: IrrBasis,
}

impl Default for PortfolioConfig {
    fn default() -> Self {
        Self {
            commitments: DEFAULT_COMMITMENTS.iter().copied().collect(),
            default_rate_pct: DEFAULT_DEFAULT_RATE_PCT,
            recovery_rate_pct: DEFAULT_RECOVERY_RATE_PCT,
            distribution_yield_pct: DEFAULT_DISTRIBUTION_YIELD_PCT,
            horizon_years: DEFAULT_HORIZON_YEARS,
            irr_basis: IrrBasis::default(),
        }
    }
}

impl PortfolioConfig {
    /// Commitment for one fund (zero when the fund has none)
    pub fn commitment(&self, fund: FundId) -> f64 {
        self.commitments.get(&fund).copied().unwrap_or(0.0)
    }

    /// Total portfolio commitment
    pub fn total_commitment(&self) -> ModelResult<f64> {
        aggregate_commitments(&self.commitments)
    }

    /// Check every scalar input before the pipeline runs
    pub fn validate(&self) -> ModelResult<()> {
        aggregate_commitments(&self.commitments)?;

        if self.horizon_years > MAX_HORIZON_YEARS {
            return Err(ModelError::invalid(
                "horizon_years",
                format!("{} exceeds the {}-year maximum", self.horizon_years, MAX_HORIZON_YEARS),
            ));
        }

        check_finite("default_rate_pct", self.default_rate_pct)?;
        if !(0.0..=100.0).contains(&self.default_rate_pct) {
            return Err(ModelError::invalid(
                "default_rate_pct",
                format!("{} is outside 0-100", self.default_rate_pct),
            ));
        }

        check_finite("recovery_rate_pct", self.recovery_rate_pct)?;
        if self.recovery_rate_pct < 0.0 {
            return Err(ModelError::invalid(
                "recovery_rate_pct",
                format!("{} is negative", self.recovery_rate_pct),
            ));
        }

        check_finite("distribution_yield_pct", self.distribution_yield_pct)?;
        if self.distribution_yield_pct < 0.0 {
            return Err(ModelError::invalid(
                "distribution_yield_pct",
                format!("{} is negative", self.distribution_yield_pct),
            ));
        }

        Ok(())
    }

    /// Stress loss on a commitment basis at this config's default and recovery rates
    pub fn stress_loss(&self, basis_commitment: f64) -> f64 {
        default_loss(basis_commitment, self.default_rate_pct, self.recovery_rate_pct)
    }
}

/// Sum fund commitments, rejecting negative or non-finite amounts
pub fn aggregate_commitments(commitments: &BTreeMap<FundId, f64>) -> ModelResult<f64> {
    let mut total = 0.0;
    for (fund, &amount) in commitments {
        let field = format!("commitments.{}", fund);
        check_finite(&field, amount)?;
        if amount < 0.0 {
            return Err(ModelError::invalid(field, format!("{} is negative", amount)));
        }
        total += amount;
    }
    Ok(total)
}

/// Expected loss realised on `basis_commitment`: basis * default * (1 - recovery)
pub fn default_loss(basis_commitment: f64, default_rate_pct: f64, recovery_rate_pct: f64) -> f64 {
    basis_commitment * (default_rate_pct / 100.0) * (1.0 - recovery_rate_pct / 100.0)
}

pub(crate) fn check_finite(field: &str, value: f64) -> ModelResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ModelError::invalid(field, format!("{} is not a finite number", value)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_reference_total_commitment() {
        let config = PortfolioConfig::default();
        assert_relative_eq!(config.total_commitment().unwrap(), 40_000_000.0);
    }

    #[test]
    fn test_aggregation_matches_sum() {
        let amounts = [(1_250_000.0, 0.0, 7_500_000.5, 3.0), (0.0, 0.0, 0.0, 0.0)];
        for (a, b, c, d) in amounts {
            let commitments: BTreeMap<_, _> = FundId::ALL.into_iter().zip([a, b, c, d]).collect();
            let total = aggregate_commitments(&commitments).unwrap();
            assert_relative_eq!(total, a + b + c + d);
        }
    }

    #[test]
    fn test_negative_commitment_rejected() {
        let mut config = PortfolioConfig::default();
        config.commitments.insert(FundId::Ares, -1.0);
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ModelError::InvalidInput { ref field, .. } if field == "commitments.Ares"));
    }

    #[test]
    fn test_non_finite_rate_rejected() {
        let config = PortfolioConfig {
            distribution_yield_pct: f64::NAN,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = PortfolioConfig {
            default_rate_pct: 120.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_horizon_capped() {
        let config = PortfolioConfig {
            horizon_years: MAX_HORIZON_YEARS,
            ..Default::default()
        };
        assert!(config.validate().is_ok());

        let config = PortfolioConfig {
            horizon_years: u32::MAX,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ModelError::InvalidInput { ref field, .. } if field == "horizon_years"));
    }

    #[test]
    fn test_recovery_above_hundred_allowed() {
        let config = PortfolioConfig {
            recovery_rate_pct: 110.0,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
        assert!(config.stress_loss(1_000_000.0) < 0.0);
    }

    #[test]
    fn test_reference_loss() {
        let config = PortfolioConfig::default();
        assert_relative_eq!(config.stress_loss(40_000_000.0), 420_000.0, max_relative = 1e-12);
    }

    #[test]
    fn test_fund_id_parsing() {
        assert_eq!("cvc".parse::<FundId>().unwrap(), FundId::Cvc);
        assert_eq!(" Oaktree ".parse::<FundId>().unwrap(), FundId::Oaktree);
        assert!("Blackstone".parse::<FundId>().is_err());
    }

    #[test]
    fn test_config_json_defaults() {
        let config: PortfolioConfig =
            serde_json::from_str(r#"{"default_rate_pct": 5.0, "commitments": {"CVC": 2000000.0}}"#).unwrap();
        assert_eq!(config.default_rate_pct, 5.0);
        assert_eq!(config.recovery_rate_pct, DEFAULT_RECOVERY_RATE_PCT);
        assert_eq!(config.commitment(FundId::Cvc), 2_000_000.0);
        assert_eq!(config.commitment(FundId::Oakhill), 0.0);
        assert_eq!(config.irr_basis, IrrBasis::UpfrontCommitment);
    }
}
