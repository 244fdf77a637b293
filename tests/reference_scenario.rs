use std::collections::BTreeMap;

use approx::{assert_abs_diff_eq, assert_relative_eq};
use fund_commitment_model::portfolio::load_schedule_from_reader;
use fund_commitment_model::projection::irr_cash_flows;
use fund_commitment_model::{
    apply_stress, compute_fund_projection, compute_performance, compute_portfolio_projection,
    compute_sensitivity, CapitalCallSchedule, FundId, IrrBasis, PortfolioConfig, ScenarioRunner,
};

// ===========================================================================
// Commitments and capital calls
// ===========================================================================

#[test]
fn test_reference_commitments_and_calls() {
    let config = PortfolioConfig::default();
    let schedule = CapitalCallSchedule::reference();

    assert_eq!(config.total_commitment().unwrap(), 40_000_000.0);
    assert_eq!(
        schedule.total_calls(4),
        vec![1_500_000.0, 13_050_000.0, 13_200_000.0, 9_750_000.0]
    );

    let projection = compute_portfolio_projection(&config, &schedule).unwrap();
    let after_2027 = projection.periods().iter().find(|p| p.year == 2027).unwrap();
    assert_eq!(after_2027.cumulative_call, 37_500_000.0);
}

#[test]
fn test_data_file_schedule_matches_reference() {
    let csv = include_str!("../data/capital_call_schedule.csv");
    let schedule = load_schedule_from_reader(csv.as_bytes()).unwrap();
    assert_eq!(schedule, CapitalCallSchedule::reference());
}

#[test]
fn test_data_file_config_matches_defaults() {
    let json = include_str!("../data/portfolio.json");
    let config: PortfolioConfig = serde_json::from_str(json).unwrap();
    assert_eq!(config, PortfolioConfig::default());
}

// ===========================================================================
// Stress on the final year only
// ===========================================================================

#[test]
fn test_reference_stress() {
    let config = PortfolioConfig::default();
    let schedule = CapitalCallSchedule::reference();
    let base = compute_portfolio_projection(&config, &schedule).unwrap();
    let stressed = apply_stress(&base, 3.0, 65.0, 40_000_000.0);

    let last = stressed.last().unwrap();
    assert_eq!(last.period, 11);
    assert_eq!(last.year, 2035);
    assert_relative_eq!(last.distribution, 6_375_000.0 - 420_000.0, max_relative = 1e-12);

    for (before, after) in base.periods().iter().zip(stressed.periods()).take(11) {
        assert_eq!(before, after);
    }
}

#[test]
fn test_fund_stress_uses_own_commitment() {
    let config = PortfolioConfig::default();
    let schedule = CapitalCallSchedule::reference();
    let base = compute_fund_projection(FundId::Oaktree, &config, &schedule).unwrap();
    let stressed = apply_stress(&base, 3.0, 65.0, config.commitment(FundId::Oaktree));

    let loss = base.last().unwrap().distribution - stressed.last().unwrap().distribution;
    assert_relative_eq!(loss, 15_000_000.0 * 0.03 * 0.35, max_relative = 1e-9);
}

#[test]
fn test_moic_equals_distributions_over_commitment() {
    let report = ScenarioRunner::new().run(&PortfolioConfig::default()).unwrap();

    let pairs = std::iter::once((&report.portfolio_projection, &report.portfolio_performance))
        .chain(report.fund_projections.iter().zip(&report.fund_performance));
    for (projection, performance) in pairs {
        assert_relative_eq!(
            performance.moic.unwrap() * performance.commitment,
            projection.total_distributions(),
            max_relative = 1e-12
        );
    }
}

#[test]
fn test_reference_irr() {
    let report = ScenarioRunner::new().run(&PortfolioConfig::default()).unwrap();
    assert_abs_diff_eq!(report.portfolio_performance.irr.unwrap(), 0.081403, epsilon = 1e-5);

    let expected = [
        (FundId::Oakhill, 0.097906, 1.7847),
        (FundId::Oaktree, 0.095919, 1.7235),
        (FundId::Cvc, 0.038137, 1.2645),
        (FundId::Ares, 0.091630, 1.698),
    ];
    for ((fund, irr, moic), result) in expected.iter().zip(&report.fund_performance) {
        assert_eq!(result.entity.to_string(), fund.to_string());
        assert_abs_diff_eq!(result.irr.unwrap(), *irr, epsilon = 1e-5);
        assert_abs_diff_eq!(result.moic.unwrap(), *moic, epsilon = 1e-9);
    }
}

// ===========================================================================
// Default-rate sensitivity
// ===========================================================================

#[test]
fn test_sensitivity_endpoints() {
    let points =
        compute_sensitivity(&PortfolioConfig::default(), &CapitalCallSchedule::reference(), 65.0).unwrap();

    let first = points.first().unwrap();
    let last = points.last().unwrap();
    assert_eq!(first.default_rate_pct, 0.0);
    assert_eq!(last.default_rate_pct, 10.0);
    assert!(first.irr.unwrap() >= last.irr.unwrap());
    assert_abs_diff_eq!(first.irr.unwrap(), 0.082241, epsilon = 1e-5);
    assert_abs_diff_eq!(last.irr.unwrap(), 0.079412, epsilon = 1e-5);
}

#[test]
fn test_sensitivity_delta_against_stressed_base() {
    // Sweeping from a 0% base must land on the same curve as sweeping from 3%
    let schedule = CapitalCallSchedule::reference();
    let from_three = compute_sensitivity(&PortfolioConfig::default(), &schedule, 65.0).unwrap();
    let from_zero = compute_sensitivity(
        &PortfolioConfig {
            default_rate_pct: 0.0,
            ..Default::default()
        },
        &schedule,
        65.0,
    )
    .unwrap();

    for (a, b) in from_three.iter().zip(&from_zero) {
        assert_abs_diff_eq!(a.irr.unwrap(), b.irr.unwrap(), epsilon = 1e-8);
    }
}

// ===========================================================================
// Zero commitments
// ===========================================================================

#[test]
fn test_zero_commitments_are_undefined() {
    let config = PortfolioConfig {
        commitments: FundId::ALL.iter().map(|&f| (f, 0.0)).collect::<BTreeMap<_, _>>(),
        ..Default::default()
    };
    let report = ScenarioRunner::new().run(&config).unwrap();

    assert_eq!(report.total_commitment, 0.0);
    assert_eq!(report.portfolio_performance.irr, None);
    assert_eq!(report.portfolio_performance.moic, None);
    assert!(report.fund_performance.iter().all(|r| r.irr.is_none() && r.moic.is_none()));
    assert!(report.sensitivity.iter().all(|p| p.irr.is_none()));

    // Cash-flow tables are still produced
    assert_eq!(report.portfolio_projection.len(), 12);
    assert!(report.portfolio_projection.total_distributions() > 0.0);
}

// ===========================================================================
// IRR basis modes
// ===========================================================================

#[test]
fn test_net_cash_flow_basis_is_separate_mode() {
    let upfront = ScenarioRunner::new().run(&PortfolioConfig::default()).unwrap();
    let net = ScenarioRunner::new()
        .run(&PortfolioConfig {
            irr_basis: IrrBasis::NetCashFlow,
            ..Default::default()
        })
        .unwrap();

    assert_eq!(upfront.portfolio_projection, net.portfolio_projection);
    assert_eq!(upfront.portfolio_performance.moic, net.portfolio_performance.moic);
    assert_ne!(upfront.portfolio_performance.irr, net.portfolio_performance.irr);

    let flows = irr_cash_flows(&net.portfolio_projection, 40_000_000.0, IrrBasis::NetCashFlow);
    assert_relative_eq!(flows[0], 255_000.0 - 1_500_000.0, max_relative = 1e-12);

    let direct = compute_performance(&net.portfolio_projection, 40_000_000.0);
    assert_eq!(direct.irr, upfront.portfolio_performance.irr);
}
