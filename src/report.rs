//! Text tables, CSV export, and JSON output for portfolio reports
//!
//! Currency is rounded to whole units with thousands separators, rates are
//! shown as percentages to 2 decimals, multiples to 2 decimals with an `x`.

use std::io::Write;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::ModelResult;
use crate::projection::CashFlowProjection;
use crate::scenario::{PortfolioReport, SensitivityPoint};

const UNDEFINED: &str = "n/a";

/// Whole currency units with thousands separators, e.g. `40,000,000`
pub fn format_currency(amount: f64) -> String {
    if !amount.is_finite() {
        return UNDEFINED.to_string();
    }

    let rounded = amount.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if rounded < 0.0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

/// Decimal rate as a percentage, e.g. `Some(0.0673)` -> `6.73%`
pub fn format_percent(rate: Option<f64>) -> String {
    match rate {
        Some(r) if r.is_finite() => format!("{:.2}%", r * 100.0),
        _ => UNDEFINED.to_string(),
    }
}

/// Multiple with an `x` suffix, e.g. `1.45x`
pub fn format_multiple(multiple: Option<f64>) -> String {
    match multiple {
        Some(m) if m.is_finite() => format!("{:.2}x", m),
        _ => UNDEFINED.to_string(),
    }
}

/// Fund-level IRR and MOIC
pub fn fund_table(report: &PortfolioReport) -> String {
    let mut out = format!("{:<10} {:>16} {:>10} {:>8}\n", "Fund", "Commitment", "IRR", "MOIC");
    out.push_str(&format!("{}\n", "-".repeat(47)));
    for result in &report.fund_performance {
        out.push_str(&format!(
            "{:<10} {:>16} {:>10} {:>8}\n",
            result.entity.to_string(),
            format_currency(result.commitment),
            format_percent(result.irr),
            format_multiple(result.moic),
        ));
    }
    out
}

/// Portfolio totals and headline metrics
pub fn portfolio_summary(report: &PortfolioReport) -> String {
    let perf = &report.portfolio_performance;
    let totals = report.portfolio_projection.summary();
    [
        format!("Total Commitment: ${}", format_currency(report.total_commitment)),
        format!("Capital Called:   ${}", format_currency(totals.total_capital_called)),
        format!("Distributions:    ${}", format_currency(totals.total_distributions)),
        format!("Default Loss:     ${}", format_currency(report.portfolio_loss)),
        format!("Adjusted IRR:     {}", format_percent(perf.irr)),
        format!("Portfolio MOIC:   {}", format_multiple(perf.moic)),
    ]
    .iter()
    .map(|line| format!("{}\n", line))
    .collect()
}

/// IRR at each swept default rate
pub fn sensitivity_table(points: &[SensitivityPoint]) -> String {
    let mut out = format!("{:>14} {:>10}\n", "Default Rate", "IRR");
    out.push_str(&format!("{}\n", "-".repeat(25)));
    for point in points {
        out.push_str(&format!(
            "{:>14} {:>10}\n",
            format!("{:.2}%", point.default_rate_pct),
            format_percent(point.irr),
        ));
    }
    out
}

/// Year-by-year cash flow table
pub fn cash_flow_table(projection: &CashFlowProjection) -> String {
    let mut out = format!(
        "{:>6} {:>16} {:>16} {:>16} {:>16}\n",
        "Year", "Capital Call", "Cumulative Call", "Distribution", "Net CF"
    );
    out.push_str(&format!("{}\n", "-".repeat(74)));
    for row in projection.periods() {
        out.push_str(&format!(
            "{:>6} {:>16} {:>16} {:>16} {:>16}\n",
            row.year,
            format_currency(row.capital_call),
            format_currency(row.cumulative_call),
            format_currency(row.distribution),
            format_currency(row.net_cash_flow),
        ));
    }
    out
}

/// All sections of the dashboard as plain text
pub fn render_report(report: &PortfolioReport) -> String {
    [
        ("Fund-Level IRR & MOIC", fund_table(report)),
        ("Portfolio Results Summary", portfolio_summary(report)),
        ("IRR Sensitivity to Default Rate", sensitivity_table(&report.sensitivity)),
        ("Detailed Cash Flow Table", cash_flow_table(&report.portfolio_projection)),
    ]
    .iter()
    .map(|(title, body)| format!("{}\n\n{}", title, body))
    .collect::<Vec<_>>()
    .join("\n")
}

/// Write a projection as CSV with full precision
pub fn write_projection_csv<W: Write>(projection: &CashFlowProjection, writer: W) -> ModelResult<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["Entity", "Period", "Year", "CapitalCall", "CumulativeCall", "Distribution", "NetCF"])?;
    let entity = projection.entity().to_string();
    for row in projection.periods() {
        wtr.write_record([
            entity.clone(),
            row.period.to_string(),
            row.year.to_string(),
            row.capital_call.to_string(),
            row.cumulative_call.to_string(),
            row.distribution.to_string(),
            row.net_cash_flow.to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write the sensitivity curve as CSV; undefined IRRs are left empty
pub fn write_sensitivity_csv<W: Write>(points: &[SensitivityPoint], writer: W) -> ModelResult<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["DefaultRatePct", "IRR"])?;
    for point in points {
        wtr.write_record([
            point.default_rate_pct.to_string(),
            point.irr.map(|r| r.to_string()).unwrap_or_default(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// JSON output wrapper stamped with its generation time
#[derive(Debug, Serialize)]
pub struct ReportEnvelope<'a> {
    pub generated_at: DateTime<Utc>,
    pub report: &'a PortfolioReport,
}

impl<'a> ReportEnvelope<'a> {
    pub fn new(report: &'a PortfolioReport) -> Self {
        Self {
            generated_at: Utc::now(),
            report,
        }
    }

    pub fn to_json_pretty(&self) -> ModelResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
