//! Load portfolio configuration (JSON) and capital call schedules (CSV)
//!
//! Schedule files look like:
//!
//! ```text
//! Year,Oakhill,Oaktree,CVC,Ares
//! 2024,1500000,0,0,0
//! 2025,1050000,6000000,2500000,3500000
//! ```
//!
//! Funds missing from the header call nothing. Empty cells read as zero.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use super::data::{FundId, PortfolioConfig};
use super::schedule::{CapitalCallSchedule, ScheduledCall};
use crate::error::{ModelError, ModelResult};

/// Load a portfolio configuration from a JSON file
pub fn load_config(path: &Path) -> ModelResult<PortfolioConfig> {
    let file = File::open(path)?;
    let config: PortfolioConfig = serde_json::from_reader(file)?;
    config.validate()?;
    Ok(config)
}

/// Parse a portfolio configuration from a JSON string
pub fn config_from_json(json: &str) -> ModelResult<PortfolioConfig> {
    let config: PortfolioConfig = serde_json::from_str(json)?;
    config.validate()?;
    Ok(config)
}

/// Load a capital call schedule from a CSV file
pub fn load_schedule(path: &Path) -> ModelResult<CapitalCallSchedule> {
    let file = File::open(path)?;
    load_schedule_from_reader(file)
}

/// Load a capital call schedule from any CSV reader
pub fn load_schedule_from_reader<R: Read>(reader: R) -> ModelResult<CapitalCallSchedule> {
    let mut reader = csv::Reader::from_reader(reader);

    let headers = reader.headers()?.clone();
    match headers.get(0) {
        Some(h) if h.trim().eq_ignore_ascii_case("year") => {}
        other => {
            return Err(ModelError::invalid(
                "schedule header",
                format!("first column must be Year, found {:?}", other),
            ))
        }
    }

    let funds = headers
        .iter()
        .skip(1)
        .map(|h| h.parse::<FundId>())
        .collect::<ModelResult<Vec<_>>>()?;

    let mut start_year: Option<i32> = None;
    let mut entries = Vec::new();

    for result in reader.records() {
        let record = result?;
        let year_field = record.get(0).unwrap_or("").trim();
        let year: i32 = year_field
            .parse()
            .map_err(|_| ModelError::invalid("schedule.Year", format!("'{}' is not a year", year_field)))?;

        let first = *start_year.get_or_insert(year);
        if year < first {
            return Err(ModelError::invalid(
                "schedule.Year",
                format!("year {} precedes first year {}", year, first),
            ));
        }

        let mut calls = BTreeMap::new();
        for (fund, raw) in funds.iter().zip(record.iter().skip(1)) {
            let raw = raw.trim();
            let amount = if raw.is_empty() {
                0.0
            } else {
                raw.parse::<f64>().map_err(|_| {
                    ModelError::invalid(
                        format!("schedule[{}].{}", year, fund),
                        format!("'{}' is not a number", raw),
                    )
                })?
            };
            calls.insert(*fund, amount);
        }

        let period = year
            .checked_sub(first)
            .and_then(|offset| u32::try_from(offset).ok())
            .ok_or_else(|| {
                ModelError::invalid("schedule.Year", format!("year {} is too far from {}", year, first))
            })?;

        entries.push(ScheduledCall { period, calls });
    }

    CapitalCallSchedule::new(start_year.unwrap_or(0), entries)
}
