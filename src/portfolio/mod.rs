//! Portfolio inputs: fund commitments, run configuration, and the capital call schedule

mod data;
mod schedule;
pub mod loader;

pub use data::{
    aggregate_commitments, default_loss, FundId, IrrBasis, PortfolioConfig,
    DEFAULT_COMMITMENTS, DEFAULT_DEFAULT_RATE_PCT, DEFAULT_DISTRIBUTION_YIELD_PCT,
    DEFAULT_HORIZON_YEARS, DEFAULT_RECOVERY_RATE_PCT, MAX_HORIZON_YEARS,
};
pub use schedule::{CapitalCallSchedule, ScheduledCall, DEFAULT_START_YEAR};
pub use loader::{load_config, load_schedule, load_schedule_from_reader, config_from_json};
