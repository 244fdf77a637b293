//! AWS Lambda handler for portfolio reports
//!
//! Accepts a portfolio configuration as a JSON body and returns the full report:
//! stressed projections, fund and portfolio IRR/MOIC, and the sensitivity curve.
//!
//! Supports Lambda Function URLs for direct HTTP access.

use std::time::Instant;

use chrono::{DateTime, Utc};
use lambda_http::{run, service_fn, Body, Error, Request, Response};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::json;

use fund_commitment_model::{
    CapitalCallSchedule, PortfolioConfig, PortfolioReport, ScenarioRunner, SensitivityGrid,
};

/// Input for one report
#[derive(Debug, Deserialize)]
pub struct ProjectionRequest {
    /// Commitments, rates, horizon, and IRR basis; omitted fields use the reference values
    #[serde(flatten)]
    pub config: PortfolioConfig,

    /// Capital call schedule (default: reference 2024-2027 schedule)
    #[serde(default)]
    pub schedule: Option<CapitalCallSchedule>,

    /// Default-rate sweep (default: 0-10% by 0.5%)
    #[serde(default)]
    pub sensitivity_grid: Option<SensitivityGrid>,
}

/// Output from the handler
#[derive(Debug, Serialize)]
pub struct ProjectionResponse {
    pub report: PortfolioReport,
    pub generated_at: DateTime<Utc>,
    pub execution_time_ms: u64,
}

/// Request body as text. Base64 payloads arrive already decoded as `Binary`.
fn body_text(body: &Body) -> Result<&str, String> {
    match body {
        Body::Text(s) => Ok(s.as_str()),
        Body::Binary(bytes) => {
            std::str::from_utf8(bytes).map_err(|e| format!("Body is not UTF-8: {}", e))
        }
        Body::Empty => Ok("{}"),
    }
}

fn parse_request(text: &str) -> Result<ProjectionRequest, String> {
    serde_json::from_str(text).map_err(|e| format!("Invalid JSON: {}", e))
}

fn build_report(request: ProjectionRequest) -> Result<PortfolioReport, String> {
    let mut runner = ScenarioRunner::with_schedule(request.schedule.unwrap_or_default());
    if let Some(grid) = request.sensitivity_grid {
        runner = runner.with_grid(grid);
    }

    runner.run(&request.config).map_err(|e| e.to_string())
}

fn cors_builder(status: u16) -> lambda_http::http::response::Builder {
    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .header("Access-Control-Allow-Methods", "POST, OPTIONS")
        .header("Access-Control-Allow-Headers", "Content-Type")
}

fn error_response(status: u16, message: &str) -> Result<Response<Body>, Error> {
    warn!("request rejected: {}", message);
    let body = json!({ "error": message }).to_string();
    Ok(cors_builder(status).body(Body::Text(body))?)
}

/// Handle one HTTP request
fn respond(event: &Request) -> Result<Response<Body>, Error> {
    let start = Instant::now();

    // CORS preflight
    if event.method().as_str() == "OPTIONS" {
        return Ok(cors_builder(200).body(Body::Empty)?);
    }

    let request = match body_text(event.body()).and_then(parse_request) {
        Ok(r) => r,
        Err(message) => return error_response(400, &message),
    };

    let report = match build_report(request) {
        Ok(r) => r,
        Err(message) => return error_response(400, &message),
    };

    info!(
        "report: IRR {:?}, MOIC {:?}",
        report.portfolio_performance.irr, report.portfolio_performance.moic
    );

    let response = ProjectionResponse {
        report,
        generated_at: Utc::now(),
        execution_time_ms: start.elapsed().as_millis() as u64,
    };
    Ok(cors_builder(200).body(Body::Text(serde_json::to_string(&response)?))?)
}

async fn handler(event: Request) -> Result<Response<Body>, Error> {
    respond(&event)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();
    run(service_fn(handler)).await
}
