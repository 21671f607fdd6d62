use axum::{
    Router,
    extract::{Json, rejection::JsonRejection},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use serde_json::Value;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

use crate::core::{
    SeverancePayTaxInput, TaxBreakdown, TaxError, check_ranges, compute_breakdown,
    compute_severance_pay_withholding_tax,
};

const DEFAULT_PORT: u16 = 3000;
const INVALID_PARAMETER: &str = "Invalid parameter.";

#[derive(Parser, Debug)]
#[command(
    name = "severance-tax",
    about = "Withholding income tax on Japanese lump-sum severance pay"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Enable debug logging")]
    pub verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the calculation over HTTP at POST /calc-tax
    Serve(ServeArgs),
    /// Compute one payment and print every stage as JSON
    Calc(CalcArgs),
}

#[derive(Args, Debug)]
struct ServeArgs {
    #[arg(
        long,
        env = "SEVERANCE_TAX_HOST",
        default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED)
    )]
    host: IpAddr,
    #[arg(long, env = "SEVERANCE_TAX_PORT", default_value_t = DEFAULT_PORT)]
    port: u16,
}

#[derive(Args, Debug)]
struct CalcArgs {
    #[arg(long, help = "Full years of service, 1 to 100")]
    years_of_service: u32,
    #[arg(long, help = "Severance payment in yen")]
    severance_pay: u64,
    #[arg(long, help = "Retirement caused directly by becoming disabled")]
    disability: bool,
    #[arg(long, help = "Payee is an officer such as a company director")]
    officer: bool,
}

impl From<&CalcArgs> for SeverancePayTaxInput {
    fn from(value: &CalcArgs) -> Self {
        SeverancePayTaxInput {
            years_of_service: value.years_of_service,
            is_disability: value.disability,
            is_officer: value.officer,
            severance_pay: value.severance_pay,
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Tax(#[from] TaxError),
    #[error("failed to encode output: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Serialize)]
struct TaxResponse {
    tax: u64,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    message: String,
}

pub async fn run(cli: Cli) -> Result<(), AppError> {
    match cli.command {
        Command::Serve(args) => {
            run_http_server(SocketAddr::new(args.host, args.port)).await?;
        }
        Command::Calc(args) => {
            println!("{}", calc_json(&args)?);
        }
    }
    Ok(())
}

fn calc_json(args: &CalcArgs) -> Result<String, AppError> {
    let input = SeverancePayTaxInput::from(args);
    check_ranges(&input)?;
    Ok(render_breakdown(&compute_breakdown(&input))?)
}

fn render_breakdown(breakdown: &TaxBreakdown) -> serde_json::Result<String> {
    serde_json::to_string(breakdown)
}

pub fn router() -> Router {
    Router::new()
        .route("/calc-tax", post(calc_tax_handler))
        .fallback(not_found_handler)
}

pub async fn run_http_server(addr: SocketAddr) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "severance tax API listening");

    axum::serve(listener, router())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("severance tax API stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "could not listen for ctrl-c, serving until killed");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}

async fn calc_tax_handler(payload: Result<Json<Value>, JsonRejection>) -> Response {
    let payload = match payload {
        Ok(Json(payload)) => payload,
        Err(rejection) => {
            warn!(%rejection, "unreadable calc-tax body");
            return error_response(StatusCode::BAD_REQUEST, INVALID_PARAMETER);
        }
    };

    match compute_severance_pay_withholding_tax(&payload) {
        Ok(tax) => {
            debug!(tax, "computed severance pay withholding tax");
            json_response(StatusCode::OK, TaxResponse { tax })
        }
        Err(e) => {
            warn!(error = %e, "rejected calc-tax payload");
            error_response(StatusCode::BAD_REQUEST, INVALID_PARAMETER)
        }
    }
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            message: msg.to_string(),
        },
    )
}
