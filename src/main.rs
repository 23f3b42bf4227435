use axum::extract::{FromRef, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use axum_prometheus::PrometheusMetricLayer;
use clap::{Args, Parser, Subcommand};
use listing_truth::config::{AppConfig, CollaboratorConfig};
use listing_truth::error::AppError;
use listing_truth::telemetry;
use listing_truth::workflows::listing::clients::{
    ApifyScraperClient, ClaudeTextClient, ClaudeVisionClient, StreetViewClient,
};
use listing_truth::workflows::listing::{AnalysisReport, ImageAnalysis, ListingAnalysisService};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Deserialize;
use serde_json::json;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

type HttpAnalysisService = ListingAnalysisService<
    ApifyScraperClient,
    StreetViewClient,
    ClaudeVisionClient,
    ClaudeTextClient,
>;
type SharedAnalyzer = Arc<HttpAnalysisService>;

#[derive(Clone)]
struct AppState {
    readiness: Arc<AtomicBool>,
    metrics: PrometheusHandle,
    analyzer: SharedAnalyzer,
}

impl FromRef<AppState> for Arc<AtomicBool> {
    fn from_ref(state: &AppState) -> Self {
        state.readiness.clone()
    }
}

impl FromRef<AppState> for PrometheusHandle {
    fn from_ref(state: &AppState) -> Self {
        state.metrics.clone()
    }
}

impl FromRef<AppState> for SharedAnalyzer {
    fn from_ref(state: &AppState) -> Self {
        state.analyzer.clone()
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "Listing Truth Finder",
    about = "Score real-estate listings for photo, price, and language risk",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Analyze a single listing URL and print the report
    Analyze(AnalyzeArgs),
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    port: Option<u16>,
}

#[derive(Args, Debug)]
struct AnalyzeArgs {
    /// Listing detail-page URL to analyze
    url: String,
    /// Print the raw JSON report instead of the text rendering
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Deserialize)]
struct AnalyzeRequest {
    url: String,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => run_server(args).await,
        Command::Analyze(args) => run_analyze(args).await,
    }
}

fn build_analyzer(collaborators: &CollaboratorConfig) -> HttpAnalysisService {
    ListingAnalysisService::new(
        ApifyScraperClient::new(
            collaborators.apify_token.clone(),
            collaborators.scraper_endpoint.clone(),
        ),
        StreetViewClient::new(collaborators.maps_api_key.clone()),
        ClaudeVisionClient::new(
            collaborators.anthropic_api_key.clone(),
            collaborators.anthropic_model.clone(),
        ),
        ClaudeTextClient::new(
            collaborators.anthropic_api_key.clone(),
            collaborators.anthropic_model.clone(),
        ),
    )
}

async fn run_server(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let state = AppState {
        readiness: readiness_flag.clone(),
        metrics: prometheus_handle,
        analyzer: Arc::new(build_analyzer(&config.collaborators)),
    };

    let app = Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/v1/listing/analyze", post(analyze_endpoint))
        .layer(prometheus_layer)
        .with_state(state);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "listing truth finder ready");

    axum::serve(listener, app).await?;
    Ok(())
}

async fn run_analyze(args: AnalyzeArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let analyzer = build_analyzer(&config.collaborators);
    let report = analyzer.analyze(&args.url).await?;

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).unwrap_or_else(|_| "{}".to_string())
        );
    } else {
        render_report(&report);
    }

    Ok(())
}

async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn readiness_endpoint(State(readiness): State<Arc<AtomicBool>>) -> impl IntoResponse {
    let ready = readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

async fn metrics_endpoint(State(metrics): State<PrometheusHandle>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        metrics.render(),
    )
}

async fn analyze_endpoint(
    State(analyzer): State<SharedAnalyzer>,
    Json(payload): Json<AnalyzeRequest>,
) -> Result<Json<AnalysisReport>, AppError> {
    let report = analyzer.analyze(&payload.url).await?;
    Ok(Json(report))
}

fn render_report(report: &AnalysisReport) {
    println!("Listing analysis");
    println!("Address: {}", report.listing.address);
    if let Some(price) = report.listing.price {
        println!("Asking price: ${price}");
    }

    println!(
        "\nOverall risk: {} (score {}/100, {} flag(s))",
        report.overall_risk.level.label(),
        report.overall_risk.score,
        report.overall_risk.flag_count
    );

    println!("\nExterior photo check");
    match &report.image_analysis {
        ImageAnalysis::Skipped { reason } => println!("- skipped: {reason}"),
        ImageAnalysis::Completed {
            confidence,
            risk_level,
            discrepancies,
            verdict,
            ..
        } => {
            println!(
                "- {} (confidence {confidence}): {verdict}",
                risk_level.label()
            );
            for discrepancy in discrepancies {
                println!("  - {discrepancy}");
            }
        }
    }

    let price = &report.price_analysis;
    println!("\nPrice history");
    println!(
        "- {} (confidence {}): {} drop(s), {}% total decrease, {} day(s) on market",
        price.risk_level.label(),
        price.confidence,
        price.drop_count,
        price.total_decrease,
        price.days_on_market
    );
    println!("- {}", price.explanation);

    let text = &report.text_analysis;
    println!("\nDescription language");
    if text.red_flags.is_empty() {
        println!(
            "- {} (confidence {}): no red flags detected",
            text.risk_level.label(),
            text.confidence
        );
    } else {
        println!(
            "- {} (confidence {}): {} red flag(s)",
            text.risk_level.label(),
            text.confidence,
            text.red_flags.len()
        );
        for flag in &text.red_flags {
            println!("  - \"{}\" -> {}", flag.phrase, flag.translation);
        }
    }

    if report.recommendations.is_empty() {
        println!("\nRecommendations: none");
    } else {
        println!("\nRecommendations");
        for recommendation in &report.recommendations {
            println!("- {recommendation}");
        }
    }
}
