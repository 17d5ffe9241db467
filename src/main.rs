use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use axum_prometheus::PrometheusMetricLayer;
use clap::{Args, Parser, Subcommand};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use talent_ai::config::{AppConfig, InferenceConfig};
use talent_ai::error::AppError;
use talent_ai::telemetry;
use talent_ai::workflows::screening::adapter::http::InferenceScoringAdapter;
use talent_ai::workflows::screening::{
    screening_router, CandidateDocument, DocumentId, RoleDescription, RoleId, ScreeningService,
    ScreeningSession,
};
use tracing::info;

#[derive(Clone)]
struct AppState {
    readiness: Arc<AtomicBool>,
    metrics: PrometheusHandle,
}

#[derive(Parser, Debug)]
#[command(
    name = "Talent Screening Orchestrator",
    about = "Run the bulk candidate screening service from the command line",
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
    /// Screen a directory of candidate documents against a role description
    Screen(ScreenArgs),
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
struct ScreenArgs {
    /// Role description file (plain text)
    #[arg(long)]
    role: PathBuf,
    /// Directory of candidate documents to score
    #[arg(long)]
    candidates: PathBuf,
    /// Documents per scoring call
    #[arg(long)]
    batch_size: Option<usize>,
    /// Cap on concurrent scoring calls
    #[arg(long)]
    max_in_flight: Option<usize>,
    /// Write the ranked results to a CSV file
    #[arg(long)]
    csv: Option<PathBuf>,
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
        Command::Screen(args) => run_screen(args).await,
    }
}

fn build_adapter(config: &InferenceConfig) -> Result<InferenceScoringAdapter, AppError> {
    let adapter = InferenceScoringAdapter::new(
        config.endpoint.clone(),
        config.api_key.clone(),
        config.model.clone(),
        Duration::from_secs(config.timeout_secs),
    )?;
    Ok(adapter)
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

    let adapter = build_adapter(&config.inference)?;
    let service = Arc::new(ScreeningService::new(
        Arc::new(adapter),
        config.screening.clone(),
    ));

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let state = AppState {
        readiness: readiness_flag.clone(),
        metrics: prometheus_handle,
    };

    let app = Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .with_state(state)
        .merge(screening_router(service))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "screening orchestrator ready");

    axum::serve(listener, app).await?;
    Ok(())
}

async fn run_screen(args: ScreenArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let role = load_role(&args.role)?;
    let documents = load_candidates(&args.candidates)?;

    let mut screening = config.screening.clone();
    if let Some(batch_size) = args.batch_size {
        screening.batch_size = batch_size;
    }
    if let Some(cap) = args.max_in_flight {
        screening.max_in_flight = cap;
    }

    let adapter = build_adapter(&config.inference)?;
    let service = ScreeningService::new(Arc::new(adapter), screening);

    let session = service.run_to_completion(role, documents).await?;
    render_session(&session);

    if let Some(path) = args.csv {
        write_session_csv(&session, &path)?;
        println!("\nRanked results written to {}", path.display());
    }

    Ok(())
}

async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn readiness_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "starting" })
    };

    (status, Json(payload))
}

async fn metrics_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

fn load_role(path: &Path) -> Result<RoleDescription, AppError> {
    let content = fs::read_to_string(path)?;
    let source_document = file_name_of(path);
    let display_name = match source_document.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem.to_string(),
        _ => source_document.clone(),
    };

    Ok(RoleDescription {
        id: RoleId(display_name.clone()),
        display_name,
        content,
        source_document,
    })
}

fn load_candidates(dir: &Path) -> Result<Vec<CandidateDocument>, AppError> {
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect();
    paths.sort();

    let mut documents = Vec::with_capacity(paths.len());
    for path in paths {
        let display_name = file_name_of(&path);
        let content = fs::read_to_string(&path)?;
        documents.push(CandidateDocument {
            id: DocumentId(display_name.clone()),
            display_name,
            content,
        });
    }

    Ok(documents)
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn render_session(session: &ScreeningSession) {
    println!("Screening session {}", session.token.0);
    println!(
        "Role: {} (started {})",
        session.role_name,
        session.started_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!("Candidates screened: {}", session.record_count());

    println!("\nRanked candidates");
    for (position, record) in session.records.iter().enumerate() {
        let email = if record.email.is_empty() {
            String::new()
        } else {
            format!(" <{}>", record.email)
        };
        println!(
            "{:>3}. {}{} | match {} | compatibility {} | {} | {}",
            position + 1,
            record.candidate_name,
            email,
            record.match_score,
            record.compatibility_score,
            record.disposition.label(),
            record.source_document
        );
        if !record.key_skills.is_empty() {
            println!("     skills: {}", record.key_skills);
        }
        if !record.feedback.is_empty() {
            println!("     notes: {}", record.feedback);
        }
    }
}

fn session_csv_rows(session: &ScreeningSession) -> Vec<Vec<String>> {
    session
        .records
        .iter()
        .enumerate()
        .map(|(position, record)| {
            vec![
                (position + 1).to_string(),
                record.candidate_name.clone(),
                record.email.clone(),
                record.match_score.to_string(),
                record.compatibility_score.to_string(),
                record.disposition.label().to_string(),
                record.key_skills.clone(),
                record.feedback.clone(),
                record.source_document.clone(),
            ]
        })
        .collect()
}

fn write_session_csv(session: &ScreeningSession, path: &Path) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record([
        "rank",
        "candidate",
        "email",
        "match_score",
        "compatibility_score",
        "disposition",
        "key_skills",
        "feedback",
        "source_document",
    ])?;
    for row in session_csv_rows(session) {
        writer.write_record(&row)?;
    }
    writer.flush()?;
    Ok(())
}
