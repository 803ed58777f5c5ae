//! murmur: Bilibili comment assistant.
//!
//! Serves the HTTP API for unreplied comments and replies, and runs a Dify
//! workflow on a recurring schedule.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use miette::Result;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use murmur_bilibili::{BilibiliClient, Credential, DEFAULT_API_URL, DEFAULT_MEMBER_URL};
use murmur_comments::CommentService;
use murmur_dify::{DEFAULT_BASE_URL, WorkflowClient};
use murmur_scheduler::Scheduler;
use murmur_web::{AppState, create_router};

mod workflow_job;

/// Parse boolean from environment variable, accepting common truthy values.
/// Accepts "1", "true", "yes", "on" (case-insensitive) as true.
/// Accepts "0", "false", "no", "off", "" (case-insensitive) as false.
fn parse_bool_env(s: &str) -> Result<bool, String> {
    match s.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(format!(
            "invalid boolean value '{}', expected 1/true/yes/on or 0/false/no/off",
            s
        )),
    }
}

#[derive(Parser, Debug)]
#[command(name = "murmur")]
#[command(about = "Bilibili comment assistant with a scheduled Dify workflow", long_about = None)]
struct Cli {
    /// Bilibili SESSDATA cookie
    #[arg(long, env = "BILIBILI_SESSDATA", hide_env_values = true)]
    sessdata: String,

    /// Bilibili bili_jct cookie, also used as the CSRF token
    #[arg(long, env = "BILIBILI_BILI_JCT", hide_env_values = true)]
    bili_jct: String,

    /// Account id of the creator; their own comments count as replies
    #[arg(long, env = "BILIBILI_MID")]
    mid: String,

    /// Bilibili public API base URL
    #[arg(long, env = "BILIBILI_API_URL", default_value = DEFAULT_API_URL)]
    bilibili_api_url: String,

    /// Bilibili creator-center base URL
    #[arg(long, env = "BILIBILI_MEMBER_URL", default_value = DEFAULT_MEMBER_URL)]
    bilibili_member_url: String,

    /// Dify API base URL
    #[arg(long, env = "DIFY_BASE_URL", default_value = DEFAULT_BASE_URL)]
    dify_base_url: String,

    /// Dify workflow app API key
    #[arg(long, env = "DIFY_API_KEY", hide_env_values = true)]
    dify_api_key: String,

    /// Hours between scheduled workflow runs
    #[arg(
        long,
        env = "SCHEDULER_INTERVAL_HOURS",
        default_value = "1",
        value_parser = clap::value_parser!(u32).range(1..=24)
    )]
    interval_hours: u32,

    /// Timeout for a single workflow call, in seconds
    #[arg(
        long,
        env = "DIFY_REQUEST_TIMEOUT",
        default_value = "30",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    request_timeout: u64,

    /// Start the scheduler when the server boots
    #[arg(long, env = "AUTO_START_SCHEDULER", value_parser = parse_bool_env, action = clap::ArgAction::Set, default_value = "true")]
    auto_start: bool,

    /// HTTP server port
    #[arg(long, env = "MURMUR_PORT", default_value = "8000")]
    port: u16,

    /// Log file, written in addition to stdout
    #[arg(long, env = "MURMUR_LOG_FILE", default_value = "murmur.log")]
    log_file: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Held until exit so buffered lines reach the file
    let _log_guard = init_tracing(&cli.log_file)?;

    run_server(cli).await
}

/// Log to stdout and to `log_file`.
fn init_tracing(log_file: &Path) -> Result<WorkerGuard> {
    let file_name = log_file
        .file_name()
        .ok_or_else(|| miette::miette!("invalid log file path: {}", log_file.display()))?;
    let dir = match log_file.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let appender = tracing_appender::rolling::never(dir, file_name);
    let (file_writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "murmur=info,tower_http=info".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(file_writer),
        )
        .init();

    Ok(guard)
}

async fn run_server(cli: Cli) -> Result<()> {
    let bilibili = BilibiliClient::with_urls(
        &cli.bilibili_api_url,
        &cli.bilibili_member_url,
        Credential::new(cli.sessdata, cli.bili_jct),
    );
    let comments = CommentService::new(Arc::new(bilibili), cli.mid);

    let workflow = Arc::new(
        WorkflowClient::new(&cli.dify_base_url, cli.dify_api_key)
            .with_timeout(Duration::from_secs(cli.request_timeout)),
    );

    let scheduler = Arc::new(Scheduler::new(workflow_job::executor(Arc::clone(
        &workflow,
    ))));

    info!(
        owner = %comments.owner_id(),
        dify_base_url = %cli.dify_base_url,
        interval_hours = cli.interval_hours,
        "starting murmur"
    );

    if cli.auto_start {
        match scheduler.start(cli.interval_hours).await {
            Ok(job) => info!(name = %job.name, "scheduler auto-started"),
            Err(e) => warn!(error = %e, "failed to auto-start scheduler"),
        }
    }

    let state = Arc::new(AppState::new(
        comments,
        workflow,
        Arc::clone(&scheduler),
        cli.interval_hours,
    ));
    let router = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], cli.port));
    info!("starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| miette::miette!("failed to bind to {}: {}", addr, e))?;

    let served = axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| miette::miette!("{}", e));

    scheduler.shutdown().await;
    info!("murmur stopped");

    served
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
