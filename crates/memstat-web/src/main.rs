mod handlers;
mod openapi;
mod state;

use std::process;
use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use clap::Parser;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tracing::level_filters::LevelFilter;
use tracing::{Level, error, info};
use tracing_subscriber::EnvFilter;

#[cfg(target_os = "linux")]
use memstat_core::collector::RealFs;
#[cfg(not(target_os = "linux"))]
use memstat_core::collector::mock::MockFs;
use memstat_core::collector::{Collector, JemallocProbe};
use memstat_core::model::InstanceId;

use state::{MemorySource, SharedState, WebAppInner};

// ============================================================
// CLI
// ============================================================

#[derive(Parser)]
#[command(
    name = "memstat-web",
    about = "Host memory and process statistics over HTTP",
    version = memstat_core::VERSION
)]
struct Args {
    /// Listen address.
    #[arg(long, default_value = "0.0.0.0:8080", env = "MEMSTAT_LISTEN")]
    listen: String,

    /// Path to /proc filesystem.
    #[arg(long, default_value = "/proc", env = "MEMSTAT_PROC_PATH")]
    proc_path: String,

    /// Path to the user database used to name process owners.
    #[arg(long, default_value = "/etc/passwd", env = "MEMSTAT_PASSWD_PATH")]
    passwd_path: String,

    /// Increase logging verbosity (-v for debug, -vv for trace). Default is info level.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode - only show errors.
    #[arg(short, long)]
    quiet: bool,
}

/// Initializes the tracing subscriber with the appropriate log level.
/// `RUST_LOG` directives take precedence over the flags.
fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level).into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

// ============================================================
// Main
// ============================================================

fn main() {
    let args = Args::parse();

    init_logging(args.verbose, args.quiet);

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!(error = %e, "failed to build tokio runtime");
            process::exit(1);
        }
    };

    if let Err(e) = runtime.block_on(async_main(args)) {
        error!(error = %e, "server error");
        process::exit(1);
    }
}

async fn async_main(args: Args) -> std::io::Result<()> {
    let instance_id = InstanceId::generate();
    info!(
        version = memstat_core::VERSION,
        id = %instance_id,
        proc_path = %args.proc_path,
        "starting"
    );

    let state: SharedState = Arc::new(WebAppInner::new(create_source(&args), instance_id));

    let app = build_router(state)
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new());

    let listener = tokio::net::TcpListener::bind(&args.listen).await?;
    info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, app).await
}

/// Routes without middleware, shared by `main` and the handler tests.
pub(crate) fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/api/v1/health", get(handlers::handle_health))
        .route("/api/v1/memory", get(handlers::handle_memory))
        .route("/api-docs/openapi.json", get(handlers::handle_openapi))
        .with_state(state)
}

fn create_source(args: &Args) -> Box<dyn MemorySource> {
    #[cfg(target_os = "linux")]
    let fs = RealFs::new();
    #[cfg(not(target_os = "linux"))]
    let fs = MockFs::typical_system();

    let collector = Collector::with_passwd(
        fs,
        &args.proc_path,
        &args.passwd_path,
        JemallocProbe::new(),
    );
    info!(
        window_ms = collector.process_sampler().window().as_millis() as u64,
        passwd_path = %args.passwd_path,
        "collector ready"
    );

    Box::new(collector)
}
