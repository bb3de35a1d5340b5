use std::num::NonZeroU16;
use std::path::PathBuf;
use std::sync::Arc;

use axum::routing::get;
use clap::{Parser, ValueHint};
use log::LevelFilter;
use tokio::signal;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;

mod config;
mod labs;
mod process;
mod routes;

#[tokio::main(flavor = "current_thread")] // single-threaded, multi requires rt-multi-thread feature
async fn main() -> std::io::Result<()> {
    env_logger::builder()
        .filter_level(LevelFilter::Info)
        .filter(Some("tower_http"), LevelFilter::Debug)
        .filter(Some("labcheck_server"), LevelFilter::Debug)
        .parse_default_env()
        .init();

    let CliArgs {
        host,
        port,
        data_root,
        scripts_root,
        python,
    } = CliArgs::parse();

    log::info!(
        version = env!("CARGO_PKG_VERSION");
        "Initializing server"
    );

    if !data_root.is_dir() {
        log::warn!(
            path:debug = data_root;
            "lab data directory does not exist, the lab listing will be empty"
        );
    }

    let config = Arc::new(ServerConfig {
        data_root,
        scripts_root,
        python,
    });

    let router = routes::routes(config)
        .route("/health", get(|| async { "OK" }))
        .layer(TraceLayer::new_for_http());

    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    log::info!(
        addr:display = host,
        port = port.get();
        "listening to TCP"
    );

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
}

#[derive(Parser)]
struct CliArgs {
    /// The host address for the lab check server.
    #[arg(
        long,
        value_name = "URI",
        value_hint = ValueHint::Hostname,
        default_value = "0.0.0.0",
        env = "LABCHECK_HOST",
    )]
    host: String,
    /// The host port for the lab check server.
    #[arg(
        short,
        long,
        value_name = "PORT",
        value_hint = ValueHint::Other,
        default_value = "5000",
        env = "LABCHECK_PORT",
    )]
    port: NonZeroU16,
    /// The directory with one subdirectory per lab, holding the student
    /// submissions.
    #[arg(
        long,
        value_name = "DIR",
        value_hint = ValueHint::DirPath,
        default_value = "lab_data",
        env = "LABCHECK_DATA_ROOT",
    )]
    data_root: PathBuf,
    /// The directory with one `{lab}_check.py` checker script per lab.
    #[arg(
        long,
        value_name = "DIR",
        value_hint = ValueHint::DirPath,
        default_value = "lab_scripts",
        env = "LABCHECK_SCRIPTS_ROOT",
    )]
    scripts_root: PathBuf,
    /// The interpreter the checker scripts are run with.
    #[arg(
        long,
        value_name = "PATH",
        value_hint = ValueHint::CommandName,
        default_value = "python3",
        env = "LABCHECK_PYTHON",
    )]
    python: PathBuf,
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install SIGINT (ctrl+c) handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => log::info!("received SIGINT (ctrl+c), shutting down"),
        () = terminate => log::info!("received SIGTERM, shutting down"),
    }
}
