// crates/edge/src/cli.rs

use crate::{
    error::Error,
    router, settings,
    state::{AppState, Services, StateConfig},
};
use chrono::Utc;
use clap::{builder::ValueHint, Parser, Subcommand};
use domain::setting::Settings;
use std::{net::SocketAddr, path::PathBuf, process::ExitCode};
use tokio::net::TcpListener;
use tracing::{error, info};

pub type Result<T> = std::result::Result<T, Error>;

/// Storefront CLI
#[tokio::main(flavor = "multi_thread")]
#[tracing::instrument(skip_all)]
pub async fn start() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Serve(serve) => do_serve(serve).await,
    };

    result.map_or_else(
        |e| {
            error!("Storefront stopped with an error: {}", e);
            ExitCode::FAILURE
        },
        |_| {
            info!("Storefront stopped");
            ExitCode::SUCCESS
        },
    )
}

#[tracing::instrument(skip_all)]
async fn do_serve(cmd: ServeCmd) -> Result<()> {
    let then = Utc::now();
    let process = StartProcess::<CommandIssued>::load_settings(cmd)?;
    info!(
        "Settings loaded in {} milliseconds",
        Utc::now().timestamp_millis() - then.timestamp_millis()
    );

    let then = Utc::now();
    let process = process.init_services()?;
    info!(
        "Services initialized in {} milliseconds",
        Utc::now().timestamp_millis() - then.timestamp_millis()
    );

    process.serve().await
}

#[derive(Parser, Debug)]
#[command(name = "storefront", version, about = "Commerce + CMS storefront server")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve the storefront over HTTP
    Serve(ServeCmd),
}

#[derive(Parser, Debug)]
pub struct ServeCmd {
    /// Settings file (TOML). Environment variables prefixed `STOREFRONT__`
    /// override it and can replace it entirely.
    #[arg(
        long,
        value_name = "FILE",
        env = "STOREFRONT_CONFIG",
        value_hint = ValueHint::FilePath,
        value_parser = file_must_exist
    )]
    pub config: Option<PathBuf>,
}

fn file_must_exist(s: &str) -> std::result::Result<PathBuf, String> {
    let p = PathBuf::from(s);
    if !p.is_file() {
        return Err(format!("Not a file: {}", p.display()));
    }
    Ok(p)
}

// ─────────────────────────────────────────────────────────────────────────────
// Start process state machine
// ─────────────────────────────────────────────────────────────────────────────

trait ProcessState {}

struct CommandIssued;

struct SettingsLoaded {
    settings: Settings,
}

struct ServicesReady {
    settings: Settings,
    services: Services,
    state: AppState,
}

impl ProcessState for CommandIssued {}
impl ProcessState for SettingsLoaded {}
impl ProcessState for ServicesReady {}

struct StartProcess<S: ProcessState> {
    state: S,
}

impl StartProcess<CommandIssued> {
    #[tracing::instrument(skip_all)]
    fn load_settings(cmd: ServeCmd) -> Result<StartProcess<SettingsLoaded>> {
        let settings = settings::load(cmd.config.as_deref())?;
        Ok(StartProcess {
            state: SettingsLoaded { settings },
        })
    }
}

impl StartProcess<SettingsLoaded> {
    #[tracing::instrument(skip_all)]
    fn init_services(self) -> Result<StartProcess<ServicesReady>> {
        let settings = self.state.settings;
        let services = Services::init(&settings)?;
        let state = AppState::new(services.backends(), StateConfig::from_settings(&settings))?;

        Ok(StartProcess {
            state: ServicesReady {
                settings,
                services,
                state,
            },
        })
    }
}

impl StartProcess<ServicesReady> {
    /// Serve until Ctrl-C, then tear the services down.
    #[tracing::instrument(skip_all)]
    async fn serve(self) -> Result<()> {
        let ServicesReady {
            settings,
            services,
            state,
        } = self.state;

        let addr = SocketAddr::new(settings.server.ip, settings.server.port);
        let listener = TcpListener::bind(addr).await?;
        info!("Listening on http://{}", addr);

        let served = axum::serve(listener, router::build(state))
            .with_graceful_shutdown(shutdown_signal())
            .await;

        services.shutdown();
        Ok(served?)
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
