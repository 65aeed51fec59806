use anyhow::Context;
use clap::Args;
use rulepin_core::config::{Config, ConfigInput};
use rulepin_core::health::HealthState;
use rulepin_core::scheduler::Scheduler;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info};

// ---------------------------------------------------------------------------
// Arguments
// ---------------------------------------------------------------------------

/// Settings for the reconciliation loop. Each flag falls back to its
/// environment variable; validation happens in `ConfigInput::validate`.
#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// AdGuard Home base URL, e.g. http://adguard:3000
    #[arg(long = "url", env = "ADGUARD_URL")]
    pub url: Option<String>,

    /// AdGuard Home username
    #[arg(long = "user", env = "ADGUARD_USER")]
    pub user: Option<String>,

    /// AdGuard Home password
    #[arg(long = "password", env = "ADGUARD_PASS", hide_env_values = true)]
    pub password: Option<String>,

    /// Rule that must stay last, matched exactly
    #[arg(long = "target-rule", env = "TARGET_RULE")]
    pub target_rule: Option<String>,

    /// Seconds between checks [default: 60]
    #[arg(long = "interval", env = "CHECK_INTERVAL")]
    pub check_interval: Option<String>,

    /// Port for the /healthz and /readyz endpoints [default: 8080]
    #[arg(long = "health-port", env = "HEALTH_PORT")]
    pub health_port: Option<String>,

    /// Body encoding for set_rules: json or text [default: json]
    #[arg(long = "write-format", env = "WRITE_FORMAT")]
    pub write_format: Option<String>,
}

impl From<RunArgs> for ConfigInput {
    fn from(args: RunArgs) -> Self {
        ConfigInput {
            url: args.url,
            user: args.user,
            password: args.password,
            target_rule: args.target_rule,
            check_interval: args.check_interval,
            health_port: args.health_port,
            write_format: args.write_format,
        }
    }
}

// ---------------------------------------------------------------------------
// run
// ---------------------------------------------------------------------------

pub fn run(args: RunArgs) -> anyhow::Result<()> {
    info!("starting rulepin");

    let config = ConfigInput::from(args)
        .validate()
        .context("invalid configuration")?;
    info!(
        url = %config.base_url,
        target_rule = %config.target_rule,
        interval_secs = config.check_interval.as_secs(),
        health_port = config.health_port,
        write_format = %config.write_format,
        "configuration loaded"
    );

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(run_loop(config))
}

async fn run_loop(config: Config) -> anyhow::Result<()> {
    let health = Arc::new(HealthState::new());
    let scheduler = Scheduler::from_config(&config, Arc::clone(&health))?;
    let (stop_tx, stop_rx) = watch::channel(false);

    let server = spawn_health_server(config.health_port, Arc::clone(&health), stop_rx.clone()).await;

    tokio::select! {
        _ = scheduler.run(stop_rx) => {}
        _ = shutdown_signal() => {
            info!("shutdown signal received");
        }
    }

    let _ = stop_tx.send(true);
    if let Some(server) = server {
        server.await.context("health server task panicked")?;
    }
    Ok(())
}

/// Bind and spawn the probe server. A bind failure is logged and clears
/// `server_up`; reconciliation runs regardless.
async fn spawn_health_server(
    port: u16,
    health: Arc<HealthState>,
    mut stop: watch::Receiver<bool>,
) -> Option<JoinHandle<()>> {
    let listener = match tokio::net::TcpListener::bind(("0.0.0.0", port)).await {
        Ok(l) => l,
        Err(e) => {
            health.set_server_up(false);
            error!("failed to bind health server on port {port}: {e}");
            return None;
        }
    };

    let shutdown = async move {
        let _ = stop.wait_for(|stopped| *stopped).await;
    };
    Some(tokio::spawn(async move {
        // Errors are logged and reflected in `server_up` by serve_on.
        let _ = rulepin_server::serve_on(listener, health, shutdown).await;
    }))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("failed to listen for ctrl-c: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
