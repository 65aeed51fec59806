mod cmd;

use clap::Parser;
use cmd::run::RunArgs;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "rulepin",
    about = "Keep one AdGuard Home user rule pinned to the bottom of the rule list",
    version
)]
struct Cli {
    /// Probe the liveness endpoint of the instance running on HEALTH_PORT and exit
    #[arg(long)]
    health: bool,

    #[command(flatten)]
    args: RunArgs,
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.health {
        tracing::Level::WARN
    } else {
        tracing::Level::INFO
    };

    let rust_log = std::env::var("RUST_LOG").ok();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(rust_log.as_deref(), default_level))
        .with_target(false)
        .init();

    let result = if cli.health {
        cmd::probe::run(cli.args.health_port.as_deref())
    } else {
        cmd::run::run(cli.args)
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

/// `RUST_LOG` when set and valid, otherwise `default_level` for everything.
fn log_filter(rust_log: Option<&str>, default_level: tracing::Level) -> EnvFilter {
    rust_log
        .filter(|s| !s.trim().is_empty())
        .and_then(|s| EnvFilter::try_new(s).ok())
        .unwrap_or_else(|| EnvFilter::default().add_directive(default_level.into()))
}
