use anyhow::{anyhow, Context, Result};
use rulepin_core::config::parse_health_port;
use std::time::Duration;

const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// `rulepin --health`: query the local instance's /healthz once.
pub fn run(health_port: Option<&str>) -> Result<()> {
    let port = parse_health_port(health_port.filter(|p| !p.is_empty()))
        .context("invalid configuration")?;
    probe(&format!("http://127.0.0.1:{port}/healthz"))
}

fn probe(url: &str) -> Result<()> {
    let agent = ureq::AgentBuilder::new().timeout(PROBE_TIMEOUT).build();
    match agent.get(url).call() {
        Ok(_) => Ok(()),
        Err(ureq::Error::Status(code, _)) => Err(anyhow!("{url} returned status {code}")),
        Err(e) => Err(anyhow!("{url} unreachable: {e}")),
    }
}
