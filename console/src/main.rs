//! Console entry-point: loads the alias and transfer tables once and logs
//! them alongside the backend statistics.

use std::sync::Arc;

use color_eyre::eyre::{Result, WrapErr, eyre};
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use extras_console::domain::{Collaborators, ExtrasConsole};
use extras_console::outbound::http::HttpExtrasBackend;
use extras_console::settings::ConsoleSettings;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = ConsoleSettings::load_from_iter(std::env::args_os())
        .wrap_err("failed to load console settings")?;
    let backend = build_backend(&settings)?;
    let console = ExtrasConsole::new(Arc::new(backend), Collaborators::headless());

    let report = console.load().await;
    for alias in console.alias_rows() {
        info!(
            id = %alias.id,
            label = %alias.label,
            owners = %alias.owners,
            active = alias.active,
            "alias"
        );
    }
    for transfer in console.transfer_rows() {
        info!(
            id = %transfer.id,
            alias = %transfer.alias_label,
            name = %transfer.name,
            created = %transfer.created_date,
            end = %transfer.end_date,
            active = transfer.active,
            "transfer"
        );
    }
    match console.statistics().await {
        Ok(statistics) => info!(
            total = statistics.total_aliases,
            active = statistics.active_aliases,
            inactive = statistics.inactive_aliases,
            transferred = %statistics.total_transferred,
            "statistics"
        ),
        Err(e) => warn!(error = %e, "statistics unavailable"),
    }
    console.dispose();

    if report.is_complete() {
        return Ok(());
    }
    let stages = report
        .failures
        .iter()
        .map(|(stage, error)| format!("{stage:?}: {error}"))
        .collect::<Vec<_>>()
        .join("; ");
    Err(eyre!("initial load incomplete ({stages})"))
}

fn build_backend(settings: &ConsoleSettings) -> Result<HttpExtrasBackend> {
    let base_url = settings.base_url()?;
    let timeout = settings.request_timeout()?;
    let backend = HttpExtrasBackend::new(base_url, timeout)
        .wrap_err("failed to build backend HTTP client")?;
    Ok(match settings.auth_token() {
        Some(token) => backend.with_auth_token(token),
        None => backend,
    })
}
