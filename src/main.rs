//! diary-mood-status binary entrypoint.
//! Runs the pipeline once: recent diary entries → dominant emotion → profile status.

use anyhow::{bail, Result};
use diary_mood_status::{build_action, config::AppConfig};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// `RUST_LOG` wins; otherwise our crate at info, everything else at warn.
/// `LOG_FORMAT=json` switches to JSON lines (CI logs).
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("diary_mood_status=info,warn"));

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact())
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env locally; no-op when the file is absent (CI secrets).
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = AppConfig::from_env()?;
    tracing::debug!(?cfg, "config loaded");

    let action = build_action(&cfg)?;
    let report = action.run().await?;

    if !report.published {
        bail!("Failed to update status ({} entries read)", report.entries);
    }
    Ok(())
}
