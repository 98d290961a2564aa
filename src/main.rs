use std::process::ExitCode;

use clap::Parser;
use dotenvy::dotenv;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use supa_smoke::config::SmokeConfig;
use supa_smoke::errors::SmokeError;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<ExitCode> {
	// .env first so clap's `env` fallbacks can see it
	dotenv().ok();

	let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "warn,supa_smoke=info".into());
	tracing_subscriber::registry()
		.with(tracing_subscriber::EnvFilter::new(env_filter))
		.with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
		.try_init()
		.ok();

	let cfg = SmokeConfig::parse();
	let stdout = std::io::stdout();
	let mut out = stdout.lock();
	match supa_smoke::run(&cfg, &mut out).await {
		Ok(summary) => Ok(ExitCode::from(summary.exit_code() as u8)),
		Err(e @ SmokeError::Config(_)) => {
			tracing::error!(error = %e, "unusable configuration");
			eprintln!("{}", e);
			Ok(ExitCode::from(2))
		}
		Err(e) => Err(anyhow::Error::from(e).context("smoke run aborted")),
	}
}
