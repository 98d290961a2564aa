pub mod checks;
pub mod client;
pub mod config;
pub mod errors;
pub mod models;
pub mod report;

use std::io::Write;

use crate::checks::run_all;
use crate::client::SupabaseClient;
use crate::config::SmokeConfig;
use crate::errors::SmokeResult;
use crate::report::{write_all, write_banner, Summary};

pub const BANNER: &str = "Supabase后端集成自动化验证";

/// Runs the four checks against `cfg` and renders everything to `out`.
/// Only configuration and output errors surface here; check failures land in the summary.
pub async fn run(cfg: &SmokeConfig, out: &mut impl Write) -> SmokeResult<Summary> {
	let client = SupabaseClient::new(cfg)?;
	cfg.inspect_anon_key();
	tracing::info!(base = cfg.base(), started_at = %models::now_iso(), "running smoke checks");
	write_banner(out, BANNER)?;
	let reports = run_all(&client, cfg).await;
	let summary = write_all(out, &reports, cfg.frontend_url())?;
	out.flush()?;
	Ok(summary)
}
