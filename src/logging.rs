use std::error::Error;
use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::config::state_dir;

pub const LOG_ENV: &str = "TIMELINE_LOG";
const LOG_FILE: &str = "timeline_lanes.log";

/// Installs a file-backed subscriber when `TIMELINE_LOG` holds a filter such as `debug` or
/// `timeline_lanes::interaction=debug`. Returns the log path when logging is active.
///
/// The dashboard owns the terminal, so events never go to stdout or stderr.
pub fn init_logging() -> Result<Option<PathBuf>, Box<dyn Error>> {
	if std::env::var_os(LOG_ENV).is_none() {
		return Ok(None);
	}
	let filter = EnvFilter::try_from_env(LOG_ENV)?;

	let dir = state_dir();
	fs::create_dir_all(&dir)?;
	let path = dir.join(LOG_FILE);
	let file = OpenOptions::new().create(true).append(true).open(&path)?;

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(Mutex::new(file))
		.with_ansi(false)
		.with_target(true)
		.try_init()
		.map_err(|err| -> Box<dyn Error> { err })?;

	tracing::info!(path = %path.display(), "logging initialized");
	Ok(Some(path))
}
