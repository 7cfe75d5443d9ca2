use std::env;
use std::fmt::{Display, Formatter};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::interaction::LayoutMetrics;
use crate::window::DEFAULT_BASE_DAY_WIDTH;

const APP_DIR: &str = "timeline_lanes";
const CONFIG_FILE: &str = "config.toml";
const DEFAULT_LANE_HEIGHT: f64 = 56.0;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
	pub layout: LayoutConfig,
	pub dashboard: DashboardConfig,
}

/// Pixel geometry of the timeline itself.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
	pub base_day_width: f64,
	pub lane_height: f64,
}

impl Default for LayoutConfig {
	fn default() -> Self {
		Self {
			base_day_width: DEFAULT_BASE_DAY_WIDTH,
			lane_height: DEFAULT_LANE_HEIGHT,
		}
	}
}

impl LayoutConfig {
	pub fn metrics(&self) -> LayoutMetrics {
		LayoutMetrics {
			base_day_width: self.base_day_width,
			lane_height: self.lane_height,
		}
	}
}

/// How many pixels one terminal cell stands for.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
	pub cell_width: f64,
	pub cell_height: f64,
	pub double_click_ms: u64,
}

impl Default for DashboardConfig {
	fn default() -> Self {
		Self {
			cell_width: 8.0,
			cell_height: 28.0,
			double_click_ms: 400,
		}
	}
}

#[derive(Debug)]
pub enum ConfigError {
	Io(PathBuf, std::io::Error),
	TomlDecode(toml::de::Error),
	Invalid(String),
}

impl Display for ConfigError {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self {
			ConfigError::Io(path, err) => write!(f, "failed to read config {}: {err}", path.display()),
			ConfigError::TomlDecode(err) => write!(f, "failed to parse config: {err}"),
			ConfigError::Invalid(message) => write!(f, "invalid config: {message}"),
		}
	}
}

impl std::error::Error for ConfigError {}

/// Loads the config from `--config`, `TIMELINE_CONFIG` or the default location.
///
/// A missing file at the default location means defaults; a missing explicit file is an error.
pub fn load_config(cli_path: Option<PathBuf>) -> Result<Config, ConfigError> {
	let explicit = cli_path.or_else(|| env_path("TIMELINE_CONFIG"));
	let (path, required) = match explicit {
		Some(path) => (absolutize(path), true),
		None => (config_dir().join(CONFIG_FILE), false),
	};

	let raw = match fs::read_to_string(&path) {
		Ok(raw) => raw,
		Err(err) if err.kind() == ErrorKind::NotFound && !required => return Ok(Config::default()),
		Err(err) => return Err(ConfigError::Io(path, err)),
	};

	parse_config(&raw)
}

pub fn parse_config(raw: &str) -> Result<Config, ConfigError> {
	let config: Config = toml::from_str(raw).map_err(ConfigError::TomlDecode)?;
	validate(&config)?;
	Ok(config)
}

fn validate(config: &Config) -> Result<(), ConfigError> {
	let positive = [
		("layout.base_day_width", config.layout.base_day_width),
		("layout.lane_height", config.layout.lane_height),
		("dashboard.cell_width", config.dashboard.cell_width),
		("dashboard.cell_height", config.dashboard.cell_height),
	];
	for (key, value) in positive {
		if !value.is_finite() || value <= 0.0 {
			return Err(ConfigError::Invalid(format!("{key} must be a positive number, got {value}")));
		}
	}
	Ok(())
}

/// Seed file from `--seed` or `TIMELINE_SEED`; `None` selects the built-in sample items.
pub fn resolve_seed_path(cli_path: Option<PathBuf>) -> Option<PathBuf> {
	cli_path.or_else(|| env_path("TIMELINE_SEED")).map(absolutize)
}

pub fn state_dir() -> PathBuf {
	if let Some(path) = env::var_os("TIMELINE_STATE_DIR") {
		return PathBuf::from(path);
	}

	#[cfg(target_os = "windows")]
	{
		if let Some(path) = env::var_os("LOCALAPPDATA") {
			return PathBuf::from(path).join(APP_DIR);
		}
	}

	if let Some(path) = env::var_os("XDG_STATE_HOME") {
		return PathBuf::from(path).join(APP_DIR);
	}

	if let Some(path) = env::var_os("HOME") {
		return PathBuf::from(path).join(".local").join("state").join(APP_DIR);
	}

	PathBuf::from(".timeline_lanes")
}

fn config_dir() -> PathBuf {
	#[cfg(target_os = "windows")]
	{
		if let Some(path) = env::var_os("APPDATA") {
			return PathBuf::from(path).join(APP_DIR);
		}
	}

	if let Some(path) = env::var_os("XDG_CONFIG_HOME") {
		return PathBuf::from(path).join(APP_DIR);
	}

	if let Some(path) = env::var_os("HOME") {
		return PathBuf::from(path).join(".config").join(APP_DIR);
	}

	PathBuf::from(".timeline_lanes")
}

fn env_path(key: &str) -> Option<PathBuf> {
	let path = PathBuf::from(env::var_os(key)?);
	if path.as_os_str().is_empty() {
		None
	} else {
		Some(path)
	}
}

fn absolutize(path: PathBuf) -> PathBuf {
	let path = if path.is_absolute() {
		path
	} else if let Ok(cwd) = env::current_dir() {
		cwd.join(path)
	} else {
		path
	};

	if path.exists() {
		fs::canonicalize(&path).unwrap_or(path)
	} else {
		path
	}
}

pub fn display_path(path: Option<&Path>) -> String {
	path.map(|path| path.display().to_string())
		.unwrap_or_else(|| "built-in sample".to_string())
}
