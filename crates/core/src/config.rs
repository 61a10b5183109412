//! Suite configuration.
//!
//! Values come from defaults, then an optional JSON file, then environment:
//!
//! | Source | Key |
//! |--------|-----|
//! | file | `$SHOPTODO_CONFIG`, else `./shoptodo.json` when present |
//! | env | `SHOPTODO_BASE_URL`, `SHOPTODO_BACKEND`, `SHOPTODO_PROFILE`, `SHOPTODO_HEADLESS` |

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, ShopError};

pub const DEFAULT_BASE_URL: &str = "https://toasagi.github.io/shoptodo-app/";
pub const CONFIG_FILE_NAME: &str = "shoptodo.json";

/// Which page implementation scenarios run against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
	/// In-memory storefront; no browser needed.
	#[default]
	Sim,
	/// Real Chromium through the Playwright driver.
	Playwright,
}

impl FromStr for Backend {
	type Err = ShopError;

	fn from_str(s: &str) -> Result<Self> {
		match s.trim().to_ascii_lowercase().as_str() {
			"sim" | "simulator" => Ok(Self::Sim),
			"playwright" | "browser" => Ok(Self::Playwright),
			other => Err(ShopError::Config(format!("unknown backend `{other}` (expected `sim` or `playwright`)"))),
		}
	}
}

/// Fixture profile, chosen once per suite.
///
/// Under [`Profile::Authenticated`] the catalog and cart fixtures are bound to a
/// page that has already logged in as the demo user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
	#[default]
	Guest,
	Authenticated,
}

impl FromStr for Profile {
	type Err = ShopError;

	fn from_str(s: &str) -> Result<Self> {
		match s.trim().to_ascii_lowercase().as_str() {
			"guest" => Ok(Self::Guest),
			"authenticated" | "auth" => Ok(Self::Authenticated),
			other => Err(ShopError::Config(format!("unknown profile `{other}` (expected `guest` or `authenticated`)"))),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SuiteConfig {
	pub base_url: String,
	pub backend: Backend,
	pub profile: Profile,
	pub headless: bool,
	pub action_timeout_ms: u64,
	pub navigation_timeout_ms: u64,
	pub expect_timeout_ms: u64,
	/// Search box debounce. The in-memory storefront applies it and search
	/// waits span at least one such window.
	pub search_debounce_ms: u64,
}

impl Default for SuiteConfig {
	fn default() -> Self {
		Self {
			base_url: DEFAULT_BASE_URL.to_string(),
			backend: Backend::Sim,
			profile: Profile::Guest,
			headless: true,
			action_timeout_ms: 15_000,
			navigation_timeout_ms: 30_000,
			expect_timeout_ms: 10_000,
			search_debounce_ms: 300,
		}
	}
}

impl SuiteConfig {
	/// Loads the file (if any) and applies environment overrides.
	pub fn load() -> Result<Self> {
		let mut config = match config_path() {
			Some(path) => Self::from_file(&path)?,
			None => Self::default(),
		};
		config.apply_overrides(|key| std::env::var(key).ok())?;
		debug!(target = "shoptodo.config", ?config, "loaded suite config");
		Ok(config)
	}

	pub fn from_file(path: &Path) -> Result<Self> {
		let raw = std::fs::read_to_string(path).map_err(|e| ShopError::Config(format!("cannot read {}: {e}", path.display())))?;
		serde_json::from_str(&raw).map_err(|e| ShopError::Config(format!("{}: {e}", path.display())))
	}

	/// Applies `SHOPTODO_*` overrides read through `lookup`.
	pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
		if let Some(url) = lookup("SHOPTODO_BASE_URL") {
			self.base_url = url;
		}
		if let Some(backend) = lookup("SHOPTODO_BACKEND") {
			self.backend = backend.parse()?;
		}
		if let Some(profile) = lookup("SHOPTODO_PROFILE") {
			self.profile = profile.parse()?;
		}
		if let Some(headless) = lookup("SHOPTODO_HEADLESS") {
			self.headless = parse_bool(&headless).ok_or_else(|| ShopError::Config(format!("SHOPTODO_HEADLESS must be a boolean, got `{headless}`")))?;
		}
		self.validate()
	}

	fn validate(&self) -> Result<()> {
		if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
			return Err(ShopError::Config(format!("base URL must be http(s), got `{}`", self.base_url)));
		}
		for (name, value) in [
			("actionTimeoutMs", self.action_timeout_ms),
			("navigationTimeoutMs", self.navigation_timeout_ms),
			("expectTimeoutMs", self.expect_timeout_ms),
		] {
			if value == 0 {
				return Err(ShopError::Config(format!("{name} must be greater than zero")));
			}
		}
		Ok(())
	}

	/// Resolves `path` against the base URL. Absolute URLs pass through.
	pub fn url(&self, path: &str) -> String {
		if path.starts_with("http://") || path.starts_with("https://") {
			return path.to_string();
		}
		let base = self.base_url.trim_end_matches('/');
		let path = path.trim_start_matches('/');
		if path.is_empty() { format!("{base}/") } else { format!("{base}/{path}") }
	}

	pub fn action_timeout(&self) -> Duration {
		Duration::from_millis(self.action_timeout_ms)
	}

	pub fn navigation_timeout(&self) -> Duration {
		Duration::from_millis(self.navigation_timeout_ms)
	}

	pub fn expect_timeout(&self) -> Duration {
		Duration::from_millis(self.expect_timeout_ms)
	}

	pub fn search_debounce(&self) -> Duration {
		Duration::from_millis(self.search_debounce_ms)
	}
}

fn config_path() -> Option<PathBuf> {
	if let Some(path) = std::env::var_os("SHOPTODO_CONFIG") {
		return Some(PathBuf::from(path));
	}
	let local = PathBuf::from(CONFIG_FILE_NAME);
	local.is_file().then_some(local)
}

fn parse_bool(value: &str) -> Option<bool> {
	match value.trim().to_ascii_lowercase().as_str() {
		"1" | "true" | "yes" | "on" => Some(true),
		"0" | "false" | "no" | "off" => Some(false),
		_ => None,
	}
}
