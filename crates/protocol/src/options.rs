//! Option payloads and shared constants.

use serde::{Deserialize, Serialize};

/// Default timeout in milliseconds when a call does not specify one.
///
/// Recent drivers reject calls without an explicit `timeout`, so every call site
/// fills it in.
pub const DEFAULT_TIMEOUT_MS: f64 = 30000.0;

/// Element state awaited by `waitForSelector`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WaitForState {
	Attached,
	Detached,
	Visible,
	Hidden,
}

impl WaitForState {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Attached => "attached",
			Self::Detached => "detached",
			Self::Visible => "visible",
			Self::Hidden => "hidden",
		}
	}
}

impl std::fmt::Display for WaitForState {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Browser engine exposed by the root Playwright object.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowserName {
	#[default]
	Chromium,
	Firefox,
	Webkit,
}

impl BrowserName {
	/// Key of this engine in the Playwright initializer.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Chromium => "chromium",
			Self::Firefox => "firefox",
			Self::Webkit => "webkit",
		}
	}
}

/// Parameters for `BrowserType.launch`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchOptions {
	pub headless: bool,
	pub timeout: f64,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub args: Vec<String>,
}

impl Default for LaunchOptions {
	fn default() -> Self {
		Self {
			headless: true,
			timeout: DEFAULT_TIMEOUT_MS,
			args: Vec::new(),
		}
	}
}
