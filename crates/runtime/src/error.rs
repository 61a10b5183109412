//! Error types for the driver runtime.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
	/// No usable node + cli.js pair was found.
	#[error("Playwright driver not found. Install with `npm install -g playwright` or set PLAYWRIGHT_DRIVER_PATH")]
	DriverNotFound,

	#[error("failed to launch Playwright driver: {0}")]
	LaunchFailed(String),

	/// stdio framing failure.
	#[error("transport error: {0}")]
	Transport(String),

	/// Malformed or unexpected protocol traffic.
	#[error("protocol error: {0}")]
	Protocol(String),

	/// Error raised inside the driver.
	#[error("{name}: {message}")]
	Remote {
		/// e.g. "TimeoutError", "Error", "TargetClosedError"
		name: String,
		message: String,
		stack: Option<String>,
	},

	#[error("timeout: {0}")]
	Timeout(String),

	#[error("object not found: {0}")]
	ObjectNotFound(String),

	/// The driver went away while a call was pending.
	#[error("connection closed")]
	ChannelClosed,

	#[error(transparent)]
	Io(#[from] std::io::Error),

	#[error(transparent)]
	Json(#[from] serde_json::Error),
}

impl Error {
	/// Returns true for local timeouts and remote `TimeoutError`s.
	pub fn is_timeout(&self) -> bool {
		match self {
			Error::Timeout(_) => true,
			Error::Remote { name, .. } => name == "TimeoutError",
			_ => false,
		}
	}

	/// Returns true when the page, context or browser was already closed.
	pub fn is_target_closed(&self) -> bool {
		match self {
			Error::ChannelClosed => true,
			Error::Remote { name, .. } => name == "TargetClosedError",
			_ => false,
		}
	}
}
