//! Error types for page objects, fixtures and backends.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ShopError>;

#[derive(Debug, Error)]
pub enum ShopError {
	/// An expectation did not hold.
	#[error("assertion failed: {0}")]
	Assertion(String),

	/// Failures collected by [`SoftAssertions`](crate::expect::SoftAssertions).
	#[error("{} soft assertion(s) failed:\n  - {}", .0.len(), .0.join("\n  - "))]
	SoftAssertions(Vec<String>),

	#[error("product \"{0}\" is not defined in the product table; add it to PRODUCTS in crates/core/src/data.rs")]
	MissingProduct(String),

	/// A bounded wait ran out. Distinct from a value mismatch.
	#[error("timed out after {ms}ms waiting for {condition}")]
	Timeout { ms: u64, condition: String },

	#[error("fixture `{name}` failed: {source}")]
	Fixture {
		name: &'static str,
		#[source]
		source: Box<ShopError>,
	},

	#[error("fixture dependency cycle: {}", .0.join(" -> "))]
	FixtureCycle(Vec<&'static str>),

	/// A single-element operation matched several elements.
	#[error("strict mode violation: {locator} resolved to {count} elements")]
	StrictMode { locator: String, count: usize },

	#[error("no element matches {0}")]
	ElementNotFound(String),

	#[error("{locator} is not actionable: {reason}")]
	NotActionable { locator: String, reason: String },

	#[error("invalid configuration: {0}")]
	Config(String),

	#[error("driver error: {0}")]
	Driver(#[source] shop_runtime::Error),

	#[error(transparent)]
	Io(#[from] std::io::Error),

	#[error(transparent)]
	Json(#[from] serde_json::Error),
}

impl ShopError {
	/// True for bounded waits that expired, including remote `TimeoutError`s and
	/// fixtures that failed because of one.
	pub fn is_timeout(&self) -> bool {
		match self {
			ShopError::Timeout { .. } => true,
			ShopError::Fixture { source, .. } => source.is_timeout(),
			ShopError::Driver(e) => e.is_timeout(),
			_ => false,
		}
	}

	pub fn is_assertion(&self) -> bool {
		matches!(self, ShopError::Assertion(_) | ShopError::SoftAssertions(_))
	}

	/// The innermost error below any fixture wrappers.
	pub fn root_cause(&self) -> &ShopError {
		match self {
			ShopError::Fixture { source, .. } => source.root_cause(),
			other => other,
		}
	}

	pub(crate) fn timeout(ms: u128, condition: impl Into<String>) -> Self {
		ShopError::Timeout {
			ms: u64::try_from(ms).unwrap_or(u64::MAX),
			condition: condition.into(),
		}
	}
}

impl From<shop_runtime::Error> for ShopError {
	fn from(err: shop_runtime::Error) -> Self {
		match err {
			shop_runtime::Error::Remote { ref name, ref message, .. } if name == "TimeoutError" => ShopError::Timeout {
				ms: timeout_ms_in(message).unwrap_or(0),
				condition: message.lines().next().unwrap_or_default().to_string(),
			},
			shop_runtime::Error::Timeout(condition) => ShopError::Timeout { ms: 0, condition },
			other => ShopError::Driver(other),
		}
	}
}

/// Extracts `15000` from driver messages like `Timeout 15000ms exceeded.`
fn timeout_ms_in(message: &str) -> Option<u64> {
	let rest = &message[message.find("Timeout ")? + "Timeout ".len()..];
	let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
	rest[digits.len()..].starts_with("ms").then(|| digits.parse().ok()).flatten()
}
