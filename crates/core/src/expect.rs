//! Condition waits and assertions.
//!
//! Page objects never sleep for a fixed time; they poll a condition with
//! [`wait_until`] and fail with [`ShopError::Timeout`] when it does not hold in
//! time. [`SoftAssertions`] collects failures so a scenario can report all of
//! them at the end instead of stopping at the first.

use std::fmt::Debug;
use std::future::Future;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;
use tracing::{debug, trace};

use crate::error::{Result, ShopError};

/// Delay between two evaluations of a polled condition.
pub const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Polls `check` until it returns `true` or `timeout` elapses.
///
/// Errors from `check` abort the wait immediately.
pub async fn wait_until<F, Fut>(timeout: Duration, condition: &str, mut check: F) -> Result<()>
where
	F: FnMut() -> Fut,
	Fut: Future<Output = Result<bool>>,
{
	let started = Instant::now();
	let deadline = started + timeout;
	loop {
		if check().await? {
			trace!(target = "shoptodo.expect", condition, elapsed_ms = started.elapsed().as_millis() as u64, "condition met");
			return Ok(());
		}
		let now = Instant::now();
		if now >= deadline {
			debug!(target = "shoptodo.expect", condition, "condition not met in time");
			return Err(ShopError::timeout(timeout.as_millis(), condition));
		}
		tokio::time::sleep(POLL_INTERVAL.min(deadline - now)).await;
	}
}

/// Polls `fetch` until it yields `expected`; the timeout error reports the last value seen.
pub async fn eventually_eq<T, F, Fut>(timeout: Duration, what: &str, expected: T, mut fetch: F) -> Result<()>
where
	T: PartialEq + Debug,
	F: FnMut() -> Fut,
	Fut: Future<Output = Result<T>>,
{
	let last: Mutex<Option<T>> = Mutex::new(None);
	let (last_seen, wanted) = (&last, &expected);
	let outcome = wait_until(timeout, what, move || {
		let fut = fetch();
		async move {
			let value = fut.await?;
			let done = value == *wanted;
			*last_seen.lock() = Some(value);
			Ok(done)
		}
	})
	.await;

	match outcome {
		Err(ShopError::Timeout { .. }) => {
			let last = last.into_inner();
			Err(ShopError::Assertion(format!("{what}: expected {expected:?}, last saw {last:?} after {}ms", timeout.as_millis())))
		}
		other => other,
	}
}

pub fn ensure(condition: bool, message: impl FnOnce() -> String) -> Result<()> {
	if condition { Ok(()) } else { Err(ShopError::Assertion(message())) }
}

pub fn ensure_eq<T: PartialEq + Debug>(actual: T, expected: T, what: &str) -> Result<()> {
	ensure(actual == expected, || format!("{what}: expected {expected:?}, got {actual:?}"))
}

/// Records failures without stopping the scenario.
#[derive(Debug, Default)]
pub struct SoftAssertions {
	failures: Mutex<Vec<String>>,
}

impl SoftAssertions {
	pub fn new() -> Self {
		Self::default()
	}

	/// Records `message` when `condition` is false. Returns `condition`.
	pub fn check(&self, condition: bool, message: impl FnOnce() -> String) -> bool {
		if !condition {
			let message = message();
			debug!(target = "shoptodo.expect", %message, "soft assertion failed");
			self.failures.lock().push(message);
		}
		condition
	}

	pub fn check_eq<T: PartialEq + Debug>(&self, actual: T, expected: T, what: &str) -> bool {
		let ok = actual == expected;
		self.check(ok, || format!("{what}: expected {expected:?}, got {actual:?}"))
	}

	/// Records a failed result. Assertion failures are kept as their message,
	/// anything else (timeouts, driver errors) is kept with its kind.
	pub fn record(&self, result: Result<()>) {
		match result {
			Ok(()) => {}
			Err(ShopError::Assertion(message)) => {
				self.failures.lock().push(message);
			}
			Err(ShopError::SoftAssertions(mut nested)) => {
				self.failures.lock().append(&mut nested);
			}
			Err(other) => {
				self.failures.lock().push(other.to_string());
			}
		}
	}

	pub fn len(&self) -> usize {
		self.failures.lock().len()
	}

	pub fn is_empty(&self) -> bool {
		self.failures.lock().is_empty()
	}

	pub fn failures(&self) -> Vec<String> {
		self.failures.lock().clone()
	}

	/// Fails with every recorded message, or succeeds when nothing was recorded.
	pub fn finish(self) -> Result<()> {
		let failures = self.failures.into_inner();
		if failures.is_empty() { Ok(()) } else { Err(ShopError::SoftAssertions(failures)) }
	}
}
