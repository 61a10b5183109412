//! Driver process lifecycle.

use std::process::Stdio;
use std::time::Duration;

use tokio::process::{Child, Command};
use tracing::{debug, info};

use crate::driver::{DriverPaths, locate_driver};
use crate::error::{Error, Result};
use crate::transport::{PipeTransport, TransportParts};

/// A running `node cli.js run-driver` child process.
///
/// The driver speaks the protocol over its stdin/stdout; stderr is inherited so
/// driver crashes show up in the test output.
#[derive(Debug)]
pub struct DriverProcess {
	child: Child,
}

impl DriverProcess {
	/// Locates the driver and spawns it.
	///
	/// # Errors
	///
	/// [`Error::DriverNotFound`] when no driver is installed, [`Error::LaunchFailed`] when
	/// the process cannot start or exits immediately.
	pub async fn launch() -> Result<(Self, TransportParts)> {
		let paths = locate_driver()?;
		Self::launch_with(&paths).await
	}

	/// Spawns the driver at the given location.
	pub async fn launch_with(paths: &DriverPaths) -> Result<(Self, TransportParts)> {
		let mut cmd = Command::new(&paths.node);
		cmd.arg(&paths.cli)
			.arg("run-driver")
			.env("PW_LANG_NAME", "rust")
			.env("PW_LANG_NAME_VERSION", env!("CARGO_PKG_RUST_VERSION"))
			.env("PW_CLI_DISPLAY_VERSION", env!("CARGO_PKG_VERSION"))
			.stdin(Stdio::piped())
			.stdout(Stdio::piped())
			.stderr(Stdio::inherit())
			.kill_on_drop(true);

		for passthrough in ["PLAYWRIGHT_BROWSERS_PATH", "PLAYWRIGHT_SKIP_BROWSER_DOWNLOAD"] {
			if let Some(value) = std::env::var_os(passthrough) {
				cmd.env(passthrough, value);
			}
		}

		let mut child = cmd.spawn().map_err(|e| Error::LaunchFailed(format!("failed to spawn driver: {e}")))?;

		tokio::time::sleep(Duration::from_millis(100)).await;
		if let Some(status) = child.try_wait()? {
			return Err(Error::LaunchFailed(format!("driver exited immediately with status {status}")));
		}

		let stdin = child.stdin.take().ok_or_else(|| Error::LaunchFailed("driver stdin not captured".to_string()))?;
		let stdout = child.stdout.take().ok_or_else(|| Error::LaunchFailed("driver stdout not captured".to_string()))?;

		info!(target = "shop.driver", node = %paths.node.display(), "driver started");
		Ok((Self { child }, PipeTransport::new(stdin, stdout)))
	}

	/// Terminates the driver and reaps it.
	pub async fn shutdown(mut self) -> Result<()> {
		self.child
			.kill()
			.await
			.map_err(|e| Error::LaunchFailed(format!("failed to kill driver: {e}")))?;
		let _ = tokio::time::timeout(Duration::from_secs(5), self.child.wait()).await;
		debug!(target = "shop.driver", "driver stopped");
		Ok(())
	}
}
