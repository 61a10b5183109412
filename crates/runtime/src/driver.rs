//! Locating the Playwright driver (`node` + `cli.js`).
//!
//! Search order:
//! 1. `PLAYWRIGHT_NODE_EXE` and `PLAYWRIGHT_CLI_JS`
//! 2. `PLAYWRIGHT_DRIVER_PATH` (a driver directory: `node` + `package/cli.js`)
//! 3. global npm install (`npm root -g`)
//! 4. local npm install (`npm root`)
//!
//! A candidate whose `node` is not runnable falls back to the `node` on PATH.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Resolved driver location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverPaths {
	pub node: PathBuf,
	pub cli: PathBuf,
}

/// Finds a runnable driver.
///
/// # Errors
///
/// Returns [`Error::DriverNotFound`] when no candidate is usable.
pub fn locate_driver() -> Result<DriverPaths> {
	let candidates: [(&str, fn() -> Option<DriverPaths>); 4] = [
		("PLAYWRIGHT_NODE_EXE/PLAYWRIGHT_CLI_JS", from_node_cli_env),
		("PLAYWRIGHT_DRIVER_PATH", from_driver_path_env),
		("npm global", || from_npm_root(&["root", "-g"])),
		("npm local", || from_npm_root(&["root"])),
	];

	for (label, probe) in candidates {
		let Some(paths) = probe() else {
			debug!(target = "shop.driver", source = label, "no driver candidate");
			continue;
		};
		if let Some(paths) = usable_or_fallback(label, paths) {
			debug!(target = "shop.driver", source = label, node = %paths.node.display(), cli = %paths.cli.display(), "using driver");
			return Ok(paths);
		}
	}

	Err(Error::DriverNotFound)
}

fn usable_or_fallback(label: &str, paths: DriverPaths) -> Option<DriverPaths> {
	if node_is_usable(&paths.node) {
		return Some(paths);
	}

	warn!(
		target = "shop.driver",
		source = label,
		node = %paths.node.display(),
		"driver node is not runnable; trying node from PATH"
	);

	let fallback = find_node_executable().ok()?;
	if fallback == paths.node || !node_is_usable(&fallback) {
		return None;
	}
	Some(DriverPaths { node: fallback, cli: paths.cli })
}

fn from_node_cli_env() -> Option<DriverPaths> {
	let node = PathBuf::from(std::env::var_os("PLAYWRIGHT_NODE_EXE")?);
	let cli = PathBuf::from(std::env::var_os("PLAYWRIGHT_CLI_JS")?);
	(node.exists() && cli.exists()).then_some(DriverPaths { node, cli })
}

fn from_driver_path_env() -> Option<DriverPaths> {
	let dir = PathBuf::from(std::env::var_os("PLAYWRIGHT_DRIVER_PATH")?);
	driver_dir_paths(&dir)
}

/// Paths inside an unpacked driver directory, if both files exist.
pub fn driver_dir_paths(dir: &Path) -> Option<DriverPaths> {
	let node = if cfg!(windows) { dir.join("node.exe") } else { dir.join("node") };
	let cli = dir.join("package").join("cli.js");
	(node.exists() && cli.exists()).then_some(DriverPaths { node, cli })
}

fn from_npm_root(args: &[&str]) -> Option<DriverPaths> {
	let output = Command::new("npm").args(args).output().ok()?;
	if !output.status.success() {
		return None;
	}
	let root = PathBuf::from(String::from_utf8_lossy(&output.stdout).trim());
	let cli = playwright_cli_in(&root)?;
	let node = find_node_executable().ok()?;
	Some(DriverPaths { node, cli })
}

/// Finds `cli.js` of a `playwright` or `@playwright/test` package under `node_modules`.
pub fn playwright_cli_in(node_modules: &Path) -> Option<PathBuf> {
	[node_modules.join("playwright"), node_modules.join("@playwright").join("test")]
		.into_iter()
		.map(|dir| dir.join("cli.js"))
		.find(|cli| cli.exists())
}

fn node_is_usable(node: &Path) -> bool {
	Command::new(node)
		.arg("--version")
		.stdout(Stdio::null())
		.stderr(Stdio::null())
		.status()
		.map(|status| status.success())
		.unwrap_or(false)
}

fn find_node_executable() -> Result<PathBuf> {
	let which = if cfg!(windows) { "where" } else { "which" };
	if let Ok(output) = Command::new(which).arg("node").output() {
		if output.status.success() {
			let stdout = String::from_utf8_lossy(&output.stdout);
			if let Some(path) = stdout.lines().next().map(PathBuf::from).filter(|p| p.exists()) {
				return Ok(path);
			}
		}
	}

	let common: &[&str] = if cfg!(windows) {
		&["C:\\Program Files\\nodejs\\node.exe", "C:\\Program Files (x86)\\nodejs\\node.exe"]
	} else {
		&["/usr/local/bin/node", "/usr/bin/node", "/opt/homebrew/bin/node"]
	};

	common
		.iter()
		.map(PathBuf::from)
		.find(|p| p.exists())
		.ok_or_else(|| Error::LaunchFailed("Node.js executable not found; install Node.js or set PLAYWRIGHT_NODE_EXE".to_string()))
}
