//! [`PageDriver`] over a real browser, through the Playwright driver.
//!
//! One [`BrowserSession`] owns the driver process and a launched browser;
//! [`BrowserSession::new_page`] opens an isolated browser context per test.
//! Page operations map onto `Frame` methods of the main frame.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Value, json};
use shop_protocol::{BrowserName, LaunchOptions, WaitForState};
use shop_runtime::{Channel, Connection, DriverProcess};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::PageDriver;
use crate::config::SuiteConfig;
use crate::error::{Result, ShopError};
use crate::locator::Locator;

/// A driver process with one launched browser.
pub struct BrowserSession {
	process: Mutex<Option<DriverProcess>>,
	connection: Arc<Connection>,
	browser: Channel,
	dispatch: JoinHandle<()>,
	config: Arc<SuiteConfig>,
}

impl std::fmt::Debug for BrowserSession {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("BrowserSession").field("browser", &self.browser.guid()).finish_non_exhaustive()
	}
}

impl BrowserSession {
	/// Starts the driver and launches Chromium.
	///
	/// # Errors
	///
	/// [`ShopError::Driver`] wrapping `DriverNotFound` when no Playwright install is
	/// found; callers use that to skip live runs.
	pub async fn launch(config: Arc<SuiteConfig>) -> Result<Self> {
		let (process, parts) = DriverProcess::launch().await?;
		let connection = Arc::new(Connection::new(parts));

		let dispatch = {
			let connection = Arc::clone(&connection);
			tokio::spawn(async move {
				if let Err(e) = connection.run().await {
					warn!(target = "shoptodo.browser", error = %e, "dispatch loop failed");
				}
			})
		};

		let playwright = connection.initialize().await?;
		let browser_type = playwright
			.initializer_ref(BrowserName::Chromium.as_str())
			.ok_or_else(|| ShopError::Driver(shop_runtime::Error::Protocol("Playwright initializer has no chromium".to_string())))?;
		let browser_type = Channel::new(browser_type, Arc::clone(&connection));

		let options = LaunchOptions {
			headless: config.headless,
			timeout: config.navigation_timeout_ms as f64,
			..LaunchOptions::default()
		};
		let launched: Value = browser_type.send("launch", options).await?;
		let browser = connection.result_object(&launched, "browser").await?;
		info!(target = "shoptodo.browser", headless = config.headless, guid = %browser.guid, "browser launched");

		Ok(Self {
			process: Mutex::new(Some(process)),
			browser: Channel::new(Arc::clone(&browser.guid), Arc::clone(&connection)),
			connection,
			dispatch,
			config,
		})
	}

	/// Opens a fresh context and page.
	pub async fn new_page(&self) -> Result<BrowserPage> {
		let created: Value = self.browser.send("newContext", json!({})).await?;
		let context = self.connection.result_object(&created, "context").await?;
		let context = Channel::new(Arc::clone(&context.guid), Arc::clone(&self.connection));

		let created: Value = context.send("newPage", json!({})).await?;
		let page = self.connection.result_object(&created, "page").await?;
		let frame_guid = page
			.initializer_ref("mainFrame")
			.ok_or_else(|| ShopError::Driver(shop_runtime::Error::Protocol("page initializer has no mainFrame".to_string())))?;
		let frame = self.connection.wait_for_object(frame_guid).await?;
		debug!(target = "shoptodo.browser", page = %page.guid, frame = %frame.guid, "page opened");

		Ok(BrowserPage {
			context,
			frame: Channel::new(Arc::clone(&frame.guid), Arc::clone(&self.connection)),
			action_timeout: self.config.action_timeout(),
			navigation_timeout: self.config.navigation_timeout(),
		})
	}

	/// Closes the browser and stops the driver.
	pub async fn close(&self) -> Result<()> {
		if let Err(e) = self.browser.send_no_result("close", json!({})).await {
			debug!(target = "shoptodo.browser", error = %e, "browser close failed");
		}
		let process = self.process.lock().take();
		if let Some(process) = process {
			process.shutdown().await?;
		}
		self.dispatch.abort();
		Ok(())
	}
}

/// One isolated page (its own browser context).
#[derive(Debug)]
pub struct BrowserPage {
	context: Channel,
	frame: Channel,
	action_timeout: Duration,
	navigation_timeout: Duration,
}

impl BrowserPage {
	fn timeout_ms(&self) -> f64 {
		self.action_timeout.as_millis() as f64
	}

	/// Frame call carrying `selector`, `strict` and `timeout`, returning `result.value`.
	async fn frame_value(&self, method: &str, locator: &Locator, mut extra: Value) -> Result<Value> {
		let selector = locator.selector();
		if let Some(params) = extra.as_object_mut() {
			params.insert("selector".into(), Value::String(selector.clone()));
			params.entry("strict").or_insert(Value::Bool(true));
			params.entry("timeout").or_insert(json!(self.timeout_ms()));
		}
		debug!(target = "shoptodo.browser", method, %selector);
		let result: Value = self
			.frame
			.send_titled(&format!("{method} {locator}"), method, extra)
			.await
			.map_err(|e| classify(e, locator))?;
		Ok(result.get("value").cloned().unwrap_or(Value::Null))
	}
}

/// Maps driver errors onto the suite's taxonomy with the locator in context.
fn classify(err: shop_runtime::Error, locator: &Locator) -> ShopError {
	if let shop_runtime::Error::Remote { message, .. } = &err {
		if message.contains("strict mode violation") {
			return ShopError::StrictMode {
				locator: locator.to_string(),
				count: strict_count(message).unwrap_or(2),
			};
		}
	}
	err.into()
}

/// Reads `N` from "... resolved to N elements".
fn strict_count(message: &str) -> Option<usize> {
	let rest = &message[message.find("resolved to ")? + "resolved to ".len()..];
	rest.split_whitespace().next()?.parse().ok()
}

fn as_string(value: Value) -> Option<String> {
	match value {
		Value::String(s) => Some(s),
		_ => None,
	}
}

#[async_trait]
impl PageDriver for BrowserPage {
	async fn goto(&self, url: &str) -> Result<()> {
		info!(target = "shoptodo.browser", url, "goto");
		let params = json!({
			"url": url,
			"timeout": self.navigation_timeout.as_millis() as f64,
			"waitUntil": "load",
		});
		let _: Value = self.frame.send_titled(&format!("goto {url}"), "goto", params).await?;
		Ok(())
	}

	async fn title(&self) -> Result<String> {
		let result: Value = self.frame.send_no_params("title").await?;
		Ok(result.get("value").and_then(Value::as_str).unwrap_or_default().to_string())
	}

	async fn click(&self, locator: &Locator) -> Result<()> {
		self.frame_value("click", locator, json!({})).await.map(drop)
	}

	async fn fill(&self, locator: &Locator, value: &str) -> Result<()> {
		self.frame_value("fill", locator, json!({ "value": value })).await.map(drop)
	}

	async fn select_option(&self, locator: &Locator, label: &str) -> Result<()> {
		self.frame_value("selectOption", locator, json!({ "options": [{ "label": label }] })).await.map(drop)
	}

	async fn count(&self, locator: &Locator) -> Result<usize> {
		let params = json!({ "selector": locator.selector() });
		let result: Value = self.frame.send("queryCount", params).await.map_err(|e| classify(e, locator))?;
		Ok(result.get("value").and_then(Value::as_u64).unwrap_or(0) as usize)
	}

	async fn text_content(&self, locator: &Locator) -> Result<Option<String>> {
		Ok(as_string(self.frame_value("textContent", locator, json!({})).await?))
	}

	async fn attribute(&self, locator: &Locator, name: &str) -> Result<Option<String>> {
		Ok(as_string(self.frame_value("getAttribute", locator, json!({ "name": name })).await?))
	}

	async fn is_visible(&self, locator: &Locator) -> Result<bool> {
		let value = self.frame_value("isVisible", locator, json!({})).await?;
		Ok(value.as_bool().unwrap_or(false))
	}

	async fn is_enabled(&self, locator: &Locator) -> Result<bool> {
		let value = self.frame_value("isEnabled", locator, json!({})).await?;
		Ok(value.as_bool().unwrap_or(false))
	}

	async fn input_value(&self, locator: &Locator) -> Result<String> {
		Ok(as_string(self.frame_value("inputValue", locator, json!({})).await?).unwrap_or_default())
	}

	async fn wait_for(&self, locator: &Locator, state: WaitForState, timeout: Duration) -> Result<()> {
		let params = json!({
			"state": state,
			"strict": false,
			"timeout": timeout.as_millis() as f64,
		});
		match self.frame_value("waitForSelector", locator, params).await {
			Err(ShopError::Timeout { .. }) => Err(ShopError::timeout(timeout.as_millis(), format!("{locator} to be {state}"))),
			other => other.map(drop),
		}
	}

	async fn close(&self) -> Result<()> {
		self.context.send_no_result("close", json!({})).await?;
		Ok(())
	}
}
