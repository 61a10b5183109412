//! The page seam.
//!
//! Page objects talk to a [`PageDriver`] and never to a backend directly:
//! - [`browser::BrowserPage`]: Chromium driven over the Playwright protocol
//! - [`Storefront`](crate::sim::Storefront): in-memory model of the app, for offline runs
//!
//! Single-element operations are strict: a locator that matches more than one
//! element fails with [`ShopError::StrictMode`](crate::ShopError::StrictMode).

pub mod browser;
#[cfg(test)]
pub(crate) mod testing;

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
pub use shop_protocol::WaitForState;
use tokio::sync::OnceCell;
use tracing::info;

use self::browser::BrowserSession;
use crate::config::{Backend, SuiteConfig};
use crate::error::Result;
use crate::locator::Locator;
use crate::sim::Storefront;

/// Operations page objects need from a page.
#[async_trait]
pub trait PageDriver: Send + Sync + fmt::Debug {
	/// Navigates to an absolute `url` and waits for the load event.
	async fn goto(&self, url: &str) -> Result<()>;

	async fn title(&self) -> Result<String>;

	/// Waits for the element to be actionable, then clicks it.
	async fn click(&self, locator: &Locator) -> Result<()>;

	/// Replaces the value of an input.
	async fn fill(&self, locator: &Locator, value: &str) -> Result<()>;

	/// Selects the option whose label is `label`.
	async fn select_option(&self, locator: &Locator, label: &str) -> Result<()>;

	/// Number of matching elements right now. Never waits.
	async fn count(&self, locator: &Locator) -> Result<usize>;

	async fn text_content(&self, locator: &Locator) -> Result<Option<String>>;

	async fn attribute(&self, locator: &Locator, name: &str) -> Result<Option<String>>;

	/// `false` when nothing matches. Never waits.
	async fn is_visible(&self, locator: &Locator) -> Result<bool>;

	async fn is_enabled(&self, locator: &Locator) -> Result<bool>;

	async fn input_value(&self, locator: &Locator) -> Result<String>;

	/// Waits until any match reaches `state` (or, for `Detached`/`Hidden`, until none is left).
	async fn wait_for(&self, locator: &Locator, state: WaitForState, timeout: Duration) -> Result<()>;

	/// Releases the page. Later calls fail.
	async fn close(&self) -> Result<()> {
		Ok(())
	}
}

/// A page plus the suite configuration it runs under.
///
/// Cheap to clone; every page object holds one.
#[derive(Clone)]
pub struct PageHandle {
	driver: Arc<dyn PageDriver>,
	config: Arc<SuiteConfig>,
}

impl PageHandle {
	pub fn new(driver: Arc<dyn PageDriver>, config: Arc<SuiteConfig>) -> Self {
		Self { driver, config }
	}

	pub fn config(&self) -> &SuiteConfig {
		&self.config
	}

	/// Bound used by condition waits in page objects.
	pub fn expect_timeout(&self) -> Duration {
		self.config.expect_timeout()
	}
}

impl Deref for PageHandle {
	type Target = dyn PageDriver;

	fn deref(&self) -> &Self::Target {
		self.driver.as_ref()
	}
}

impl fmt::Debug for PageHandle {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("PageHandle").field("driver", &self.driver).field("base_url", &self.config.base_url).finish()
	}
}

/// Hands out one fresh page per test on the configured backend.
///
/// The Playwright backend starts the driver and browser on the first request
/// and gives every later page its own browser context.
#[derive(Debug)]
pub struct PageFactory {
	config: Arc<SuiteConfig>,
	session: OnceCell<BrowserSession>,
}

impl PageFactory {
	pub fn new(config: Arc<SuiteConfig>) -> Self {
		Self {
			config,
			session: OnceCell::new(),
		}
	}

	pub fn config(&self) -> &Arc<SuiteConfig> {
		&self.config
	}

	pub async fn new_page(&self) -> Result<PageHandle> {
		let driver: Arc<dyn PageDriver> = match self.config.backend {
			Backend::Sim => Storefront::shared(&self.config),
			Backend::Playwright => {
				let session = self
					.session
					.get_or_try_init(|| async {
						info!(target = "shoptodo.driver", "starting browser session");
						BrowserSession::launch(Arc::clone(&self.config)).await
					})
					.await?;
				Arc::new(session.new_page().await?)
			}
		};
		Ok(PageHandle::new(driver, Arc::clone(&self.config)))
	}

	/// Closes the browser, if one was started.
	pub async fn shutdown(&self) -> Result<()> {
		match self.session.get() {
			Some(session) => session.close().await,
			None => Ok(()),
		}
	}
}
