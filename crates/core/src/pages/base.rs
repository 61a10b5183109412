use std::sync::LazyLock;

use regex::Regex;
use tracing::info;

use crate::driver::{PageHandle, WaitForState};
use crate::error::Result;
use crate::locator::{Locator, Role, TextMatch};

static READY_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new("カートに追加|Add to Cart").unwrap());

/// Navigation and page-level queries.
#[derive(Debug, Clone)]
pub struct BasePage {
	page: PageHandle,
}

impl BasePage {
	pub fn new(page: PageHandle) -> Self {
		Self { page }
	}

	pub fn page(&self) -> &PageHandle {
		&self.page
	}

	/// Any add-to-cart button; the catalog has rendered once one exists.
	pub(crate) fn ready_marker() -> Locator {
		Locator::role(Role::Button, TextMatch::pattern(READY_RE.clone()))
	}

	/// Opens `path` relative to the configured base URL.
	pub async fn navigate(&self, path: &str) -> Result<()> {
		let url = self.page.config().url(path);
		info!(target = "shoptodo.pages", %url, "navigate");
		self.page.goto(&url).await
	}

	/// Waits until the catalog is rendered.
	pub async fn wait_for_ready(&self) -> Result<()> {
		self.page
			.wait_for(&Self::ready_marker(), WaitForState::Attached, self.page.expect_timeout())
			.await
	}

	/// [`navigate`](Self::navigate) then [`wait_for_ready`](Self::wait_for_ready).
	pub async fn open(&self, path: &str) -> Result<()> {
		self.navigate(path).await?;
		self.wait_for_ready().await
	}

	pub async fn title(&self) -> Result<String> {
		self.page.title().await
	}

	/// Whether some text on the page matches `pattern`.
	pub async fn shows_text(&self, pattern: &Regex) -> Result<bool> {
		self.page.is_visible(&Locator::text(TextMatch::pattern(pattern.clone())).first()).await
	}
}
