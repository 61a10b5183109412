use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::currency::parse_yen;
use crate::driver::PageHandle;
use crate::error::Result;
use crate::expect::eventually_eq;
use crate::locator::{Locator, Role, TextMatch};

/// Leading product name of a cart line (`"Tシャツ¥2,980数量: 1🗑️"`).
static LINE_NAME_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(.+?)[¥￥]").unwrap());

/// The cart aside.
///
/// Cart lines expose no role, so they are reached through their remove
/// buttons (`🗑️`). [`item_count`](Self::item_count) therefore counts lines,
/// not units: adding the same product twice may still read as one.
#[derive(Debug, Clone)]
pub struct CartComponent {
	page: PageHandle,
}

impl CartComponent {
	pub fn new(page: PageHandle) -> Self {
		Self { page }
	}

	fn section() -> Locator {
		Locator::role_only(Role::Complementary)
	}

	fn remove_buttons() -> Locator {
		Self::section().get_by_role(Role::Button, TextMatch::exact("🗑️"))
	}

	fn line(name: &str) -> Locator {
		Self::section().get_by_text(TextMatch::contains(name)).closest_with_button()
	}

	fn checkout_button() -> Locator {
		Locator::role(Role::Button, TextMatch::exact("チェックアウト"))
	}

	/// Cart total in yen; 0 when no amount is shown.
	pub async fn total(&self) -> Result<u64> {
		let total = Self::section().get_by_text(TextMatch::contains("合計:"));
		let text = self.page.text_content(&total).await?;
		Ok(text.as_deref().map(parse_yen).unwrap_or(0))
	}

	pub async fn item_count(&self) -> Result<usize> {
		self.page.count(&Self::remove_buttons()).await
	}

	/// Waits until the cart shows `expected` lines.
	pub async fn wait_for_item_count(&self, expected: usize) -> Result<()> {
		eventually_eq(self.page.expect_timeout(), "cart line count", expected, move || self.item_count()).await
	}

	pub async fn is_empty(&self) -> Result<bool> {
		self.page.is_visible(&Locator::text(TextMatch::exact("カートは空です"))).await
	}

	pub async fn checkout(&self) -> Result<()> {
		debug!(target = "shoptodo.pages", "checkout");
		self.page.click(&Self::checkout_button()).await
	}

	pub async fn is_checkout_enabled(&self) -> Result<bool> {
		self.page.is_enabled(&Self::checkout_button()).await
	}

	pub async fn view_order_history(&self) -> Result<()> {
		self.page.click(&Locator::role(Role::Button, TextMatch::exact("注文履歴を見る"))).await
	}

	pub async fn is_order_history_open(&self) -> Result<bool> {
		self.page.is_visible(&Locator::role(Role::Dialog, TextMatch::exact("注文履歴"))).await
	}

	pub async fn remove_item(&self, name: &str) -> Result<()> {
		debug!(target = "shoptodo.pages", product = name, "remove from cart");
		let button = Self::line(name).get_by_role(Role::Button, TextMatch::exact("🗑️"));
		self.page.click(&button).await
	}

	/// Product names of the cart lines, in display order.
	pub async fn item_names(&self) -> Result<Vec<String>> {
		let count = self.item_count().await?;
		let mut names = Vec::with_capacity(count);
		for i in 0..count {
			let line = Self::remove_buttons().nth(i).parent();
			let text = self.page.text_content(&line).await?.unwrap_or_default();
			if let Some(name) = LINE_NAME_RE.captures(&text).and_then(|c| c.get(1)) {
				names.push(name.as_str().trim().to_string());
			}
		}
		Ok(names)
	}

	/// Unit price shown on the line for `name`; 0 when none is shown.
	pub async fn item_price(&self, name: &str) -> Result<u64> {
		let text = self.page.text_content(&Self::line(name)).await?;
		Ok(text.as_deref().map(parse_yen).unwrap_or(0))
	}
}
