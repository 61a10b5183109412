use std::sync::LazyLock;

use parking_lot::Mutex;
use regex::Regex;
use tokio::time::Instant;
use tracing::debug;

use crate::currency::parse_yen;
use crate::data::{Category, SortOption};
use crate::driver::PageHandle;
use crate::error::Result;
use crate::expect::wait_until;
use crate::locator::{Locator, Role, TextMatch};

static PRICE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[¥￥]\s*[0-9][0-9,]*$").unwrap());

/// Product catalog: search, sort, category tabs and product cards.
#[derive(Debug, Clone)]
pub struct CatalogPage {
	page: PageHandle,
}

impl CatalogPage {
	pub fn new(page: PageHandle) -> Self {
		Self { page }
	}

	fn search_input() -> Locator {
		Locator::placeholder(TextMatch::exact("商品を検索..."))
	}

	fn sort_select() -> Locator {
		Locator::role(Role::Combobox, TextMatch::exact("並び替え"))
	}

	fn category_tabs() -> Locator {
		Locator::role(Role::Tablist, TextMatch::exact("商品カテゴリ"))
	}

	/// One per card; cards have no role of their own.
	fn add_buttons() -> Locator {
		Locator::role(Role::Button, TextMatch::contains("カートに追加"))
	}

	/// The card holding the image whose alt text is `name`.
	fn card(name: &str) -> Locator {
		Locator::role(Role::Img, TextMatch::exact(name)).parent()
	}

	fn price_in(card: Locator) -> Locator {
		card.get_by_text(TextMatch::pattern(PRICE_RE.clone()))
	}

	/// Types `keyword` into the search box and waits for the debounced filter
	/// to apply.
	pub async fn search_product(&self, keyword: &str) -> Result<()> {
		self.page.fill(&Self::search_input(), keyword).await?;
		self.settle_search(keyword).await
	}

	/// Empties the search box and waits until the full catalog is back.
	pub async fn clear_search(&self) -> Result<()> {
		self.page.fill(&Self::search_input(), "").await?;
		self.settle_search("").await
	}

	/// The grid has settled on `keyword` once a full debounce window has passed
	/// since typing, every listed name contains it, and two polls in a row saw
	/// the same list. A stale list from an earlier, narrower search passes the
	/// name check alone.
	async fn settle_search(&self, keyword: &str) -> Result<()> {
		let typed_at = Instant::now();
		let debounce = self.page.config().search_debounce();
		let needle = keyword.trim().to_lowercase();
		let previous: Mutex<Option<Vec<String>>> = Mutex::new(None);
		let (needle, previous) = (needle.as_str(), &previous);
		let condition = format!("catalog filtered by \"{keyword}\"");
		wait_until(self.page.expect_timeout(), &condition, || async move {
			if typed_at.elapsed() < debounce {
				return Ok(false);
			}
			let names = self.product_names().await?;
			let matching = names.iter().all(|name| name.to_lowercase().contains(needle));
			let stable = previous.lock().replace(names.clone()).is_some_and(|seen| seen == names);
			Ok(matching && stable)
		})
		.await
	}

	pub async fn search_text(&self) -> Result<String> {
		self.page.input_value(&Self::search_input()).await
	}

	pub async fn sort_by(&self, option: SortOption) -> Result<()> {
		self.sort_by_label(option.label()).await
	}

	/// Selects a sort entry by its raw label; unknown labels fail at the control.
	pub async fn sort_by_label(&self, label: &str) -> Result<()> {
		debug!(target = "shoptodo.pages", label, "sort");
		self.page.select_option(&Self::sort_select(), label).await
	}

	pub async fn filter_by_category(&self, category: Category) -> Result<()> {
		self.filter_by_category_label(category.label()).await
	}

	/// Clicks a category tab by its raw label.
	pub async fn filter_by_category_label(&self, label: &str) -> Result<()> {
		debug!(target = "shoptodo.pages", label, "filter");
		let tab = Self::category_tabs().get_by_role(Role::Tab, TextMatch::exact(label));
		self.page.click(&tab).await
	}

	pub async fn product_count(&self) -> Result<usize> {
		self.page.count(&Self::add_buttons()).await
	}

	/// Listed product names in display order, read from the card images.
	pub async fn product_names(&self) -> Result<Vec<String>> {
		let count = self.product_count().await?;
		let mut names = Vec::with_capacity(count);
		for i in 0..count {
			let img = Self::add_buttons().nth(i).parent().get_by_role_only(Role::Img);
			if let Some(alt) = self.page.attribute(&img, "alt").await? {
				names.push(alt.trim().to_string());
			}
		}
		Ok(names)
	}

	/// Listed prices in display order.
	pub async fn product_prices(&self) -> Result<Vec<u64>> {
		let count = self.product_count().await?;
		let mut prices = Vec::with_capacity(count);
		for i in 0..count {
			let price = Self::price_in(Self::add_buttons().nth(i).parent());
			let text = self.page.text_content(&price).await?.unwrap_or_default();
			prices.push(parse_yen(&text));
		}
		Ok(prices)
	}

	pub async fn is_sorted_by_price_asc(&self) -> Result<bool> {
		let prices = self.product_prices().await?;
		Ok(prices.windows(2).all(|pair| pair[0] <= pair[1]))
	}

	pub async fn add_to_cart(&self, name: &str) -> Result<()> {
		debug!(target = "shoptodo.pages", product = name, "add to cart");
		let button = Self::card(name).get_by_role(Role::Button, TextMatch::contains("カートに追加"));
		self.page.click(&button).await
	}

	pub async fn is_add_to_cart_enabled(&self, name: &str) -> Result<bool> {
		let button = Self::card(name).get_by_role(Role::Button, TextMatch::contains("カートに追加"));
		self.page.is_enabled(&button).await
	}

	/// Listed price of `name`; 0 when the card shows no price.
	pub async fn product_price(&self, name: &str) -> Result<u64> {
		let text = self.page.text_content(&Self::price_in(Self::card(name))).await?;
		Ok(text.as_deref().map(parse_yen).unwrap_or(0))
	}

	pub async fn is_product_visible(&self, name: &str) -> Result<bool> {
		let title = Locator::role_only(Role::Main).get_by_text(TextMatch::exact(name));
		self.page.is_visible(&title).await
	}

	pub async fn are_category_tabs_visible(&self) -> Result<bool> {
		self.page.is_visible(&Self::category_tabs()).await
	}
}
