use std::sync::LazyLock;

use cucumber::gherkin::Step;
use cucumber::{given, then, when};
use regex::Regex;
use shoptodo::expect::wait_until;
use shoptodo::locator::{Locator, Role, TextMatch};
use shoptodo::pages::{BasePage, CatalogPage, HeaderComponent};
use shoptodo::{Result, ShopError};

use crate::world::ShopWorld;

static ENGLISH_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new("Login|Product|Cart|Checkout").unwrap());
static JAPANESE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new("ログイン|商品|カート").unwrap());
static PRODUCT_NAME_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new("スマートフォン|ノートパソコン|Tシャツ").unwrap());
static PRICE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"¥[\d,]+").unwrap());

#[given(regex = r"^ShopTodoのホームページを開く$")]
async fn open_home(world: &mut ShopWorld) -> Result<()> {
	world.fixtures().await?.get::<BasePage>().await?.open("").await
}

#[when(regex = r"^英語に切り替える$")]
async fn switch_to_english(world: &mut ShopWorld) -> Result<()> {
	world.fixtures().await?.get::<HeaderComponent>().await?.switch_to_english().await
}

#[when(regex = r"^日本語に切り替える$")]
async fn switch_to_japanese(world: &mut ShopWorld) -> Result<()> {
	world.fixtures().await?.get::<HeaderComponent>().await?.switch_to_japanese().await
}

#[then(regex = r"^ページが英語で表示される$")]
async fn shows_english(world: &mut ShopWorld) -> Result<()> {
	shows_language(world, &ENGLISH_RE, "English UI text").await
}

#[then(regex = r"^ページが日本語で表示される$")]
async fn shows_japanese(world: &mut ShopWorld) -> Result<()> {
	shows_language(world, &JAPANESE_RE, "Japanese UI text").await
}

async fn shows_language(world: &mut ShopWorld, pattern: &Regex, what: &str) -> Result<()> {
	let fixtures = world.fixtures().await?;
	let base = fixtures.get::<BasePage>().await?;
	let base = base.as_ref();
	wait_until(fixtures.page().expect_timeout(), what, || async move { base.shows_text(pattern).await }).await
}

#[then(regex = r"^以下の要素がすべて正しく表示される（Soft Assertions）$")]
async fn all_elements_visible(world: &mut ShopWorld, step: &Step) -> Result<()> {
	let elements = element_names(step)?;
	let fixtures = world.fixtures().await?;
	let page = fixtures.page().clone();
	let catalog = fixtures.get::<CatalogPage>().await?;
	for element in &elements {
		let visible = match element.as_str() {
			"ヘッダー" => page.is_visible(&Locator::role_only(Role::Banner)).await,
			"商品カタログ" => page.is_visible(&add_to_cart_button().first()).await,
			"カテゴリタブ" => catalog.are_category_tabs_visible().await,
			"検索ボックス" => page.is_visible(&Locator::placeholder(TextMatch::exact("商品を検索..."))).await,
			other => Err(unknown_element(other)),
		};
		check_visible(world, element, visible);
	}
	std::mem::take(&mut world.soft).finish()
}

#[then(regex = r"^ログイン後の以下の要素がすべて正しく表示される（Soft Assertions）$")]
async fn logged_in_elements_visible(world: &mut ShopWorld, step: &Step) -> Result<()> {
	let elements = element_names(step)?;
	let fixtures = world.fixtures().await?;
	let page = fixtures.page().clone();
	let header = fixtures.get::<HeaderComponent>().await?;
	for element in &elements {
		let visible = match element.as_str() {
			"ログアウトボタン" => header.is_logged_in().await,
			"カート" => page.is_visible(&Locator::role_only(Role::Complementary)).await,
			"商品一覧" => page.is_visible(&add_to_cart_button().first()).await,
			other => Err(unknown_element(other)),
		};
		check_visible(world, element, visible);
	}
	std::mem::take(&mut world.soft).finish()
}

#[then(regex = r"^商品カードに以下の要素が含まれる（Soft Assertions）$")]
async fn product_card_elements_visible(world: &mut ShopWorld, step: &Step) -> Result<()> {
	let elements = element_names(step)?;
	let page = world.fixtures().await?.page().clone();
	for element in &elements {
		let locator = match element.as_str() {
			"商品画像" => Ok(Locator::role(Role::Img, TextMatch::pattern(PRODUCT_NAME_RE.clone()))),
			"商品名" => Ok(Locator::text(TextMatch::pattern(PRODUCT_NAME_RE.clone()))),
			"価格" => Ok(Locator::text(TextMatch::pattern(PRICE_RE.clone()))),
			"カートに追加ボタン" => Ok(add_to_cart_button()),
			other => Err(unknown_element(other)),
		};
		let visible = match locator {
			Ok(locator) => page.is_visible(&locator.first()).await,
			Err(err) => Err(err),
		};
		check_visible(world, element, visible);
	}
	std::mem::take(&mut world.soft).finish()
}

/// First column of a step table, header row skipped.
fn element_names(step: &Step) -> Result<Vec<String>> {
	let table = step
		.table
		.as_ref()
		.ok_or_else(|| ShopError::Assertion("step needs a table of element names".into()))?;
	Ok(table.rows.iter().skip(1).filter_map(|row| row.first().cloned()).collect())
}

fn add_to_cart_button() -> Locator {
	Locator::role(Role::Button, TextMatch::contains("カートに追加"))
}

fn unknown_element(name: &str) -> ShopError {
	ShopError::Assertion(format!("unknown element `{name}`"))
}

fn check_visible(world: &mut ShopWorld, element: &str, visible: Result<bool>) {
	match visible {
		Ok(visible) => {
			world.soft.check(visible, || format!("{element} is not visible"));
		}
		Err(err) => world.soft.record(Err(err)),
	}
}
