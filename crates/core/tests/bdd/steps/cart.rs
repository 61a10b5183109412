//! Cart steps. The `Fixturesで...` phrasings are kept for the fixture
//! feature; they run the same page objects as the plain ones.

use cucumber::{then, when};
use shoptodo::expect::{ensure, ensure_eq, wait_until};
use shoptodo::fixtures::ProductData;
use shoptodo::pages::{CartComponent, CatalogPage};
use shoptodo::Result;

use crate::world::ShopWorld;

#[when(regex = r#"^(?:Fixturesで)?"([^"]*)"をカートに追加する$"#)]
async fn add_to_cart(world: &mut ShopWorld, name: String) -> Result<()> {
	world.fixtures().await?.get::<CatalogPage>().await?.add_to_cart(&name).await
}

#[then(regex = r"^カートに商品が(\d+)件ある$")]
async fn cart_count(world: &mut ShopWorld, expected: usize) -> Result<()> {
	expect_lines(world, expected).await
}

#[then(regex = r"^Fixturesでカートに商品が(\d+)件あることを確認する$")]
async fn cart_count_via_fixtures(world: &mut ShopWorld, expected: usize) -> Result<()> {
	expect_lines(world, expected).await
}

async fn expect_lines(world: &mut ShopWorld, expected: usize) -> Result<()> {
	world.fixtures().await?.get::<CartComponent>().await?.wait_for_item_count(expected).await
}

#[then(regex = r"^カートの合計が(\d+)円より大きい$")]
async fn total_above(world: &mut ShopWorld, floor: u64) -> Result<()> {
	let total = world.fixtures().await?.get::<CartComponent>().await?.total().await?;
	ensure(total > floor, || format!("cart total ¥{total} is not above ¥{floor}"))
}

/// The total covers at least one unit of every line.
#[then(regex = r"^カートの合計が正しい$")]
async fn total_consistent(world: &mut ShopWorld) -> Result<()> {
	let fixtures = world.fixtures().await?;
	let cart = fixtures.get::<CartComponent>().await?;
	let products = fixtures.get::<ProductData>().await?;
	let names = cart.item_names().await?;
	let floor = products.total_of(names.iter().map(String::as_str))?;
	let total = cart.total().await?;
	ensure(total > 0 && total >= floor, || format!("cart total ¥{total} does not cover its lines (¥{floor})"))
}

#[then(regex = r#"^"([^"]*)"のカートに追加ボタンが無効である$"#)]
async fn add_disabled(world: &mut ShopWorld, name: String) -> Result<()> {
	let catalog = world.fixtures().await?.get::<CatalogPage>().await?;
	ensure(!catalog.is_add_to_cart_enabled(&name).await?, || format!("add-to-cart for {name} is enabled"))
}

#[when(regex = r#"^カートから"([^"]*)"を削除する$"#)]
async fn remove(world: &mut ShopWorld, name: String) -> Result<()> {
	world.fixtures().await?.get::<CartComponent>().await?.remove_item(&name).await
}

#[then(regex = r"^カートが空である$")]
async fn cart_empty(world: &mut ShopWorld) -> Result<()> {
	let fixtures = world.fixtures().await?;
	let cart = fixtures.get::<CartComponent>().await?;
	let cart = cart.as_ref();
	wait_until(fixtures.page().expect_timeout(), "empty cart", || async move { cart.is_empty().await }).await
}

#[then(regex = r"^チェックアウトボタンが有効である$")]
async fn checkout_enabled(world: &mut ShopWorld) -> Result<()> {
	let cart = world.fixtures().await?.get::<CartComponent>().await?;
	ensure(cart.is_checkout_enabled().await?, || "checkout is disabled".into())
}

#[then(regex = r#"^Fixturesでカート内に"([^"]*)"が表示されることを確認する$"#)]
async fn line_shown(world: &mut ShopWorld, name: String) -> Result<()> {
	let names = world.fixtures().await?.get::<CartComponent>().await?.item_names().await?;
	ensure(names.contains(&name), || format!("{name} not among cart lines {names:?}"))
}

#[then(regex = r#"^Fixturesで"([^"]*)"の価格が正しいことを確認する$"#)]
async fn line_price(world: &mut ShopWorld, name: String) -> Result<()> {
	let fixtures = world.fixtures().await?;
	let expected = fixtures.get::<ProductData>().await?.price_of(&name)?;
	let actual = fixtures.get::<CartComponent>().await?.item_price(&name).await?;
	ensure_eq(actual, expected, &format!("price of {name}"))
}
