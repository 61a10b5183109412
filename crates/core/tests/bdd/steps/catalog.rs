use cucumber::{then, when};
use shoptodo::expect::{ensure, eventually_eq, wait_until};
use shoptodo::pages::CatalogPage;
use shoptodo::Result;

use crate::world::ShopWorld;

#[when(regex = r#"^"([^"]*)"で検索する$"#)]
async fn search(world: &mut ShopWorld, keyword: String) -> Result<()> {
	world.fixtures().await?.get::<CatalogPage>().await?.search_product(&keyword).await
}

#[then(regex = r#"^検索結果に"([^"]*)"が表示される$"#)]
async fn result_shown(world: &mut ShopWorld, name: String) -> Result<()> {
	let catalog = world.fixtures().await?.get::<CatalogPage>().await?;
	ensure(catalog.is_product_visible(&name).await?, || format!("{name} is not in the results"))
}

#[when(regex = r#"^"([^"]*)"タブをクリックする$"#)]
async fn click_tab(world: &mut ShopWorld, label: String) -> Result<()> {
	world.fixtures().await?.get::<CatalogPage>().await?.filter_by_category_label(&label).await
}

#[when(regex = r#"^"([^"]*)"でソートする$"#)]
async fn sort(world: &mut ShopWorld, label: String) -> Result<()> {
	world.fixtures().await?.get::<CatalogPage>().await?.sort_by_label(&label).await
}

#[then(regex = r"^商品が価格の安い順に並ぶ$")]
async fn sorted_by_price(world: &mut ShopWorld) -> Result<()> {
	let fixtures = world.fixtures().await?;
	let catalog = fixtures.get::<CatalogPage>().await?;
	let catalog = catalog.as_ref();
	wait_until(fixtures.page().expect_timeout(), "products sorted by ascending price", || async move {
		catalog.is_sorted_by_price_asc().await
	})
	.await
}

#[then(regex = r"^商品が(\d+)件表示される$")]
async fn product_count(world: &mut ShopWorld, expected: usize) -> Result<()> {
	let fixtures = world.fixtures().await?;
	let catalog = fixtures.get::<CatalogPage>().await?;
	let catalog = catalog.as_ref();
	eventually_eq(fixtures.page().expect_timeout(), "product count", expected, move || catalog.product_count()).await
}

#[then(regex = r"^商品が1件以上表示される$")]
async fn some_products(world: &mut ShopWorld) -> Result<()> {
	let catalog = world.fixtures().await?.get::<CatalogPage>().await?;
	let count = catalog.product_count().await?;
	ensure(count >= 1, || "the catalog lists no products".into())
}

#[then(regex = r"^商品カテゴリのタブが表示される$")]
async fn tabs_shown(world: &mut ShopWorld) -> Result<()> {
	let catalog = world.fixtures().await?.get::<CatalogPage>().await?;
	ensure(catalog.are_category_tabs_visible().await?, || "category tabs are not shown".into())
}
