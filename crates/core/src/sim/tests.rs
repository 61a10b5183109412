use super::*;
use crate::locator::TextMatch;

fn config() -> SuiteConfig {
	SuiteConfig {
		action_timeout_ms: 300,
		search_debounce_ms: 100,
		..SuiteConfig::default()
	}
}

async fn loaded() -> Storefront {
	let shop = Storefront::new(&config());
	shop.goto("https://shop.test/").await.unwrap();
	shop
}

fn button(name: &str) -> Locator {
	Locator::role(Role::Button, TextMatch::exact(name))
}

fn header_button(name: &str) -> Locator {
	Locator::role_only(Role::Banner).get_by_role(Role::Button, TextMatch::exact(name))
}

fn login_dialog() -> Locator {
	Locator::role(Role::Dialog, TextMatch::exact("ログイン"))
}

fn add_to_cart(product: &str) -> Locator {
	Locator::role(Role::Img, TextMatch::exact(product))
		.parent()
		.get_by_role(Role::Button, TextMatch::contains("カートに追加"))
}

async fn log_in(shop: &Storefront, user: &str, password: &str) {
	shop.click(&header_button("ログイン")).await.unwrap();
	let dialog = login_dialog();
	shop.fill(&dialog.clone().get_by_label(TextMatch::exact("ユーザー名:")), user).await.unwrap();
	shop.fill(&dialog.clone().get_by_label(TextMatch::exact("パスワード:")), password).await.unwrap();
	shop.click(&dialog.get_by_role(Role::Button, TextMatch::exact("ログイン"))).await.unwrap();
}

#[tokio::test]
async fn blank_page_has_nothing_until_navigation() {
	let shop = Storefront::new(&config());
	assert_eq!(shop.count(&Locator::role_only(Role::Button)).await.unwrap(), 0);
	shop.goto("https://shop.test/").await.unwrap();
	assert_eq!(shop.count(&Locator::role(Role::Button, TextMatch::contains("カートに追加"))).await.unwrap(), 7);
	assert_eq!(shop.title().await.unwrap(), PAGE_TITLE);
}

#[tokio::test]
async fn strict_operations_reject_ambiguous_locators() {
	let shop = loaded().await;
	let err = shop.click(&Locator::role(Role::Button, TextMatch::contains("カートに追加"))).await.unwrap_err();
	assert!(matches!(err, ShopError::StrictMode { count: 7, .. }), "{err}");

	let err = shop.is_visible(&Locator::role_only(Role::Tab)).await.unwrap_err();
	assert!(matches!(err, ShopError::StrictMode { count: 5, .. }));
}

#[tokio::test]
async fn missing_elements_time_out_instead_of_failing_fast() {
	let shop = loaded().await;
	let started = Instant::now();
	let err = shop.click(&button("存在しないボタン")).await.unwrap_err();
	assert!(err.is_timeout());
	assert!(started.elapsed() >= Duration::from_millis(300));
	assert!(!shop.is_visible(&button("存在しないボタン")).await.unwrap());
}

#[tokio::test]
async fn disabled_buttons_are_not_clicked() {
	let shop = loaded().await;
	log_in(&shop, "demo", "Demo@2025!").await;
	let sold_out = add_to_cart("スマートウォッチ");
	assert!(!shop.is_enabled(&sold_out).await.unwrap());
	assert!(shop.click(&sold_out).await.unwrap_err().is_timeout());
	assert!(!shop.is_enabled(&button("チェックアウト")).await.unwrap());
}

#[tokio::test]
async fn valid_login_closes_the_dialog_and_shows_the_user() {
	let shop = loaded().await;
	log_in(&shop, "demo", "Demo@2025!").await;
	assert!(!shop.is_visible(&login_dialog()).await.unwrap());
	assert!(shop.is_visible(&header_button("ログアウト")).await.unwrap());
	let user = shop.text_content(&Locator::class_contains("user-name")).await.unwrap();
	assert_eq!(user.as_deref(), Some("demo"));
}

#[tokio::test]
async fn invalid_login_keeps_the_dialog_with_an_error() {
	let shop = loaded().await;
	log_in(&shop, "invaliduser", "wrongpassword").await;
	assert!(shop.is_visible(&login_dialog()).await.unwrap());
	let error = login_dialog().get_by_class_contains("error");
	assert_eq!(
		shop.text_content(&error).await.unwrap().as_deref(),
		Some("ユーザー名またはパスワードが正しくありません")
	);
}

#[tokio::test]
async fn guests_adding_to_cart_get_the_login_dialog() {
	let shop = loaded().await;
	shop.click(&add_to_cart("Tシャツ")).await.unwrap();
	assert!(shop.is_visible(&login_dialog()).await.unwrap());
	let trash = Locator::role_only(Role::Complementary).get_by_role(Role::Button, TextMatch::exact("🗑️"));
	assert_eq!(shop.count(&trash).await.unwrap(), 0);
}

#[tokio::test]
async fn cart_lines_merge_quantities_and_total_follows() {
	let shop = loaded().await;
	log_in(&shop, "demo", "Demo@2025!").await;
	shop.click(&add_to_cart("Tシャツ")).await.unwrap();
	shop.click(&add_to_cart("Tシャツ")).await.unwrap();
	shop.click(&add_to_cart("ジーンズ")).await.unwrap();

	let trash = Locator::role_only(Role::Complementary).get_by_role(Role::Button, TextMatch::exact("🗑️"));
	assert_eq!(shop.count(&trash).await.unwrap(), 2);
	let line = trash.clone().first().parent();
	assert_eq!(shop.text_content(&line).await.unwrap().as_deref(), Some("Tシャツ¥2,980数量: 2🗑️"));
	let total = Locator::role_only(Role::Complementary).get_by_text(TextMatch::contains("合計:"));
	assert_eq!(shop.text_content(&total).await.unwrap().as_deref(), Some("合計: ¥13,940"));
}

#[tokio::test]
async fn checkout_clears_the_cart_and_records_an_order() {
	let shop = loaded().await;
	log_in(&shop, "demo", "Demo@2025!").await;
	shop.click(&add_to_cart("コーヒーメーカー")).await.unwrap();
	assert!(shop.is_enabled(&button("チェックアウト")).await.unwrap());
	shop.click(&button("チェックアウト")).await.unwrap();
	assert!(shop.is_visible(&Locator::text(TextMatch::exact("カートは空です"))).await.unwrap());

	shop.click(&button("注文履歴を見る")).await.unwrap();
	let history = Locator::role(Role::Dialog, TextMatch::exact("注文履歴"));
	assert_eq!(shop.count(&history.clone().get_by_role_only(Role::Listitem)).await.unwrap(), 1);
	shop.click(&history.get_by_role(Role::Button, TextMatch::exact("閉じる"))).await.unwrap();
	assert_eq!(shop.count(&Locator::role_only(Role::Dialog)).await.unwrap(), 0);
}

#[tokio::test]
async fn search_applies_only_after_the_debounce() {
	let shop = loaded().await;
	let search = Locator::placeholder(TextMatch::exact("商品を検索..."));
	shop.fill(&search, "スマート").await.unwrap();
	let cards = Locator::role(Role::Button, TextMatch::contains("カートに追加"));
	assert_eq!(shop.count(&cards).await.unwrap(), 7);
	assert_eq!(shop.input_value(&search).await.unwrap(), "スマート");

	tokio::time::sleep(Duration::from_millis(150)).await;
	assert_eq!(shop.count(&cards).await.unwrap(), 2);
}

#[tokio::test]
async fn tabs_filter_and_sort_reorders() {
	let shop = loaded().await;
	let tabs = Locator::role(Role::Tablist, TextMatch::exact("商品カテゴリ"));
	shop.click(&tabs.get_by_role(Role::Tab, TextMatch::exact("書籍"))).await.unwrap();
	let imgs = Locator::role_only(Role::Img);
	assert_eq!(shop.count(&imgs).await.unwrap(), 1);

	let tabs = Locator::role(Role::Tablist, TextMatch::exact("商品カテゴリ"));
	shop.click(&tabs.get_by_role(Role::Tab, TextMatch::exact("すべての商品"))).await.unwrap();
	let sort = Locator::role(Role::Combobox, TextMatch::exact("並び替え"));
	shop.select_option(&sort, "価格（安い順）").await.unwrap();
	let first = shop.attribute(&imgs.clone().first(), "alt").await.unwrap();
	assert_eq!(first.as_deref(), Some("Tシャツ"));

	let err = shop.select_option(&sort, "人気順").await.unwrap_err();
	assert!(matches!(err, ShopError::NotActionable { .. }));
}

#[tokio::test]
async fn registration_validates_then_closes() {
	let shop = loaded().await;
	shop.click(&header_button("ログイン")).await.unwrap();
	shop.click(&login_dialog().get_by_role(Role::Link, TextMatch::exact("新規登録"))).await.unwrap();
	let dialog = Locator::role(Role::Dialog, TextMatch::exact("新規登録"));
	let field = |label: &str| dialog.clone().get_by_label(TextMatch::exact(label));
	let submit = dialog.clone().get_by_role(Role::Button, TextMatch::exact("新規登録"));

	shop.fill(&field("ユーザー名:"), "newbie").await.unwrap();
	shop.fill(&field("メールアドレス"), "newbie@example.com").await.unwrap();
	shop.fill(&field("パスワード:"), "short").await.unwrap();
	shop.fill(&field("パスワード確認:"), "short").await.unwrap();
	shop.click(&submit).await.unwrap();
	let error = dialog.clone().get_by_class_contains("error");
	assert_eq!(
		shop.text_content(&error).await.unwrap().as_deref(),
		Some("パスワードは8文字以上で入力してください")
	);

	shop.fill(&field("パスワード:"), "Longer@2025").await.unwrap();
	shop.fill(&field("パスワード確認:"), "Longer@2025").await.unwrap();
	shop.click(&submit).await.unwrap();
	assert!(!shop.is_visible(&dialog).await.unwrap());

	log_in(&shop, "newbie", "Longer@2025").await;
	assert!(shop.is_visible(&header_button("ログアウト")).await.unwrap());
}

#[tokio::test]
async fn english_switch_relabels_the_page() {
	let shop = loaded().await;
	shop.click(&header_button("EN")).await.unwrap();
	assert!(shop.is_visible(&header_button("Login")).await.unwrap());
	assert_eq!(shop.count(&Locator::role(Role::Button, TextMatch::exact("Add to Cart"))).await.unwrap(), 7);
	shop.click(&header_button("JP")).await.unwrap();
	assert!(shop.is_visible(&header_button("ログイン")).await.unwrap());
}

#[tokio::test]
async fn wait_for_covers_both_directions() {
	let shop = loaded().await;
	let dialog = login_dialog();
	let err = shop.wait_for(&dialog, WaitForState::Visible, Duration::from_millis(80)).await.unwrap_err();
	assert!(err.is_timeout());
	shop.wait_for(&dialog, WaitForState::Hidden, Duration::from_millis(80)).await.unwrap();
	shop.click(&header_button("ログイン")).await.unwrap();
	shop.wait_for(&dialog, WaitForState::Attached, Duration::from_millis(80)).await.unwrap();
}

#[tokio::test]
async fn closed_pages_refuse_work() {
	let shop = loaded().await;
	shop.close().await.unwrap();
	assert!(matches!(shop.count(&button("ログイン")).await.unwrap_err(), ShopError::Driver(_)));
}

#[tokio::test]
async fn navigation_resets_everything_but_accounts() {
	let shop = loaded().await;
	log_in(&shop, "demo", "Demo@2025!").await;
	shop.click(&add_to_cart("ジーンズ")).await.unwrap();
	shop.goto("https://shop.test/").await.unwrap();
	assert!(shop.is_visible(&header_button("ログイン")).await.unwrap());
	assert!(shop.is_visible(&Locator::text(TextMatch::exact("カートは空です"))).await.unwrap());
}
