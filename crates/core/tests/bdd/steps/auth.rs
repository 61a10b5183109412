use cucumber::{given, then, when};
use shoptodo::expect::{ensure, wait_until};
use shoptodo::fixtures::AuthenticatedPage;
use shoptodo::pages::{DialogOutcome, HeaderComponent, LoginOutcome, LoginPage, RegisterPage};
use shoptodo::{Result, ShopError};

use crate::world::ShopWorld;

#[given(regex = r"^ログイン済みである$")]
async fn logged_in(world: &mut ShopWorld) -> Result<()> {
	let fixtures = world.fixtures().await?;
	fixtures.get::<AuthenticatedPage>().await?;
	let header = fixtures.get::<HeaderComponent>().await?;
	ensure(header.is_logged_in().await?, || "logout button missing after logging in".into())
}

#[when(regex = r"^ログインボタンをクリックする$")]
async fn click_login(world: &mut ShopWorld) -> Result<()> {
	world.fixtures().await?.get::<HeaderComponent>().await?.click_login().await
}

#[when(regex = r#"^ユーザー名"([^"]*)"とパスワード"([^"]*)"でログインする$"#)]
async fn log_in(world: &mut ShopWorld, username: String, password: String) -> Result<()> {
	let outcome = world.fixtures().await?.get::<LoginPage>().await?.login(&username, &password).await?;
	world.last_login = Some(outcome);
	Ok(())
}

#[then(regex = r"^ログインに成功する$")]
async fn login_succeeded(world: &mut ShopWorld) -> Result<()> {
	if let Some(LoginOutcome::Failure { message }) = &world.last_login {
		return Err(ShopError::Assertion(format!("login was rejected: {message}")));
	}
	let header = world.fixtures().await?.get::<HeaderComponent>().await?;
	ensure(header.is_logged_in().await?, || "logout button is not shown".into())
}

#[then(regex = r"^ログインダイアログが表示されたままである$")]
async fn login_dialog_stays(world: &mut ShopWorld) -> Result<()> {
	let login = world.fixtures().await?.get::<LoginPage>().await?;
	ensure(login.is_visible().await?, || "login dialog closed".into())?;
	ensure(login.has_error().await?, || "login dialog shows no error".into())
}

#[when(regex = r"^ログアウトする$")]
async fn log_out(world: &mut ShopWorld) -> Result<()> {
	world.fixtures().await?.get::<HeaderComponent>().await?.click_logout().await
}

#[then(regex = r"^ログアウトボタンが表示される$")]
async fn logout_button_shown(world: &mut ShopWorld) -> Result<()> {
	let header = world.fixtures().await?.get::<HeaderComponent>().await?;
	ensure(header.is_logged_in().await?, || "logout button is not shown".into())
}

#[then(regex = r"^ログインボタンが表示される$")]
async fn login_button_shown(world: &mut ShopWorld) -> Result<()> {
	let fixtures = world.fixtures().await?;
	let header = fixtures.get::<HeaderComponent>().await?;
	let header = header.as_ref();
	wait_until(fixtures.page().expect_timeout(), "login button", || async move { header.is_login_button_visible().await }).await
}

#[when(regex = r"^新規登録リンクをクリックする$")]
async fn open_registration(world: &mut ShopWorld) -> Result<()> {
	world.fixtures().await?.get::<LoginPage>().await?.click_register_link().await
}

#[when(regex = r#"^ユーザー名"([^"]*)"、メール"([^"]*)"、パスワード"([^"]*)"で登録する$"#)]
async fn register(world: &mut ShopWorld, username: String, email: String, password: String) -> Result<()> {
	submit_registration(world, &username, &email, &password, &password).await
}

#[when(regex = r#"^ユーザー名"([^"]*)"、メール"([^"]*)"、パスワード"([^"]*)"、確認パスワード"([^"]*)"で登録する$"#)]
async fn register_with_confirmation(
	world: &mut ShopWorld,
	username: String,
	email: String,
	password: String,
	confirm: String,
) -> Result<()> {
	submit_registration(world, &username, &email, &password, &confirm).await
}

async fn submit_registration(world: &mut ShopWorld, username: &str, email: &str, password: &str, confirm: &str) -> Result<()> {
	let register = world.fixtures().await?.get::<RegisterPage>().await?;
	world.last_registration = Some(register.register(username, email, password, confirm).await?);
	Ok(())
}

#[then(regex = r"^登録ダイアログが閉じる$")]
async fn registration_closed(world: &mut ShopWorld) -> Result<()> {
	if let Some(DialogOutcome::Rejected { message }) = &world.last_registration {
		return Err(ShopError::Assertion(format!("registration was rejected: {message}")));
	}
	let register = world.fixtures().await?.get::<RegisterPage>().await?;
	ensure(!register.is_visible().await?, || "register dialog is still open".into())
}

#[then(regex = r"^登録ダイアログが表示されたままである$")]
async fn registration_stays(world: &mut ShopWorld) -> Result<()> {
	let register = world.fixtures().await?.get::<RegisterPage>().await?;
	ensure(register.is_visible().await?, || "register dialog closed".into())?;
	ensure(register.has_error().await?, || "register dialog shows no error".into())
}
