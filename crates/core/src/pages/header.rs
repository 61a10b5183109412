use tracing::debug;

use crate::driver::PageHandle;
use crate::error::Result;
use crate::locator::{Locator, Role, TextMatch};

/// Site header: session controls and the language switch.
///
/// Buttons are looked up inside the banner so the login dialog's own
/// `ログイン` button never makes them ambiguous.
#[derive(Debug, Clone)]
pub struct HeaderComponent {
	page: PageHandle,
}

impl HeaderComponent {
	pub fn new(page: PageHandle) -> Self {
		Self { page }
	}

	fn button(name: &str) -> Locator {
		Locator::role_only(Role::Banner).get_by_role(Role::Button, TextMatch::exact(name))
	}

	pub async fn click_login(&self) -> Result<()> {
		self.page.click(&Self::button("ログイン")).await
	}

	pub async fn click_logout(&self) -> Result<()> {
		debug!(target = "shoptodo.pages", "logout");
		self.page.click(&Self::button("ログアウト")).await
	}

	pub async fn switch_to_english(&self) -> Result<()> {
		self.page.click(&Self::button("EN")).await
	}

	pub async fn switch_to_japanese(&self) -> Result<()> {
		self.page.click(&Self::button("JP")).await
	}

	/// Logged in exactly when the logout button shows.
	pub async fn is_logged_in(&self) -> Result<bool> {
		self.page.is_visible(&Self::button("ログアウト")).await
	}

	pub async fn is_login_button_visible(&self) -> Result<bool> {
		self.page.is_visible(&Self::button("ログイン")).await
	}

	pub async fn logged_in_user_name(&self) -> Result<Option<String>> {
		if !self.is_logged_in().await? {
			return Ok(None);
		}
		// no accessible handle for the name display
		let name = self.page.text_content(&Locator::class_contains("user-name")).await?;
		Ok(name.map(|n| n.trim().to_string()))
	}
}

#[cfg(test)]
mod tests {
	use std::sync::Arc;

	use super::*;
	use crate::config::SuiteConfig;
	use crate::data::VALID_USER;
	use crate::driver::PageDriver;
	use crate::pages::LoginPage;
	use crate::sim::Storefront;

	async fn header() -> (HeaderComponent, LoginPage) {
		let config = Arc::new(SuiteConfig {
			action_timeout_ms: 300,
			expect_timeout_ms: 500,
			..SuiteConfig::default()
		});
		let shop = Storefront::shared(&config);
		shop.goto(&config.base_url).await.unwrap();
		let page = PageHandle::new(shop, config);
		(HeaderComponent::new(page.clone()), LoginPage::new(page))
	}

	#[tokio::test]
	async fn session_round_trip() {
		let (header, login) = header().await;
		assert!(header.is_login_button_visible().await.unwrap());
		assert_eq!(header.logged_in_user_name().await.unwrap(), None);

		header.click_login().await.unwrap();
		login.login(VALID_USER.username, VALID_USER.password).await.unwrap();
		assert!(header.is_logged_in().await.unwrap());
		assert_eq!(header.logged_in_user_name().await.unwrap().as_deref(), Some("demo"));

		header.click_logout().await.unwrap();
		assert!(!header.is_logged_in().await.unwrap());
		assert!(header.is_login_button_visible().await.unwrap());
	}

	#[tokio::test]
	async fn login_button_stays_unambiguous_with_dialog_open() {
		let (header, login) = header().await;
		header.click_login().await.unwrap();
		assert!(login.is_visible().await.unwrap());
		assert!(header.is_login_button_visible().await.unwrap());
	}

	#[tokio::test]
	async fn language_switch_round_trip() {
		let (header, _) = header().await;
		header.switch_to_english().await.unwrap();
		assert!(!header.is_login_button_visible().await.unwrap());
		header.switch_to_japanese().await.unwrap();
		assert!(header.is_login_button_visible().await.unwrap());
	}
}
