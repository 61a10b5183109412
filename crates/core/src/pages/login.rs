use tracing::{debug, info};

use super::{DialogState, LoginOutcome, Modal};
use crate::driver::PageHandle;
use crate::error::Result;
use crate::locator::{Locator, Role, TextMatch};

/// The login dialog.
#[derive(Debug, Clone)]
pub struct LoginPage {
	page: PageHandle,
	modal: Modal,
}

impl LoginPage {
	pub fn new(page: PageHandle) -> Self {
		Self {
			page,
			modal: Modal::new(Self::dialog()),
		}
	}

	pub(crate) fn dialog() -> Locator {
		Locator::role(Role::Dialog, TextMatch::exact("ログイン"))
	}

	fn within(&self) -> Locator {
		self.modal.dialog.clone()
	}

	pub async fn is_visible(&self) -> Result<bool> {
		self.page.is_visible(&self.modal.dialog).await
	}

	/// Submits `username` and `password`, then waits for the dialog to close or
	/// show an error other than the one already showing.
	pub async fn login(&self, username: &str, password: &str) -> Result<LoginOutcome> {
		self.fill_form(username, password).await?;
		let before = self.modal.error_message(&self.page).await?;
		self.page.click(&Self::submit_button()).await?;
		let settled = self.modal.settle(&self.page, before.as_deref(), "login dialog to close or show a new error");
		match settled.await? {
			None => {
				info!(target = "shoptodo.pages", username, "logged in");
				Ok(LoginOutcome::Success)
			}
			Some(message) => {
				debug!(target = "shoptodo.pages", username, %message, "login rejected");
				Ok(LoginOutcome::Failure { message })
			}
		}
	}

	/// Fills and submits the form without waiting for the result.
	pub async fn submit(&self, username: &str, password: &str) -> Result<()> {
		self.fill_form(username, password).await?;
		self.page.click(&Self::submit_button()).await
	}

	async fn fill_form(&self, username: &str, password: &str) -> Result<()> {
		self.page.fill(&self.within().get_by_label(TextMatch::exact("ユーザー名:")), username).await?;
		self.page.fill(&self.within().get_by_label(TextMatch::exact("パスワード:")), password).await
	}

	pub(crate) fn submit_button() -> Locator {
		Self::dialog().get_by_role(Role::Button, TextMatch::exact("ログイン"))
	}

	pub async fn close(&self) -> Result<()> {
		self.page.click(&self.within().get_by_role(Role::Button, TextMatch::exact("閉じる"))).await
	}

	pub async fn click_register_link(&self) -> Result<()> {
		self.page.click(&self.within().get_by_role(Role::Link, TextMatch::exact("新規登録"))).await
	}

	pub async fn error_message(&self) -> Result<Option<String>> {
		self.modal.error_message(&self.page).await
	}

	pub async fn has_error(&self) -> Result<bool> {
		self.page.is_visible(&self.modal.error).await
	}

	pub async fn state(&self) -> Result<DialogState> {
		self.modal.state(&self.page).await
	}
}
