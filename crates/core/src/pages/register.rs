use tracing::{debug, info};

use super::{DialogOutcome, DialogState, Modal};
use crate::driver::PageHandle;
use crate::error::Result;
use crate::locator::{Locator, Role, TextMatch};

/// The registration dialog, reached from the login dialog's link.
#[derive(Debug, Clone)]
pub struct RegisterPage {
	page: PageHandle,
	modal: Modal,
}

impl RegisterPage {
	pub fn new(page: PageHandle) -> Self {
		Self {
			page,
			modal: Modal::new(Locator::role(Role::Dialog, TextMatch::exact("新規登録"))),
		}
	}

	fn field(&self, label: &str) -> Locator {
		self.modal.dialog.clone().get_by_label(TextMatch::exact(label))
	}

	pub async fn is_visible(&self) -> Result<bool> {
		self.page.is_visible(&self.modal.dialog).await
	}

	/// Submits the form and waits for the dialog to close or show an error.
	pub async fn register(&self, username: &str, email: &str, password: &str, confirm: &str) -> Result<DialogOutcome> {
		self.page.fill(&self.field("ユーザー名:"), username).await?;
		self.page.fill(&self.field("メールアドレス"), email).await?;
		self.page.fill(&self.field("パスワード:").first(), password).await?;
		self.page.fill(&self.field("パスワード確認:"), confirm).await?;
		let before = self.modal.error_message(&self.page).await?;
		let submit = self.modal.dialog.clone().get_by_role(Role::Button, TextMatch::exact("新規登録"));
		self.page.click(&submit).await?;

		let settled = self.modal.settle(&self.page, before.as_deref(), "register dialog to close or show a new error");
		match settled.await? {
			None => {
				info!(target = "shoptodo.pages", username, "registered");
				Ok(DialogOutcome::Closed)
			}
			Some(message) => {
				debug!(target = "shoptodo.pages", username, %message, "registration rejected");
				Ok(DialogOutcome::Rejected { message })
			}
		}
	}

	pub async fn close(&self) -> Result<()> {
		let close = self.modal.dialog.clone().get_by_role(Role::Button, TextMatch::exact("閉じる"));
		self.page.click(&close).await
	}

	pub async fn click_login_link(&self) -> Result<()> {
		let link = self.modal.dialog.clone().get_by_role(Role::Link, TextMatch::exact("ログイン"));
		self.page.click(&link).await
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
