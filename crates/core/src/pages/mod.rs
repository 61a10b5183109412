//! Page objects for the ShopTodo storefront.
//!
//! Each page object is bound to one [`PageHandle`] and owns nothing but
//! locator descriptions; every operation builds its locators again and
//! queries the page. Page objects are not meant to be shared between
//! concurrent tasks on the same page.

mod base;
mod cart;
mod catalog;
mod header;
mod login;
mod register;

pub use base::BasePage;
pub use cart::CartComponent;
pub use catalog::CatalogPage;
pub use header::HeaderComponent;
pub use login::LoginPage;
pub use register::RegisterPage;

use crate::driver::PageHandle;
use crate::error::Result;
use crate::expect::wait_until;
use crate::locator::Locator;

/// Result of submitting the login dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
	/// The dialog closed.
	Success,
	/// The dialog stayed open and showed `message`.
	Failure { message: String },
}

impl LoginOutcome {
	pub fn is_success(&self) -> bool {
		matches!(self, Self::Success)
	}
}

/// Result of submitting the register dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogOutcome {
	Closed,
	Rejected { message: String },
}

impl DialogOutcome {
	pub fn is_closed(&self) -> bool {
		matches!(self, Self::Closed)
	}
}

/// Observable state of a modal dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogState {
	Closed,
	Open,
	OpenWithError,
}

/// A dialog and its error element, shared by the login and register pages.
#[derive(Debug, Clone)]
struct Modal {
	dialog: Locator,
	error: Locator,
}

impl Modal {
	fn new(dialog: Locator) -> Self {
		// The error element has no role or label in the app.
		let error = dialog.clone().get_by_class_contains("error");
		Self { dialog, error }
	}

	async fn state(&self, page: &PageHandle) -> Result<DialogState> {
		if !page.is_visible(&self.dialog).await? {
			return Ok(DialogState::Closed);
		}
		if page.is_visible(&self.error).await? {
			Ok(DialogState::OpenWithError)
		} else {
			Ok(DialogState::Open)
		}
	}

	async fn error_message(&self, page: &PageHandle) -> Result<Option<String>> {
		if page.is_visible(&self.error).await? {
			Ok(page.text_content(&self.error).await?.map(|text| text.trim().to_string()))
		} else {
			Ok(None)
		}
	}

	/// Waits for a submission to settle: either the dialog closed or it shows an
	/// error other than `before`, the message it showed before submitting.
	/// `None` means closed.
	///
	/// A resubmission rejected with the same message leaves nothing to observe,
	/// so once the wait runs out with `before` still showing, that message is
	/// the outcome.
	async fn settle(&self, page: &PageHandle, before: Option<&str>, what: &str) -> Result<Option<String>> {
		let modal = self;
		let waited = wait_until(page.expect_timeout(), what, || async move {
			if page.count(&modal.dialog).await? == 0 {
				return Ok(true);
			}
			Ok(modal.error_message(page).await?.is_some_and(|message| Some(message.as_str()) != before))
		})
		.await;
		match waited {
			Ok(()) => {}
			Err(err) if err.is_timeout() && before.is_some() => {
				if page.count(&self.dialog).await? == 0 {
					return Ok(None);
				}
				let current = self.error_message(page).await?;
				if current.as_deref() != before {
					return Err(err);
				}
				return Ok(current);
			}
			Err(err) => return Err(err),
		}
		if page.count(&self.dialog).await? == 0 {
			return Ok(None);
		}
		Ok(Some(self.error_message(page).await?.unwrap_or_default()))
	}
}
