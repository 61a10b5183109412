//! Test doubles for the page seam.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::{PageDriver, WaitForState};
use crate::error::Result;
use crate::locator::Locator;
use crate::sim::Storefront;

/// What happens to a click on the intercepted locator.
#[derive(Debug, Clone, Copy)]
pub(crate) enum ClickFault {
	/// Reported as done but never reaches the page.
	Drop,
	/// Reported as done at once, applied after the delay.
	Delay(Duration),
}

/// Forwards everything to an in-memory storefront, except clicks on one
/// locator, which suffer a [`ClickFault`].
#[derive(Debug)]
pub(crate) struct FaultyPage {
	inner: Arc<Storefront>,
	target: String,
	fault: Mutex<Option<ClickFault>>,
}

impl FaultyPage {
	pub(crate) fn new(inner: Arc<Storefront>, target: &Locator, fault: ClickFault) -> Arc<Self> {
		Arc::new(Self {
			inner,
			target: target.selector(),
			fault: Mutex::new(Some(fault)),
		})
	}

	/// Lets later clicks through untouched.
	pub(crate) fn heal(&self) {
		self.fault.lock().take();
	}
}

#[async_trait]
impl PageDriver for FaultyPage {
	async fn goto(&self, url: &str) -> Result<()> {
		self.inner.goto(url).await
	}

	async fn title(&self) -> Result<String> {
		self.inner.title().await
	}

	async fn click(&self, locator: &Locator) -> Result<()> {
		let fault = *self.fault.lock();
		match fault {
			Some(fault) if locator.selector() == self.target => match fault {
				ClickFault::Drop => Ok(()),
				ClickFault::Delay(delay) => {
					let (inner, locator) = (Arc::clone(&self.inner), locator.clone());
					tokio::spawn(async move {
						tokio::time::sleep(delay).await;
						let _ = inner.click(&locator).await;
					});
					Ok(())
				}
			},
			_ => self.inner.click(locator).await,
		}
	}

	async fn fill(&self, locator: &Locator, value: &str) -> Result<()> {
		self.inner.fill(locator, value).await
	}

	async fn select_option(&self, locator: &Locator, label: &str) -> Result<()> {
		self.inner.select_option(locator, label).await
	}

	async fn count(&self, locator: &Locator) -> Result<usize> {
		self.inner.count(locator).await
	}

	async fn text_content(&self, locator: &Locator) -> Result<Option<String>> {
		self.inner.text_content(locator).await
	}

	async fn attribute(&self, locator: &Locator, name: &str) -> Result<Option<String>> {
		self.inner.attribute(locator, name).await
	}

	async fn is_visible(&self, locator: &Locator) -> Result<bool> {
		self.inner.is_visible(locator).await
	}

	async fn is_enabled(&self, locator: &Locator) -> Result<bool> {
		self.inner.is_enabled(locator).await
	}

	async fn input_value(&self, locator: &Locator) -> Result<String> {
		self.inner.input_value(locator).await
	}

	async fn wait_for(&self, locator: &Locator, state: WaitForState, timeout: Duration) -> Result<()> {
		self.inner.wait_for(locator, state, timeout).await
	}

	async fn close(&self) -> Result<()> {
		self.inner.close().await
	}
}
