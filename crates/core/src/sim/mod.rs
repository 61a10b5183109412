//! In-memory ShopTodo storefront.
//!
//! [`Storefront`] implements [`PageDriver`] over a model of the app: header
//! with login state and language switch, catalog with search, category tabs
//! and sort, the cart aside with checkout and order history, and the login
//! and register dialogs. Every query renders the state into a fresh tree and
//! resolves the locator against it, so locators behave as they do against the
//! live page: strict single-element operations, auto-waiting on actions and
//! bounded waits that end in [`ShopError::Timeout`].
//!
//! Search filtering is debounced like the real app's: the product grid only
//! reflects a typed keyword after `search_debounce_ms` of idle time.

mod resolve;
mod state;
mod tree;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::time::Instant;
use tracing::{debug, info};

use self::resolve::resolve;
use self::state::AppState;
use self::tree::{Field, NodeId, Tree};
use crate::config::SuiteConfig;
use crate::driver::{PageDriver, WaitForState};
use crate::error::{Result, ShopError};
use crate::expect::POLL_INTERVAL;
use crate::locator::{Locator, Role};

pub const PAGE_TITLE: &str = "ShopTodo";

/// One simulated browser page.
#[derive(Debug)]
pub struct Storefront {
	state: Mutex<AppState>,
	debounce: Duration,
	action_timeout: Duration,
}

impl Storefront {
	pub fn new(config: &SuiteConfig) -> Self {
		Self {
			state: Mutex::new(AppState::new()),
			debounce: config.search_debounce(),
			action_timeout: config.action_timeout(),
		}
	}

	/// A page with the configured timeouts, ready to be wrapped in a
	/// [`PageHandle`](crate::driver::PageHandle).
	pub fn shared(config: &SuiteConfig) -> Arc<Self> {
		Arc::new(Self::new(config))
	}

	fn snapshot(&self) -> Result<Tree> {
		let mut state = self.state.lock();
		if state.is_closed() {
			return Err(ShopError::Driver(shop_runtime::Error::ChannelClosed));
		}
		state.settle(self.debounce);
		Ok(state.render())
	}

	/// Waits until `locator` resolves to exactly one node accepted by `ready`.
	///
	/// Several matches fail at once with [`ShopError::StrictMode`]; none (or a
	/// node `ready` rejects) keeps polling until the action timeout.
	async fn single(&self, locator: &Locator, waiting_for: &str, ready: impl Fn(&Tree, NodeId) -> bool) -> Result<(Tree, NodeId)> {
		let deadline = Instant::now() + self.action_timeout;
		loop {
			let tree = self.snapshot()?;
			let hits = resolve(&tree, locator);
			match hits.as_slice() {
				[id] if ready(&tree, *id) => {
					let id = *id;
					return Ok((tree, id));
				}
				[_, _, ..] => {
					return Err(ShopError::StrictMode {
						locator: locator.to_string(),
						count: hits.len(),
					});
				}
				_ => {}
			}
			let now = Instant::now();
			if now >= deadline {
				return Err(ShopError::timeout(self.action_timeout.as_millis(), format!("{locator} {waiting_for}")));
			}
			tokio::time::sleep(POLL_INTERVAL.min(deadline - now)).await;
		}
	}

	async fn attached(&self, locator: &Locator) -> Result<(Tree, NodeId)> {
		self.single(locator, "to be attached", |_, _| true).await
	}

	async fn input(&self, locator: &Locator) -> Result<Field> {
		let (tree, id) = self.attached(locator).await?;
		tree.node(id).field.ok_or_else(|| ShopError::NotActionable {
			locator: locator.to_string(),
			reason: "element is not an input".to_string(),
		})
	}
}

#[async_trait]
impl PageDriver for Storefront {
	async fn goto(&self, url: &str) -> Result<()> {
		info!(target = "shoptodo.sim", url, "goto");
		let mut state = self.state.lock();
		if state.is_closed() {
			return Err(ShopError::Driver(shop_runtime::Error::ChannelClosed));
		}
		state.load();
		Ok(())
	}

	async fn title(&self) -> Result<String> {
		self.snapshot()?;
		Ok(PAGE_TITLE.to_string())
	}

	async fn click(&self, locator: &Locator) -> Result<()> {
		let (tree, id) = self.single(locator, "to be enabled", |tree, id| !tree.node(id).disabled).await?;
		debug!(target = "shoptodo.sim", %locator, "click");
		if let Some(action) = &tree.node(id).action {
			self.state.lock().click(action);
		}
		Ok(())
	}

	async fn fill(&self, locator: &Locator, value: &str) -> Result<()> {
		let field = self.input(locator).await?;
		debug!(target = "shoptodo.sim", %locator, value, "fill");
		if field == Field::Sort || !self.state.lock().fill(field, value) {
			return Err(ShopError::NotActionable {
				locator: locator.to_string(),
				reason: "element is not a text input".to_string(),
			});
		}
		Ok(())
	}

	async fn select_option(&self, locator: &Locator, label: &str) -> Result<()> {
		let (tree, id) = self.attached(locator).await?;
		let node = tree.node(id);
		if node.role != Some(Role::Combobox) {
			return Err(ShopError::NotActionable {
				locator: locator.to_string(),
				reason: "element is not a <select>".to_string(),
			});
		}
		if !self.state.lock().select_sort(label) {
			return Err(ShopError::NotActionable {
				locator: locator.to_string(),
				reason: format!("no option labelled \"{label}\" (options: {})", node.options.join(", ")),
			});
		}
		Ok(())
	}

	async fn count(&self, locator: &Locator) -> Result<usize> {
		let tree = self.snapshot()?;
		Ok(resolve(&tree, locator).len())
	}

	async fn text_content(&self, locator: &Locator) -> Result<Option<String>> {
		let (tree, id) = self.attached(locator).await?;
		Ok(Some(tree.text_content(id)))
	}

	async fn attribute(&self, locator: &Locator, name: &str) -> Result<Option<String>> {
		let (tree, id) = self.attached(locator).await?;
		let node = tree.node(id);
		Ok(match name {
			"alt" => node.alt.clone(),
			"placeholder" => node.placeholder.clone(),
			"class" => Some(node.classes.clone()),
			"aria-label" => (!node.name.is_empty()).then(|| node.name.clone()),
			"value" => node.value.clone(),
			"disabled" => node.disabled.then(String::new),
			_ => None,
		})
	}

	async fn is_visible(&self, locator: &Locator) -> Result<bool> {
		let tree = self.snapshot()?;
		match resolve(&tree, locator).len() {
			0 => Ok(false),
			1 => Ok(true),
			count => Err(ShopError::StrictMode {
				locator: locator.to_string(),
				count,
			}),
		}
	}

	async fn is_enabled(&self, locator: &Locator) -> Result<bool> {
		let (tree, id) = self.attached(locator).await?;
		Ok(!tree.node(id).disabled)
	}

	async fn input_value(&self, locator: &Locator) -> Result<String> {
		let (tree, id) = self.attached(locator).await?;
		tree.node(id).value.clone().ok_or_else(|| ShopError::NotActionable {
			locator: locator.to_string(),
			reason: "element is not an input".to_string(),
		})
	}

	async fn wait_for(&self, locator: &Locator, state: WaitForState, timeout: Duration) -> Result<()> {
		let present = matches!(state, WaitForState::Attached | WaitForState::Visible);
		let deadline = Instant::now() + timeout;
		loop {
			let tree = self.snapshot()?;
			let found = !resolve(&tree, locator).is_empty();
			if found == present {
				return Ok(());
			}
			let now = Instant::now();
			if now >= deadline {
				return Err(ShopError::timeout(timeout.as_millis(), format!("{locator} to be {state}")));
			}
			tokio::time::sleep(POLL_INTERVAL.min(deadline - now)).await;
		}
	}

	async fn close(&self) -> Result<()> {
		self.state.lock().close();
		Ok(())
	}
}

#[cfg(test)]
mod tests;
