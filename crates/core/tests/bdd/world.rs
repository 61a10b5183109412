use std::sync::OnceLock;

use shoptodo::driver::PageFactory;
use shoptodo::pages::{DialogOutcome, LoginOutcome};
use shoptodo::{Fixtures, Profile, Result, ShopError, SoftAssertions};
use tracing::warn;

static FACTORY: OnceLock<PageFactory> = OnceLock::new();

/// Registers the factory every scenario takes its page from.
pub fn install_factory(factory: PageFactory) -> &'static PageFactory {
	FACTORY.get_or_init(|| factory)
}

fn factory() -> Result<&'static PageFactory> {
	FACTORY
		.get()
		.ok_or_else(|| ShopError::Config("no page factory installed".into()))
}

/// State of one scenario.
///
/// The page is opened on the first step that needs it, so a scenario that
/// fails in its `before` hook never starts a browser context.
#[derive(Debug, Default, cucumber::World)]
pub struct ShopWorld {
	profile: Option<Profile>,
	fixtures: Option<Fixtures>,
	pub soft: SoftAssertions,
	pub last_login: Option<LoginOutcome>,
	pub last_registration: Option<DialogOutcome>,
}

impl ShopWorld {
	pub fn set_profile(&mut self, profile: Profile) {
		self.profile = Some(profile);
	}

	/// The scenario's fixture container, opening its page on first use.
	pub async fn fixtures(&mut self) -> Result<&Fixtures> {
		let fixtures = match self.fixtures.take() {
			Some(fixtures) => fixtures,
			None => {
				let factory = factory()?;
				let profile = self.profile.unwrap_or(factory.config().profile);
				Fixtures::with_profile(factory.new_page().await?, profile)
			}
		};
		let fixtures: &Fixtures = self.fixtures.insert(fixtures);
		Ok(fixtures)
	}

	/// Closes the scenario's page.
	pub async fn release(&mut self) {
		if let Some(fixtures) = self.fixtures.take() {
			if let Err(err) = fixtures.page().close().await {
				warn!(target = "shoptodo.bdd", error = %err, "closing scenario page failed");
			}
		}
	}
}
