//! Per-test dependency injection.
//!
//! A [`Fixtures`] container belongs to one test and one page. Fixtures are
//! requested by type through [`Fixtures::get`], built on first request (their
//! own dependencies first), and cached for the rest of the test:
//!
//! ```text
//! CartComponent ──► AuthenticatedPage ──► PageFixture     (Profile::Authenticated)
//! CartComponent ──► PageFixture                           (Profile::Guest)
//! ```
//!
//! A factory error aborts the whole request. Whatever the failed request
//! built along the way is dropped again, so a later request starts clean.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::config::Profile;
use crate::data::{self, ProductTable, TestData};
use crate::driver::{PageHandle, WaitForState};
use crate::error::{Result, ShopError};
use crate::pages::{BasePage, CartComponent, CatalogPage, HeaderComponent, LoginOutcome, LoginPage, RegisterPage};

/// How long [`AuthenticatedPage`] waits for the login dialog to go away.
pub const LOGIN_SETTLE_TIMEOUT: Duration = Duration::from_secs(5);

/// A value [`Fixtures`] can build and cache.
#[async_trait]
pub trait Fixture: Send + Sync + Sized + 'static {
	/// Name used in logs and errors.
	const NAME: &'static str;

	/// Builds the fixture. Dependencies are requested from `fixtures`.
	async fn setup(fixtures: &Fixtures) -> Result<Self>;
}

type Cached = Arc<dyn Any + Send + Sync>;

/// Fixture container for one test.
pub struct Fixtures {
	page: PageHandle,
	profile: Profile,
	cache: Mutex<HashMap<TypeId, Cached>>,
	/// Fixtures being built, outermost first.
	resolving: Mutex<Vec<(TypeId, &'static str)>>,
	/// Cache insertions in order, so a failed request can undo its own.
	journal: Mutex<Vec<TypeId>>,
}

impl std::fmt::Debug for Fixtures {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Fixtures")
			.field("profile", &self.profile)
			.field("cached", &self.cache.lock().len())
			.finish_non_exhaustive()
	}
}

impl Fixtures {
	/// Container for the page the runner supplied, under the suite's profile.
	pub fn new(page: PageHandle) -> Self {
		let profile = page.config().profile;
		Self::with_profile(page, profile)
	}

	pub fn with_profile(page: PageHandle, profile: Profile) -> Self {
		Self {
			page,
			profile,
			cache: Mutex::new(HashMap::new()),
			resolving: Mutex::new(Vec::new()),
			journal: Mutex::new(Vec::new()),
		}
	}

	pub fn page(&self) -> &PageHandle {
		&self.page
	}

	pub fn profile(&self) -> Profile {
		self.profile
	}

	/// Whether `F` has been built in this test.
	pub fn is_cached<F: Fixture>(&self) -> bool {
		self.cache.lock().contains_key(&TypeId::of::<F>())
	}

	/// Returns `F`, building it and its dependencies on first use.
	///
	/// # Errors
	///
	/// - [`ShopError::FixtureCycle`] when `F` is already being built further up
	/// - [`ShopError::Fixture`] wrapping the error of a failed factory
	pub async fn get<F: Fixture>(&self) -> Result<Arc<F>> {
		let key = TypeId::of::<F>();
		if let Some(cached) = self.cached::<F>() {
			return Ok(cached);
		}

		let (top_level, mark) = {
			let mut resolving = self.resolving.lock();
			if resolving.iter().any(|(id, _)| *id == key) {
				let mut path: Vec<&'static str> = resolving.iter().map(|(_, name)| *name).collect();
				path.push(F::NAME);
				warn!(target = "shoptodo.fixtures", path = %path.join(" -> "), "dependency cycle");
				return Err(ShopError::FixtureCycle(path));
			}
			let top_level = resolving.is_empty();
			resolving.push((key, F::NAME));
			(top_level, self.journal.lock().len())
		};

		debug!(target = "shoptodo.fixtures", fixture = F::NAME, "setup");
		let built = F::setup(self).await;
		self.resolving.lock().pop();

		match built {
			Ok(value) => {
				let value = Arc::new(value);
				self.cache.lock().insert(key, Arc::clone(&value) as Cached);
				self.journal.lock().push(key);
				info!(target = "shoptodo.fixtures", fixture = F::NAME, "ready");
				Ok(value)
			}
			Err(err) => {
				if top_level {
					self.rollback(mark);
				}
				warn!(target = "shoptodo.fixtures", fixture = F::NAME, error = %err, "setup failed");
				Err(match err {
					cycle @ ShopError::FixtureCycle(_) => cycle,
					source => ShopError::Fixture {
						name: F::NAME,
						source: Box::new(source),
					},
				})
			}
		}
	}

	fn cached<F: Fixture>(&self) -> Option<Arc<F>> {
		let cached = self.cache.lock().get(&TypeId::of::<F>()).cloned()?;
		cached.downcast::<F>().ok()
	}

	/// Drops everything cached since journal position `mark`.
	fn rollback(&self, mark: usize) {
		let undone: Vec<TypeId> = self.journal.lock().drain(mark..).collect();
		if undone.is_empty() {
			return;
		}
		let mut cache = self.cache.lock();
		for key in &undone {
			cache.remove(key);
		}
		debug!(target = "shoptodo.fixtures", dropped = undone.len(), "rolled back failed request");
	}

	/// The page page objects bind to: the raw page for guests, the logged-in
	/// page under [`Profile::Authenticated`].
	async fn bound_page(&self) -> Result<PageHandle> {
		match self.profile {
			Profile::Guest => Ok(self.get::<PageFixture>().await?.0.clone()),
			Profile::Authenticated => Ok(self.get::<AuthenticatedPage>().await?.0.clone()),
		}
	}
}

/// The page the runner supplied for this test.
#[derive(Debug, Clone)]
pub struct PageFixture(pub PageHandle);

#[async_trait]
impl Fixture for PageFixture {
	const NAME: &'static str = "page";

	async fn setup(fixtures: &Fixtures) -> Result<Self> {
		Ok(Self(fixtures.page.clone()))
	}
}

/// The page after logging in with the demo user.
#[derive(Debug, Clone)]
pub struct AuthenticatedPage(pub PageHandle);

#[async_trait]
impl Fixture for AuthenticatedPage {
	const NAME: &'static str = "authenticatedPage";

	async fn setup(fixtures: &Fixtures) -> Result<Self> {
		let page = fixtures.get::<PageFixture>().await?.0.clone();
		let base = BasePage::new(page.clone());
		base.open("").await?;

		HeaderComponent::new(page.clone()).click_login().await?;
		let user = data::VALID_USER;
		let login = LoginPage::new(page.clone());
		login.submit(user.username, user.password).await?;
		// A rejected login also leaves the dialog open, so both end here.
		page.wait_for(&LoginPage::dialog(), WaitForState::Hidden, LOGIN_SETTLE_TIMEOUT).await?;
		info!(target = "shoptodo.fixtures", username = user.username, "authenticated");
		Ok(Self(page))
	}
}

#[async_trait]
impl Fixture for BasePage {
	const NAME: &'static str = "basePage";

	async fn setup(fixtures: &Fixtures) -> Result<Self> {
		Ok(Self::new(fixtures.get::<PageFixture>().await?.0.clone()))
	}
}

#[async_trait]
impl Fixture for CatalogPage {
	const NAME: &'static str = "catalogPage";

	async fn setup(fixtures: &Fixtures) -> Result<Self> {
		Ok(Self::new(fixtures.bound_page().await?))
	}
}

#[async_trait]
impl Fixture for CartComponent {
	const NAME: &'static str = "cartComponent";

	async fn setup(fixtures: &Fixtures) -> Result<Self> {
		Ok(Self::new(fixtures.bound_page().await?))
	}
}

#[async_trait]
impl Fixture for LoginPage {
	const NAME: &'static str = "loginPage";

	async fn setup(fixtures: &Fixtures) -> Result<Self> {
		Ok(Self::new(fixtures.get::<PageFixture>().await?.0.clone()))
	}
}

#[async_trait]
impl Fixture for RegisterPage {
	const NAME: &'static str = "registerPage";

	async fn setup(fixtures: &Fixtures) -> Result<Self> {
		Ok(Self::new(fixtures.get::<PageFixture>().await?.0.clone()))
	}
}

#[async_trait]
impl Fixture for HeaderComponent {
	const NAME: &'static str = "headerComponent";

	async fn setup(fixtures: &Fixtures) -> Result<Self> {
		Ok(Self::new(fixtures.get::<PageFixture>().await?.0.clone()))
	}
}

/// Product oracle for price assertions.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProductData(pub ProductTable);

impl std::ops::Deref for ProductData {
	type Target = ProductTable;

	fn deref(&self) -> &ProductTable {
		&self.0
	}
}

#[async_trait]
impl Fixture for ProductData {
	const NAME: &'static str = "productData";

	async fn setup(_fixtures: &Fixtures) -> Result<Self> {
		Ok(Self(ProductTable::standard()))
	}
}

#[async_trait]
impl Fixture for TestData {
	const NAME: &'static str = "testData";

	async fn setup(_fixtures: &Fixtures) -> Result<Self> {
		Ok(Self::default())
	}
}

/// Logs in through [`LoginPage`] and reports the outcome; for steps that log
/// in explicitly instead of using [`AuthenticatedPage`].
pub async fn log_in_as(fixtures: &Fixtures, username: &str, password: &str) -> Result<LoginOutcome> {
	fixtures.get::<HeaderComponent>().await?.click_login().await?;
	fixtures.get::<LoginPage>().await?.login(username, password).await
}
