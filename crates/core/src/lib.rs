//! shoptodo: page objects and fixtures for the ShopTodo storefront.
//!
//! Scenarios talk to the app through page objects ([`pages`]) obtained from a
//! per-test [`Fixtures`] container. Page objects drive a [`PageDriver`]:
//! either a real Chromium page ([`driver::browser`]) or the in-memory
//! [`Storefront`](sim::Storefront) used for offline runs.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//!
//! use shoptodo::fixtures::ProductData;
//! use shoptodo::pages::{CartComponent, CatalogPage};
//! use shoptodo::{Fixtures, PageHandle, SuiteConfig, sim::Storefront};
//!
//! let config = Arc::new(SuiteConfig::load()?);
//! let page = PageHandle::new(Storefront::shared(&config), config);
//! let fixtures = Fixtures::new(page);
//!
//! fixtures.get::<CatalogPage>().await?.add_to_cart("Tシャツ").await?;
//! let cart = fixtures.get::<CartComponent>().await?;
//! cart.wait_for_item_count(1).await?;
//! assert_eq!(cart.item_price("Tシャツ").await?, fixtures.get::<ProductData>().await?.price_of("Tシャツ")?);
//! ```

pub mod config;
pub mod currency;
pub mod data;
pub mod driver;
pub mod error;
pub mod expect;
pub mod fixtures;
pub mod locator;
pub mod logging;
pub mod pages;
pub mod sim;

pub use config::{Backend, Profile, SuiteConfig};
pub use driver::{PageDriver, PageHandle, WaitForState};
pub use error::{Result, ShopError};
pub use expect::SoftAssertions;
pub use fixtures::{Fixture, Fixtures};
pub use locator::{Locator, Role, TextMatch};
