//! BDD scenarios for the ShopTodo storefront.
//!
//! Feature files live in `tests/features/`. Every scenario gets its own page
//! from the configured backend (`SHOPTODO_BACKEND`, default `sim`) and its own
//! fixture container. Scenarios or features tagged `@authenticated` run under
//! [`Profile::Authenticated`](shoptodo::Profile::Authenticated).
//!
//! ```text
//! cargo test --test bdd
//! cargo test --test bdd -- --tags @cart
//! SHOPTODO_BACKEND=playwright cargo test --test bdd
//! ```

mod steps;
mod world;

use std::sync::Arc;

use cucumber::{StatsWriter as _, World as _};
use shoptodo::driver::PageFactory;
use shoptodo::logging::{init_logging, verbosity_from_env};
use shoptodo::{Profile, SuiteConfig};
use world::ShopWorld;

const AUTHENTICATED_TAG: &str = "authenticated";

#[tokio::main]
async fn main() {
	init_logging(verbosity_from_env());

	let config = match SuiteConfig::load() {
		Ok(config) => config,
		Err(err) => {
			eprintln!("cannot load suite configuration: {err}");
			std::process::exit(2);
		}
	};
	let factory = world::install_factory(PageFactory::new(Arc::new(config)));

	let features = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/features");
	let writer = ShopWorld::cucumber()
		.before(|feature, _rule, scenario, world| {
			Box::pin(async move {
				let tagged = feature.tags.iter().chain(&scenario.tags).any(|t| t == AUTHENTICATED_TAG);
				if tagged {
					world.set_profile(Profile::Authenticated);
				}
			})
		})
		.after(|_feature, _rule, _scenario, _finished, world| {
			Box::pin(async move {
				if let Some(world) = world {
					world.release().await;
				}
			})
		})
		.fail_on_skipped()
		.run(features)
		.await;

	if let Err(err) = factory.shutdown().await {
		eprintln!("browser shutdown failed: {err}");
	}
	if writer.execution_has_failed() {
		std::process::exit(1);
	}
}
