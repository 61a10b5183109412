//! Step definitions, one module per feature area.
//!
//! There is a single canonical step set. Steps never build page objects
//! themselves; they ask the scenario's [`Fixtures`](shoptodo::Fixtures), so
//! the `@authenticated` profile applies to every step alike.

mod auth;
mod cart;
mod catalog;
mod common;
