//! Core operations.
//!
//! Multi-request workflows built on the client, kept apart from argument
//! parsing and output rendering so they can run against any transport.

pub mod export;
pub mod formula;
pub mod import;

#[cfg(test)]
pub(crate) mod fake;

pub use export::export;
pub use formula::{deploy_formulas, test_formulas};
pub use import::import;
