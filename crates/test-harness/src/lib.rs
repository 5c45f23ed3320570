//! Verification tooling for generated part recipes.
//!
//! # Key Components
//!
//! - [`oracle`]: Pure checks of the recipe contract returning pass/fail verdicts
//! - [`report`]: Structured text description of a recipe
//! - [`helpers`]: Error type, seed sweeps, lookup helpers
//! - [`assertions`]: Assertion helpers with diagnostics

pub mod assertions;
pub mod helpers;
pub mod oracle;
pub mod report;

pub use helpers::{sweep, HarnessError};
pub use oracle::OracleVerdict;
pub use report::RecipeReport;
