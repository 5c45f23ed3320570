//! Helper functions: error type, seed sweeps, recipe lookups.

use std::ops::Range;

use part_generator::{generate, GenerateError};
use recipe_types::{Difficulty, Operation, PartRecipe, Primitive};

// ── Error Type ──────────────────────────────────────────────────────────────

/// Unified error type for the test harness.
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    #[error("generation failed for seed {seed}: {source}")]
    Generate {
        seed: u64,
        #[source]
        source: GenerateError,
    },

    #[error("assertion failed: {detail}")]
    AssertionFailed { detail: String },

    #[error("oracle failure ({oracle}): {detail}")]
    OracleFailure { oracle: String, detail: String },

    #[error("unknown id: {id}")]
    UnknownId { id: String },
}

// ── Sweeps ──────────────────────────────────────────────────────────────────

/// Generate one recipe per seed in `seeds`.
pub fn sweep(difficulty: Difficulty, seeds: Range<u64>) -> Result<Vec<PartRecipe>, HarnessError> {
    seeds
        .map(|seed| {
            generate(seed, difficulty).map_err(|source| HarnessError::Generate { seed, source })
        })
        .collect()
}

// ── Lookups ─────────────────────────────────────────────────────────────────

/// The tool primitive an operation applies.
pub fn tool_of<'a>(recipe: &'a PartRecipe, op: &Operation) -> Result<&'a Primitive, HarnessError> {
    recipe
        .primitive(&op.tool_id)
        .ok_or_else(|| HarnessError::UnknownId {
            id: op.tool_id.to_string(),
        })
}

/// Operations in application order, rendered as `o3:subtract(o2, p3)`.
pub fn chain_summary(recipe: &PartRecipe) -> Vec<String> {
    recipe
        .operations
        .iter()
        .map(|o| format!("{}:{}({}, {})", o.id, o.kind, o.target_id, o.tool_id))
        .collect()
}
