//! Rich assertion helpers with diagnostic output.
//!
//! Every failure includes the expected and actual values plus the
//! operation chain of the recipe under test.

use recipe_types::{BooleanKind, FeatureTag, PartRecipe};

use crate::helpers::{chain_summary, HarnessError};
use crate::oracle::{run_all_checks, OracleVerdict};

/// Fail with every failed verdict listed.
pub fn assert_all_pass(verdicts: &[OracleVerdict], ctx: &str) -> Result<(), HarnessError> {
    let failed: Vec<&OracleVerdict> = verdicts.iter().filter(|v| !v.passed).collect();
    match failed.first() {
        None => Ok(()),
        Some(first) if failed.len() == 1 => Err(HarnessError::OracleFailure {
            oracle: first.oracle_name.clone(),
            detail: format!("[{}] {}", ctx, first.detail),
        }),
        Some(_) => Err(HarnessError::AssertionFailed {
            detail: format!(
                "[{}] {} oracles failed:\n{}",
                ctx,
                failed.len(),
                failed
                    .iter()
                    .map(|v| format!("  {}: {}", v.oracle_name, v.detail))
                    .collect::<Vec<_>>()
                    .join("\n"),
            ),
        }),
    }
}

/// Run every oracle on `recipe` and require all of them to pass.
pub fn assert_recipe_valid(recipe: &PartRecipe, ctx: &str) -> Result<(), HarnessError> {
    assert_all_pass(&run_all_checks(recipe), ctx)
}

/// Assert the operation kinds in application order.
pub fn assert_operation_kinds(
    recipe: &PartRecipe,
    expected: &[BooleanKind],
    ctx: &str,
) -> Result<(), HarnessError> {
    let actual: Vec<BooleanKind> = recipe.operations.iter().map(|o| o.kind).collect();
    if actual == expected {
        Ok(())
    } else {
        Err(HarnessError::AssertionFailed {
            detail: format!(
                "[{}] expected kinds {:?}, got {:?}\nChain: {}",
                ctx,
                expected,
                actual,
                chain_summary(recipe).join(" -> "),
            ),
        })
    }
}

/// Assert the semantic tags in application order.
pub fn assert_tags(
    recipe: &PartRecipe,
    expected: &[FeatureTag],
    ctx: &str,
) -> Result<(), HarnessError> {
    let actual: Vec<Option<FeatureTag>> = recipe.operations.iter().map(|o| o.tag()).collect();
    let wanted: Vec<Option<FeatureTag>> = expected.iter().copied().map(Some).collect();
    if actual == wanted {
        Ok(())
    } else {
        Err(HarnessError::AssertionFailed {
            detail: format!(
                "[{}] expected tags {:?}, got {:?}\nChain: {}",
                ctx,
                expected,
                actual,
                chain_summary(recipe).join(" -> "),
            ),
        })
    }
}

/// Assert the nominal bounding box within tolerance.
pub fn assert_bounds(
    recipe: &PartRecipe,
    expected: [f64; 3],
    tol: f64,
    ctx: &str,
) -> Result<(), HarnessError> {
    let actual = recipe.bounding_mm.as_array();
    for i in 0..3 {
        if (actual[i] - expected[i]).abs() > tol {
            return Err(HarnessError::AssertionFailed {
                detail: format!(
                    "[{}] bounds[{}]: expected {:.3}, got {:.3} (tol={})",
                    ctx, i, expected[i], actual[i], tol,
                ),
            });
        }
    }
    Ok(())
}
