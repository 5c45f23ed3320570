//! Verification oracles: pure functions returning pass/fail verdicts.
//!
//! Each oracle returns an `OracleVerdict` with diagnostic detail, not panics,
//! so a sweep can collect every failure in one pass.

use std::collections::HashSet;

use part_generator::placement::Aabb;
use part_generator::{generate, site_thickness, DifficultyPolicy};
use recipe_format::validate_recipe;
use recipe_types::{BooleanKind, Difficulty, NodeId, PartRecipe, Shape};

const TOL: f64 = 1e-9;

/// The result of a single oracle check.
#[derive(Debug, Clone)]
pub struct OracleVerdict {
    pub oracle_name: String,
    pub passed: bool,
    pub detail: String,
    pub value: Option<f64>,
}

impl OracleVerdict {
    fn pass(name: &str, detail: String) -> Self {
        Self {
            oracle_name: name.to_string(),
            passed: true,
            detail,
            value: None,
        }
    }

    fn pass_val(name: &str, detail: String, value: f64) -> Self {
        Self {
            oracle_name: name.to_string(),
            passed: true,
            detail,
            value: Some(value),
        }
    }

    fn fail(name: &str, detail: String) -> Self {
        Self {
            oracle_name: name.to_string(),
            passed: false,
            detail,
            value: None,
        }
    }

    fn fail_val(name: &str, detail: String, value: f64) -> Self {
        Self {
            oracle_name: name.to_string(),
            passed: false,
            detail,
            value: Some(value),
        }
    }
}

// ── Structure Oracles ───────────────────────────────────────────────────────

/// Every reference resolves to an id defined earlier; tools are primitives.
pub fn check_referential_integrity(recipe: &PartRecipe) -> OracleVerdict {
    let primitives: HashSet<&NodeId> = recipe.primitives.iter().map(|p| &p.id).collect();
    let mut applied: HashSet<&NodeId> = HashSet::new();
    let mut bad = Vec::new();

    for op in &recipe.operations {
        if !primitives.contains(&op.tool_id) {
            bad.push(format!("{} tool {}", op.id, op.tool_id));
        }
        if !primitives.contains(&op.target_id) && !applied.contains(&op.target_id) {
            bad.push(format!("{} target {}", op.id, op.target_id));
        }
        if !applied.insert(&op.id) || primitives.contains(&op.id) {
            bad.push(format!("{} defined twice", op.id));
        }
    }

    if bad.is_empty() {
        OracleVerdict::pass(
            "referential_integrity",
            format!("{} operations, all references resolve", recipe.operations.len()),
        )
    } else {
        OracleVerdict::fail(
            "referential_integrity",
            format!(
                "{} unresolved: {:?}",
                bad.len(),
                &bad[..bad.len().min(5)]
            ),
        )
    }
}

/// Every length and radius parameter is finite and strictly positive.
pub fn check_positivity(recipe: &PartRecipe) -> OracleVerdict {
    let mut bad = Vec::new();
    for p in &recipe.primitives {
        for (name, v) in p.shape.dimensions() {
            if !(v.is_finite() && v > 0.0) {
                bad.push(format!("{}.{}={}", p.id, name, v));
            }
        }
    }

    if bad.is_empty() {
        OracleVerdict::pass(
            "positivity",
            format!("{} primitives, all dimensions > 0", recipe.primitives.len()),
        )
    } else {
        OracleVerdict::fail(
            "positivity",
            format!("{} bad parameters: {:?}", bad.len(), &bad[..bad.len().min(5)]),
        )
    }
}

// ── Geometry Oracles ────────────────────────────────────────────────────────

/// Estimated wall thickness at every subtract and intersect site is at
/// least `min_wall`. The value is the thinnest wall found.
pub fn check_wall_thickness(recipe: &PartRecipe, min_wall: f64) -> OracleVerdict {
    let mut thinnest = f64::INFINITY;
    let mut thin_site = None;
    for op in &recipe.operations {
        if let Some(t) = site_thickness(
            op,
            &recipe.primitives,
            &recipe.operations,
            &recipe.bounding_mm,
        ) {
            if t < thinnest {
                thinnest = t;
                thin_site = Some(op.id.clone());
            }
        }
    }

    match thin_site {
        None => OracleVerdict::pass("wall_thickness", "no cut sites".to_string()),
        Some(site) if thinnest >= min_wall - TOL => OracleVerdict::pass_val(
            "wall_thickness",
            format!("thinnest wall {:.3} mm at {} (min {})", thinnest, site, min_wall),
            thinnest,
        ),
        Some(site) => OracleVerdict::fail_val(
            "wall_thickness",
            format!("wall {:.3} mm at {} below min {}", thinnest, site, min_wall),
            thinnest,
        ),
    }
}

/// The base is a box matching `bounding_mm`, and every tool touches it.
pub fn check_bounding_consistency(recipe: &PartRecipe) -> OracleVerdict {
    let b = recipe.bounding_mm;
    match recipe.base().map(|p| &p.shape) {
        Some(Shape::Box {
            width,
            depth,
            height,
        }) if (width - b.width).abs() <= TOL
            && (depth - b.depth).abs() <= TOL
            && (height - b.height).abs() <= TOL => {}
        other => {
            return OracleVerdict::fail(
                "bounding_consistency",
                format!("base {:?} does not match bounds {:?}", other, b),
            )
        }
    }

    let part = Aabb::of_bounds(&b);
    let detached: Vec<&NodeId> = recipe.primitives[1..]
        .iter()
        .filter(|p| {
            Aabb::of_primitive(p)
                .separation(&part)
                .iter()
                .any(|s| *s > TOL)
        })
        .map(|p| &p.id)
        .collect();

    if detached.is_empty() {
        OracleVerdict::pass(
            "bounding_consistency",
            format!(
                "base {} x {} x {} mm, {} tools touch it",
                b.width,
                b.depth,
                b.height,
                recipe.primitives.len() - 1
            ),
        )
    } else {
        OracleVerdict::fail(
            "bounding_consistency",
            format!("tools outside the base: {:?}", detached),
        )
    }
}

// ── Sequence Oracles ────────────────────────────────────────────────────────

/// Through cuts come before every union; intersects come last.
pub fn check_operation_ordering(recipe: &PartRecipe) -> OracleVerdict {
    let ops = &recipe.operations;
    let last_through = ops.iter().rposition(|o| o.is_through_cut());
    let first_union = ops.iter().position(|o| o.kind == BooleanKind::Union);

    if let (Some(t), Some(u)) = (last_through, first_union) {
        if t > u {
            return OracleVerdict::fail(
                "operation_ordering",
                format!("through cut {} follows union {}", ops[t].id, ops[u].id),
            );
        }
    }

    if let Some(i) = ops.iter().position(|o| o.kind == BooleanKind::Intersect) {
        if let Some(late) = ops[i..].iter().find(|o| o.kind != BooleanKind::Intersect) {
            return OracleVerdict::fail(
                "operation_ordering",
                format!("{} follows intersect {}", late.id, ops[i].id),
            );
        }
    }

    for pair in ops.windows(2) {
        if pair[1].target_id != pair[0].id {
            return OracleVerdict::fail(
                "operation_ordering",
                format!("{} does not target {}", pair[1].id, pair[0].id),
            );
        }
    }

    OracleVerdict::pass(
        "operation_ordering",
        format!("{} operations in order", ops.len()),
    )
}

/// Operation count within the policy's range and every kind allowed.
pub fn check_feature_count(recipe: &PartRecipe, policy: &DifficultyPolicy) -> OracleVerdict {
    let n = recipe.operations.len();
    if n > policy.feature_count.max as usize {
        return OracleVerdict::fail_val(
            "feature_count",
            format!("{} features, max {}", n, policy.feature_count.max),
            n as f64,
        );
    }
    if let Some(op) = recipe.operations.iter().find(|o| !policy.allows(o.kind)) {
        return OracleVerdict::fail(
            "feature_count",
            format!("{} uses disallowed {}", op.id, op.kind),
        );
    }
    if recipe.metadata.feature_count != n {
        return OracleVerdict::fail(
            "feature_count",
            format!(
                "metadata reports {}, recipe has {}",
                recipe.metadata.feature_count, n
            ),
        );
    }
    OracleVerdict::pass_val(
        "feature_count",
        format!(
            "{} features (policy {}..={})",
            n, policy.feature_count.min, policy.feature_count.max
        ),
        n as f64,
    )
}

/// The recipe passes the schema validator.
pub fn check_schema(recipe: &PartRecipe) -> OracleVerdict {
    let report = validate_recipe(recipe);
    if report.is_valid() {
        OracleVerdict::pass("schema", "no schema issues".to_string())
    } else {
        let first: Vec<String> = report.issues.iter().take(3).map(|i| i.to_string()).collect();
        OracleVerdict::fail_val(
            "schema",
            format!("{} issues: {}", report.issues.len(), first.join("; ")),
            report.issues.len() as f64,
        )
    }
}

/// Two independent generations agree on everything but the timestamp.
pub fn check_determinism(seed: u64, difficulty: Difficulty) -> OracleVerdict {
    match (generate(seed, difficulty), generate(seed, difficulty)) {
        (Ok(a), Ok(b)) if a.same_geometry(&b) => OracleVerdict::pass(
            "determinism",
            format!("seed {} {} reproduced", seed, difficulty),
        ),
        (Ok(_), Ok(_)) => OracleVerdict::fail(
            "determinism",
            format!("seed {} {} produced different recipes", seed, difficulty),
        ),
        (Err(e), _) | (_, Err(e)) => {
            OracleVerdict::fail("determinism", format!("generation failed: {}", e))
        }
    }
}

// ── Composite ───────────────────────────────────────────────────────────────

/// Run every single-recipe check against the recipe's own difficulty policy.
pub fn run_all_checks(recipe: &PartRecipe) -> Vec<OracleVerdict> {
    let policy = DifficultyPolicy::for_difficulty(recipe.difficulty);
    vec![
        check_referential_integrity(recipe),
        check_positivity(recipe),
        check_wall_thickness(recipe, policy.min_wall_thickness),
        check_bounding_consistency(recipe),
        check_operation_ordering(recipe),
        check_feature_count(recipe, &policy),
        check_schema(recipe),
    ]
}
