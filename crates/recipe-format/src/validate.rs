//! Structural schema checks for a [`PartRecipe`].
//!
//! Generation guarantees these properties; the validator exists for
//! recipes that arrive from disk or from another producer.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;
use tracing::{debug, instrument};

use recipe_types::{NodeId, PartRecipe, Shape};

const TOL: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum IssueCode {
    NonPositiveBounds,
    MissingBase,
    BaseMismatch,
    DuplicateId,
    NonPositiveDimension,
    NonFiniteValue,
    DanglingReference,
    ForwardReference,
    SelfReference,
    ToolNotPrimitive,
    FeatureCountMismatch,
}

/// One problem found in a recipe.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaIssue {
    pub code: IssueCode,
    /// Location such as `primitives[2].radius` or `operations[0].targetId`.
    pub path: String,
    pub message: String,
}

impl fmt::Display for SchemaIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} at {}: {}", self.code, self.path, self.message)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationReport {
    pub issues: Vec<SchemaIssue>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn has(&self, code: IssueCode) -> bool {
        self.issues.iter().any(|i| i.code == code)
    }

    fn push(&mut self, code: IssueCode, path: impl Into<String>, message: impl Into<String>) {
        self.issues.push(SchemaIssue {
            code,
            path: path.into(),
            message: message.into(),
        });
    }
}

/// Where an id was defined.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Def {
    Primitive,
    Operation(usize),
}

#[instrument(skip(recipe), fields(recipe = %recipe.id))]
pub fn validate_recipe(recipe: &PartRecipe) -> ValidationReport {
    let mut report = ValidationReport::default();

    check_bounds(recipe, &mut report);
    check_primitives(recipe, &mut report);

    let mut defs: HashMap<&NodeId, Def> = HashMap::new();
    for (i, p) in recipe.primitives.iter().enumerate() {
        if defs.insert(&p.id, Def::Primitive).is_some() {
            report.push(
                IssueCode::DuplicateId,
                format!("primitives[{}].id", i),
                format!("id {} is defined more than once", p.id),
            );
        }
    }
    for (i, op) in recipe.operations.iter().enumerate() {
        if defs.insert(&op.id, Def::Operation(i)).is_some() {
            report.push(
                IssueCode::DuplicateId,
                format!("operations[{}].id", i),
                format!("id {} is defined more than once", op.id),
            );
        }
    }

    for (i, op) in recipe.operations.iter().enumerate() {
        let target_path = format!("operations[{}].targetId", i);
        if op.target_id == op.id {
            report.push(IssueCode::SelfReference, target_path, "operation targets itself");
        } else {
            match defs.get(&op.target_id) {
                None => report.push(
                    IssueCode::DanglingReference,
                    target_path,
                    format!("unknown id {}", op.target_id),
                ),
                Some(Def::Operation(j)) if *j > i => report.push(
                    IssueCode::ForwardReference,
                    target_path,
                    format!("{} is applied after {}", op.target_id, op.id),
                ),
                Some(_) => {}
            }
        }

        let tool_path = format!("operations[{}].toolId", i);
        if op.tool_id == op.id {
            report.push(IssueCode::SelfReference, tool_path, "operation uses itself as tool");
        } else {
            match defs.get(&op.tool_id) {
                None => report.push(
                    IssueCode::DanglingReference,
                    tool_path,
                    format!("unknown id {}", op.tool_id),
                ),
                Some(Def::Operation(_)) => report.push(
                    IssueCode::ToolNotPrimitive,
                    tool_path,
                    format!("{} is an operation result", op.tool_id),
                ),
                Some(Def::Primitive) => {}
            }
        }
    }

    if recipe.metadata.feature_count != recipe.operations.len() {
        report.push(
            IssueCode::FeatureCountMismatch,
            "metadata.featureCount",
            format!(
                "metadata says {} features, recipe has {} operations",
                recipe.metadata.feature_count,
                recipe.operations.len()
            ),
        );
    }

    debug!(issues = report.issues.len(), "recipe validated");
    report
}

fn check_bounds(recipe: &PartRecipe, report: &mut ValidationReport) {
    let b = recipe.bounding_mm;
    for (name, v) in [("width", b.width), ("depth", b.depth), ("height", b.height)] {
        if !v.is_finite() {
            report.push(
                IssueCode::NonFiniteValue,
                format!("bounding_mm.{}", name),
                "value is not finite",
            );
        } else if v <= 0.0 {
            report.push(
                IssueCode::NonPositiveBounds,
                format!("bounding_mm.{}", name),
                format!("{} mm is not positive", v),
            );
        }
    }

    match recipe.base() {
        None => report.push(IssueCode::MissingBase, "primitives", "no base primitive p0"),
        Some(base) => match &base.shape {
            Shape::Box {
                width,
                depth,
                height,
            } => {
                let same = [*width, *depth, *height]
                    .iter()
                    .zip(b.as_array())
                    .all(|(a, e)| (a - e).abs() <= TOL);
                if !same {
                    report.push(
                        IssueCode::BaseMismatch,
                        "primitives[p0]",
                        format!(
                            "base is {} x {} x {}, bounding box is {} x {} x {}",
                            width, depth, height, b.width, b.depth, b.height
                        ),
                    );
                }
            }
            other => report.push(
                IssueCode::MissingBase,
                "primitives[p0].kind",
                format!("base must be a box, found {:?}", other.kind()),
            ),
        },
    }
}

fn check_primitives(recipe: &PartRecipe, report: &mut ValidationReport) {
    for (i, p) in recipe.primitives.iter().enumerate() {
        for (name, v) in p.shape.dimensions() {
            let path = format!("primitives[{}].{}", i, name);
            if !v.is_finite() {
                report.push(IssueCode::NonFiniteValue, path, "value is not finite");
            } else if v <= 0.0 {
                report.push(
                    IssueCode::NonPositiveDimension,
                    path,
                    format!("{} mm is not positive", v),
                );
            }
        }
        if let Some(t) = &p.transform {
            let mut values = t.position.iter().chain(&t.rotation).chain(&t.scale);
            if values.any(|v| !v.is_finite()) {
                report.push(
                    IssueCode::NonFiniteValue,
                    format!("primitives[{}].transform", i),
                    "transform has a non-finite component",
                );
            }
        }
    }
}
