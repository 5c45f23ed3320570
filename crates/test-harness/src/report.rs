//! Structured text reports of a recipe.
//!
//! Reports are plain text, meant to be read next to a failing test or
//! printed by the command-line tool.

use std::fmt;

use recipe_types::{PartRecipe, Primitive, Shape};

use crate::oracle::{run_all_checks, OracleVerdict};

/// A complete recipe report with all sections.
pub struct RecipeReport {
    pub title: String,
    pub bounds: [f64; 3],
    pub primitive_entries: Vec<PrimitiveEntry>,
    pub operation_entries: Vec<OperationEntry>,
    pub metadata_lines: Vec<String>,
    pub oracle_results: Vec<OracleVerdict>,
}

/// A single primitive's report entry.
pub struct PrimitiveEntry {
    pub id: String,
    pub kind: String,
    pub detail: String,
    pub position: Option<[f64; 3]>,
}

/// A single operation's report entry.
pub struct OperationEntry {
    pub index: usize,
    pub id: String,
    pub kind: String,
    pub target: String,
    pub tool: String,
    pub tag: Option<String>,
}

impl RecipeReport {
    /// Describe `recipe` and run every oracle on it.
    pub fn from_recipe(recipe: &PartRecipe) -> Self {
        let primitive_entries = recipe
            .primitives
            .iter()
            .map(|p| PrimitiveEntry {
                id: p.id.to_string(),
                kind: format!("{:?}", p.kind()),
                detail: describe_shape(&p.shape),
                position: p.transform.as_ref().map(|t| t.position),
            })
            .collect();

        let operation_entries = recipe
            .operations
            .iter()
            .enumerate()
            .map(|(index, o)| OperationEntry {
                index,
                id: o.id.to_string(),
                kind: o.kind.to_string(),
                target: o.target_id.to_string(),
                tool: o.tool_id.to_string(),
                tag: o.feature.map(|f| {
                    let through = if f.through { ", through" } else { "" };
                    format!("{} ({}{})", f.tag, f.axis, through)
                }),
            })
            .collect();

        let m = &recipe.metadata;
        let mut metadata_lines = vec![
            format!(
                "features: {} kept / {} sampled ({} placement drops, {} safety drops, {} shrunk)",
                m.feature_count,
                m.sampled_features,
                m.placement_drops,
                m.safety_drops,
                m.shrunk_features
            ),
            format!(
                "csg depth: {} | primitive kinds: {}",
                m.csg_depth, m.primitive_kinds
            ),
            format!("generator: {} | rng: {}", m.generator, m.rng),
        ];
        if !m.dropped_feature_ids.is_empty() {
            let ids: Vec<String> = m.dropped_feature_ids.iter().map(|i| i.to_string()).collect();
            metadata_lines.push(format!("dropped: {}", ids.join(", ")));
        }
        for (k, v) in &m.extra {
            metadata_lines.push(format!("{}: {}", k, v));
        }

        Self {
            title: format!(
                "{} seed={} difficulty={}",
                recipe.id, recipe.seed, recipe.difficulty
            ),
            bounds: recipe.bounding_mm.as_array(),
            primitive_entries,
            operation_entries,
            metadata_lines,
            oracle_results: run_all_checks(recipe),
        }
    }

    pub fn all_passed(&self) -> bool {
        self.oracle_results.iter().all(|v| v.passed)
    }

    /// Format the report as text.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        out.push_str("=== Part Recipe Report ===\n");
        out.push_str(&format!("{}\n", self.title));
        out.push_str(&format!(
            "Bounds: {:.1} x {:.1} x {:.1} mm\n\n",
            self.bounds[0], self.bounds[1], self.bounds[2]
        ));

        out.push_str(&format!("Primitives ({}):\n", self.primitive_entries.len()));
        for p in &self.primitive_entries {
            out.push_str(&format!("  {} {} {}", p.id, p.kind, p.detail));
            if let Some([x, y, z]) = p.position {
                out.push_str(&format!(" @ ({:.1}, {:.1}, {:.1})", x, y, z));
            }
            out.push('\n');
        }

        out.push_str(&format!("\nOperations ({}):\n", self.operation_entries.len()));
        for o in &self.operation_entries {
            out.push_str(&format!(
                "  [{}] {} {} {} <- {}",
                o.index, o.id, o.kind, o.target, o.tool
            ));
            if let Some(tag) = &o.tag {
                out.push_str(&format!("  {}", tag));
            }
            out.push('\n');
        }

        out.push_str("\nMetadata:\n");
        for line in &self.metadata_lines {
            out.push_str(&format!("  {}\n", line));
        }

        if !self.oracle_results.is_empty() {
            out.push_str(&format!(
                "\nOracle Results ({} checks):\n",
                self.oracle_results.len()
            ));
            for v in &self.oracle_results {
                let status = if v.passed { "PASS" } else { "FAIL" };
                out.push_str(&format!("  [{}] {}: {}\n", status, v.oracle_name, v.detail));
            }
        }

        out
    }
}

impl fmt::Display for RecipeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_text())
    }
}

/// Describe a shape's parameters in a human-readable way.
fn describe_shape(shape: &Shape) -> String {
    let dims: Vec<String> = shape
        .dimensions()
        .iter()
        .map(|(name, v)| format!("{}={}", name, v))
        .collect();
    let mut text = dims.join(" ");
    if let Shape::Custom { profile, .. } = shape {
        text = format!("profile={} {}", profile, text);
    }
    if let Some(axis) = shape.axis() {
        text.push_str(&format!(" axis={}", axis));
    }
    text
}

/// One-line label for a primitive, e.g. `p1 Cylinder radius=10 height=27 axis=z`.
pub fn primitive_label(p: &Primitive) -> String {
    format!("{} {:?} {}", p.id, p.kind(), describe_shape(&p.shape))
}
