use recipe_types::PartRecipe;
use serde::Deserialize;
use tracing::warn;

use crate::errors::LoadError;
use crate::save::{FORMAT_ID, FORMAT_VERSION};
use crate::validate::validate_recipe;

/// The top-level file structure for deserialization.
#[derive(Debug, Clone, Deserialize)]
pub struct RecipeFileRaw {
    pub format: String,
    pub version: u32,
    pub recipe: PartRecipe,
}

/// Deserialize a recipe document.
///
/// Checks the format identifier and version, then validates the recipe
/// against the schema. A recipe with any schema issue is rejected.
pub fn load_recipe(json: &str) -> Result<PartRecipe, LoadError> {
    let raw: RecipeFileRaw =
        serde_json::from_str(json).map_err(|e| LoadError::ParseError(e.to_string()))?;

    if raw.format != FORMAT_ID {
        return Err(LoadError::UnknownFormat(raw.format));
    }

    if raw.version > FORMAT_VERSION {
        return Err(LoadError::FutureVersion {
            file_version: raw.version,
            supported_version: FORMAT_VERSION,
        });
    }

    let report = validate_recipe(&raw.recipe);
    if let Some(first) = report.issues.first() {
        warn!(
            recipe = %raw.recipe.id,
            issues = report.issues.len(),
            "rejecting recipe with schema violations"
        );
        return Err(LoadError::SchemaViolation {
            count: report.issues.len(),
            first: first.to_string(),
        });
    }

    Ok(raw.recipe)
}
