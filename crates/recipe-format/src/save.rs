use recipe_types::PartRecipe;
use serde::Serialize;

/// Format identifier written into every file.
pub const FORMAT_ID: &str = "part-recipe";

/// Current file format version.
pub const FORMAT_VERSION: u32 = 1;

/// The top-level file structure.
#[derive(Debug, Clone, Serialize)]
pub struct RecipeFile<'a> {
    /// Format identifier.
    pub format: &'static str,
    /// Format version number.
    pub version: u32,
    pub recipe: &'a PartRecipe,
}

/// Serialize a recipe to a pretty-printed JSON document.
pub fn save_recipe(recipe: &PartRecipe) -> String {
    let file = RecipeFile {
        format: FORMAT_ID,
        version: FORMAT_VERSION,
        recipe,
    };
    serde_json::to_string_pretty(&file).expect("PartRecipe serialization should never fail")
}
