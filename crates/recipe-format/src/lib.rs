pub mod errors;
pub mod load;
pub mod save;
pub mod validate;

pub use errors::LoadError;
pub use load::load_recipe;
pub use save::{save_recipe, FORMAT_ID, FORMAT_VERSION};
pub use validate::{validate_recipe, IssueCode, SchemaIssue, ValidationReport};
