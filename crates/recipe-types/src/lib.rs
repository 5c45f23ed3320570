pub mod ids;
pub mod operation;
pub mod recipe;
pub mod shape;

pub use ids::*;
pub use operation::*;
pub use recipe::*;
pub use shape::*;
