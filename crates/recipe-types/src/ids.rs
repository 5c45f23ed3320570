use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a node in a recipe: either a primitive (`p{n}`) or the
/// result of an operation (`o{n}`).
///
/// Ids are stable within a recipe and never reused, so gaps are normal when
/// features were dropped during generation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl NodeId {
    /// Id of the `index`-th primitive. The base solid is always `p0`.
    pub fn primitive(index: usize) -> Self {
        Self(format!("p{}", index))
    }

    /// Id of the operation that consumes the `index`-th tool primitive.
    pub fn operation(index: usize) -> Self {
        Self(format!("o{}", index))
    }

    pub fn is_primitive(&self) -> bool {
        self.0.starts_with('p')
    }

    pub fn is_operation(&self) -> bool {
        self.0.starts_with('o')
    }

    /// Numeric suffix, if the id follows the `p{n}` / `o{n}` convention.
    pub fn index(&self) -> Option<usize> {
        self.0.get(1..).and_then(|s| s.parse().ok())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitive_and_operation_ids() {
        let p = NodeId::primitive(3);
        let o = NodeId::operation(3);
        assert_eq!(p.as_str(), "p3");
        assert_eq!(o.as_str(), "o3");
        assert!(p.is_primitive() && !p.is_operation());
        assert!(o.is_operation() && !o.is_primitive());
        assert_eq!(p.index(), Some(3));
    }

    #[test]
    fn index_of_foreign_id_is_none() {
        assert_eq!(NodeId::from("base").index(), None);
    }
}
