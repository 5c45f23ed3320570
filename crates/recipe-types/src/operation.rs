use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ids::NodeId;
use crate::shape::Axis;

/// Boolean operation type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BooleanKind {
    Union,
    Subtract,
    Intersect,
}

impl fmt::Display for BooleanKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BooleanKind::Union => "union",
            BooleanKind::Subtract => "subtract",
            BooleanKind::Intersect => "intersect",
        };
        f.write_str(s)
    }
}

/// Semantic tag consumed by drawing and dimensioning logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FeatureTag {
    /// Blind drilled hole.
    Hole,
    ThroughHole,
    Pocket,
    ThroughSlot,
    Boss,
    Rib,
    Countersink,
    /// Spherical recess centred on a face.
    Dimple,
    /// Toroidal ring groove centred on a face.
    Groove,
    /// Intersection that trims the outline of the part.
    Trim,
}

impl FeatureTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureTag::Hole => "hole",
            FeatureTag::ThroughHole => "through-hole",
            FeatureTag::Pocket => "pocket",
            FeatureTag::ThroughSlot => "through-slot",
            FeatureTag::Boss => "boss",
            FeatureTag::Rib => "rib",
            FeatureTag::Countersink => "countersink",
            FeatureTag::Dimple => "dimple",
            FeatureTag::Groove => "groove",
            FeatureTag::Trim => "trim",
        }
    }
}

impl fmt::Display for FeatureTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Feature metadata attached to an operation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureMeta {
    pub tag: FeatureTag,
    /// The tool fully traverses the base along `axis`.
    pub through: bool,
    /// Direction the feature is cut or raised along. Blind and raised
    /// features open on the positive face of this axis.
    pub axis: Axis,
}

/// One ordered boolean step. `target_id` names a primitive or an earlier
/// operation; `tool_id` always names a primitive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    pub id: NodeId,
    pub kind: BooleanKind,
    pub target_id: NodeId,
    pub tool_id: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature: Option<FeatureMeta>,
}

impl Operation {
    /// True for subtract operations that fully traverse the base.
    pub fn is_through_cut(&self) -> bool {
        self.kind == BooleanKind::Subtract && self.feature.map(|f| f.through).unwrap_or(false)
    }

    /// Semantic tag, if the operation carries feature metadata.
    pub fn tag(&self) -> Option<FeatureTag> {
        self.feature.map(|f| f.tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operation_uses_camel_case_refs() {
        let op = Operation {
            id: NodeId::operation(1),
            kind: BooleanKind::Subtract,
            target_id: NodeId::primitive(0),
            tool_id: NodeId::primitive(1),
            feature: Some(FeatureMeta {
                tag: FeatureTag::ThroughHole,
                through: true,
                axis: Axis::Z,
            }),
        };
        let json = serde_json::to_value(&op).unwrap();
        assert_eq!(json["targetId"], "p0");
        assert_eq!(json["toolId"], "p1");
        assert_eq!(json["kind"], "subtract");
        assert_eq!(json["feature"]["tag"], "through-hole");
        assert!(op.is_through_cut());
    }

    #[test]
    fn union_is_never_a_through_cut() {
        let op = Operation {
            id: NodeId::operation(2),
            kind: BooleanKind::Union,
            target_id: NodeId::primitive(0),
            tool_id: NodeId::primitive(2),
            feature: Some(FeatureMeta {
                tag: FeatureTag::Boss,
                through: true,
                axis: Axis::Z,
            }),
        };
        assert!(!op.is_through_cut());
    }
}
