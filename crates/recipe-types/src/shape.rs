use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ids::NodeId;

/// Principal axis. Tool primitives in generated recipes are always aligned
/// with one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// Component index of this axis in an `[x, y, z]` triple.
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    /// The two in-plane component indices (u, v) perpendicular to this axis.
    pub fn plane(self) -> (usize, usize) {
        match self {
            Axis::X => (1, 2),
            Axis::Y => (0, 2),
            Axis::Z => (0, 1),
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        };
        f.write_str(s)
    }
}

/// Primitive kind, without parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveKind {
    Box,
    Cylinder,
    Sphere,
    Cone,
    Torus,
    Custom,
}

/// Kind-specific primitive parameters, in millimetres.
///
/// Every primitive is centred on its local origin. Axis-bearing kinds extend
/// symmetrically along their axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Shape {
    Box {
        width: f64,
        depth: f64,
        height: f64,
    },
    Cylinder {
        radius: f64,
        height: f64,
        axis: Axis,
    },
    Sphere {
        radius: f64,
    },
    /// Truncated cone; `radius_bottom` sits at the negative end of the axis.
    Cone {
        radius_bottom: f64,
        radius_top: f64,
        height: f64,
        axis: Axis,
    },
    Torus {
        major_radius: f64,
        minor_radius: f64,
        axis: Axis,
    },
    /// Named prism profile (e.g. `hex-prism`) inscribed in a box.
    Custom {
        profile: String,
        width: f64,
        depth: f64,
        height: f64,
    },
}

impl Shape {
    pub fn kind(&self) -> PrimitiveKind {
        match self {
            Shape::Box { .. } => PrimitiveKind::Box,
            Shape::Cylinder { .. } => PrimitiveKind::Cylinder,
            Shape::Sphere { .. } => PrimitiveKind::Sphere,
            Shape::Cone { .. } => PrimitiveKind::Cone,
            Shape::Torus { .. } => PrimitiveKind::Torus,
            Shape::Custom { .. } => PrimitiveKind::Custom,
        }
    }

    /// Axis of rotationally symmetric kinds; boxes and spheres have none.
    pub fn axis(&self) -> Option<Axis> {
        match self {
            Shape::Cylinder { axis, .. } | Shape::Cone { axis, .. } | Shape::Torus { axis, .. } => {
                Some(*axis)
            }
            _ => None,
        }
    }

    /// Full axis-aligned extent `[x, y, z]` of the untransformed shape.
    pub fn extents(&self) -> [f64; 3] {
        match self {
            Shape::Box {
                width,
                depth,
                height,
            }
            | Shape::Custom {
                width,
                depth,
                height,
                ..
            } => [*width, *depth, *height],
            Shape::Cylinder {
                radius,
                height,
                axis,
            } => along(*axis, *height, 2.0 * radius),
            Shape::Sphere { radius } => [2.0 * radius; 3],
            Shape::Cone {
                radius_bottom,
                radius_top,
                height,
                axis,
            } => along(*axis, *height, 2.0 * radius_bottom.max(*radius_top)),
            Shape::Torus {
                major_radius,
                minor_radius,
                axis,
            } => along(
                *axis,
                2.0 * minor_radius,
                2.0 * (major_radius + minor_radius),
            ),
        }
    }

    /// Named linear parameters, used by positivity checks.
    pub fn dimensions(&self) -> Vec<(&'static str, f64)> {
        match self {
            Shape::Box {
                width,
                depth,
                height,
            }
            | Shape::Custom {
                width,
                depth,
                height,
                ..
            } => vec![("width", *width), ("depth", *depth), ("height", *height)],
            Shape::Cylinder { radius, height, .. } => {
                vec![("radius", *radius), ("height", *height)]
            }
            Shape::Sphere { radius } => vec![("radius", *radius)],
            Shape::Cone {
                radius_bottom,
                radius_top,
                height,
                ..
            } => vec![
                ("radius_bottom", *radius_bottom),
                ("radius_top", *radius_top),
                ("height", *height),
            ],
            Shape::Torus {
                major_radius,
                minor_radius,
                ..
            } => vec![
                ("major_radius", *major_radius),
                ("minor_radius", *minor_radius),
            ],
        }
    }

    /// True if every linear parameter is finite and strictly positive.
    pub fn is_positive(&self) -> bool {
        self.dimensions()
            .iter()
            .all(|(_, v)| v.is_finite() && *v > 0.0)
    }
}

/// Extent triple with `length` along `axis` and `width` on the other two.
fn along(axis: Axis, length: f64, width: f64) -> [f64; 3] {
    let mut e = [width; 3];
    e[axis.index()] = length;
    e
}

/// Placement of a primitive: position in mm, rotation in degrees, scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: [f64; 3],
    #[serde(default)]
    pub rotation: [f64; 3],
    #[serde(default = "unit_scale")]
    pub scale: [f64; 3],
}

fn unit_scale() -> [f64; 3] {
    [1.0; 3]
}

impl Transform {
    /// Pure translation.
    pub fn at(position: [f64; 3]) -> Self {
        Self {
            position,
            rotation: [0.0; 3],
            scale: unit_scale(),
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::at([0.0; 3])
    }
}

/// A primitive solid owned by a recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Primitive {
    pub id: NodeId,
    #[serde(flatten)]
    pub shape: Shape,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform: Option<Transform>,
}

impl Primitive {
    pub fn kind(&self) -> PrimitiveKind {
        self.shape.kind()
    }

    /// World position of the primitive's centre.
    pub fn position(&self) -> [f64; 3] {
        self.transform
            .as_ref()
            .map(|t| t.position)
            .unwrap_or([0.0; 3])
    }

    /// World extent, including a non-unit transform scale.
    pub fn extents(&self) -> [f64; 3] {
        let mut e = self.shape.extents();
        if let Some(t) = &self.transform {
            for (i, s) in t.scale.iter().enumerate() {
                e[i] *= s.abs();
            }
        }
        e
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cylinder_extents_follow_axis() {
        let s = Shape::Cylinder {
            radius: 5.0,
            height: 30.0,
            axis: Axis::X,
        };
        assert_eq!(s.extents(), [30.0, 10.0, 10.0]);
    }

    #[test]
    fn torus_extents() {
        let s = Shape::Torus {
            major_radius: 10.0,
            minor_radius: 2.0,
            axis: Axis::Z,
        };
        assert_eq!(s.extents(), [24.0, 24.0, 4.0]);
    }

    #[test]
    fn zero_radius_is_not_positive() {
        let s = Shape::Sphere { radius: 0.0 };
        assert!(!s.is_positive());
    }

    #[test]
    fn primitive_serializes_kind_inline() {
        let p = Primitive {
            id: NodeId::primitive(1),
            shape: Shape::Cylinder {
                radius: 10.0,
                height: 27.0,
                axis: Axis::Z,
            },
            transform: None,
        };
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["id"], "p1");
        assert_eq!(json["kind"], "cylinder");
        assert_eq!(json["axis"], "z");
        assert!(json.get("transform").is_none());

        let back: Primitive = serde_json::from_value(json).unwrap();
        assert_eq!(back, p);
    }
}
