//! Geometry and placement utilities: margins, bounding-volume overlap,
//! wall-thickness estimation and the retrying placement search.

use tracing::debug;

use recipe_types::{Axis, Dimensions, NodeId, Primitive};

use crate::catalog::{base_section, ToolRole};
use crate::config::GeneratorConfig;
use crate::rng::RandomSource;
use crate::types::PlacementError;

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: [f64; 3],
    pub max: [f64; 3],
}

impl Aabb {
    pub fn from_center(center: [f64; 3], extents: [f64; 3]) -> Self {
        let mut min = [0.0; 3];
        let mut max = [0.0; 3];
        for i in 0..3 {
            min[i] = center[i] - 0.5 * extents[i];
            max[i] = center[i] + 0.5 * extents[i];
        }
        Self { min, max }
    }

    pub fn of_primitive(p: &Primitive) -> Self {
        Self::from_center(p.position(), p.extents())
    }

    /// The base solid: a box of `bounds` centred on the origin.
    pub fn of_bounds(bounds: &Dimensions) -> Self {
        Self::from_center([0.0; 3], bounds.as_array())
    }

    pub fn center(&self) -> [f64; 3] {
        [
            0.5 * (self.min[0] + self.max[0]),
            0.5 * (self.min[1] + self.max[1]),
            0.5 * (self.min[2] + self.max[2]),
        ]
    }

    pub fn extents(&self) -> [f64; 3] {
        [
            self.max[0] - self.min[0],
            self.max[1] - self.min[1],
            self.max[2] - self.min[2],
        ]
    }

    /// Per-axis gap between the boxes; negative where they overlap.
    pub fn separation(&self, other: &Aabb) -> [f64; 3] {
        let mut s = [0.0; 3];
        for i in 0..3 {
            s[i] = (other.min[i] - self.max[i]).max(self.min[i] - other.max[i]);
        }
        s
    }

    /// True when the boxes come closer than `clearance` on every axis.
    pub fn overlaps(&self, other: &Aabb, clearance: f64) -> bool {
        self.separation(other).iter().all(|s| *s < clearance)
    }

    /// Euclidean distance between the boxes, 0 if they touch or overlap.
    pub fn distance(&self, other: &Aabb) -> f64 {
        self.separation(other)
            .iter()
            .map(|s| s.max(0.0).powi(2))
            .sum::<f64>()
            .sqrt()
    }
}

/// Minimum clearance between a tool and any outer face of the base.
pub fn margin(bounds: &Dimensions, config: &GeneratorConfig) -> f64 {
    config
        .margin_floor
        .max(bounds.min_extent() * config.margin_ratio)
}

/// Bounding-volume intersection test between two tools, honouring the
/// rule that cutters may overlap each other freely.
pub fn collides(a: &PlacedTool, b: &PlacedTool, clearance: f64) -> bool {
    !a.role.may_overlap(b.role) && a.bounds.overlaps(&b.bounds, clearance)
}

/// A tool already committed to the draft.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedTool {
    pub id: NodeId,
    pub role: ToolRole,
    pub bounds: Aabb,
}

/// Everything `try_place` needs to know about the candidate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementRequest {
    pub role: ToolRole,
    pub axis: Axis,
    /// In-plane size `(u, v)`.
    pub footprint: (f64, f64),
    pub along_center: f64,
    pub along_extent: f64,
}

impl PlacementRequest {
    fn bounds_at(&self, u: f64, v: f64) -> Aabb {
        let (iu, iv) = self.axis.plane();
        let ia = self.axis.index();
        let mut c = [0.0; 3];
        let mut e = [0.0; 3];
        c[iu] = u;
        c[iv] = v;
        c[ia] = self.along_center;
        e[iu] = self.footprint.0;
        e[iv] = self.footprint.1;
        e[ia] = self.along_extent;
        Aabb::from_center(c, e)
    }
}

/// Search for a collision-free in-plane position.
///
/// Each attempt draws `u` then `v` uniformly inside the base section shrunk
/// by `margin` and half the footprint, snapped toward zero onto the size
/// grid. Overlap with a tool the candidate may overlap (cutter on cutter)
/// counts as success. Returns the `(u, v)` pair; `DoesNotFit` is returned
/// without drawing when the footprint cannot fit at all.
pub fn try_place<R: RandomSource>(
    request: &PlacementRequest,
    placed: &[PlacedTool],
    bounds: &Dimensions,
    margin: f64,
    clearance: f64,
    config: &GeneratorConfig,
    rng: &mut R,
) -> Result<(f64, f64), PlacementError> {
    let (pu, pv, _) = base_section(bounds, request.axis);
    let half_u = 0.5 * pu - margin - 0.5 * request.footprint.0;
    let half_v = 0.5 * pv - margin - 0.5 * request.footprint.1;
    if half_u < 0.0 || half_v < 0.0 {
        return Err(PlacementError::DoesNotFit);
    }

    for attempt in 1..=config.max_attempts {
        let u = config.snap_position(rng.range(-half_u, half_u));
        let v = config.snap_position(rng.range(-half_v, half_v));
        let candidate = PlacedTool {
            id: NodeId::from("candidate"),
            role: request.role,
            bounds: request.bounds_at(u, v),
        };
        match placed.iter().find(|t| collides(&candidate, t, clearance)) {
            Some(hit) => {
                debug!(attempt, u, v, blocked_by = %hit.id, "placement collided");
            }
            None => return Ok((u, v)),
        }
    }

    Err(PlacementError::Exhausted {
        attempts: config.max_attempts,
    })
}

/// Conservative wall thickness left between a cutter and the outer faces
/// of the target it cuts.
///
/// Faces the cutter breaks through are open and do not count. Returns
/// `f64::INFINITY` when the cutter opens every face it approaches.
pub fn estimate_wall_thickness(
    target: &Dimensions,
    cutter_position: [f64; 3],
    cutter_size: [f64; 3],
) -> f64 {
    let t = target.as_array();
    let mut thinnest = f64::INFINITY;
    for i in 0..3 {
        let lo = (cutter_position[i] - 0.5 * cutter_size[i]) + 0.5 * t[i];
        let hi = 0.5 * t[i] - (cutter_position[i] + 0.5 * cutter_size[i]);
        for wall in [lo, hi] {
            if wall > 0.0 {
                thinnest = thinnest.min(wall);
            }
        }
    }
    thinnest
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::Mulberry32;
    use approx::assert_relative_eq;

    fn bounds() -> Dimensions {
        Dimensions::new(100.0, 50.0, 25.0)
    }

    fn request(role: ToolRole, d: f64) -> PlacementRequest {
        PlacementRequest {
            role,
            axis: Axis::Z,
            footprint: (d, d),
            along_center: 0.0,
            along_extent: 27.0,
        }
    }

    #[test]
    fn margin_has_a_two_millimetre_floor() {
        let c = GeneratorConfig::default();
        assert_eq!(margin(&bounds(), &c), 2.0);
        let big = Dimensions::new(400.0, 300.0, 200.0);
        assert_relative_eq!(margin(&big, &c), 4.0);
    }

    #[test]
    fn separation_and_overlap() {
        let a = Aabb::from_center([0.0; 3], [10.0; 3]);
        let b = Aabb::from_center([12.0, 0.0, 0.0], [10.0; 3]);
        assert_eq!(a.separation(&b)[0], 2.0);
        assert!(!a.overlaps(&b, 1.0));
        assert!(a.overlaps(&b, 3.0));
        assert_eq!(a.distance(&b), 2.0);
        assert_eq!(a.distance(&a), 0.0);
    }

    #[test]
    fn placement_respects_margin() {
        let c = GeneratorConfig::default();
        let mut rng = Mulberry32::new(77);
        let req = request(ToolRole::Cutter, 10.0);
        for _ in 0..200 {
            let (u, v) = try_place(&req, &[], &bounds(), 2.0, 0.0, &c, &mut rng).unwrap();
            assert!(u.abs() + 5.0 <= 48.0);
            assert!(v.abs() + 5.0 <= 23.0);
        }
    }

    #[test]
    fn too_large_candidate_does_not_fit() {
        let c = GeneratorConfig::default();
        let mut rng = Mulberry32::new(1);
        let before = rng.clone();
        let err = try_place(
            &request(ToolRole::Cutter, 48.0),
            &[],
            &bounds(),
            2.0,
            0.0,
            &c,
            &mut rng,
        );
        assert_eq!(err, Err(PlacementError::DoesNotFit));
        assert_eq!(rng, before);
    }

    #[test]
    fn overlapping_cutters_are_accepted() {
        let c = GeneratorConfig::default();
        let everywhere = PlacedTool {
            id: NodeId::primitive(1),
            role: ToolRole::Cutter,
            bounds: Aabb::from_center([0.0; 3], [200.0; 3]),
        };
        let mut rng = Mulberry32::new(3);
        let placed = try_place(
            &request(ToolRole::Cutter, 6.0),
            &[everywhere],
            &bounds(),
            2.0,
            1.0,
            &c,
            &mut rng,
        );
        assert!(placed.is_ok());
    }

    #[test]
    fn additive_obstacle_exhausts_all_attempts() {
        let c = GeneratorConfig::default();
        let boss = PlacedTool {
            id: NodeId::primitive(1),
            role: ToolRole::Additive,
            bounds: Aabb::from_center([0.0; 3], [200.0; 3]),
        };
        let mut rng = Mulberry32::new(3);
        let mut reference = rng.clone();
        let result = try_place(
            &request(ToolRole::Cutter, 6.0),
            &[boss],
            &bounds(),
            2.0,
            1.0,
            &c,
            &mut rng,
        );
        assert_eq!(result, Err(PlacementError::Exhausted { attempts: 8 }));
        // Two draws per attempt.
        for _ in 0..16 {
            reference.next_f64();
        }
        assert_eq!(rng, reference);
    }

    #[test]
    fn wall_thickness_ignores_open_faces() {
        let b = bounds();
        // Through hole r=5 at x=40: side wall is 50 - 45 = 5.
        let t = estimate_wall_thickness(&b, [40.0, 0.0, 0.0], [10.0, 10.0, 27.0]);
        assert_relative_eq!(t, 5.0);
        // Blind pocket 20 deep from the top leaves a 5 mm floor.
        let t = estimate_wall_thickness(&b, [0.0, 0.0, 3.0], [10.0, 10.0, 21.0]);
        assert_relative_eq!(t, 5.0);
        // A cutter bigger than the part opens every face.
        let t = estimate_wall_thickness(&b, [0.0; 3], [200.0, 200.0, 200.0]);
        assert!(t.is_infinite());
    }
}
