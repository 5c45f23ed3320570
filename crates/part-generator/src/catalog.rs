//! Feature catalog: per-difficulty tables of feature kinds and the parameter
//! ranges a concrete feature is sampled from.
//!
//! The catalog draws the feature kind (and, where applicable, the custom
//! variant and the cut axis) but never sizes or places geometry.

use recipe_types::{Axis, BooleanKind, Difficulty, Dimensions, FeatureTag};

use crate::policy::{DifficultyPolicy, SizeRange};
use crate::rng::RandomSource;

/// Kind of feature drawn from the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureKind {
    Hole,
    Pocket,
    ThroughSlot,
    Boss,
    Rib,
    Custom,
    Trim,
}

impl FeatureKind {
    pub fn role(self) -> ToolRole {
        match self {
            FeatureKind::Boss | FeatureKind::Rib => ToolRole::Additive,
            FeatureKind::Trim => ToolRole::Trim,
            _ => ToolRole::Cutter,
        }
    }
}

/// Custom (Expert-only) cutter variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CustomVariant {
    Countersink,
    Dimple,
    Groove,
    HexPocket,
}

const CUSTOM_VARIANTS: [CustomVariant; 4] = [
    CustomVariant::Countersink,
    CustomVariant::Dimple,
    CustomVariant::Groove,
    CustomVariant::HexPocket,
];

/// How a tool interacts with the part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolRole {
    /// Removes material (subtract).
    Cutter,
    /// Adds material (union).
    Additive,
    /// Keeps only the overlap (intersect).
    Trim,
}

impl ToolRole {
    pub fn boolean(self) -> BooleanKind {
        match self {
            ToolRole::Cutter => BooleanKind::Subtract,
            ToolRole::Additive => BooleanKind::Union,
            ToolRole::Trim => BooleanKind::Intersect,
        }
    }

    /// Whether two tools may overlap without counting as a collision.
    /// Cutters merge naturally; anything touching an additive tool may not.
    pub fn may_overlap(self, other: ToolRole) -> bool {
        matches!((self, other), (ToolRole::Cutter, ToolRole::Cutter))
    }
}

/// Where a tool sits along its axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mount {
    /// Spans the whole base plus overshoot on both sides.
    Through,
    /// Opens on the positive face and stops short of the opposite one.
    Blind,
    /// Sits on the positive face, outside the base.
    Raised,
    /// Centred on the positive face.
    Surface,
    /// Centred on the origin.
    Centered,
}

/// Whether a cutter goes all the way through.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ThroughRule {
    Always,
    Never,
    /// Decided by one draw with this probability.
    Chance(f64),
}

/// Parameter ranges, one variant per tool profile. Fields are sampled in
/// declaration order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProfileRanges {
    /// Cylinder.
    Round { radius: SizeRange },
    /// Box; `long` runs along the first in-plane axis unless turned.
    Rect { long: SizeRange, short: SizeRange },
    /// Hexagonal prism; the across-corners size is sampled, flats derived.
    Hex { across: SizeRange },
    /// Cone, wide end at the open face.
    Taper { outer: SizeRange, ratio: SizeRange },
    Ball { radius: SizeRange },
    Ring { major: SizeRange, minor: SizeRange },
}

/// Feature-intent descriptor: what to build and the ranges to size it from.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureDescriptor {
    pub kind: FeatureKind,
    pub variant: Option<CustomVariant>,
    pub role: ToolRole,
    pub axis: Axis,
    pub through: ThroughRule,
    /// Mount used when the feature is not through.
    pub mount: Mount,
    pub through_tag: FeatureTag,
    pub blind_tag: FeatureTag,
    pub profile: ProfileRanges,
    /// Blind depth or raised height; ignored for through and surface mounts.
    pub length: SizeRange,
    /// Ribs draw an orientation after their length.
    pub turnable: bool,
}

/// Weighted kind table; repeated entries raise a kind's odds.
pub fn kinds(difficulty: Difficulty) -> &'static [FeatureKind] {
    use FeatureKind::*;
    match difficulty {
        Difficulty::Beginner => &[Hole, Hole, Hole, Pocket, Boss],
        Difficulty::Intermediate => &[Hole, Hole, Pocket, Pocket, Boss, Rib, ThroughSlot, Trim],
        Difficulty::Expert => &[Hole, Hole, Pocket, Boss, ThroughSlot, Rib, Custom, Trim],
    }
}

fn axes(difficulty: Difficulty) -> &'static [Axis] {
    match difficulty {
        Difficulty::Beginner => &[Axis::Z],
        Difficulty::Intermediate => &[Axis::Z, Axis::Z, Axis::Z, Axis::X, Axis::Y],
        Difficulty::Expert => &[Axis::Z, Axis::Z, Axis::X, Axis::Y],
    }
}

/// In-plane sizes `(u, v)` and along-axis length of the base for `axis`.
pub fn base_section(bounds: &Dimensions, axis: Axis) -> (f64, f64, f64) {
    let e = bounds.as_array();
    let (u, v) = axis.plane();
    (e[u], e[v], e[axis.index()])
}

/// Range `[lo, max(lo, hi)]`.
fn range(lo: f64, hi: f64) -> SizeRange {
    SizeRange::new(lo, hi.max(lo))
}

/// Draw one feature descriptor for `difficulty`.
///
/// Draws: kind, then the custom variant (custom only), then the axis
/// (cutters, when off-axis features are allowed). Returns `None` without
/// drawing when the policy allows none of the catalog's operations.
pub fn describe<R: RandomSource>(
    difficulty: Difficulty,
    policy: &DifficultyPolicy,
    bounds: &Dimensions,
    rng: &mut R,
) -> Option<FeatureDescriptor> {
    let available: Vec<FeatureKind> = kinds(difficulty)
        .iter()
        .copied()
        .filter(|k| policy.allows(k.role().boolean()))
        .collect();
    let kind = *rng.pick(&available)?;

    let variant = if kind == FeatureKind::Custom {
        rng.pick(&CUSTOM_VARIANTS).copied()
    } else {
        None
    };

    let axis = if kind.role() == ToolRole::Cutter && policy.off_axis_features {
        rng.pick(axes(difficulty)).copied().unwrap_or(Axis::Z)
    } else {
        Axis::Z
    };

    Some(ranges_for(difficulty, kind, variant, axis, bounds))
}

/// Parameter ranges for a known kind, variant and axis. No draws.
pub fn ranges_for(
    difficulty: Difficulty,
    kind: FeatureKind,
    variant: Option<CustomVariant>,
    axis: Axis,
    bounds: &Dimensions,
) -> FeatureDescriptor {
    let (pu, pv, len) = base_section(bounds, axis);
    let m = pu.min(pv);

    let (hole_min, hole_cap, hole_div, through_p) = match difficulty {
        Difficulty::Beginner => (2.0_f64, 15.0_f64, 6.0, 0.7),
        Difficulty::Intermediate => (2.0, 20.0, 5.0, 0.6),
        Difficulty::Expert => (1.5, 25.0, 4.0, 0.5),
    };
    let boss_cap: f64 = match difficulty {
        Difficulty::Beginner => 15.0,
        _ => 20.0,
    };

    let mut d = FeatureDescriptor {
        kind,
        variant,
        role: kind.role(),
        axis,
        through: ThroughRule::Never,
        mount: Mount::Blind,
        through_tag: FeatureTag::ThroughHole,
        blind_tag: FeatureTag::Hole,
        profile: ProfileRanges::Round {
            radius: range(hole_min, hole_cap.min(m / hole_div)),
        },
        length: range(0.25 * len, 0.7 * len),
        turnable: false,
    };

    match kind {
        FeatureKind::Hole => {
            d.through = ThroughRule::Chance(through_p);
        }
        FeatureKind::Pocket => {
            d.blind_tag = FeatureTag::Pocket;
            d.profile = ProfileRanges::Rect {
                long: range(0.15 * m, 0.45 * m),
                short: range(0.1 * m, 0.35 * m),
            };
            d.length = range(0.15 * len, 0.6 * len);
        }
        FeatureKind::ThroughSlot => {
            d.through = ThroughRule::Always;
            d.through_tag = FeatureTag::ThroughSlot;
            d.blind_tag = FeatureTag::ThroughSlot;
            d.profile = ProfileRanges::Rect {
                long: range(0.3 * m, 0.6 * m),
                short: range(3.0_f64.min(0.1 * m), 0.15 * m),
            };
        }
        FeatureKind::Boss => {
            d.mount = Mount::Raised;
            d.blind_tag = FeatureTag::Boss;
            d.profile = ProfileRanges::Round {
                radius: range(3.0, boss_cap.min(m / 6.0)),
            };
            d.length = range(3.0, 25.0_f64.min(0.5 * len));
        }
        FeatureKind::Rib => {
            d.mount = Mount::Raised;
            d.blind_tag = FeatureTag::Rib;
            d.profile = ProfileRanges::Rect {
                long: range(0.3 * m, 0.7 * m),
                short: range(2.0, 8.0_f64.min(0.08 * m)),
            };
            d.length = range(3.0, 20.0_f64.min(0.4 * len));
            d.turnable = true;
        }
        FeatureKind::Custom => match variant.unwrap_or(CustomVariant::HexPocket) {
            CustomVariant::Countersink => {
                d.blind_tag = FeatureTag::Countersink;
                d.profile = ProfileRanges::Taper {
                    outer: range(3.0, 15.0_f64.min(m / 6.0)),
                    ratio: range(0.3, 0.6),
                };
                d.length = range(0.2 * len, 0.5 * len);
            }
            CustomVariant::Dimple => {
                d.mount = Mount::Surface;
                d.blind_tag = FeatureTag::Dimple;
                d.profile = ProfileRanges::Ball {
                    radius: range(3.0, 20.0_f64.min(m / 5.0).min(0.6 * len)),
                };
            }
            CustomVariant::Groove => {
                d.mount = Mount::Surface;
                d.blind_tag = FeatureTag::Groove;
                d.profile = ProfileRanges::Ring {
                    major: range(0.12 * m, 0.3 * m),
                    minor: range(1.0, 4.0_f64.min(0.2 * len)),
                };
            }
            CustomVariant::HexPocket => {
                d.blind_tag = FeatureTag::Pocket;
                d.profile = ProfileRanges::Hex {
                    across: range(0.12 * m, 0.35 * m),
                };
                d.length = range(0.2 * len, 0.5 * len);
            }
        },
        FeatureKind::Trim => {
            let half_max = 0.5 * bounds.width.max(bounds.depth);
            let half_diag = 0.5 * bounds.width.hypot(bounds.depth);
            let gap = half_diag - half_max;
            d.through = ThroughRule::Always;
            d.mount = Mount::Centered;
            d.through_tag = FeatureTag::Trim;
            d.blind_tag = FeatureTag::Trim;
            d.profile = ProfileRanges::Round {
                radius: SizeRange::new(half_max + 0.1 * gap, half_diag - 0.1 * gap),
            };
        }
    }

    d
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::Mulberry32;

    fn bounds() -> Dimensions {
        Dimensions::new(120.0, 60.0, 30.0)
    }

    #[test]
    fn beginner_hole_radius_range() {
        let d = ranges_for(
            Difficulty::Beginner,
            FeatureKind::Hole,
            None,
            Axis::Z,
            &bounds(),
        );
        match d.profile {
            ProfileRanges::Round { radius } => {
                assert_eq!(radius.min, 2.0);
                assert_eq!(radius.max, 10.0); // min(15, 60 / 6)
            }
            other => panic!("unexpected profile {:?}", other),
        }
        assert_eq!(d.through, ThroughRule::Chance(0.7));
        assert_eq!(d.role, ToolRole::Cutter);
    }

    #[test]
    fn beginner_never_draws_intersect_or_off_axis() {
        let policy = DifficultyPolicy::for_difficulty(Difficulty::Beginner);
        let mut rng = Mulberry32::new(5);
        for _ in 0..200 {
            let d = describe(Difficulty::Beginner, &policy, &bounds(), &mut rng).unwrap();
            assert_ne!(d.role, ToolRole::Trim);
            assert_eq!(d.axis, Axis::Z);
        }
    }

    #[test]
    fn additive_features_are_raised_on_z() {
        for kind in [FeatureKind::Boss, FeatureKind::Rib] {
            let d = ranges_for(Difficulty::Expert, kind, None, Axis::Z, &bounds());
            assert_eq!(d.role, ToolRole::Additive);
            assert_eq!(d.mount, Mount::Raised);
        }
    }

    #[test]
    fn trim_radius_sits_between_half_side_and_half_diagonal() {
        let b = bounds();
        let d = ranges_for(Difficulty::Expert, FeatureKind::Trim, None, Axis::Z, &b);
        match d.profile {
            ProfileRanges::Round { radius } => {
                assert!(radius.min > 60.0);
                assert!(radius.max < 0.5 * b.width.hypot(b.depth));
            }
            other => panic!("unexpected profile {:?}", other),
        }
    }

    #[test]
    fn disallowed_ops_are_filtered() {
        let mut policy = DifficultyPolicy::for_difficulty(Difficulty::Expert);
        policy.allowed_ops = vec![BooleanKind::Subtract];
        let mut rng = Mulberry32::new(11);
        for _ in 0..200 {
            let d = describe(Difficulty::Expert, &policy, &bounds(), &mut rng).unwrap();
            assert_eq!(d.role, ToolRole::Cutter);
        }
        policy.allowed_ops.clear();
        assert!(describe(Difficulty::Expert, &policy, &bounds(), &mut rng).is_none());
    }

    #[test]
    fn side_axis_uses_side_section() {
        let (u, v, len) = base_section(&bounds(), Axis::X);
        assert_eq!((u, v, len), (60.0, 30.0, 120.0));
    }

    #[test]
    fn only_cutters_collide_freely() {
        assert!(ToolRole::Cutter.may_overlap(ToolRole::Cutter));
        assert!(!ToolRole::Cutter.may_overlap(ToolRole::Additive));
        assert!(!ToolRole::Additive.may_overlap(ToolRole::Additive));
    }
}
