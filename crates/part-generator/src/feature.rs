//! Concrete feature candidates: a catalog descriptor with its sizes drawn.

use recipe_types::{Axis, Dimensions, FeatureMeta, FeatureTag, Shape};

use crate::catalog::{
    base_section, CustomVariant, FeatureDescriptor, FeatureKind, Mount, ProfileRanges,
    ThroughRule, ToolRole,
};
use crate::config::GeneratorConfig;
use crate::policy::SizeRange;
use crate::rng::RandomSource;

/// Sampled tool cross-section. In-plane sizes are along the feature's
/// (u, v) axes, see [`Axis::plane`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Profile {
    Round { radius: f64 },
    Rect { u: f64, v: f64 },
    Hex { across: f64 },
    /// `outer` at the open face, `inner` at the bottom.
    Taper { outer: f64, inner: f64 },
    Ball { radius: f64 },
    Ring { major: f64, minor: f64 },
}

impl Profile {
    /// In-plane footprint `(u, v)`.
    pub fn footprint(&self) -> (f64, f64) {
        match *self {
            Profile::Round { radius } | Profile::Ball { radius } => (2.0 * radius, 2.0 * radius),
            Profile::Rect { u, v } => (u, v),
            Profile::Hex { across } => (across, hex_flats(across)),
            Profile::Taper { outer, .. } => (2.0 * outer, 2.0 * outer),
            Profile::Ring { major, minor } => {
                let d = 2.0 * (major + minor);
                (d, d)
            }
        }
    }

    fn scaled(&self, f: f64, config: &GeneratorConfig) -> Profile {
        let s = |x: f64| config.snap_size(x * f);
        match *self {
            Profile::Round { radius } => Profile::Round { radius: s(radius) },
            Profile::Rect { u, v } => Profile::Rect { u: s(u), v: s(v) },
            Profile::Hex { across } => Profile::Hex { across: s(across) },
            Profile::Taper { outer, inner } => Profile::Taper {
                outer: s(outer),
                inner: s(inner).min(s(outer)),
            },
            Profile::Ball { radius } => Profile::Ball { radius: s(radius) },
            Profile::Ring { major, minor } => Profile::Ring {
                major: s(major),
                minor: s(minor),
            },
        }
    }
}

fn hex_flats(across: f64) -> f64 {
    across * 3.0_f64.sqrt() / 2.0
}

/// A feature with concrete sizes, ready for placement.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub kind: FeatureKind,
    pub variant: Option<CustomVariant>,
    pub role: ToolRole,
    pub axis: Axis,
    pub mount: Mount,
    pub tag: FeatureTag,
    pub profile: Profile,
    /// Blind depth or raised height. Unused by other mounts.
    pub length: f64,
}

impl Candidate {
    /// Draw concrete sizes from `desc`.
    ///
    /// Draws, in order: the through decision (`ThroughRule::Chance` only),
    /// the profile fields in declaration order, the length (blind and
    /// raised mounts), then the orientation (turnable profiles).
    pub fn sample<R: RandomSource>(
        desc: &FeatureDescriptor,
        config: &GeneratorConfig,
        rng: &mut R,
    ) -> Candidate {
        let through = match desc.through {
            ThroughRule::Always => true,
            ThroughRule::Never => false,
            ThroughRule::Chance(p) => rng.chance(p),
        };
        // Centred tools already span the base.
        let mount = if through && desc.mount != Mount::Centered {
            Mount::Through
        } else {
            desc.mount
        };
        let tag = if through {
            desc.through_tag
        } else {
            desc.blind_tag
        };

        let mut profile = match desc.profile {
            ProfileRanges::Round { radius } => Profile::Round {
                radius: sample_size(rng, radius, config),
            },
            ProfileRanges::Rect { long, short } => {
                let u = sample_size(rng, long, config);
                let v = sample_size(rng, short, config);
                Profile::Rect { u, v }
            }
            ProfileRanges::Hex { across } => Profile::Hex {
                across: sample_size(rng, across, config),
            },
            ProfileRanges::Taper { outer, ratio } => {
                let outer = sample_size(rng, outer, config);
                // Ratios are not snapped; the resulting radius is.
                let ratio = rng.range(ratio.min, ratio.max);
                Profile::Taper {
                    outer,
                    inner: config.snap_size(outer * ratio).min(outer),
                }
            }
            ProfileRanges::Ball { radius } => Profile::Ball {
                radius: sample_size(rng, radius, config),
            },
            ProfileRanges::Ring { major, minor } => {
                let major = sample_size(rng, major, config);
                let minor = sample_size(rng, minor, config);
                Profile::Ring { major, minor }
            }
        };

        let length = match mount {
            Mount::Blind | Mount::Raised => sample_size(rng, desc.length, config),
            _ => 0.0,
        };

        if desc.turnable && rng.chance(0.5) {
            if let Profile::Rect { u, v } = profile {
                profile = Profile::Rect { u: v, v: u };
            }
        }

        Candidate {
            kind: desc.kind,
            variant: desc.variant,
            role: desc.role,
            axis: desc.axis,
            mount,
            tag,
            profile,
            length,
        }
    }

    /// The same feature scaled by `factor`. Through features keep their
    /// full length.
    pub fn scaled(&self, factor: f64, config: &GeneratorConfig) -> Candidate {
        let length = match self.mount {
            Mount::Blind | Mount::Raised => config.snap_size(self.length * factor),
            _ => self.length,
        };
        Candidate {
            profile: self.profile.scaled(factor, config),
            length,
            ..self.clone()
        }
    }

    pub fn footprint(&self) -> (f64, f64) {
        self.profile.footprint()
    }

    /// Extent of the tool along its axis.
    pub fn along_extent(&self, bounds: &Dimensions, config: &GeneratorConfig) -> f64 {
        let (_, _, len) = base_section(bounds, self.axis);
        let os = config.through_overshoot;
        match self.mount {
            Mount::Through | Mount::Centered => len + 2.0 * os,
            Mount::Blind => self.length + os,
            Mount::Raised => self.length,
            Mount::Surface => match self.profile {
                Profile::Ring { minor, .. } => 2.0 * minor,
                Profile::Ball { radius } => 2.0 * radius,
                _ => self.length,
            },
        }
    }

    /// Centre of the tool along its axis.
    pub fn along_center(&self, bounds: &Dimensions, config: &GeneratorConfig) -> f64 {
        let (_, _, len) = base_section(bounds, self.axis);
        let os = config.through_overshoot;
        match self.mount {
            Mount::Through | Mount::Centered => 0.0,
            Mount::Blind => 0.5 * len - 0.5 * self.length + 0.5 * os,
            Mount::Raised => 0.5 * len + 0.5 * self.length,
            Mount::Surface => 0.5 * len,
        }
    }

    /// World position for in-plane coordinates `(u, v)`.
    pub fn world_position(
        &self,
        uv: (f64, f64),
        bounds: &Dimensions,
        config: &GeneratorConfig,
    ) -> [f64; 3] {
        let (iu, iv) = self.axis.plane();
        let mut p = [0.0; 3];
        p[iu] = uv.0;
        p[iv] = uv.1;
        p[self.axis.index()] = self.along_center(bounds, config);
        p
    }

    /// World extent `[x, y, z]` of the tool.
    pub fn world_extents(&self, bounds: &Dimensions, config: &GeneratorConfig) -> [f64; 3] {
        let (iu, iv) = self.axis.plane();
        let (fu, fv) = self.footprint();
        let mut e = [0.0; 3];
        e[iu] = fu;
        e[iv] = fv;
        e[self.axis.index()] = self.along_extent(bounds, config);
        e
    }

    /// The primitive shape for this tool.
    pub fn to_shape(&self, bounds: &Dimensions, config: &GeneratorConfig) -> Shape {
        let along = self.along_extent(bounds, config);
        let axis = self.axis;
        match self.profile {
            Profile::Round { radius } => Shape::Cylinder {
                radius,
                height: along,
                axis,
            },
            Profile::Rect { .. } => {
                let [width, depth, height] = self.world_extents(bounds, config);
                Shape::Box {
                    width,
                    depth,
                    height,
                }
            }
            Profile::Hex { .. } => {
                let [width, depth, height] = self.world_extents(bounds, config);
                Shape::Custom {
                    profile: "hex-prism".to_string(),
                    width,
                    depth,
                    height,
                }
            }
            Profile::Taper { outer, inner } => Shape::Cone {
                radius_bottom: inner,
                radius_top: outer,
                height: along,
                axis,
            },
            Profile::Ball { radius } => Shape::Sphere { radius },
            Profile::Ring { major, minor } => Shape::Torus {
                major_radius: major,
                minor_radius: minor,
                axis,
            },
        }
    }

    pub fn meta(&self) -> FeatureMeta {
        FeatureMeta {
            tag: self.tag,
            through: matches!(self.mount, Mount::Through | Mount::Centered),
            axis: self.axis,
        }
    }
}

fn sample_size<R: RandomSource>(rng: &mut R, range: SizeRange, config: &GeneratorConfig) -> f64 {
    config.snap_size(rng.range(range.min, range.max))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ranges_for;
    use recipe_types::Difficulty;

    fn bounds() -> Dimensions {
        Dimensions::new(100.0, 50.0, 25.0)
    }

    fn hole(mount: Mount, axis: Axis) -> Candidate {
        Candidate {
            kind: FeatureKind::Hole,
            variant: None,
            role: ToolRole::Cutter,
            axis,
            mount,
            tag: FeatureTag::Hole,
            profile: Profile::Round { radius: 4.0 },
            length: 10.0,
        }
    }

    #[test]
    fn through_hole_spans_base_plus_overshoot() {
        let c = GeneratorConfig::default();
        let h = hole(Mount::Through, Axis::Z);
        assert_eq!(h.along_extent(&bounds(), &c), 27.0);
        assert_eq!(h.along_center(&bounds(), &c), 0.0);
        assert!(h.meta().through);
    }

    #[test]
    fn blind_hole_opens_on_positive_face() {
        let c = GeneratorConfig::default();
        let h = hole(Mount::Blind, Axis::Z);
        let center = h.along_center(&bounds(), &c);
        let extent = h.along_extent(&bounds(), &c);
        // Top of the tool is overshoot above the face, bottom is depth below.
        assert_eq!(center + extent / 2.0, 12.5 + 1.0);
        assert_eq!(center - extent / 2.0, 12.5 - 10.0);
        assert!(!h.meta().through);
    }

    #[test]
    fn side_hole_world_extents() {
        let c = GeneratorConfig::default();
        let h = hole(Mount::Through, Axis::X);
        assert_eq!(h.world_extents(&bounds(), &c), [102.0, 8.0, 8.0]);
        assert_eq!(h.world_position((5.0, -3.0), &bounds(), &c), [0.0, 5.0, -3.0]);
    }

    #[test]
    fn raised_boss_sits_on_top_face() {
        let c = GeneratorConfig::default();
        let mut b = hole(Mount::Raised, Axis::Z);
        b.role = ToolRole::Additive;
        b.length = 6.0;
        assert_eq!(b.along_center(&bounds(), &c), 15.5);
    }

    #[test]
    fn scaling_halves_sizes_but_keeps_through_length() {
        let c = GeneratorConfig::default();
        let h = hole(Mount::Through, Axis::Z);
        let s = h.scaled(0.5, &c);
        assert_eq!(s.profile, Profile::Round { radius: 2.0 });
        assert_eq!(
            s.along_extent(&bounds(), &c),
            h.along_extent(&bounds(), &c)
        );

        let blind = hole(Mount::Blind, Axis::Z).scaled(0.5, &c);
        assert_eq!(blind.length, 5.0);
    }

    #[test]
    fn sampled_sizes_stay_on_grid_and_in_range() {
        let c = GeneratorConfig::default();
        let desc = ranges_for(
            Difficulty::Beginner,
            FeatureKind::Pocket,
            None,
            Axis::Z,
            &bounds(),
        );
        let mut rng = crate::rng::Mulberry32::new(3);
        for _ in 0..100 {
            let cand = Candidate::sample(&desc, &c, &mut rng);
            let (u, v) = cand.footprint();
            for x in [u, v, cand.length] {
                assert_eq!((x * 2.0).fract(), 0.0);
                assert!(x > 0.0);
            }
            assert_eq!(cand.mount, Mount::Blind);
        }
    }

    #[test]
    fn sampled_trim_stays_centred_and_through() {
        let c = GeneratorConfig::default();
        let desc = ranges_for(
            Difficulty::Expert,
            FeatureKind::Trim,
            None,
            Axis::Z,
            &bounds(),
        );
        let mut rng = crate::rng::Mulberry32::new(8);
        let cand = Candidate::sample(&desc, &c, &mut rng);
        assert_eq!(cand.mount, Mount::Centered);
        assert_eq!(cand.tag, FeatureTag::Trim);
        assert!(cand.meta().through);
        assert_eq!(cand.world_position((0.0, 0.0), &bounds(), &c), [0.0; 3]);
        assert_eq!(cand.along_extent(&bounds(), &c), 27.0);
    }

    #[test]
    fn countersink_becomes_a_cone_wide_at_the_face() {
        let c = GeneratorConfig::default();
        let cand = Candidate {
            kind: FeatureKind::Custom,
            variant: Some(CustomVariant::Countersink),
            role: ToolRole::Cutter,
            axis: Axis::Z,
            mount: Mount::Blind,
            tag: FeatureTag::Countersink,
            profile: Profile::Taper {
                outer: 6.0,
                inner: 2.5,
            },
            length: 8.0,
        };
        match cand.to_shape(&bounds(), &c) {
            Shape::Cone {
                radius_bottom,
                radius_top,
                height,
                ..
            } => {
                assert_eq!(radius_top, 6.0);
                assert_eq!(radius_bottom, 2.5);
                assert_eq!(height, 9.0);
            }
            other => panic!("expected cone, got {:?}", other),
        }
    }
}
