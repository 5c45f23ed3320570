//! Safety and simplification pass: enforces the minimum wall thickness at
//! every subtract and intersect site by shrinking, then dropping, tools.
//!
//! Callable on any (primitives, operations) pair, not only on fresh drafts.

use tracing::{debug, info, instrument};

use recipe_types::{Axis, BooleanKind, Dimensions, NodeId, Operation, Primitive, Shape};

use crate::placement::{estimate_wall_thickness, Aabb};
use crate::types::SafetyAction;

/// Output of [`safety_pass`].
#[derive(Debug, Clone, PartialEq)]
pub struct SafetyReport {
    pub primitives: Vec<Primitive>,
    pub operations: Vec<Operation>,
    /// Shrinks and drops, in the order they happened.
    pub actions: Vec<SafetyAction>,
}

impl SafetyReport {
    pub fn dropped(&self) -> impl Iterator<Item = &NodeId> {
        self.actions
            .iter()
            .filter(|a| a.is_drop())
            .map(|a| a.feature())
    }

    /// Features that were shrunk and survived.
    pub fn shrunk(&self) -> Vec<&NodeId> {
        let dropped: Vec<&NodeId> = self.dropped().collect();
        self.actions
            .iter()
            .filter(|a| !a.is_drop() && !dropped.contains(&a.feature()))
            .map(|a| a.feature())
            .collect()
    }
}

/// Run the pass. Operations are visited in sequence order; a thin site is
/// shrunk once by `decrement` and dropped if still below `min_wall`.
/// Dropping an operation splices the chain so its dependents inherit its
/// target. Ids are never reassigned.
#[instrument(skip(primitives, operations), fields(ops = operations.len()))]
pub fn safety_pass(
    primitives: Vec<Primitive>,
    operations: Vec<Operation>,
    bounds: &Dimensions,
    min_wall: f64,
    decrement: f64,
) -> SafetyReport {
    let mut primitives = primitives;
    let mut operations = operations;
    let mut actions = Vec::new();

    let mut i = 0;
    while i < operations.len() {
        let thickness = match site_thickness(&operations[i], &primitives, &operations, bounds) {
            Some(t) => t,
            None => {
                i += 1;
                continue;
            }
        };
        if thickness >= min_wall {
            i += 1;
            continue;
        }

        let op = operations[i].clone();
        // Shrinking a trim only thins its walls further.
        let candidate = primitives
            .iter()
            .position(|p| p.id == op.tool_id)
            .filter(|_| op.kind != BooleanKind::Intersect)
            .and_then(|idx| shrink_tool(&primitives[idx], &op, decrement).map(|p| (idx, p)));

        let (shrunk, after) = match candidate {
            Some((idx, tool)) => {
                debug!(feature = %op.tool_id, thickness, "shrinking thin-walled tool");
                actions.push(SafetyAction::Shrunk {
                    feature: op.tool_id.clone(),
                    thickness,
                });
                primitives[idx] = tool;
                let after = site_thickness(&op, &primitives, &operations, bounds)
                    .unwrap_or(f64::INFINITY);
                (true, after)
            }
            None => (false, thickness),
        };

        if shrunk && after >= min_wall {
            i += 1;
            continue;
        }

        debug!(feature = %op.tool_id, thickness = after, "dropping thin-walled feature");
        operations.remove(i);
        for later in operations.iter_mut() {
            if later.target_id == op.id {
                later.target_id = op.target_id.clone();
            }
        }
        if !operations.iter().any(|o| o.tool_id == op.tool_id) {
            primitives.retain(|p| p.id != op.tool_id);
        }
        actions.push(SafetyAction::Dropped {
            feature: op.tool_id.clone(),
            thickness: after,
        });
    }

    if !actions.is_empty() {
        info!(
            shrunk = actions.iter().filter(|a| !a.is_drop()).count(),
            dropped = actions.iter().filter(|a| a.is_drop()).count(),
            "safety pass adjusted features"
        );
    }

    SafetyReport {
        primitives,
        operations,
        actions,
    }
}

/// Estimated wall thickness at a subtract or intersect site, or `None` for
/// unions and operations whose tool cannot be found.
pub fn site_thickness(
    op: &Operation,
    primitives: &[Primitive],
    operations: &[Operation],
    bounds: &Dimensions,
) -> Option<f64> {
    let tool = primitives.iter().find(|p| p.id == op.tool_id)?;
    let tool_box = Aabb::of_primitive(tool);

    match op.kind {
        BooleanKind::Union => None,
        BooleanKind::Subtract => {
            let mut thinnest = estimate_wall_thickness(bounds, tool.position(), tool.extents());
            for other in operations {
                if other.id == op.id || other.kind != BooleanKind::Subtract {
                    continue;
                }
                let Some(other_tool) = primitives.iter().find(|p| p.id == other.tool_id) else {
                    continue;
                };
                let gap = tool_box.distance(&Aabb::of_primitive(other_tool));
                // Overlapping cutters merge into one cavity.
                if gap > 0.0 {
                    thinnest = thinnest.min(gap);
                }
            }
            Some(thinnest)
        }
        BooleanKind::Intersect => {
            let base = Aabb::of_bounds(bounds);
            let sep = tool_box.separation(&base);
            // Negative separation is the overlap along that axis.
            let mut thinnest = sep
                .iter()
                .map(|s| -s)
                .fold(f64::INFINITY, f64::min);

            if let Shape::Cylinder {
                radius,
                axis: Axis::Z,
                ..
            } = tool.shape
            {
                // Radial wall between the trim surface and the far corner of
                // every other tool, clipped to the base outline. Side-axis
                // tools reach the trimmed ends this way.
                let c = tool.position();
                for other in operations {
                    if other.id == op.id || other.kind == BooleanKind::Intersect {
                        continue;
                    }
                    let Some(other_tool) = primitives.iter().find(|p| p.id == other.tool_id)
                    else {
                        continue;
                    };
                    let b = Aabb::of_primitive(other_tool);
                    let reach = |k: usize| {
                        let lo = b.min[k].max(base.min[k]);
                        let hi = b.max[k].min(base.max[k]);
                        (lo - c[k]).abs().max((hi - c[k]).abs())
                    };
                    thinnest = thinnest.min(radius - reach(0).hypot(reach(1)));
                }
            }
            Some(thinnest)
        }
    }
}

/// The tool reduced by `decrement`: radii and in-plane sizes shrink, a
/// blind tool keeps its open face in place, a through tool keeps its
/// length. `None` if any dimension would stop being positive.
pub fn shrink_tool(tool: &Primitive, op: &Operation, decrement: f64) -> Option<Primitive> {
    let through = op.feature.map(|f| f.through).unwrap_or(false);
    let axis = op
        .feature
        .map(|f| f.axis)
        .or_else(|| tool.shape.axis())
        .unwrap_or(Axis::Z);
    let ia = axis.index();

    let mut position = tool.position();
    let mut shorten = |length: f64| -> f64 {
        if through {
            length
        } else {
            position[ia] += 0.5 * decrement;
            length - decrement
        }
    };

    let shape = match &tool.shape {
        Shape::Box {
            width,
            depth,
            height,
        } => {
            let mut e = [*width, *depth, *height];
            for (i, x) in e.iter_mut().enumerate() {
                *x = if i == ia { shorten(*x) } else { *x - 2.0 * decrement };
            }
            Shape::Box {
                width: e[0],
                depth: e[1],
                height: e[2],
            }
        }
        Shape::Custom {
            profile,
            width,
            depth,
            height,
        } => {
            let mut e = [*width, *depth, *height];
            for (i, x) in e.iter_mut().enumerate() {
                *x = if i == ia { shorten(*x) } else { *x - 2.0 * decrement };
            }
            Shape::Custom {
                profile: profile.clone(),
                width: e[0],
                depth: e[1],
                height: e[2],
            }
        }
        Shape::Cylinder {
            radius,
            height,
            axis,
        } => Shape::Cylinder {
            radius: radius - decrement,
            height: shorten(*height),
            axis: *axis,
        },
        Shape::Cone {
            radius_bottom,
            radius_top,
            height,
            axis,
        } => Shape::Cone {
            radius_bottom: radius_bottom - decrement,
            radius_top: radius_top - decrement,
            height: shorten(*height),
            axis: *axis,
        },
        Shape::Sphere { radius } => Shape::Sphere {
            radius: radius - decrement,
        },
        Shape::Torus {
            major_radius,
            minor_radius,
            axis,
        } => Shape::Torus {
            major_radius: *major_radius,
            minor_radius: minor_radius - decrement,
            axis: *axis,
        },
    };

    if !shape.is_positive() {
        return None;
    }

    let mut transform = tool.transform.clone().unwrap_or_default();
    transform.position = position;
    Some(Primitive {
        id: tool.id.clone(),
        shape,
        transform: Some(transform),
    })
}
