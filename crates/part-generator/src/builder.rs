//! Recipe builder: draws the base, samples and places features, orders the
//! boolean chain, runs the safety pass and stamps metadata.

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use recipe_types::{
    BooleanKind, Difficulty, Dimensions, NodeId, Operation, PartRecipe, Primitive, RecipeMetadata,
    Shape, Transform, Units,
};

use crate::catalog::{describe, Mount, ToolRole};
use crate::config::GeneratorConfig;
use crate::feature::Candidate;
use crate::fixtures::{pinned, Fixture};
use crate::placement::{margin, try_place, Aabb, PlacedTool, PlacementRequest};
use crate::policy::DifficultyPolicy;
use crate::rng::{Mulberry32, RandomSource};
use crate::safety::safety_pass;
use crate::types::{GenerateError, PlacementError};

/// Namespace for recipe ids: `uuid_v5(RECIPE_NAMESPACE, "<seed>:<difficulty>")`.
pub const RECIPE_NAMESPACE: Uuid = Uuid::from_u128(0x6a1f_3c52_9d4e_4b7a_8e21_5f0c_d3b9_a614);

pub fn recipe_id(seed: u64, difficulty: Difficulty) -> Uuid {
    Uuid::new_v5(
        &RECIPE_NAMESPACE,
        format!("{}:{}", seed, difficulty).as_bytes(),
    )
}

/// Configurable front end to the generation pipeline.
///
/// ```ignore
/// let recipe = RecipeBuilder::new(42, Difficulty::Expert).build()?;
/// ```
pub struct RecipeBuilder<R: RandomSource = Mulberry32> {
    seed: u64,
    difficulty: Difficulty,
    policy: DifficultyPolicy,
    config: GeneratorConfig,
    rng: R,
    created_at: Option<DateTime<Utc>>,
    fixtures: bool,
}

impl RecipeBuilder<Mulberry32> {
    pub fn new(seed: u64, difficulty: Difficulty) -> Self {
        Self::with_source(seed, difficulty, Mulberry32::new(seed))
    }
}

impl<R: RandomSource> RecipeBuilder<R> {
    /// Builder drawing from `rng` instead of the seeded generator. The seed
    /// is still recorded and still selects pinned fixtures.
    pub fn with_source(seed: u64, difficulty: Difficulty, rng: R) -> Self {
        Self {
            seed,
            difficulty,
            policy: DifficultyPolicy::for_difficulty(difficulty),
            config: GeneratorConfig::default(),
            rng,
            created_at: None,
            fixtures: true,
        }
    }

    pub fn policy(mut self, policy: DifficultyPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn config(mut self, config: GeneratorConfig) -> Self {
        self.config = config;
        self
    }

    /// Fix the creation timestamp. Defaults to the time of `build`.
    pub fn created_at(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = Some(at);
        self
    }

    /// Ignore pinned regression fixtures.
    pub fn without_fixtures(mut self) -> Self {
        self.fixtures = false;
        self
    }

    #[instrument(skip(self), fields(seed = self.seed, difficulty = %self.difficulty))]
    pub fn build(mut self) -> Result<PartRecipe, GenerateError> {
        self.policy.validate()?;
        self.config.validate()?;

        let fixture = if self.fixtures {
            pinned(self.seed, self.difficulty)
        } else {
            None
        };

        let bounds = match &fixture {
            Some(f) => f.bounds,
            None => self.draw_bounds(),
        };
        if !bounds.is_positive() {
            return Err(GenerateError::NonPositiveBounds {
                width: bounds.width,
                depth: bounds.depth,
                height: bounds.height,
            });
        }

        let mut draft = Draft::new(bounds);
        let mut target = NodeId::primitive(0);
        match &fixture {
            Some(f) => {
                debug!(fixture = f.name, "using pinned fixture");
                for (i, pinned) in f.features.iter().enumerate() {
                    draft.sampled += 1;
                    target = draft.emit(
                        i + 1,
                        &pinned.candidate,
                        pinned.uv,
                        target,
                        &self.config,
                    );
                }
            }
            None => {
                let count = self
                    .rng
                    .int_range(self.policy.feature_count.min, self.policy.feature_count.max);
                for i in 1..=count as usize {
                    target = self.sample_feature(i, target, &mut draft);
                }
            }
        }

        Ok(self.finalize(draft, fixture.as_ref()))
    }

    fn draw_bounds(&mut self) -> Dimensions {
        let width = self.rng.range(self.policy.width.min, self.policy.width.max).round();
        let depth = self.rng.range(self.policy.depth.min, self.policy.depth.max).round();
        let height = self
            .rng
            .range(self.policy.height.min, self.policy.height.max)
            .round();
        Dimensions::new(width, depth, height)
    }

    /// Sample feature `i` and fold it onto `target`. Returns the new rolling
    /// target, or `target` unchanged when the feature is dropped.
    fn sample_feature(&mut self, i: usize, target: NodeId, draft: &mut Draft) -> NodeId {
        draft.sampled += 1;

        let desc = match describe(self.difficulty, &self.policy, &draft.bounds, &mut self.rng) {
            Some(desc) => desc,
            None => {
                let err = PlacementError::Unavailable {
                    reason: "policy allows no catalog feature".into(),
                };
                draft.drop_feature(i, &err);
                return target;
            }
        };

        if desc.role == ToolRole::Trim && draft.has_trim {
            let err = PlacementError::Unavailable {
                reason: "recipe already has a trim".into(),
            };
            draft.drop_feature(i, &err);
            return target;
        }

        let candidate = Candidate::sample(&desc, &self.config, &mut self.rng);
        match self.place(candidate, draft) {
            Ok((candidate, uv)) => draft.emit(i, &candidate, uv, target, &self.config),
            Err(err) => {
                draft.drop_feature(i, &err);
                target
            }
        }
    }

    /// Find a position for `candidate`, shrinking it after each exhausted
    /// round of attempts until the retries run out.
    fn place(
        &mut self,
        candidate: Candidate,
        draft: &Draft,
    ) -> Result<(Candidate, (f64, f64)), PlacementError> {
        if candidate.mount == Mount::Centered {
            // Must clip the outline without swallowing a whole corner.
            let (fu, fv) = candidate.footprint();
            let r = 0.5 * fu.max(fv);
            let b = &draft.bounds;
            if r <= 0.5 * b.width.max(b.depth) || r >= 0.5 * b.width.hypot(b.depth) {
                return Err(PlacementError::DoesNotFit);
            }
            return Ok((candidate, (0.0, 0.0)));
        }

        let margin = margin(&draft.bounds, &self.config);
        let mut candidate = candidate;
        let mut retries = 0;
        loop {
            let request = PlacementRequest {
                role: candidate.role,
                axis: candidate.axis,
                footprint: candidate.footprint(),
                along_center: candidate.along_center(&draft.bounds, &self.config),
                along_extent: candidate.along_extent(&draft.bounds, &self.config),
            };
            match try_place(
                &request,
                &draft.placed,
                &draft.bounds,
                margin,
                self.policy.collision_clearance,
                &self.config,
                &mut self.rng,
            ) {
                Ok(uv) => return Ok((candidate, uv)),
                Err(err) if retries < self.config.shrink_retries => {
                    debug!(%err, retry = retries + 1, "shrinking candidate");
                    candidate = candidate.scaled(self.config.shrink_factor, &self.config);
                    retries += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    fn finalize(self, draft: Draft, fixture: Option<&Fixture>) -> PartRecipe {
        let bounds = draft.bounds;
        let sampled = draft.sampled;
        let placement_drops = draft.dropped.len();
        let mut dropped_ids = draft.dropped;

        let ordered = order_operations(draft.operations);
        let report = safety_pass(
            draft.primitives,
            ordered,
            &bounds,
            self.policy.min_wall_thickness,
            self.config.safety_decrement,
        );

        let safety_drops: Vec<NodeId> = report.dropped().cloned().collect();
        let shrunk_features = report.shrunk().len();
        dropped_ids.extend(safety_drops.iter().cloned());

        let kinds: BTreeSet<_> = report.primitives.iter().map(|p| p.kind()).collect();
        let mut metadata = RecipeMetadata {
            feature_count: report.operations.len(),
            sampled_features: sampled,
            dropped_features: sampled.saturating_sub(report.operations.len()),
            placement_drops,
            safety_drops: safety_drops.len(),
            shrunk_features,
            dropped_feature_ids: dropped_ids,
            csg_depth: csg_depth(&report.operations),
            primitive_kinds: kinds.len(),
            generator: format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
            rng: self.rng.algorithm().to_string(),
            ..Default::default()
        };
        if let Some(f) = fixture {
            metadata
                .extra
                .insert("fixture".into(), serde_json::Value::from(f.name));
        }

        info!(
            features = metadata.feature_count,
            dropped = metadata.dropped_features,
            csg_depth = metadata.csg_depth,
            "recipe generated"
        );

        PartRecipe {
            id: recipe_id(self.seed, self.difficulty),
            seed: self.seed,
            difficulty: self.difficulty,
            units: Units::Millimetres,
            bounding_mm: bounds,
            primitives: report.primitives,
            operations: report.operations,
            created_at: self.created_at.unwrap_or_else(Utc::now),
            metadata,
        }
    }
}

/// Work in progress between sampling and finalization.
struct Draft {
    bounds: Dimensions,
    primitives: Vec<Primitive>,
    operations: Vec<Operation>,
    placed: Vec<PlacedTool>,
    has_trim: bool,
    sampled: usize,
    dropped: Vec<NodeId>,
}

impl Draft {
    fn new(bounds: Dimensions) -> Self {
        let base = Primitive {
            id: NodeId::primitive(0),
            shape: Shape::Box {
                width: bounds.width,
                depth: bounds.depth,
                height: bounds.height,
            },
            transform: None,
        };
        Self {
            bounds,
            primitives: vec![base],
            operations: Vec::new(),
            placed: Vec::new(),
            has_trim: false,
            sampled: 0,
            dropped: Vec::new(),
        }
    }

    /// Commit a placed feature as `p{i}` / `o{i}` and return the new target.
    fn emit(
        &mut self,
        i: usize,
        candidate: &Candidate,
        uv: (f64, f64),
        target: NodeId,
        config: &GeneratorConfig,
    ) -> NodeId {
        let tool = Primitive {
            id: NodeId::primitive(i),
            shape: candidate.to_shape(&self.bounds, config),
            transform: Some(Transform::at(
                candidate.world_position(uv, &self.bounds, config),
            )),
        };

        if candidate.role == ToolRole::Trim {
            self.has_trim = true;
        } else {
            self.placed.push(PlacedTool {
                id: tool.id.clone(),
                role: candidate.role,
                bounds: Aabb::of_primitive(&tool),
            });
        }

        let op = Operation {
            id: NodeId::operation(i),
            kind: candidate.role.boolean(),
            target_id: target,
            tool_id: tool.id.clone(),
            feature: Some(candidate.meta()),
        };
        let next = op.id.clone();
        self.primitives.push(tool);
        self.operations.push(op);
        next
    }

    fn drop_feature(&mut self, i: usize, err: &PlacementError) {
        debug!(feature = i, %err, "dropping feature");
        self.dropped.push(NodeId::primitive(i));
    }
}

fn order_group(op: &Operation) -> u8 {
    match op.kind {
        BooleanKind::Subtract if op.is_through_cut() => 0,
        BooleanKind::Subtract => 1,
        BooleanKind::Union => 2,
        BooleanKind::Intersect => 3,
    }
}

/// Stable-sort operations into through cuts, blind cuts, unions and
/// intersects, then re-thread the chain.
pub fn order_operations(mut operations: Vec<Operation>) -> Vec<Operation> {
    operations.sort_by_key(order_group);
    rethread(&mut operations);
    operations
}

/// Point the first operation at `p0` and every later one at its
/// predecessor.
pub fn rethread(operations: &mut [Operation]) {
    let mut target = NodeId::primitive(0);
    for op in operations.iter_mut() {
        op.target_id = target;
        target = op.id.clone();
    }
}

/// Longest chain of operations between a result and a primitive.
pub fn csg_depth(operations: &[Operation]) -> usize {
    let mut depth: HashMap<&NodeId, usize> = HashMap::new();
    let mut deepest = 0;
    for op in operations {
        let below = |id: &NodeId| depth.get(id).copied().unwrap_or(0);
        let d = 1 + below(&op.target_id).max(below(&op.tool_id));
        depth.insert(&op.id, d);
        deepest = deepest.max(d);
    }
    deepest
}
