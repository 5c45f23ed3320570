//! Property-based tests of the generator's output contract.

use proptest::prelude::*;
use std::collections::HashSet;

use part_generator::{generate, site_thickness, DifficultyPolicy, Mulberry32, RandomSource};
use recipe_types::{BooleanKind, Difficulty, NodeId};

// ---------------------------------------------------------------------------
// Strategy helpers
// ---------------------------------------------------------------------------

fn arb_difficulty() -> impl Strategy<Value = Difficulty> {
    prop_oneof![
        Just(Difficulty::Beginner),
        Just(Difficulty::Intermediate),
        Just(Difficulty::Expert),
    ]
}

// ---------------------------------------------------------------------------
// 1. Determinism
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn generation_is_deterministic(seed in any::<u64>(), d in arb_difficulty()) {
        let a = generate(seed, d).unwrap();
        let b = generate(seed, d).unwrap();
        prop_assert!(a.same_geometry(&b));
    }
}

// ---------------------------------------------------------------------------
// 2. Referential integrity: every reference points backwards
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn references_resolve_to_earlier_ids(seed in any::<u64>(), d in arb_difficulty()) {
        let recipe = generate(seed, d).unwrap();
        let primitives: HashSet<&NodeId> = recipe.primitives.iter().map(|p| &p.id).collect();
        prop_assert_eq!(primitives.len(), recipe.primitives.len());

        let mut seen_ops: HashSet<&NodeId> = HashSet::new();
        for op in &recipe.operations {
            prop_assert!(primitives.contains(&op.tool_id), "{} has dangling tool", op.id);
            prop_assert!(
                primitives.contains(&op.target_id) || seen_ops.contains(&op.target_id),
                "{} targets {} before it exists", op.id, op.target_id
            );
            prop_assert!(seen_ops.insert(&op.id));
        }
    }
}

// ---------------------------------------------------------------------------
// 3. Positivity of every primitive parameter
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn primitive_dimensions_are_positive(seed in any::<u64>(), d in arb_difficulty()) {
        let recipe = generate(seed, d).unwrap();
        prop_assert!(recipe.bounding_mm.is_positive());
        for p in &recipe.primitives {
            prop_assert!(p.shape.is_positive(), "{} is degenerate: {:?}", p.id, p.shape);
        }
    }
}

// ---------------------------------------------------------------------------
// 4. Wall thickness at every cut site
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn cut_sites_keep_minimum_wall(seed in any::<u64>(), d in arb_difficulty()) {
        let recipe = generate(seed, d).unwrap();
        let min_wall = DifficultyPolicy::for_difficulty(d).min_wall_thickness;
        for op in &recipe.operations {
            if let Some(t) = site_thickness(op, &recipe.primitives, &recipe.operations, &recipe.bounding_mm) {
                prop_assert!(t >= min_wall - 1e-9, "{} wall {} < {}", op.id, t, min_wall);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// 5. Through cuts precede unions; intersects come last
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn through_cuts_precede_unions(seed in any::<u64>(), d in arb_difficulty()) {
        let recipe = generate(seed, d).unwrap();
        let ops = &recipe.operations;
        let last_through = ops.iter().rposition(|o| o.is_through_cut());
        let first_union = ops.iter().position(|o| o.kind == BooleanKind::Union);
        if let (Some(t), Some(u)) = (last_through, first_union) {
            prop_assert!(t < u);
        }
        if let Some(i) = ops.iter().position(|o| o.kind == BooleanKind::Intersect) {
            prop_assert!(ops[i..].iter().all(|o| o.kind == BooleanKind::Intersect));
        }
    }
}

// ---------------------------------------------------------------------------
// 6. Feature count within the difficulty's range
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn feature_count_within_policy(seed in any::<u64>(), d in arb_difficulty()) {
        let recipe = generate(seed, d).unwrap();
        let policy = DifficultyPolicy::for_difficulty(d);
        prop_assert!(recipe.operations.len() <= policy.feature_count.max as usize);
        prop_assert_eq!(recipe.metadata.feature_count, recipe.operations.len());
        for op in &recipe.operations {
            prop_assert!(policy.allows(op.kind));
        }
    }
}

// ---------------------------------------------------------------------------
// 7. RNG helpers stay in range
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn rng_draws_stay_in_range(seed in any::<u64>(), lo in 0u32..100, span in 0u32..100) {
        let mut rng = Mulberry32::new(seed);
        for _ in 0..64 {
            let x = rng.next_f64();
            prop_assert!((0.0..1.0).contains(&x));
            let n = rng.int_range(lo, lo + span);
            prop_assert!(n >= lo && n <= lo + span);
        }
    }
}
