//! Seed sweeps: every generated recipe satisfies every oracle.

use proptest::prelude::*;

use recipe_types::{Difficulty, FeatureTag};
use test_harness::assertions::*;
use test_harness::oracle::check_determinism;
use test_harness::sweep;

#[test]
fn beginner_sweep_is_clean() {
    for recipe in sweep(Difficulty::Beginner, 0..150).unwrap() {
        assert_recipe_valid(&recipe, &format!("beginner seed {}", recipe.seed)).unwrap();
    }
}

#[test]
fn intermediate_sweep_is_clean() {
    for recipe in sweep(Difficulty::Intermediate, 0..150).unwrap() {
        assert_recipe_valid(&recipe, &format!("intermediate seed {}", recipe.seed)).unwrap();
    }
}

#[test]
fn expert_sweep_is_clean() {
    for recipe in sweep(Difficulty::Expert, 0..150).unwrap() {
        assert_recipe_valid(&recipe, &format!("expert seed {}", recipe.seed)).unwrap();
    }
}

#[test]
fn fixture_matches_expected_structure() {
    let recipe = part_generator::generate(12345, Difficulty::Beginner).unwrap();
    assert_bounds(&recipe, [100.0, 50.0, 25.0], 1e-9, "fixture").unwrap();
    assert_tags(&recipe, &[FeatureTag::ThroughHole], "fixture").unwrap();
    assert_operation_kinds(
        &recipe,
        &[recipe_types::BooleanKind::Subtract],
        "fixture",
    )
    .unwrap();
}

#[test]
fn wrong_expectation_reports_the_chain() {
    let recipe = part_generator::generate(12345, Difficulty::Beginner).unwrap();
    let err = assert_tags(&recipe, &[FeatureTag::Pocket], "fixture").unwrap_err();
    let text = err.to_string();
    assert!(text.contains("o1:subtract(p0, p1)"), "{}", text);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn any_seed_passes_all_oracles(seed in any::<u64>(), pick in 0usize..3) {
        let difficulty = Difficulty::ALL[pick];
        let recipe = part_generator::generate(seed, difficulty).unwrap();
        let ctx = format!("{} seed {}", difficulty, seed);
        prop_assert!(assert_recipe_valid(&recipe, &ctx).is_ok(), "{:?}", assert_recipe_valid(&recipe, &ctx));
        prop_assert!(check_determinism(seed, difficulty).passed);
    }
}
