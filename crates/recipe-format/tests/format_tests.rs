use part_generator::generate;
use recipe_format::{
    load_recipe, save_recipe, validate_recipe, IssueCode, LoadError, FORMAT_ID, FORMAT_VERSION,
};
use recipe_types::{Difficulty, NodeId};

// ── Helper Functions ─────────────────────────────────────────────────────

fn envelope(format: &str, version: u32, recipe_json: &str) -> String {
    format!(
        r#"{{"format": "{}", "version": {}, "recipe": {}}}"#,
        format, version, recipe_json
    )
}

// ── Save / load ──────────────────────────────────────────────────────────

#[test]
fn saved_recipe_loads_back_unchanged() {
    let recipe = generate(2024, Difficulty::Expert).unwrap();
    let json = save_recipe(&recipe);
    let loaded = load_recipe(&json).unwrap();
    assert_eq!(loaded, recipe);
}

#[test]
fn document_uses_the_documented_field_names() {
    let recipe = generate(12345, Difficulty::Beginner).unwrap();
    let value: serde_json::Value = serde_json::from_str(&save_recipe(&recipe)).unwrap();

    assert_eq!(value["format"], FORMAT_ID);
    assert_eq!(value["version"], FORMAT_VERSION);
    let r = &value["recipe"];
    assert_eq!(r["difficulty"], "beginner");
    assert_eq!(r["units"], "mm");
    assert_eq!(r["bounding_mm"]["width"], 100.0);
    assert!(r["createdAt"].is_string());
    assert_eq!(r["primitives"][0]["kind"], "box");
    assert_eq!(r["primitives"][1]["kind"], "cylinder");
    assert_eq!(r["primitives"][1]["axis"], "z");
    assert_eq!(r["operations"][0]["kind"], "subtract");
    assert_eq!(r["operations"][0]["targetId"], "p0");
    assert_eq!(r["operations"][0]["toolId"], "p1");
    assert_eq!(r["operations"][0]["feature"]["tag"], "through-hole");
    assert_eq!(r["metadata"]["featureCount"], 1);
    assert_eq!(r["metadata"]["extra"]["fixture"], "simple-plate");
}

// ── Rejections ───────────────────────────────────────────────────────────

#[test]
fn garbage_is_a_parse_error() {
    assert!(matches!(
        load_recipe("{not json"),
        Err(LoadError::ParseError(_))
    ));
}

#[test]
fn foreign_format_is_rejected() {
    let recipe = generate(1, Difficulty::Beginner).unwrap();
    let inner = serde_json::to_string(&recipe).unwrap();
    let err = load_recipe(&envelope("waffle-iron", 1, &inner)).unwrap_err();
    assert!(matches!(err, LoadError::UnknownFormat(f) if f == "waffle-iron"));
}

#[test]
fn future_version_is_rejected() {
    let recipe = generate(1, Difficulty::Beginner).unwrap();
    let inner = serde_json::to_string(&recipe).unwrap();
    let err = load_recipe(&envelope(FORMAT_ID, FORMAT_VERSION + 1, &inner)).unwrap_err();
    assert!(matches!(
        err,
        LoadError::FutureVersion {
            file_version: 2,
            supported_version: 1
        }
    ));
}

#[test]
fn schema_violation_is_rejected_on_load() {
    let mut recipe = generate(12345, Difficulty::Beginner).unwrap();
    recipe.operations[0].tool_id = NodeId::operation(1);
    let err = load_recipe(&save_recipe(&recipe)).unwrap_err();
    match err {
        LoadError::SchemaViolation { count, first } => {
            assert!(count >= 1);
            assert!(first.contains("toolId"), "{first}");
        }
        other => panic!("expected a schema violation, got {other:?}"),
    }
}

#[test]
fn unknown_primitive_kind_fails_to_parse() {
    let recipe = generate(12345, Difficulty::Beginner).unwrap();
    let json = save_recipe(&recipe).replace("\"cylinder\"", "\"pyramid\"");
    assert!(matches!(load_recipe(&json), Err(LoadError::ParseError(_))));
}

// ── Validator over generated output ──────────────────────────────────────

#[test]
fn generated_recipes_pass_the_validator() {
    for difficulty in Difficulty::ALL {
        for seed in 0..40 {
            let recipe = generate(seed, difficulty).unwrap();
            let report = validate_recipe(&recipe);
            assert!(report.is_valid(), "seed {seed} {difficulty}: {:?}", report.issues);
        }
    }
}

#[test]
fn forward_reference_and_count_mismatch_are_reported() {
    let mut recipe = generate(3, Difficulty::Expert).unwrap();
    if recipe.operations.len() < 2 {
        return;
    }
    let later = recipe.operations[1].id.clone();
    recipe.operations[0].target_id = later;
    recipe.metadata.feature_count += 1;
    let report = validate_recipe(&recipe);
    assert!(report.has(IssueCode::ForwardReference));
    assert!(report.has(IssueCode::FeatureCountMismatch));
}
