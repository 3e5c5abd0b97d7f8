mod common;

use common::photos::png_bytes;
use upcycle_impact::classify::{ClassificationResult, Material};
use upcycle_impact::present::card::{export_card, CardLayout};
use upcycle_impact::{prepare_photo, HasRecoverySuggestion, AnalysisResult, Condition, CostPolicy, ImpactCalculator};
use upcycle_scale::presets::PhotoPreset;

fn result(calculator: &ImpactCalculator) -> AnalysisResult {
    let classification = ClassificationResult::new("metal cabinet")
        .with_material(Material::Metal)
        .with_condition(Condition::Average);
    AnalysisResult {
        impact: calculator.compute(&classification.furniture_key, classification.condition),
        classification,
        location: Some("Grenoble".into()),
        uploaded_at: None,
    }
}

#[test]
fn test_export_writes_png_and_sidecar() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("upcycle-impact.png");
    let upload = prepare_photo(png_bytes(640, 480), None, PhotoPreset::Medium, 85).unwrap();
    let calculator = ImpactCalculator::with_policy(CostPolicy::ConditionAware);

    let export = export_card(
        &result(&calculator),
        &upload.preview,
        &calculator,
        CardLayout::default(),
        &path,
    )
    .unwrap();

    let card = image::open(&export.png_path).unwrap();
    assert_eq!((card.width(), card.height()), (800, 1000));

    assert_eq!(export.json_path, dir.path().join("upcycle-impact.json"));
    let sidecar: serde_json::Value =
        serde_json::from_slice(&std::fs::read(&export.json_path).unwrap()).unwrap();
    assert_eq!(sidecar["classification"]["furnitureKey"], "metal cabinet");
    assert_eq!(sidecar["classification"]["material"], "metal");
    assert_eq!(sidecar["impact"]["co2SavedKg"], 195.0);
    assert_eq!(sidecar["location"], "Grenoble");
    assert!(sidecar.get("uploadedAt").is_none());
}

#[test]
fn test_pixel_ratio_scales_the_card() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("card.png");
    let upload = prepare_photo(png_bytes(100, 300), None, PhotoPreset::Small, 85).unwrap();
    let calculator = ImpactCalculator::default();

    let export = export_card(
        &result(&calculator),
        &upload.preview,
        &calculator,
        CardLayout::new(3),
        &path,
    )
    .unwrap();
    let card = image::open(export.png_path).unwrap();
    assert_eq!((card.width(), card.height()), (1200, 1500));
}

#[test]
fn test_export_into_missing_directory_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("card.png");
    let upload = prepare_photo(png_bytes(20, 20), None, PhotoPreset::Small, 85).unwrap();
    let calculator = ImpactCalculator::default();

    let error = export_card(
        &result(&calculator),
        &upload.preview,
        &calculator,
        CardLayout::new(1),
        &path,
    )
    .unwrap_err();
    assert_eq!(error.category(), "io");
    assert!(!error.user_message().contains("image file"));
    assert!(error.user_message().contains("card.png"));
    assert!(error.recovery_suggestion().is_none_or(|hint| !hint.contains("photo")));
}
