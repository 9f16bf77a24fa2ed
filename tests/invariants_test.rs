// tests/invariants_test.rs
//
// End-to-end invariants over the whole analyzer battery, driven entirely
// by synthetic fixtures so no binary assets are needed.

use imagecheckr::core::{analyze_image, AnalysisRequest};
use imagecheckr::testgen;
use imagecheckr::{analyze_request, AnalysisConfig, Confidence, ConfidenceLabel};

fn report_for(image: &imagecheckr::core::ImageData, config: AnalysisConfig) -> imagecheckr::AnalysisReport {
    let request = AnalysisRequest::from_bytes(Vec::new(), config);
    analyze_image(image, &request)
}

#[test]
fn test_all_scores_within_range() {
    let fixtures = [
        testgen::uniform_gray(96, 96, 128),
        testgen::gradient_image(96, 96),
        testgen::noise_image(96, 96, 11),
        testgen::checkerboard(96, 96, 4),
    ];

    for image in &fixtures {
        let report = report_for(image, AnalysisConfig::default());
        for result in [
            &report.texture,
            &report.definition,
            &report.artifacts,
            &report.forensics,
        ] {
            if let Some(score) = result.score {
                assert!((0.0..=10.0).contains(&score), "{} out of range: {score}", result.name);
            }
        }
        assert!((0.0..=1.0).contains(&report.composite.score_autenticidad));
        for probe in &report.composite.per_probe {
            if let Some(score) = probe.score {
                assert!((0.0..=1.0).contains(&score));
            }
        }
    }
}

#[test]
fn test_same_seed_is_deterministic() {
    let image = testgen::noise_image(160, 160, 99);
    let mut config = AnalysisConfig::default();
    config.seed = 42;

    let a = report_for(&image, config.clone());
    let b = report_for(&image, config);

    assert_eq!(a.texture.score, b.texture.score);
    assert_eq!(a.texture.details, b.texture.details);
    assert_eq!(a.definition.score, b.definition.score);
    assert_eq!(a.artifacts.score, b.artifacts.score);
    assert_eq!(
        a.composite.score_autenticidad,
        b.composite.score_autenticidad
    );
}

#[test]
fn test_tiny_image_definition_short_circuit() {
    let image = testgen::uniform_gray(1, 1, 200);
    let report = report_for(&image, AnalysisConfig::default());

    assert_eq!(report.definition.score, Some(0.0));
    assert_eq!(report.definition.confidence, Confidence::Low);
}

#[test]
fn test_nonexistent_path_yields_error_results() {
    let request = AnalysisRequest::from_path("/no/such/file.png", AnalysisConfig::default());
    let report = analyze_request(&request);

    for result in [
        &report.texture,
        &report.definition,
        &report.artifacts,
        &report.forensics,
    ] {
        assert_eq!(result.score, None);
        assert_eq!(result.confidence, Confidence::Error);
    }
    assert!(!report.composite.es_autentico);
    assert_eq!(report.composite.nivel_confianza, ConfidenceLabel::Baja);
}

#[test]
fn test_uniform_gray_texture_scores_synthetic() {
    // A perfectly flat plane is maximally self-similar at every offset; the
    // texture analyzer must land it well inside the synthetic half.
    let image = testgen::uniform_gray(256, 256, 128);
    let report = report_for(&image, AnalysisConfig::default());
    let texture = report.texture.score.expect("texture reports on 256x256");
    assert!(texture < 5.0, "flat image scored {texture}");
}

#[test]
fn test_report_serializes_wire_contract() {
    let image = testgen::uniform_gray(64, 64, 128);
    let report = report_for(&image, AnalysisConfig::default());
    let json = serde_json::to_string(&report).expect("report serializes");

    assert!(json.contains("\"scoreAutenticidad\""));
    assert!(json.contains("\"esAutentico\""));
    assert!(json.contains("\"nivelConfianza\""));
    assert!(json.contains("\"correlationId\""));
    // Labels are lowercase Spanish words on the wire
    assert!(json.contains("\"alta\"") || json.contains("\"media\"") || json.contains("\"baja\""));
}

#[test]
fn test_disabled_families_are_skipped() {
    let image = testgen::uniform_gray(64, 64, 128);
    let mut config = AnalysisConfig::default();
    config.check_texture = false;
    config.check_forensics = false;

    let report = report_for(&image, config);
    assert_eq!(report.texture.score, None);
    assert_eq!(report.forensics.score, None);
    assert!(report.composite.per_probe.is_empty());
    assert!(report.definition.score.is_some());
    assert!(report.artifacts.score.is_some());
}

#[test]
fn test_artifact_feature_vector_is_stable_contract() {
    let image = testgen::gradient_image(128, 128);
    let report = report_for(&image, AnalysisConfig::default());

    let fv = report
        .artifacts
        .feature_vector
        .expect("artifact analyzer emits a feature vector");
    assert_eq!(fv.len(), 10);
    for v in fv {
        assert!(v.is_finite());
    }
}
