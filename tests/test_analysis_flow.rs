//! End-to-end analysis flow with a mocked classifier.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::mock_classifier::{MockClassifier, MockReply};
use common::photos::write_photo;
use upcycle_impact::classify::ClassificationResult;
use upcycle_impact::error::UNKNOWN_FURNITURE_MESSAGE;
use upcycle_impact::present::{self, Language};
use upcycle_impact::{
    analyze_photo, load_photo, AnalysisSession, AppConfig, AppState, Condition, CostPolicy,
    GeminiClassifier,
};
use upcycle_scale::presets::PhotoPreset;

fn config() -> AppConfig {
    AppConfig::default().with_api_key("test-key")
}

#[tokio::test]
async fn test_successful_analysis_reaches_results() {
    let dir = tempfile::tempdir().unwrap();
    let photo = write_photo(dir.path(), "chair.png", 1600, 1200);
    let classifier = Arc::new(MockClassifier::classified("wooden chair"));
    let config = config().with_cost_policy(CostPolicy::Flat);

    let session = analyze_photo(classifier.clone(), &config, &photo, Some("Lyon".into()))
        .await
        .unwrap();

    let AppState::Results { upload, result } = session.state() else {
        panic!("expected results, got {}", session.state());
    };
    assert_eq!(classifier.calls(), 1);
    assert_eq!(upload.file_name.as_deref(), Some("chair.png"));
    assert_eq!((upload.encoded.size.w, upload.encoded.size.h), (1024, 768));
    assert_eq!(result.impact.co2_saved_kg, 20.0);
    assert_eq!(result.impact.community_cost_avoided, 5.0);
    assert_eq!(result.impact.value_created, 72.0);
    assert_eq!(result.location.as_deref(), Some("Lyon"));
}

#[tokio::test]
async fn test_condition_changes_value_created() {
    let dir = tempfile::tempdir().unwrap();
    let photo = write_photo(dir.path(), "sofa.png", 300, 200);
    let reply = ClassificationResult::new("fabric sofa").with_condition(Condition::Poor);
    let classifier = Arc::new(MockClassifier::new(MockReply::Classified(reply)));

    let session = analyze_photo(classifier, &config(), &photo, None).await.unwrap();
    let result = session.state().result().unwrap();
    assert_eq!(result.impact.value_created, 240.0);
    assert!(result.location.is_none());
}

#[tokio::test]
async fn test_unknown_furniture_shows_retry_message() {
    let dir = tempfile::tempdir().unwrap();
    let photo = write_photo(dir.path(), "blur.png", 64, 64);
    let classifier = Arc::new(MockClassifier::new(MockReply::Unknown));

    let session = analyze_photo(classifier, &config(), &photo, None).await.unwrap();
    assert_eq!(session.state().error_message(), Some(UNKNOWN_FURNITURE_MESSAGE));

    let screen = present::render_state(session.state(), Language::En);
    assert!(screen.contains("Try again with a different photo"));
}

#[tokio::test]
async fn test_transport_failure_shows_generic_message() {
    let dir = tempfile::tempdir().unwrap();
    let photo = write_photo(dir.path(), "chair.png", 64, 64);
    let classifier = Arc::new(MockClassifier::new(MockReply::Transport));

    let session = analyze_photo(classifier, &config(), &photo, None).await.unwrap();
    let AppState::Error { category, message } = session.state() else {
        panic!("expected error state");
    };
    assert_eq!(*category, "transport");
    assert!(!message.contains("connection reset"));
}

#[test]
fn test_missing_credential_blocks_classification() {
    let config = AppConfig::from_lookup(|_| None);
    let error = GeminiClassifier::from_config(&config).unwrap_err();
    assert_eq!(error.category(), "configuration");

    let screen = present::render_config_error(&error);
    assert!(screen.contains("API_KEY"));
}

#[tokio::test]
async fn test_non_image_file_is_rejected_before_loading() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.txt");
    std::fs::write(&path, b"definitely not a photo").unwrap();
    let classifier = Arc::new(MockClassifier::classified("wooden chair"));

    let error = analyze_photo(classifier.clone(), &config(), &path, None)
        .await
        .err()
        .unwrap();
    assert_eq!(error.category(), "image");
    assert_eq!(error.user_message(), "Please provide an image file.");
    assert_eq!(classifier.calls(), 0);
}

#[tokio::test]
async fn test_reset_during_loading_discards_reply() {
    let dir = tempfile::tempdir().unwrap();
    let photo = write_photo(dir.path(), "chair.png", 64, 64);
    let upload = load_photo(&photo, PhotoPreset::Small, 85).await.unwrap();
    let classifier = Arc::new(
        MockClassifier::classified("metal chair").with_delay(Duration::from_millis(200)),
    );

    let mut session = AnalysisSession::new(classifier, Default::default());
    session.set_location(Some("Brest".into()));
    session.upload(upload.clone()).unwrap();
    assert!(session.state().is_loading());

    session.reset();
    assert!(matches!(session.wait().await, AppState::Landing));
    assert!(session.controller().location().is_none());

    // A new analysis can start right away.
    session.upload(upload).unwrap();
    let state = session.wait().await;
    assert_eq!(state.result().unwrap().furniture_key(), "metal chair");
}

#[tokio::test]
async fn test_second_upload_while_loading_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let photo = write_photo(dir.path(), "chair.png", 64, 64);
    let upload = load_photo(&photo, PhotoPreset::Small, 85).await.unwrap();
    let classifier = Arc::new(
        MockClassifier::classified("plastic chair").with_delay(Duration::from_millis(50)),
    );

    let mut session = AnalysisSession::new(classifier.clone(), Default::default());
    session.upload(upload.clone()).unwrap();
    let error = session.upload(upload).unwrap_err();
    assert_eq!(error.category(), "state");

    let state = session.wait().await;
    assert_eq!(state.result().unwrap().furniture_key(), "plastic chair");
    assert_eq!(classifier.calls(), 1);
}

#[tokio::test]
async fn test_dropping_session_aborts_classification() {
    let dir = tempfile::tempdir().unwrap();
    let photo = write_photo(dir.path(), "chair.png", 64, 64);
    let upload = load_photo(&photo, PhotoPreset::Small, 85).await.unwrap();
    let classifier = Arc::new(
        MockClassifier::classified("wooden chair").with_delay(Duration::from_millis(100)),
    );

    let mut session = AnalysisSession::new(classifier.clone(), Default::default());
    session.upload(upload).unwrap();
    // Let the task reach the classifier before the session goes away.
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(classifier.calls(), 1);

    drop(session);
    tokio::time::sleep(Duration::from_millis(250)).await;
    assert_eq!(classifier.answered(), 0);
    assert_eq!(Arc::strong_count(&classifier), 1);
}
