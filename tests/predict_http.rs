use std::time::Duration;

use mockito::Matcher;
use serde_json::json;
use staffing_terminal::config::PredictConfig;
use staffing_terminal::model::Role;
use staffing_terminal::predict::{GeminiClient, PredictError, Predictor};
use staffing_terminal::seed::seed_members;

const PATH: &str = "/v1beta/models/test-model:generateContent";

fn config_for(base_url: String) -> PredictConfig {
    PredictConfig {
        api_key: Some("secret".to_string()),
        model: "test-model".to_string(),
        base_url,
        response_language: "English".to_string(),
        timeout: Duration::from_secs(5),
    }
}

fn envelope(text: &str) -> String {
    json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": text }] },
            "finishReason": "STOP"
        }]
    })
    .to_string()
}

#[test]
fn predicts_role_from_structured_response() {
    let mut server = mockito::Server::new();
    let prediction = json!({
        "recommendedRole": "Coordinator",
        "confidence": 0.84,
        "reasoning": "Led two events with top ratings.",
        "alternativeRole": "Technical Support",
        "suggestedImprovement": "Delegate earlier."
    })
    .to_string();
    let mock = server
        .mock("POST", PATH)
        .match_header("x-goog-api-key", "secret")
        .match_body(Matcher::Regex("responseSchema".to_string()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(envelope(&prediction))
        .create();

    let client = GeminiClient::new(config_for(server.url())).unwrap();
    let p = client.predict(&seed_members()[0]).expect("prediction");
    mock.assert();

    assert_eq!(p.recommended_role, Role::Coordinator);
    assert_eq!(p.alternative_role, Role::Technical);
    assert_eq!(p.confidence_percent(), 84);
    assert_eq!(p.suggested_improvement, "Delegate earlier.");
}

#[test]
fn http_error_surfaces_service_message() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", PATH)
        .with_status(503)
        .with_body(r#"{"error":{"code":503,"message":"The model is overloaded.","status":"UNAVAILABLE"}}"#)
        .create();

    let client = GeminiClient::new(config_for(server.url())).unwrap();
    let err = client.predict(&seed_members()[1]).unwrap_err();
    mock.assert();

    match err {
        PredictError::Status { status, message } => {
            assert_eq!(status, 503);
            assert_eq!(message, "The model is overloaded.");
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn out_of_set_role_in_response_is_rejected() {
    let mut server = mockito::Server::new();
    let prediction = json!({
        "recommendedRole": "Head Chef",
        "confidence": 0.5,
        "reasoning": "-",
        "alternativeRole": "Logistics",
        "suggestedImprovement": "-"
    })
    .to_string();
    let _mock = server
        .mock("POST", PATH)
        .with_status(200)
        .with_body(envelope(&prediction))
        .create();

    let client = GeminiClient::new(config_for(server.url())).unwrap();
    let err = client.predict(&seed_members()[3]).unwrap_err();
    assert!(matches!(err, PredictError::Schema(_)), "{err}");
}

#[test]
fn missing_key_sends_nothing() {
    let mut server = mockito::Server::new();
    let mock = server.mock("POST", PATH).expect(0).create();

    let mut cfg = config_for(server.url());
    cfg.api_key = None;
    let client = GeminiClient::new(cfg).unwrap();
    let err = client.predict(&seed_members()[0]).unwrap_err();

    assert!(matches!(err, PredictError::MissingApiKey));
    mock.assert();
}
