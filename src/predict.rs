use anyhow::Result;
use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::{Value, json};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::PredictConfig;
use crate::http_client::http_client;
use crate::model::{AIPrediction, Member, Role};

const SYSTEM_INSTRUCTION: &str = "You are a senior HR consultant and event-staffing manager. \
Analyse member data and recommend positions precisely, grounded in the actual record.";

const MAX_ERROR_BODY_CHARS: usize = 300;

#[derive(Debug, Error)]
pub enum PredictError {
    #[error("no API key configured (set GEMINI_API_KEY)")]
    MissingApiKey,
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("http {status}: {message}")]
    Status { status: u16, message: String },
    #[error("prompt blocked: {0}")]
    Blocked(String),
    #[error("response carried no text")]
    EmptyResponse,
    #[error("invalid prediction json: {0}")]
    Decode(serde_json::Error),
    #[error("prediction violates schema: {0}")]
    Schema(String),
}

impl From<serde_json::Error> for PredictError {
    fn from(err: serde_json::Error) -> Self {
        // Well-formed JSON with the wrong shape is a schema problem.
        if err.is_data() {
            PredictError::Schema(err.to_string())
        } else {
            PredictError::Decode(err)
        }
    }
}

/// Anything that can turn a member profile into a role recommendation.
pub trait Predictor {
    fn predict(&self, member: &Member) -> Result<AIPrediction, PredictError>;
}

pub struct GeminiClient {
    client: Client,
    config: PredictConfig,
}

impl GeminiClient {
    pub fn new(config: PredictConfig) -> Result<Self> {
        let client = http_client(config.timeout)?;
        Ok(Self { client, config })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    pub fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url, self.config.model
        )
    }
}

impl Predictor for GeminiClient {
    fn predict(&self, member: &Member) -> Result<AIPrediction, PredictError> {
        let Some(api_key) = self.config.api_key.as_deref() else {
            return Err(PredictError::MissingApiKey);
        };

        let body = build_request_body(member, &self.config.response_language);
        debug!(member = %member.id, model = %self.config.model, "sending prediction request");

        let resp = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()?;
        let status = resp.status();
        let raw = resp.text()?;
        if !status.is_success() {
            warn!(member = %member.id, status = status.as_u16(), "prediction request rejected");
            return Err(PredictError::Status {
                status: status.as_u16(),
                message: api_error_message(&raw),
            });
        }

        let text = parse_generate_content_json(&raw)?;
        parse_prediction_json(&text)
    }
}

pub fn build_prompt(member: &Member, language: &str) -> String {
    let history = if member.history.is_empty() {
        "- No recorded events yet".to_string()
    } else {
        member
            .history
            .iter()
            .map(|h| {
                format!(
                    "- Event: {}, Role: {}, Rating: {}/5, Feedback: {}",
                    h.event_name,
                    h.role.label(),
                    h.rating,
                    h.feedback
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        "Analyse the profile and activity history of the following team member and predict \
the position that suits them best at the next major event.\n\n\
Member name: {name}\n\
Skills: {skills}\n\
Strengths: {strengths}\n\
Performance history:\n{history}\n\n\
Consider their development trajectory, the consistency of their performance and their core skill set.\n\
Pick recommendedRole and alternativeRole from: {roles}.\n\
Write reasoning and suggestedImprovement entirely in {language}.",
        name = member.name,
        skills = member.skills.join(", "),
        strengths = member.strengths.join(", "),
        roles = Role::labels().join("; "),
    )
}

pub fn response_schema() -> Value {
    let roles = Role::labels();
    json!({
        "type": "OBJECT",
        "properties": {
            "recommendedRole": {
                "type": "STRING",
                "format": "enum",
                "enum": roles,
                "description": "Best position for the next event."
            },
            "confidence": {
                "type": "NUMBER",
                "description": "Confidence of the prediction from 0 to 1."
            },
            "reasoning": {
                "type": "STRING",
                "description": "Detailed explanation of why this position was chosen."
            },
            "alternativeRole": {
                "type": "STRING",
                "format": "enum",
                "enum": roles,
                "description": "A fallback position."
            },
            "suggestedImprovement": {
                "type": "STRING",
                "description": "What the member should focus on to excel in the new role."
            }
        },
        "required": [
            "recommendedRole",
            "confidence",
            "reasoning",
            "alternativeRole",
            "suggestedImprovement"
        ]
    })
}

pub fn build_request_body(member: &Member, language: &str) -> Value {
    json!({
        "systemInstruction": {
            "parts": [{ "text": SYSTEM_INSTRUCTION }]
        },
        "contents": [{
            "role": "user",
            "parts": [{ "text": build_prompt(member, language) }]
        }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": response_schema()
        }
    })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPrediction {
    recommended_role: String,
    confidence: f64,
    reasoning: String,
    alternative_role: String,
    suggested_improvement: String,
}

/// Extracts the text of the first candidate from a `generateContent` body.
pub fn parse_generate_content_json(raw: &str) -> Result<String, PredictError> {
    let parsed: GenerateContentResponse =
        serde_json::from_str(raw.trim()).map_err(PredictError::Decode)?;

    let Some(candidate) = parsed.candidates.into_iter().next() else {
        if let Some(reason) = parsed.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(PredictError::Blocked(reason));
        }
        return Err(PredictError::EmptyResponse);
    };

    let text: String = candidate
        .content
        .map(|c| c.parts)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|p| p.text)
        .collect();
    if text.trim().is_empty() {
        return Err(PredictError::EmptyResponse);
    }
    Ok(text)
}

pub fn parse_prediction_json(raw: &str) -> Result<AIPrediction, PredictError> {
    let parsed: RawPrediction = serde_json::from_str(strip_code_fence(raw))?;

    let recommended_role = parse_role("recommendedRole", &parsed.recommended_role)?;
    let alternative_role = parse_role("alternativeRole", &parsed.alternative_role)?;
    if !parsed.confidence.is_finite() || !(0.0..=1.0).contains(&parsed.confidence) {
        return Err(PredictError::Schema(format!(
            "confidence {} outside 0..=1",
            parsed.confidence
        )));
    }

    Ok(AIPrediction {
        recommended_role,
        confidence: parsed.confidence,
        reasoning: parsed.reasoning.trim().to_string(),
        alternative_role,
        suggested_improvement: parsed.suggested_improvement.trim().to_string(),
    })
}

fn parse_role(field: &str, raw: &str) -> Result<Role, PredictError> {
    Role::from_label(raw)
        .ok_or_else(|| PredictError::Schema(format!("{field} '{raw}' is not a known role")))
}

fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Prefers the `error.message` of a Google error body over the raw text.
fn api_error_message(raw: &str) -> String {
    let message = serde_json::from_str::<Value>(raw)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| raw.trim().to_string());
    message.chars().take(MAX_ERROR_BODY_CHARS).collect()
}
