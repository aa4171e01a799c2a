use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::{GenerationError, Result};
use crate::provider::GenerationProvider;

const LOG_PREVIEW_CHARS: usize = 500;

// Keeps log lines readable when the model echoes a long lecture back.
fn preview(text: &str) -> String {
    match text.char_indices().nth(LOG_PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}...[{} chars total]", &text[..cut], text.chars().count()),
        None => text.to_string(),
    }
}

pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl GeminiClient {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| GenerationError::Provider(format!("could not build HTTP client: {e}")))?;
        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.api_base.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent?key={}", self.base_url, self.model, self.api_key)
    }

    fn request_body(prompt: &str, schema: &Value) -> Value {
        json!({
            "contents": [{
                "parts": [{"text": prompt}]
            }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": schema,
                "candidateCount": 1
            }
        })
    }
}

#[async_trait]
impl GenerationProvider for GeminiClient {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate(&self, prompt: &str, schema: &Value) -> Result<String> {
        let url = self.endpoint();
        info!("🔗 Making request to: {}", url.replace(&self.api_key, "***"));

        let response = self.client
            .post(&url)
            .json(&Self::request_body(prompt, schema))
            .send()
            .await
            .map_err(|e| GenerationError::Provider(e.to_string()))?;

        let status = response.status();
        info!("📥 Response status: {}", status);

        let response_text = response.text().await
            .map_err(|e| GenerationError::Provider(e.to_string()))?;

        if !status.is_success() {
            error!("❌ API Error response: {}", preview(&response_text));
            let detail = serde_json::from_str::<ApiErrorBody>(&response_text)
                .map(|body| body.error.message)
                .unwrap_or(response_text);
            return Err(GenerationError::Provider(format!("status={} {}", status, detail)));
        }

        info!("📥 Raw Gemini API response: {}", preview(&response_text));

        let parsed: GeminiResponse = serde_json::from_str(&response_text)
            .map_err(|e| GenerationError::Provider(format!("unreadable response envelope: {e}")))?;

        extract_text(&parsed)
    }
}

// --- Response Parsing Helpers ---

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default, rename = "promptFeedback")]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct PromptFeedback {
    #[serde(default, rename = "blockReason")]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Content,
    #[serde(default, rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct Content { #[serde(default)] parts: Vec<Part> }

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Part {
    Text { text: String },
    Other(Value),
}

fn extract_text(resp: &GeminiResponse) -> Result<String> {
    let Some(candidate) = resp.candidates.first() else {
        let reason = resp
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.clone())
            .unwrap_or_else(|| "no candidates returned".to_string());
        warn!("⚠️ Gemini returned no candidates: {}", reason);
        return Err(GenerationError::Provider(format!("the request was not answered ({reason})")));
    };

    let text: String = candidate
        .content
        .parts
        .iter()
        .filter_map(|p| match p {
            Part::Text { text } => Some(text.as_str()),
            Part::Other(_) => None,
        })
        .collect();

    if text.is_empty() {
        let reason = candidate.finish_reason.as_deref().unwrap_or("UNKNOWN");
        warn!("⚠️ Gemini candidate had no text (finishReason={})", reason);
        return Err(GenerationError::Provider(format!("empty response (finish reason {reason})")));
    }
    if let Some(reason) = candidate.finish_reason.as_deref().filter(|r| *r != "STOP") {
        warn!("⚠️ Gemini finished with reason {}", reason);
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Language;
    use crate::schema::study_material_schema;
    use wiremock::{
        matchers::{body_partial_json, method, path, query_param},
        Mock, MockServer, ResponseTemplate,
    };

    fn config_for(server: &MockServer) -> Config {
        Config {
            api_key: "test-gemini-key".to_string(),
            model: "gemini-2.5-flash".to_string(),
            api_base: server.uri(),
            port: 0,
            request_timeout_secs: 5,
        }
    }

    fn candidate_response(text: &str) -> Value {
        json!({
            "candidates": [{
                "content": {"parts": [{"text": text}], "role": "model"},
                "finishReason": "STOP",
                "index": 0
            }],
            "usageMetadata": {"promptTokenCount": 10, "candidatesTokenCount": 20, "totalTokenCount": 30}
        })
    }

    #[tokio::test]
    async fn sends_structured_output_request() {
        let server = MockServer::start().await;
        let schema = study_material_schema(Language::Hindi).to_provider_schema();

        Mock::given(method("POST"))
            .and(path("/models/gemini-2.5-flash:generateContent"))
            .and(query_param("key", "test-gemini-key"))
            .and(body_partial_json(json!({
                "contents": [{"parts": [{"text": "the prompt"}]}],
                "generationConfig": {"responseMimeType": "application/json", "responseSchema": schema}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(candidate_response("{\"ok\":true}")))
            .expect(1)
            .mount(&server)
            .await;

        let client = GeminiClient::new(&config_for(&server)).unwrap();
        let text = client.generate("the prompt", &schema).await.unwrap();
        assert_eq!(text, "{\"ok\":true}");
    }

    #[tokio::test]
    async fn joins_text_parts() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"content": {"parts": [{"text": "{\"a\":"}, {"text": "1}"}]}}]
            })))
            .mount(&server)
            .await;

        let client = GeminiClient::new(&config_for(&server)).unwrap();
        assert_eq!(client.generate("p", &json!({})).await.unwrap(), "{\"a\":1}");
    }

    #[tokio::test]
    async fn http_error_carries_provider_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_json(json!({
                "error": {"code": 429, "message": "Resource has been exhausted (e.g. check quota).", "status": "RESOURCE_EXHAUSTED"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = GeminiClient::new(&config_for(&server)).unwrap();
        let err = client.generate("p", &json!({})).await.unwrap_err();
        match err {
            GenerationError::Provider(msg) => {
                assert!(msg.contains("429"));
                assert!(msg.contains("Resource has been exhausted"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn non_json_error_body_is_passed_through() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("upstream unavailable"))
            .mount(&server)
            .await;

        let client = GeminiClient::new(&config_for(&server)).unwrap();
        let err = client.generate("p", &json!({})).await.unwrap_err();
        assert_eq!(err, GenerationError::Provider("status=503 Service Unavailable upstream unavailable".into()));
    }

    #[tokio::test]
    async fn blocked_prompt_is_a_provider_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "promptFeedback": {"blockReason": "SAFETY"}
            })))
            .mount(&server)
            .await;

        let client = GeminiClient::new(&config_for(&server)).unwrap();
        let err = client.generate("p", &json!({})).await.unwrap_err();
        assert_eq!(err, GenerationError::Provider("the request was not answered (SAFETY)".into()));
    }

    #[tokio::test]
    async fn unreachable_provider_is_a_provider_error() {
        let server = MockServer::start().await;
        let config = config_for(&server);
        drop(server);

        let client = GeminiClient::new(&config).unwrap();
        let err = client.generate("p", &json!({})).await.unwrap_err();
        assert_eq!(err.kind(), "provider_error");
    }

    #[test]
    fn preview_truncates_on_char_boundary() {
        let long = "अ".repeat(LOG_PREVIEW_CHARS + 10);
        let p = preview(&long);
        assert!(p.ends_with(&format!("[{} chars total]", LOG_PREVIEW_CHARS + 10)));
        assert_eq!(preview("short"), "short");
    }
}
