use crate::config::InsightConfig;
use crate::models::{Category, InventoryLog};
use crate::stats::logged_category_totals;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

pub const FALLBACK_INSIGHT: &str =
    "Unable to generate insights at this time. Please check your data or connection.";

#[derive(Debug, thiserror::Error)]
pub enum InsightError {
    #[error("no API key configured")]
    MissingApiKey,
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("provider returned {status}: {body}")]
    Provider { status: u16, body: String },
    #[error("provider returned no text")]
    EmptyResponse,
}

/// Turns a prompt into generated text.
#[async_trait]
pub trait SummaryProvider: Send + Sync {
    async fn summarize(&self, prompt: &str) -> Result<String, InsightError>;
}

// Serializes as a JSON object in canonical category order.
struct CategorySummary(Vec<(Category, u64)>);

impl Serialize for CategorySummary {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(category, total)| (category.label(), total)))
    }
}

pub fn build_prompt(logs: &[InventoryLog]) -> String {
    let summary = serde_json::to_string(&CategorySummary(logged_category_totals(logs)))
        .unwrap_or_else(|_| "{}".to_string());

    format!(
        "As a real estate data analyst, provide a concise 3-sentence summary of the following inventory data.\n\
         Identify the most active category and suggest where the team should focus their efforts based on the volume.\n\
         \n\
         Current Inventory Data:\n\
         {summary}\n\
         \n\
         Total Log Entries: {}",
        logs.len()
    )
}

/// Wraps a provider so every outcome is displayable text.
#[derive(Clone)]
pub struct InsightGenerator {
    provider: Arc<dyn SummaryProvider>,
}

impl InsightGenerator {
    pub fn new(provider: Arc<dyn SummaryProvider>) -> Self {
        Self { provider }
    }

    pub async fn generate(&self, logs: &[InventoryLog]) -> String {
        let prompt = build_prompt(logs);
        debug!(entries = logs.len(), "requesting portfolio insight");
        match self.provider.summarize(&prompt).await {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => {
                warn!("insight provider returned blank text");
                FALLBACK_INSIGHT.to_string()
            }
            Err(err) => {
                warn!("insight generation failed: {err}");
                FALLBACK_INSIGHT.to_string()
            }
        }
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: [RequestPart<'a>; 1],
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "topP")]
    top_p: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

/// Gemini `generateContent` over HTTP.
pub struct GeminiProvider {
    client: Client,
    config: InsightConfig,
}

impl GeminiProvider {
    pub fn new(config: InsightConfig) -> Result<Self, InsightError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }
}

#[async_trait]
impl SummaryProvider for GeminiProvider {
    async fn summarize(&self, prompt: &str) -> Result<String, InsightError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(InsightError::MissingApiKey)?;

        let request = GenerateRequest {
            contents: [Content {
                parts: [RequestPart { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.7,
                top_p: 0.9,
            },
        };

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(InsightError::Provider {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateResponse = response.json().await?;
        let text: String = parsed
            .candidates
            .into_iter()
            .filter_map(|candidate| candidate.content)
            .flat_map(|content| content.parts)
            .filter_map(|part| part.text)
            .collect();

        if text.trim().is_empty() {
            return Err(InsightError::EmptyResponse);
        }
        Ok(text)
    }
}

/// Progress of the background insight job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum InsightStatus {
    #[default]
    Idle,
    Pending,
    Ready {
        text: String,
        generated_at: String,
    },
}

impl InsightStatus {
    pub fn is_pending(&self) -> bool {
        matches!(self, InsightStatus::Pending)
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            InsightStatus::Ready { text, .. } => Some(text),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Source;
    use std::time::Duration;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct Failing;

    #[async_trait]
    impl SummaryProvider for Failing {
        async fn summarize(&self, _prompt: &str) -> Result<String, InsightError> {
            Err(InsightError::EmptyResponse)
        }
    }

    fn sample_logs() -> Vec<InventoryLog> {
        vec![
            InventoryLog {
                id: "a".into(),
                date: "2024-06-01".into(),
                category: Category::OfficeSale,
                source: Source::Owner,
                count: 5,
                recorded_by: "Jane".into(),
            },
            InventoryLog {
                id: "b".into(),
                date: "2024-06-02".into(),
                category: Category::OfficeSale,
                source: Source::Broker,
                count: 2,
                recorded_by: "Jane".into(),
            },
        ]
    }

    fn config_for(server: &MockServer, api_key: Option<&str>) -> InsightConfig {
        InsightConfig {
            api_key: api_key.map(str::to_string),
            model: "test-model".into(),
            base_url: server.uri(),
            timeout: Duration::from_secs(2),
        }
    }

    #[test]
    fn prompt_carries_totals_and_entry_count() {
        let prompt = build_prompt(&sample_logs());
        assert!(prompt.contains(r#"{"Office Sale":7}"#));
        let mixed = vec![
            sample_logs()[0].clone(),
            InventoryLog {
                category: Category::DuplexRent,
                ..sample_logs()[1].clone()
            },
        ];
        assert!(build_prompt(&mixed).contains(r#"{"Office Sale":5,"Duplex Rent":2}"#));
        assert!(prompt.contains("Total Log Entries: 2"));
        assert!(prompt.contains("3-sentence summary"));
    }

    #[tokio::test]
    async fn provider_failure_resolves_to_fallback() {
        let generator = InsightGenerator::new(Arc::new(Failing));
        let text = generator.generate(&sample_logs()).await;
        assert_eq!(text, FALLBACK_INSIGHT);
        assert!(!text.is_empty());
    }

    #[tokio::test]
    async fn missing_api_key_resolves_to_fallback() {
        let server = MockServer::start().await;
        let provider = GeminiProvider::new(config_for(&server, None)).unwrap();
        let generator = InsightGenerator::new(Arc::new(provider));
        assert_eq!(generator.generate(&sample_logs()).await, FALLBACK_INSIGHT);
    }

    #[tokio::test]
    async fn gemini_success_returns_candidate_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/test-model:generateContent"))
            .and(header("x-goog-api-key", "secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{
                    "content": { "parts": [{ "text": "Office Sale leads. " }, { "text": "Focus there." }] }
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = GeminiProvider::new(config_for(&server, Some("secret"))).unwrap();
        let generator = InsightGenerator::new(Arc::new(provider));
        assert_eq!(
            generator.generate(&sample_logs()).await,
            "Office Sale leads. Focus there."
        );
    }

    #[tokio::test]
    async fn gemini_error_status_resolves_to_fallback() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .mount(&server)
            .await;

        let provider = GeminiProvider::new(config_for(&server, Some("secret"))).unwrap();
        let err = provider.summarize("hello").await.unwrap_err();
        assert!(matches!(err, InsightError::Provider { status: 503, .. }));

        let generator = InsightGenerator::new(Arc::new(provider));
        assert_eq!(generator.generate(&sample_logs()).await, FALLBACK_INSIGHT);
    }

    #[tokio::test]
    async fn slow_provider_times_out_to_fallback() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "candidates": [] }))
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let mut config = config_for(&server, Some("secret"));
        config.timeout = Duration::from_millis(200);
        let provider = GeminiProvider::new(config).unwrap();
        let generator = InsightGenerator::new(Arc::new(provider));
        assert_eq!(generator.generate(&sample_logs()).await, FALLBACK_INSIGHT);
    }

    #[test]
    fn status_serializes_with_tag() {
        let ready = InsightStatus::Ready {
            text: "ok".into(),
            generated_at: "2024-06-01T00:00:00Z".into(),
        };
        let value = serde_json::to_value(&ready).unwrap();
        assert_eq!(value["status"], "ready");
        assert_eq!(value["text"], "ok");
        assert_eq!(serde_json::to_value(InsightStatus::Pending).unwrap()["status"], "pending");
    }
}
