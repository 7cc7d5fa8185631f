use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::parse::{parse_nutrition, parse_product, NutritionFacts, ProductAnalysis};
use crate::retry::{is_retryable_status, with_retry, RetryConfig};
use crate::Result;

const OPENAI_API_BASE: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o";

/// Instruction sent with a product photo. The reply is still run through
/// the defensive parser - see parse.rs.
const PRODUCT_INSTRUCTION: &str = "Analyze this product image and respond ONLY with a JSON object in this exact format, with no additional text or formatting:\n{\"name\": \"Product Name\", \"description\": \"Brief product description\"}";

/// Instruction sent with a nutrition-label photo.
const NUTRITION_INSTRUCTION: &str = "Analyze this nutrition label and respond ONLY with a JSON object in this exact format. Remove any 'g' or unit suffixes from the numbers and return them as plain numbers:\n{\"servingSize\": \"2.0 oz (56g)\", \"calories\": 200, \"protein\": 6, \"carbohydrates\": 39, \"fat\": 2.5, \"sugar\": 1}";

const PRODUCT_MAX_TOKENS: u32 = 300;
const NUTRITION_MAX_TOKENS: u32 = 500;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("analysis request failed with status {status}: {body}")]
    RequestFailed {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("rate limit exceeded")]
    RateLimitExceeded,

    #[error("analysis service rejected credentials")]
    AuthRejected,

    #[error("malformed analysis reply: {0}")]
    Malformed(String),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl AnalysisError {
    /// Transient failures are worth retrying; a 401 or a garbage payload
    /// will not get better on the second attempt.
    pub fn is_transient(&self) -> bool {
        match self {
            AnalysisError::Network(_) | AnalysisError::RateLimitExceeded => true,
            AnalysisError::RequestFailed { status, .. } => is_retryable_status(*status),
            AnalysisError::AuthRejected | AnalysisError::Malformed(_) => false,
        }
    }
}

/// Client for an OpenAI-compatible chat-completions endpoint with image
/// input. One instance is cheap to clone the reqwest pool behind, so the
/// whole app shares one.
pub struct VisionClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    retry_config: RetryConfig,
}

impl VisionClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, OPENAI_API_BASE.to_string())
    }

    /// For OpenAI-compatible gateways, or a stub server in tests
    pub fn with_base_url(api_key: impl Into<String>, base_url: String) -> Self {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::USER_AGENT,
            reqwest::header::HeaderValue::from_static("cartlens/0.1.0"),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            api_key: api_key.into(),
            base_url,
            model: DEFAULT_MODEL.to_string(),
            retry_config: RetryConfig::default(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_retry_config(mut self, retry_config: RetryConfig) -> Self {
        self.retry_config = retry_config;
        self
    }

    /// Identify the product in a photo
    pub async fn analyze_product(&self, encoded_image: &str) -> Result<ProductAnalysis> {
        let content = self
            .complete(PRODUCT_INSTRUCTION, encoded_image, PRODUCT_MAX_TOKENS)
            .await?;
        parse_product(&content)
    }

    /// Read the facts off a nutrition label photo
    pub async fn analyze_nutrition(&self, encoded_image: &str) -> Result<NutritionFacts> {
        let content = self
            .complete(NUTRITION_INSTRUCTION, encoded_image, NUTRITION_MAX_TOKENS)
            .await?;
        parse_nutrition(&content)
    }

    /// One round trip to the chat-completions endpoint, retried on
    /// transient failures. Returns the assistant's reply text.
    async fn complete(
        &self,
        instruction: &str,
        encoded_image: &str,
        max_tokens: u32,
    ) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);
        let request_body = ChatRequest {
            model: &self.model,
            messages: vec![Message {
                role: "user",
                content: vec![
                    ContentPart::Text {
                        text: instruction.to_string(),
                    },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: encoded_image.to_string(),
                        },
                    },
                ],
            }],
            max_tokens,
        };

        with_retry(&self.retry_config, AnalysisError::is_transient, || async {
            let response = self
                .client
                .post(&url)
                .bearer_auth(&self.api_key)
                .json(&request_body)
                .send()
                .await?;

            let status = response.status();

            if status == reqwest::StatusCode::UNAUTHORIZED {
                return Err(AnalysisError::AuthRejected);
            }

            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                return Err(AnalysisError::RateLimitExceeded);
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(AnalysisError::RequestFailed { status, body });
            }

            let body = response.text().await?;
            let reply: ChatResponse = serde_json::from_str(&body).map_err(|_| {
                AnalysisError::Malformed(format!(
                    "unexpected completion envelope. Raw response: {body}"
                ))
            })?;

            let content = reply
                .choices
                .into_iter()
                .next()
                .map(|choice| choice.message.content)
                .ok_or_else(|| {
                    AnalysisError::Malformed(format!(
                        "completion had no choices. Raw response: {body}"
                    ))
                })?;

            debug!("Analysis reply received: {} bytes", content.len());
            Ok(content)
        })
        .await
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    max_tokens: u32,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: Vec<ContentPart>,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: AssistantMessage,
}

#[derive(Deserialize)]
struct AssistantMessage {
    content: String,
}
