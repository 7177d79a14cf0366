use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;
use tokio::time::sleep;
use tracing::{debug, warn};

use almanac_core::config::LlmConfig;

use crate::tools::FunctionDeclaration;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("llm api key is not configured")]
    MissingApiKey,
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("classification service returned status {status}: {body}")]
    HttpStatus { status: u16, body: String },
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("classification timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },
}

impl From<serde_json::Error> for LlmError {
    fn from(error: serde_json::Error) -> Self {
        Self::InvalidResponse(error.to_string())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FunctionCall {
    pub name: String,
    pub args: Value,
}

#[derive(Clone, Debug)]
pub struct FunctionCallRequest {
    pub system_instruction: String,
    pub user_text: String,
    pub functions: Vec<FunctionDeclaration>,
}

/// A model that may answer a prompt by picking one of the offered functions.
#[async_trait]
pub trait FunctionCallingClient: Send + Sync {
    /// `Ok(None)` means the model answered without calling a function.
    async fn call_function(
        &self,
        request: &FunctionCallRequest,
    ) -> Result<Option<FunctionCall>, LlmError>;
}

#[derive(Clone, Debug)]
pub struct GeminiConfig {
    pub api_base: String,
    pub api_key: SecretString,
    pub model: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
}

impl GeminiConfig {
    pub fn from_llm_config(config: &LlmConfig) -> Result<Self, LlmError> {
        let api_key = config.api_key.clone().ok_or(LlmError::MissingApiKey)?;
        Ok(Self {
            api_base: config.base_url.clone(),
            api_key,
            model: config.model.clone(),
            timeout_secs: config.timeout_secs,
            max_retries: config.max_retries,
            retry_backoff_ms: 250,
        })
    }
}

#[derive(Clone, Debug)]
pub struct GeminiClient {
    client: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self, LlmError> {
        if config.api_key.expose_secret().trim().is_empty() {
            return Err(LlmError::MissingApiKey);
        }

        let client =
            reqwest::Client::builder().timeout(Duration::from_secs(config.timeout_secs.max(1))).build()?;

        Ok(Self { client, config })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn generate_content_url(&self) -> String {
        let base = self.config.api_base.trim_end_matches('/');
        format!("{base}/models/{}:generateContent", self.config.model)
    }
}

#[async_trait]
impl FunctionCallingClient for GeminiClient {
    async fn call_function(
        &self,
        request: &FunctionCallRequest,
    ) -> Result<Option<FunctionCall>, LlmError> {
        let body = build_generate_content_body(request);
        let url = self.generate_content_url();
        let max_retries = self.config.max_retries;

        for attempt in 0..=max_retries {
            let response = self
                .client
                .post(&url)
                .header("x-goog-api-key", self.config.api_key.expose_secret())
                .json(&body)
                .send()
                .await;

            match response {
                Ok(response) => {
                    let status = response.status();
                    let raw = response.text().await.map_err(|error| error.without_url())?;
                    if status.is_success() {
                        return parse_generate_content_response(&raw);
                    }

                    if attempt < max_retries && should_retry_status(status.as_u16()) {
                        warn!(
                            event_name = "agent.llm.retry",
                            status = status.as_u16(),
                            attempt,
                            "classification request failed, retrying"
                        );
                        sleep(self.retry_delay(attempt)).await;
                        continue;
                    }

                    return Err(LlmError::HttpStatus { status: status.as_u16(), body: raw });
                }
                Err(error) => {
                    let error = error.without_url();
                    if attempt < max_retries && (error.is_timeout() || error.is_connect()) {
                        warn!(
                            event_name = "agent.llm.retry",
                            attempt,
                            error = %error,
                            "classification transport error, retrying"
                        );
                        sleep(self.retry_delay(attempt)).await;
                        continue;
                    }
                    return Err(LlmError::Http(error));
                }
            }
        }

        Err(LlmError::InvalidResponse("request retry loop terminated unexpectedly".to_string()))
    }
}

impl GeminiClient {
    fn retry_delay(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.config.retry_backoff_ms.saturating_mul(u64::from(attempt) + 1))
    }
}

fn should_retry_status(status: u16) -> bool {
    status == 429 || (500..=599).contains(&status)
}

fn build_generate_content_body(request: &FunctionCallRequest) -> Value {
    let declarations: Vec<Value> = request
        .functions
        .iter()
        .map(|function| {
            json!({
                "name": function.name,
                "description": function.description,
                "parameters": function.parameters,
            })
        })
        .collect();

    json!({
        "systemInstruction": {"parts": [{"text": request.system_instruction}]},
        "contents": [{"role": "user", "parts": [{"text": request.user_text}]}],
        "tools": [{"functionDeclarations": declarations}],
    })
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<GenerateContentCandidate>>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentCandidate {
    content: Option<GenerateContentBody>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentBody {
    parts: Option<Vec<GenerateContentPart>>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentPart {
    #[serde(rename = "functionCall")]
    function_call: Option<GenerateContentFunctionCall>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentFunctionCall {
    name: String,
    args: Option<Value>,
}

fn parse_generate_content_response(raw: &str) -> Result<Option<FunctionCall>, LlmError> {
    let parsed: GenerateContentResponse = serde_json::from_str(raw)?;
    let candidate = parsed
        .candidates
        .and_then(|candidates| candidates.into_iter().next())
        .ok_or_else(|| LlmError::InvalidResponse("response contained no candidates".to_string()))?;

    let parts = candidate.content.and_then(|content| content.parts).unwrap_or_default();
    let call = parts.into_iter().find_map(|part| part.function_call).map(|call| FunctionCall {
        name: call.name,
        args: call.args.unwrap_or_else(|| json!({})),
    });

    debug!(
        event_name = "agent.llm.response_parsed",
        function = call.as_ref().map(|call| call.name.as_str()).unwrap_or("none"),
        "classification response parsed"
    );
    Ok(call)
}
