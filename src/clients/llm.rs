//! Generation backend client. Speaks the Ollama-style generate API: a
//! single POST with the prompt, a bounded wait, raw text back. Failure is
//! an error or a timeout, never a partial payload.

use reqwest;
use serde::{Deserialize, Serialize};
use std::env;
use std::error::Error;
use std::fmt;
use std::time::Duration;

const DEFAULT_ENDPOINT: &str = "http://localhost:11434/api/generate";
const DEFAULT_MODEL: &str = "llama3";
const GENERATION_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

#[derive(Debug)]
pub enum LlmError {
    Connection(reqwest::Error),
    Status(u16),
}

impl fmt::Display for LlmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LlmError::Connection(err) => write!(f, "LLM connection failed: {}", err),
            LlmError::Status(code) => write!(f, "LLM API returned status {}", code),
        }
    }
}

impl Error for LlmError {}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        LlmError::Connection(err)
    }
}

pub struct LlmClient {
    http_client: reqwest::Client,
    endpoint: String,
    model: String,
}

impl LlmClient {
    pub fn new() -> Self {
        let endpoint = env::var("LLM_ENDPOINT").unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string());
        let model = env::var("LLM_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(GENERATION_TIMEOUT_SECS))
            .build()
            .unwrap_or_default();

        Self {
            http_client,
            endpoint,
            model,
        }
    }

    /// Run one generation and return the raw response text.
    pub async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let request = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
        };

        let response = self
            .http_client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(LlmError::Status(response.status().as_u16()));
        }

        let body: GenerateResponse = response.json().await?;
        Ok(body.response)
    }
}

impl Default for LlmClient {
    fn default() -> Self {
        Self::new()
    }
}
