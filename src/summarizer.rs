use std::fmt;

use async_trait::async_trait;
use reqwest::header::{ HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE };
use serde::{ Deserialize, Serialize };
use thiserror::Error;
use tracing::{ info, warn };

use crate::models::JobRecord;

pub const DEFAULT_CHAT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

const SYSTEM_PROMPT: &str = "You are a job market analyst.";
const ERROR_MARKER: &str = "❌ Error";

/// Bearer credential for the chat service. Never printed.
#[derive(Clone)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    fn expose(&self) -> &str {
        self.0.trim()
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

impl fmt::Display for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}

#[derive(Error, Debug)]
pub enum ChatError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("OpenAI returned {status}: {message}")]
    Rejected {
        status: reqwest::StatusCode,
        message: String,
    },
    #[error("unexpected response: {0}")]
    Malformed(String),
    #[error("invalid API key header: {0}")]
    InvalidKey(#[from] reqwest::header::InvalidHeaderValue),
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: String,
}

/// One-shot chat completion.
#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn complete(&self, messages: &[ChatMessage], api_key: &ApiKey) -> Result<String, ChatError>;
}

/// OpenAI-compatible `/chat/completions` client.
pub struct OpenAiClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
}

impl OpenAiClient {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
        }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

#[async_trait]
impl ChatClient for OpenAiClient {
    async fn complete(&self, messages: &[ChatMessage], api_key: &ApiKey) -> Result<String, ChatError> {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {}", api_key.expose()))?);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let response = self.http
            .post(format!("{}/chat/completions", self.base_url))
            .headers(headers)
            .json(
                &(ChatRequest {
                    model: &self.model,
                    messages,
                })
            )
            .send().await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            let message = serde_json
                ::from_str::<ErrorEnvelope>(&body)
                .map(|envelope| envelope.error.message)
                .unwrap_or(body);
            return Err(ChatError::Rejected { status, message });
        }

        let parsed: ChatResponse = serde_json
            ::from_str(&body)
            .map_err(|e| ChatError::Malformed(e.to_string()))?;
        parsed.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .ok_or_else(|| ChatError::Malformed("response contained no message".to_string()))
    }
}

/// Outcome of the summary call; callers render both arms.
#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Summary {
    Narrative {
        text: String,
    },
    Failed {
        reason: String,
    },
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Summary::Narrative { text } => f.write_str(text),
            Summary::Failed { reason } =>
                write!(f, "{}: {}. Please check your OpenAI API key.", ERROR_MARKER, reason),
        }
    }
}

pub struct Summarizer {
    client: Box<dyn ChatClient>,
}

impl Summarizer {
    pub fn new(client: Box<dyn ChatClient>) -> Self {
        Self { client }
    }

    /// Asks the chat model about `query` using only the retrieved postings.
    ///
    /// Never fails: every error from the remote call becomes
    /// [`Summary::Failed`].
    pub async fn summarize(&self, records: &[JobRecord], query: &str, api_key: &ApiKey) -> Summary {
        let messages = build_messages(query, &job_context(records));
        info!("Requesting market analysis over {} postings", records.len());

        match self.client.complete(&messages, api_key).await {
            Ok(text) => Summary::Narrative { text },
            Err(e) => {
                warn!("Summary request failed: {}", e);
                Summary::Failed { reason: e.to_string() }
            }
        }
    }
}

pub fn job_context(records: &[JobRecord]) -> String {
    records
        .iter()
        .map(|record| record.combined_text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn build_messages(query: &str, context: &str) -> Vec<ChatMessage> {
    let prompt = format!(
        "User searched for: '{query}'\n\n\
         You are an AI job assistant. You will be asked a question related to jobs, provide your response based on the context provided only. Do not mention anything about context. \
         Here is the context for the given job query:\n{context}"
    );
    vec![
        ChatMessage {
            role: "system",
            content: SYSTEM_PROMPT.to_string(),
        },
        ChatMessage {
            role: "user",
            content: prompt,
        }
    ]
}
