use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::{Deserialize, Serialize};

use super::prompts;
use crate::config::LlmConfig;
use crate::error::{Error, Result};
use crate::memory::search::SearchOutcome;
use crate::research::plan::{parse_observation, parse_plan};
use crate::research::{Observation, Observer, Parsed, Plan, Planner, ResearchContext, ResearchReport};

/// OpenAI-compatible chat completions client.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    http: reqwest::Client,
    endpoint: String,
    model: String,
    temperature: Option<f32>,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    /// Token limit for GPT-4 and earlier models.
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    /// Token limit for reasoning models (o1/o3/gpt-5).
    #[serde(skip_serializing_if = "Option::is_none")]
    max_completion_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiClient {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| Error::invalid_config("LLM API key is not set (OPENAI_API_KEY)"))?;

        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {api_key}"))
            .map_err(|e| Error::invalid_config(format!("invalid LLM API key: {e}")))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            endpoint: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Reasoning models take `max_completion_tokens` and only the default
    /// temperature.
    fn is_reasoning_model(&self) -> bool {
        self.model.starts_with("gpt-5") || self.model.starts_with("o1") || self.model.starts_with("o3")
    }

    fn build_request<'a>(&'a self, system: &'a str, user: &'a str) -> ChatCompletionRequest<'a> {
        let messages = [
            ChatMessage {
                role: "system",
                content: system,
            },
            ChatMessage {
                role: "user",
                content: user,
            },
        ];
        if self.is_reasoning_model() {
            ChatCompletionRequest {
                model: &self.model,
                messages,
                max_tokens: None,
                max_completion_tokens: Some(self.max_tokens),
                temperature: None,
            }
        } else {
            ChatCompletionRequest {
                model: &self.model,
                messages,
                max_tokens: Some(self.max_tokens),
                max_completion_tokens: None,
                temperature: self.temperature,
            }
        }
    }

    /// One chat completion; returns the first choice's text.
    pub async fn complete(&self, system: &str, user: &str) -> Result<String> {
        let request = self.build_request(system, user);
        let response = self
            .http
            .post(format!("{}/chat/completions", self.endpoint))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::remote("chat completion", format!("HTTP {status}: {body}")));
        }

        let parsed: ChatCompletionResponse = response.json().await?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| Error::remote("chat completion", "response contained no message content"))
    }

    /// Write a prose answer from a finished research session.
    pub async fn synthesize(&self, report: &ResearchReport) -> Result<String> {
        let prompt = prompts::synthesis_prompt(report);
        self.complete(prompts::SYNTHESIS_SYSTEM, &prompt).await
    }
}

impl Planner for OpenAiClient {
    async fn plan_next(&self, query: &str, context: &ResearchContext) -> Result<Parsed<Plan>> {
        let prompt = prompts::planner_prompt(query, context);
        let raw = self.complete(prompts::PLANNER_SYSTEM, &prompt).await?;
        Ok(parse_plan(&raw))
    }
}

impl Observer for OpenAiClient {
    async fn observe(&self, outcome: &SearchOutcome, query: &str) -> Result<Parsed<Observation>> {
        let prompt = prompts::observer_prompt(outcome, query);
        let raw = self.complete(prompts::OBSERVER_SYSTEM, &prompt).await?;
        Ok(parse_observation(&raw))
    }
}
