//! Anthropic - Claude API provider
//!
//! This module implements the Anthropic Claude drawing provider using reqwest.
//! The system prompt and notes history carry `cache_control` markers so that
//! consecutive turns hit the prompt cache; the canvas image never does.

use crate::error::{Error, Result};
use crate::provider::DrawingProvider;
use crate::request::{format_context_lines, format_notes_block, DrawingRequest, DrawingResponse};
use crate::util::{estimate_tokens, mask_api_key, sanitize_api_error};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::{debug, instrument};

/// Anthropic API version
const API_VERSION: &str = "2023-06-01";

/// Default model
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-5";

/// Default API base URL
const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";

// ============================================================================
// API Types
// ============================================================================

#[derive(Debug, Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    system: Vec<SystemBlock>,
    messages: Vec<AnthropicMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    thinking: Option<ThinkingConfig>,
}

#[derive(Debug, Serialize)]
struct SystemBlock {
    #[serde(rename = "type")]
    kind: &'static str,
    text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    cache_control: Option<CacheControl>,
}

#[derive(Debug, Clone, Copy, Serialize)]
struct CacheControl {
    #[serde(rename = "type")]
    kind: &'static str,
}

const EPHEMERAL: CacheControl = CacheControl { kind: "ephemeral" };

#[derive(Debug, Serialize)]
struct AnthropicMessage {
    role: String,
    content: Vec<ContentBlock>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type")]
enum ContentBlock {
    #[serde(rename = "text")]
    Text {
        text: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        cache_control: Option<CacheControl>,
    },
    #[serde(rename = "image")]
    Image { source: ImageSource },
}

#[derive(Debug, Serialize)]
struct ImageSource {
    #[serde(rename = "type")]
    kind: &'static str,
    media_type: &'static str,
    data: String,
}

#[derive(Debug, Serialize)]
struct ThinkingConfig {
    #[serde(rename = "type")]
    kind: &'static str,
    budget_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    model: String,
    content: Vec<ResponseContentBlock>,
    usage: AnthropicUsage,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum ResponseContentBlock {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "thinking")]
    Thinking { thinking: String },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct AnthropicUsage {
    input_tokens: u64,
    output_tokens: u64,
    #[serde(default)]
    cache_read_input_tokens: Option<u64>,
    #[serde(default)]
    cache_creation_input_tokens: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct AnthropicError {
    error: AnthropicErrorDetail,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorDetail {
    r#type: String,
    message: String,
}

// ============================================================================
// Provider Implementation
// ============================================================================

/// Anthropic provider configuration
#[derive(Clone)]
pub struct AnthropicConfig {
    /// API key
    pub api_key: String,
    /// Base URL
    pub base_url: String,
    /// Default model
    pub default_model: String,
    /// Request timeout
    pub timeout: Duration,
}

// SECURITY: Custom Debug implementation to mask API key
impl fmt::Debug for AnthropicConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnthropicConfig")
            .field("api_key", &mask_api_key(&self.api_key))
            .field("base_url", &self.base_url)
            .field("default_model", &self.default_model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl AnthropicConfig {
    /// Create a new configuration with an API key
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            default_model: DEFAULT_MODEL.to_string(),
            timeout: Duration::from_secs(300),
        }
    }

    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("ANTHROPIC_API_KEY")
            .map_err(|_| Error::NotConfigured("ANTHROPIC_API_KEY not set".to_string()))?;

        let mut config = Self::new(api_key);
        if let Ok(base_url) = std::env::var("ANTHROPIC_BASE_URL") {
            config.base_url = base_url;
        }
        if let Ok(model) = std::env::var("ANTHROPIC_MODEL") {
            config.default_model = model;
        }
        Ok(config)
    }

    /// Set the base URL
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the default model
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    /// Set the timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Anthropic Claude provider
pub struct AnthropicProvider {
    client: Client,
    config: AnthropicConfig,
}

impl AnthropicProvider {
    /// Create a new Anthropic provider
    pub fn new(config: AnthropicConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        let config = AnthropicConfig::from_env()?;
        Self::new(config)
    }

    /// Lay out a drawing turn: cached prefix, then image and context
    fn build_request(&self, request: &DrawingRequest) -> (AnthropicRequest, Vec<String>) {
        let mut provider_log = Vec::new();

        let mut content = vec![ContentBlock::Text {
            text: format!("Art prompt: {}", request.original_prompt),
            cache_control: None,
        }];
        if let Some(notes) = format_notes_block(&request.notes_history) {
            content.push(ContentBlock::Text {
                text: notes,
                cache_control: Some(EPHEMERAL),
            });
        }
        content.push(ContentBlock::Image {
            source: ImageSource {
                kind: "base64",
                media_type: "image/png",
                data: request.canvas_png_base64.clone(),
            },
        });
        content.push(ContentBlock::Text {
            text: format_context_lines(request),
            cache_control: None,
        });

        // budget_tokens must stay below max_tokens, so the budgets are added
        let mut max_tokens = request.max_output_tokens;
        let thinking = if request.thinking_enabled {
            max_tokens = request
                .thinking_budget
                .saturating_add(request.max_output_tokens);
            provider_log.push(format!(
                "Thinking enabled (budget={}, max_tokens={})",
                request.thinking_budget, max_tokens
            ));
            Some(ThinkingConfig {
                kind: "enabled",
                budget_tokens: request.thinking_budget,
            })
        } else {
            None
        };

        let body = AnthropicRequest {
            model: self.config.default_model.clone(),
            max_tokens,
            system: vec![SystemBlock {
                kind: "text",
                text: request.system_prompt.clone(),
                cache_control: Some(EPHEMERAL),
            }],
            messages: vec![AnthropicMessage {
                role: "user".to_string(),
                content,
            }],
            thinking,
        };
        (body, provider_log)
    }

    /// Fold an API response into the provider-agnostic shape
    fn convert_response(
        response: AnthropicResponse,
        mut provider_log: Vec<String>,
    ) -> DrawingResponse {
        let mut raw_text = String::new();
        let mut thinking_tokens = 0;
        for block in response.content {
            match block {
                ResponseContentBlock::Text { text } => raw_text.push_str(&text),
                // Summarised thinking: billed tokens are part of output_tokens
                ResponseContentBlock::Thinking { thinking } => {
                    thinking_tokens += estimate_tokens(&thinking);
                }
                ResponseContentBlock::Other => {}
            }
        }

        let usage = response.usage;
        let cache_read = usage.cache_read_input_tokens.unwrap_or(0);
        let cache_creation = usage.cache_creation_input_tokens.unwrap_or(0);

        if cache_read > 0 {
            provider_log.push(format!(
                "Cache hit: {}/{} input tokens from cache",
                cache_read, usage.input_tokens
            ));
        } else if cache_creation > 0 {
            provider_log.push(format!(
                "Cache primed: {} tokens written to cache",
                cache_creation
            ));
        }
        if thinking_tokens > 0 {
            provider_log.push(format!(
                "Thinking: ~{} summary tokens (billed as part of {} output tokens)",
                thinking_tokens, usage.output_tokens
            ));
        }

        DrawingResponse {
            raw_text,
            input_tokens: usage.input_tokens,
            output_tokens: usage.output_tokens,
            cache_read_tokens: cache_read,
            cache_creation_tokens: cache_creation,
            thinking_tokens,
            model: response.model,
            provider_log,
        }
    }

    /// Send request to Anthropic API
    async fn send_request(&self, request: &AnthropicRequest) -> Result<AnthropicResponse> {
        let url = format!("{}/v1/messages", self.config.base_url);

        debug!("Sending request to Anthropic: {}", url);

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", API_VERSION)
            .header("content-type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        if !status.is_success() {
            if status.as_u16() == 429 {
                return Err(Error::RateLimit);
            }
            if let Ok(error) = serde_json::from_str::<AnthropicError>(&body) {
                // SECURITY: Sanitize error messages
                return Err(Error::Api(sanitize_api_error(&format!(
                    "{}: {}",
                    error.error.r#type, error.error.message
                ))));
            }
            // SECURITY: Don't expose raw HTTP response body
            return Err(Error::Api(sanitize_api_error(&format!(
                "HTTP {}: {}",
                status, body
            ))));
        }

        serde_json::from_str(&body).map_err(|e| Error::InvalidResponse(e.to_string()))
    }
}

#[async_trait::async_trait]
impl DrawingProvider for AnthropicProvider {
    fn name(&self) -> &str {
        "anthropic"
    }

    fn default_model(&self) -> &str {
        &self.config.default_model
    }

    #[instrument(
        skip(self, request),
        fields(model = %self.config.default_model, iteration = request.iteration)
    )]
    async fn send_drawing_request(&self, request: &DrawingRequest) -> Result<DrawingResponse> {
        let (body, provider_log) = self.build_request(request);
        let response = self.send_request(&body).await?;
        Ok(Self::convert_response(response, provider_log))
    }
}
