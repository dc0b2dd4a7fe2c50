use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, error, trace};
use serde::{Deserialize, Serialize};

use crate::config::InferenceConfig;
use crate::error::Error;
use super::{InferenceTransport, UpstreamReply};

// ===== Message Types =====

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage
{   pub role: String
  , pub content: String
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCompletionRequest
{   pub model: String
  , pub messages: Vec<ChatMessage>
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<usize>
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionResponse
{   pub choices: Vec<Choice>
}

#[derive(Debug, Clone, Deserialize)]
pub struct Choice
{   pub message: ChatMessage
  , #[serde(default)]
    pub finish_reason: Option<String>
}

// ===== Transport =====

/// reqwest-backed transport for the Hugging Face router
pub struct HuggingFaceTransport
{   http_client: reqwest::Client
}

impl HuggingFaceTransport
{   pub fn new(timeout: Duration) -> Result<Self, Error>
    {   debug!("Creating HuggingFaceTransport with timeout {:?}", timeout);
        let http_client = reqwest::Client::builder()
          .timeout(timeout)
          .build()
          .map_err(|e| {
            error!("Failed to build HTTP client: {}", e);
            Error::InvalidConfiguration(e.to_string())
          })?;
        Ok(HuggingFaceTransport { http_client })
    }
}

#[async_trait]
impl InferenceTransport for HuggingFaceTransport
{   async fn post_json(
      &self
    , url: &str
    , token: &str
    , body: &serde_json::Value
    ) -> Result<UpstreamReply, Error>
    {   trace!("POST {} {}", url, body);

        let response = self.http_client
          .post(url)
          .header("Authorization", format!("Bearer {}", token))
          .json(body)
          .send()
          .await
          .map_err(|e| {
            error!("HTTP error: {}", e);
            if e.is_timeout()
            {   Error::Timeout
            } else
            {   Error::HttpError(e.to_string())
            }
          })?;

        let status = response.status().as_u16();
        trace!("Response status from {}: {}", url, status);

        let bytes = response.bytes().await.map_err(|e| {
          error!("Failed to read response body: {}", e);
          if e.is_timeout()
          {   Error::Timeout
          } else
          {   Error::ParseError(e.to_string())
          }
        })?;

        Ok(UpstreamReply::new(status, bytes.to_vec()))
    }
}

// ===== Chat =====

/// Single-shot chat completion against a fixed model
pub struct HuggingFaceChat
{   chat_url: String
  , model: String
  , max_tokens: usize
  , token: Option<String>
  , transport: Arc<dyn InferenceTransport>
}

impl HuggingFaceChat
{   pub fn new(
      config: &InferenceConfig
    , transport: Arc<dyn InferenceTransport>
    ) -> Self
    {   HuggingFaceChat
        {   chat_url: config.chat_url.clone()
          , model: config.chat_model.clone()
          , max_tokens: config.chat_max_tokens
          , token: config.token.clone()
          , transport
        }
    }

    /// Send one user message and return the first choice's text
    pub async fn send_prompt(&self, prompt: &str)
      -> Result<String, Error>
    {   let token = self.token.as_deref().ok_or_else(|| {
          error!("Chat requested without HF token");
          Error::MissingApiKey("HF Token".to_string())
        })?;

        debug!("Handling chat prompt for: {}", self.model);

        let request = ChatCompletionRequest
        {   model: self.model.clone()
          , messages: vec![
              ChatMessage
              {   role: "user".to_string()
                , content: prompt.to_string()
              }
            ]
          , max_tokens: Some(self.max_tokens)
          , stream: Some(false)
        };
        let body = serde_json::to_value(&request)
          .map_err(|e| Error::ParseError(e.to_string()))?;

        let reply = self.transport
          .post_json(&self.chat_url, token, &body)
          .await?;

        if !reply.is_success()
        {   error!("Chat API error {}: {}", reply.status, reply.message());
            return Err(Error::ApiError(
              format!("{}: {}", reply.status, reply.message())
            ));
        }

        let chat_response: ChatCompletionResponse
          = serde_json::from_slice(&reply.body).map_err(|e| {
            error!("Parse error: {}", e);
            Error::ParseError(e.to_string())
          })?;

        chat_response.choices.into_iter().next()
          .map(|c| c.message.content)
          .ok_or_else(|| {
            error!("No choices in response");
            Error::NoChoicesInResponse
          })
    }
}
