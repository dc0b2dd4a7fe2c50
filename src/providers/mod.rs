//! Upstream inference transports

pub mod huggingface;

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::Error;
use crate::failover::FallbackRules;
use crate::request::GenerationOutcome;

// Re-export for convenience
pub use huggingface::{HuggingFaceChat, HuggingFaceTransport};

/// Raw status and body of one upstream call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamReply
{   pub status: u16
  , pub body: Vec<u8>
}

#[derive(Debug, Deserialize)]
struct LoadingBody
{   estimated_time: Option<f64>
}

const MAX_MESSAGE_LEN: usize = 500;

impl UpstreamReply
{   pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self
    {   UpstreamReply
        {   status
          , body: body.into()
        }
    }

    pub fn is_success(&self) -> bool
    {   self.status == 200
    }

    /// Body as lossy UTF-8, truncated for error messages
    pub fn message(&self) -> String
    {   let text = String::from_utf8_lossy(&self.body);
        let text = text.trim();
        if text.chars().count() > MAX_MESSAGE_LEN
        {   let cut: String = text.chars().take(MAX_MESSAGE_LEN).collect();
            format!("{}...", cut)
        } else
        {   text.to_string()
        }
    }

    /// `estimated_time` from a model-loading body, in seconds
    pub fn estimated_time(&self) -> Option<f64>
    {   serde_json::from_slice::<LoadingBody>(&self.body)
          .ok()
          .and_then(|b| b.estimated_time)
    }

    /// Classify this reply for the retry loop
    pub fn outcome(self, rules: &FallbackRules) -> GenerationOutcome
    {   match self.status
        {   200 => GenerationOutcome::Success(self.body)
          , 503 => GenerationOutcome::TransientFailure
            {   status: Some(503)
              , estimated_time_ms: self.estimated_time()
                  .filter(|s| s.is_finite() && *s >= 0.0)
                  .map(|s| (s * 1000.0) as u64)
              , reason: self.message()
              , cold_start: true
            }
          , status if rules.is_hard_failure(status) => {
              GenerationOutcome::TerminalFailure
              {   status
                , message: self.message()
              }
            }
          , status => GenerationOutcome::TransientFailure
            {   status: Some(status)
              , reason: self.message()
              , cold_start: false
              , estimated_time_ms: None
            }
        }
    }
}

/// Something that can POST a JSON body with a bearer token
#[async_trait]
pub trait InferenceTransport: Send + Sync
{   async fn post_json(
      &self
    , url: &str
    , token: &str
    , body: &serde_json::Value
    ) -> Result<UpstreamReply, Error>;
}
