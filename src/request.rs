//! Request, response and outcome types shared by the dispatcher and server

use serde::{Deserialize, Serialize};

pub const IMAGE_MEDIA_TYPE: &str = "image/png";

/// Inbound image generation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest
{   /// The prompt text
    pub prompt: String
  , /// Model key, catalog default when absent
    #[serde(default)]
    pub model: Option<String>
}

/// Inbound chat request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest
{   pub prompt: String
}

/// Chat reply body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatReply
{   pub result: String
}

/// Body of `/api/info`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationInfo
{   pub status: String
  , pub models: Vec<String>
  , pub token_set: bool
}

/// Image bytes exactly as returned upstream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload
{   pub bytes: Vec<u8>
  , pub media_type: &'static str
  , /// Model identifier that produced the image
    pub model_id: String
}

impl ImagePayload
{   pub fn png(bytes: Vec<u8>, model_id: String) -> Self
    {   ImagePayload
        {   bytes
          , media_type: IMAGE_MEDIA_TYPE
          , model_id
        }
    }
}

/// Classification of a single upstream call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationOutcome
{   /// 200 with image bytes
    Success(Vec<u8>)
  , /// Worth retrying the same model after a delay
    TransientFailure
    {   status: Option<u16>
      , reason: String
      , cold_start: bool
      , /// Upstream load estimate in milliseconds
        estimated_time_ms: Option<u64>
    }
  , /// Not recoverable on this model
    TerminalFailure
    {   status: u16
      , message: String
    }
}
