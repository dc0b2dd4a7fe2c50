//! Configuration for the gateway, the upstream API and retry behavior

use std::str::FromStr;
use std::time::Duration;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::Error;

pub const DEFAULT_INFERENCE_BASE: &str
  = "https://router.huggingface.co/hf-inference/models";
pub const DEFAULT_CHAT_URL: &str
  = "https://router.huggingface.co/v1/chat/completions";
pub const DEFAULT_CHAT_MODEL: &str = "HuggingFaceH4/zephyr-7b-beta";

/// HTTP listener configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig
{   /// Host to bind to
    pub host: String
  , /// Port to listen on
    pub port: u16
}

impl Default for ServerConfig
{   fn default() -> Self
    {   ServerConfig
        {   host: "0.0.0.0".to_string()
          , port: 8080
        }
    }
}

impl ServerConfig
{   /// Socket address string
    pub fn addr(&self) -> String
    {   format!("{}:{}", self.host, self.port)
    }
}

/// Upstream inference API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceConfig
{   /// Bearer token, `None` when unset or empty
    pub token: Option<String>
  , /// Base URL the model identifier is appended to
    pub inference_base: String
  , /// Chat completion endpoint
    pub chat_url: String
  , /// Fixed chat model identifier
    pub chat_model: String
  , /// Token budget for chat replies
    pub chat_max_tokens: usize
  , /// Per-call timeout in seconds
    pub timeout_secs: u64
}

impl Default for InferenceConfig
{   fn default() -> Self
    {   InferenceConfig
        {   token: None
          , inference_base: DEFAULT_INFERENCE_BASE.to_string()
          , chat_url: DEFAULT_CHAT_URL.to_string()
          , chat_model: DEFAULT_CHAT_MODEL.to_string()
          , chat_max_tokens: 500
          , timeout_secs: 50
        }
    }
}

impl InferenceConfig
{   pub fn timeout(&self) -> Duration
    {   Duration::from_secs(self.timeout_secs)
    }
}

/// Retry and fallback configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig
{   /// Attempts per request, shared across the fallback chain
    pub max_attempts: usize
  , /// Cold-start delay when the upstream gives no estimate
    pub cold_start_delay_ms: u64
  , /// Cap applied to any cold-start delay
    pub max_cold_start_delay_ms: u64
  , /// Use the upstream `estimated_time` when present
    pub honor_estimated_time: bool
  , /// Delay after network failures and other transient statuses
    pub network_delay_ms: u64
  , /// Statuses that move off the requested model
    pub hard_failure_statuses: Vec<u16>
  , /// Statuses that move past the default model to the last resort
    pub escalate_statuses: Vec<u16>
}

impl Default for RetryConfig
{   fn default() -> Self
    {   RetryConfig
        {   max_attempts: 3
          , cold_start_delay_ms: 8_000
          , max_cold_start_delay_ms: 10_000
          , honor_estimated_time: true
          , network_delay_ms: 2_000
          , hard_failure_statuses: vec![400, 401, 402, 403, 404, 410]
          , escalate_statuses: vec![400, 404, 410]
        }
    }
}

/// Gateway configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GatewayConfig
{   pub server: ServerConfig
  , pub inference: InferenceConfig
  , pub retry: RetryConfig
}

impl GatewayConfig
{   /// Build from process environment variables
    pub fn from_env() -> Result<Self, Error>
    {   Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
      F: Fn(&str) -> Option<String>
    {   let defaults = GatewayConfig::default();

        let token = lookup("HF_TOKEN")
          .map(|t| t.trim().to_string())
          .filter(|t| !t.is_empty());
        if token.is_none()
        {   warn!("HF_TOKEN is not set; image and chat endpoints will refuse requests");
        }

        let server = ServerConfig
        {   host: lookup("HOST").unwrap_or(defaults.server.host)
          , port: parse_var(&lookup, "PORT", defaults.server.port)?
        };

        let inference = InferenceConfig
        {   token
          , inference_base: lookup("HF_INFERENCE_BASE")
              .unwrap_or(defaults.inference.inference_base)
          , chat_url: lookup("HF_CHAT_URL")
              .unwrap_or(defaults.inference.chat_url)
          , chat_model: lookup("HF_CHAT_MODEL")
              .unwrap_or(defaults.inference.chat_model)
          , chat_max_tokens: parse_var(
              &lookup,
              "HF_CHAT_MAX_TOKENS",
              defaults.inference.chat_max_tokens
            )?
          , timeout_secs: parse_var(
              &lookup,
              "HF_REQUEST_TIMEOUT_SECS",
              defaults.inference.timeout_secs
            )?
        };

        let retry = RetryConfig
        {   max_attempts: parse_var(
              &lookup,
              "STATION_MAX_ATTEMPTS",
              defaults.retry.max_attempts
            )?
          , cold_start_delay_ms: parse_var(
              &lookup,
              "STATION_COLD_START_DELAY_MS",
              defaults.retry.cold_start_delay_ms
            )?
          , max_cold_start_delay_ms: parse_var(
              &lookup,
              "STATION_MAX_COLD_START_DELAY_MS",
              defaults.retry.max_cold_start_delay_ms
            )?
          , network_delay_ms: parse_var(
              &lookup,
              "STATION_NETWORK_DELAY_MS",
              defaults.retry.network_delay_ms
            )?
          , ..defaults.retry
        };

        if retry.max_attempts == 0
        {   return Err(Error::InvalidConfiguration(
              "STATION_MAX_ATTEMPTS must be at least 1".to_string()
            ));
        }

        debug!(
          "Loaded config: addr={}, base={}, attempts={}",
          server.addr(), inference.inference_base, retry.max_attempts
        );

        Ok(GatewayConfig
        {   server
          , inference
          , retry
        })
    }
}

fn parse_var<F, T>(lookup: &F, name: &str, default: T)
  -> Result<T, Error>
where
  F: Fn(&str) -> Option<String>
, T: FromStr
{   match lookup(name)
    {   None => Ok(default)
      , Some(raw) => raw.trim().parse::<T>().map_err(|_| {
          Error::InvalidConfiguration(
            format!("{} has an invalid value: {:?}", name, raw)
          )
        })
    }
}
