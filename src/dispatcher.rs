//! Image request dispatcher
//!
//! Turns a prompt and a model key into PNG bytes by walking the fallback
//! chain (requested, default, last resort) under one shared attempt budget.
//! Cold starts and network failures sleep and retry the same model. Hard
//! failures move down the chain without spending an attempt.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, info, warn};
use serde_json::json;

use crate::catalog::ModelCatalog;
use crate::error::Error;
use crate::failover::{FallbackChain, FallbackRules, RetryPolicy};
use crate::providers::InferenceTransport;
use crate::request::{GenerationOutcome, ImagePayload};

pub const BUSY_MESSAGE: &str
  = "Server busy: no response from the inference API, please try again later";

pub struct ImageDispatcher
{   catalog: Arc<ModelCatalog>
  , policy: RetryPolicy
  , rules: FallbackRules
  , inference_base: String
  , token: Option<String>
  , transport: Arc<dyn InferenceTransport>
}

impl ImageDispatcher
{   pub fn new(
      catalog: Arc<ModelCatalog>
    , policy: RetryPolicy
    , rules: FallbackRules
    , inference_base: String
    , token: Option<String>
    , transport: Arc<dyn InferenceTransport>
    ) -> Self
    {   ImageDispatcher
        {   catalog
          , policy
          , rules
          , inference_base
          , token
          , transport
        }
    }

    /// Endpoint for a model identifier
    pub fn endpoint_for(&self, model_id: &str) -> String
    {   format!("{}/{}", self.inference_base.trim_end_matches('/'), model_id)
    }

    pub async fn generate(
      &self
    , prompt: &str
    , model_key: Option<&str>
    ) -> Result<ImagePayload, Error>
    {   let token = self.token.as_deref().ok_or_else(|| {
          error!("Image requested without HF token");
          Error::MissingApiKey("HF Token".to_string())
        })?;

        if prompt.trim().is_empty()
        {   return Err(Error::InvalidRequest(
              "prompt must not be empty".to_string()
            ));
        }

        let mut chain = FallbackChain::new(
          self.catalog.candidates_for(model_key)
        );
        let payload = json!({ "inputs": prompt });
        let max_attempts = self.policy.max_attempts.max(1);
        let mut last_reply: Option<(u16, String)> = None;
        let mut attempt = 1;

        while attempt <= max_attempts
        {   let model_id = match chain.current()
            {   Some(id) => id.to_string()
              , None => break
            };
            let url = self.endpoint_for(&model_id);
            let final_attempt = attempt == max_attempts;
            info!(
              "Attempt {}/{}: requesting image from {}",
              attempt, max_attempts, model_id
            );

            let delay: Duration = match self.transport
              .post_json(&url, token, &payload)
              .await
            {   Ok(reply) => match reply.outcome(&self.rules)
                {   GenerationOutcome::Success(bytes) => {
                      info!(
                        "Image generated by {} ({} bytes)",
                        model_id, bytes.len()
                      );
                      return Ok(ImagePayload::png(bytes, model_id));
                    }
                  , GenerationOutcome::TerminalFailure { status, message } => {
                      if chain.should_fall_back(&self.rules, status)
                      {   warn!(
                            "{} returned {}, falling back",
                            model_id, status
                          );
                          last_reply = Some((status, message));
                          chain.advance();
                          continue;
                        }
                      error!("{} rejected request with {}: {}", model_id, status, message);
                      return Err(Error::UpstreamRejected { status, message });
                    }
                  , GenerationOutcome::TransientFailure {
                      status, reason, cold_start, estimated_time_ms
                    } => {
                      warn!(
                        "{} returned {:?} (cold start: {}): {}",
                        model_id, status, cold_start, reason
                      );
                      if let Some(status) = status
                      {   last_reply = Some((status, reason));
                      }
                      if cold_start
                      {   self.policy.cold_start_delay(
                            estimated_time_ms.map(|ms| ms as f64 / 1000.0)
                          )
                      } else
                      {   self.policy.network_delay()
                      }
                    }
                }
              , Err(e) if e.is_network() => {
                  warn!("Network failure calling {}: {}", model_id, e);
                  self.policy.network_delay()
                }
              , Err(e) => {
                  if final_attempt
                  {   error!("Unexpected failure on final attempt: {}", e);
                      return Err(e);
                  }
                  warn!("Unexpected failure calling {}: {}", model_id, e);
                  self.policy.network_delay()
                }
            };

            if !final_attempt
            {   debug!("Sleeping {:?} before retrying {}", delay, model_id);
                tokio::time::sleep(delay).await;
            }
            attempt += 1;
        }

        error!("Attempt budget exhausted for prompt");
        Err(match last_reply
        {   Some((status, message)) => Error::Exhausted
            {   last_status: Some(status)
              , message
            }
          , None => Error::Exhausted
            {   last_status: None
              , message: BUSY_MESSAGE.to_string()
            }
        })
    }
}
