use std::sync::Arc;
use log::{debug, info};

use crate::catalog::ModelCatalog;
use crate::config::GatewayConfig;
use crate::dispatcher::ImageDispatcher;
use crate::error::Error;
use crate::failover::{FallbackRules, RetryPolicy};
use crate::providers::{HuggingFaceChat, HuggingFaceTransport, InferenceTransport};
use crate::request::{GenerationRequest, ImagePayload, StationInfo};

/// Public API for the station - owns the dispatcher and chat client.
///
/// Holds only read-only state, so one instance is shared by every request.
pub struct Station
{   catalog: Arc<ModelCatalog>
  , dispatcher: ImageDispatcher
  , chat: HuggingFaceChat
  , token_set: bool
}

impl Station
{   /// Build a station talking to the real Hugging Face API
    pub fn new(config: &GatewayConfig) -> Result<Self, Error>
    {   let transport = HuggingFaceTransport::new(
          config.inference.timeout()
        )?;
        Ok(Self::with_transport(
          config,
          ModelCatalog::builtin(),
          Arc::new(transport)
        ))
    }

    /// Build a station over any transport
    pub fn with_transport(
      config: &GatewayConfig
    , catalog: ModelCatalog
    , transport: Arc<dyn InferenceTransport>
    ) -> Self
    {   debug!(
          "Creating Station with {} models, default {}",
          catalog.keys().len(), catalog.default_key()
        );
        let catalog = Arc::new(catalog);
        let dispatcher = ImageDispatcher::new(
          catalog.clone(),
          RetryPolicy::from(&config.retry),
          FallbackRules::from(&config.retry),
          config.inference.inference_base.clone(),
          config.inference.token.clone(),
          transport.clone(),
        );
        let chat = HuggingFaceChat::new(&config.inference, transport);
        Station
        {   catalog
          , dispatcher
          , chat
          , token_set: config.inference.token.is_some()
        }
    }

    /// Generate an image, walking the fallback chain as needed
    pub async fn generate_image(
      &self
    , request: &GenerationRequest
    ) -> Result<ImagePayload, Error>
    {   info!(
          "Image request: model={:?}, prompt_len={}",
          request.model, request.prompt.len()
        );
        self.dispatcher
          .generate(&request.prompt, request.model.as_deref())
          .await
    }

    /// Forward a prompt to the fixed chat model
    pub async fn chat(&self, prompt: &str) -> Result<String, Error>
    {   info!("Chat request: prompt_len={}", prompt.len());
        self.chat.send_prompt(prompt).await
    }

    pub fn info(&self) -> StationInfo
    {   StationInfo
        {   status: "online".to_string()
          , models: self.catalog.keys()
          , token_set: self.token_set
        }
    }
}
