//! aistation - a small gateway in front of the Hugging Face inference API.
//!
//! Serves a test page, a chat passthrough and an image endpoint that retries
//! cold starts and falls back across a fixed chain of image models.

pub mod error;
pub mod config;
pub mod catalog;
pub mod providers;
pub mod request;
pub mod failover;
pub mod dispatcher;
pub mod client;
pub mod server;

pub use catalog::ModelCatalog;
pub use client::Station;
pub use config::GatewayConfig;
pub use dispatcher::ImageDispatcher;
pub use error::Error;
pub use request::{GenerationRequest, ImagePayload, StationInfo};
