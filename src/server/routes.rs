//! Route definitions

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{chat, generate_image, index, info};
use crate::client::Station;

/// Create the station router
pub fn api_routes() -> Router<Arc<Station>>
{   Router::new()
      .route("/", get(index))
      .route("/api/info", get(info))
      .route("/api/generate-image", get(generate_image))
      .route("/api/chat", post(chat))
}
