//! HTTP request handlers

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use log::error;

use super::page::INDEX_HTML;
use crate::client::Station;
use crate::error::Error;
use crate::request::{ChatReply, ChatRequest, GenerationRequest, StationInfo};

impl IntoResponse for Error
{   fn into_response(self) -> Response
    {   let status = StatusCode::from_u16(self.status_code())
          .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, self.to_string()).into_response()
    }
}

/// Test page
pub async fn index() -> Html<&'static str>
{   Html(INDEX_HTML)
}

/// Station status and model keys
pub async fn info(State(station): State<Arc<Station>>) -> Json<StationInfo>
{   Json(station.info())
}

/// Image generation; answers with raw PNG bytes
pub async fn generate_image(
  State(station): State<Arc<Station>>
, Query(request): Query<GenerationRequest>
) -> Response
{   match station.generate_image(&request).await
    {   Ok(image) => (
          [(header::CONTENT_TYPE, image.media_type)],
          image.bytes
        ).into_response()
      , Err(e) => {
          error!("Image generation failed: {}", e);
          e.into_response()
        }
    }
}

/// Chat passthrough; every upstream failure is a 503
pub async fn chat(
  State(station): State<Arc<Station>>
, Query(request): Query<ChatRequest>
) -> Response
{   match station.chat(&request.prompt).await
    {   Ok(result) => Json(ChatReply { result }).into_response()
      , Err(e @ Error::MissingApiKey(_)) => e.into_response()
      , Err(e) => {
          error!("Chat failed: {}", e);
          (StatusCode::SERVICE_UNAVAILABLE, e.to_string()).into_response()
        }
    }
}
