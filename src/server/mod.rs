//! HTTP server for the station
//!
//! Exposes the test page, `/api/info`, `/api/generate-image` and `/api/chat`.

mod handlers;
mod page;
mod routes;

use std::sync::Arc;

use axum::Router;
use log::info;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

use crate::client::Station;
use crate::config::GatewayConfig;
use crate::error::Error;

pub use page::INDEX_HTML;
pub use routes::api_routes;

/// Router with CORS open to any origin, method and header
pub fn build_router(station: Arc<Station>) -> Router
{   let cors = CorsLayer::new()
      .allow_origin(Any)
      .allow_methods(Any)
      .allow_headers(Any);

    Router::new()
      .merge(api_routes())
      .layer(cors)
      .with_state(station)
}

/// Serve `station` on an already bound listener
pub async fn serve(listener: TcpListener, station: Arc<Station>)
  -> Result<(), Error>
{   let app = build_router(station);
    axum::serve(listener, app)
      .await
      .map_err(|e| Error::Other(format!("server error: {}", e)))
}

/// Bind the configured address and serve until the process exits
pub async fn start(config: GatewayConfig) -> Result<(), Error>
{   let station = Arc::new(Station::new(&config)?);

    let addr = config.server.addr();
    let listener = TcpListener::bind(&addr).await.map_err(|e| {
      Error::InvalidConfiguration(format!("cannot bind {}: {}", addr, e))
    })?;

    info!("Server listening on http://{}", addr);
    info!("API endpoints:");
    info!("  GET  / - Test page");
    info!("  GET  /api/info - Station status");
    info!("  GET  /api/generate-image?prompt=&model= - Image generation");
    info!("  POST /api/chat?prompt= - Chat completion");

    serve(listener, station).await
}
