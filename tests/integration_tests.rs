use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use aistation::{GatewayConfig, Station};

const FLUX: &str = "black-forest-labs/FLUX.1-schnell";
const SD35: &str = "stabilityai/stable-diffusion-3.5-large";
const V15: &str = "stable-diffusion-v1-5/stable-diffusion-v1-5";
const PNG: &[u8] = b"\x89PNG\r\n\x1a\nfake-image-bytes";

/// Fake inference API: fixed reply per model, records every hit
#[derive(Default)]
struct FakeUpstream
{   models: HashMap<String, (u16, Vec<u8>)>
  , chat: Option<(u16, Value)>
  , hits: Mutex<Vec<String>>
  , bodies: Mutex<Vec<Value>>
  , auth: Mutex<Vec<String>>
}

impl FakeUpstream
{   fn model(mut self, id: &str, status: u16, body: &[u8]) -> Self
    {   self.models.insert(id.to_string(), (status, body.to_vec()));
        self
    }

    fn chat(mut self, status: u16, body: Value) -> Self
    {   self.chat = Some((status, body));
        self
    }

    fn hits(&self) -> Vec<String>
    {   self.hits.lock().unwrap().clone()
    }

    fn record(&self, hit: String, headers: &HeaderMap, body: Value)
    {   self.hits.lock().unwrap().push(hit);
        self.bodies.lock().unwrap().push(body);
        let auth = headers
          .get("authorization")
          .and_then(|v| v.to_str().ok())
          .unwrap_or_default()
          .to_string();
        self.auth.lock().unwrap().push(auth);
    }
}

async fn fake_model(
  State(up): State<Arc<FakeUpstream>>
, Path(model): Path<String>
, headers: HeaderMap
, Json(body): Json<Value>
) -> Response
{   let model = model.trim_start_matches('/').to_string();
    up.record(model.clone(), &headers, body);
    match up.models.get(&model)
    {   Some((status, bytes)) => (
          StatusCode::from_u16(*status).unwrap(),
          bytes.clone()
        ).into_response()
      , None => (StatusCode::NOT_FOUND, "Not Found").into_response()
    }
}

async fn fake_chat(
  State(up): State<Arc<FakeUpstream>>
, headers: HeaderMap
, Json(body): Json<Value>
) -> Response
{   up.record("chat".to_string(), &headers, body);
    match &up.chat
    {   Some((status, reply)) => (
          StatusCode::from_u16(*status).unwrap(),
          Json(reply.clone())
        ).into_response()
      , None => StatusCode::NOT_FOUND.into_response()
    }
}

async fn spawn_upstream(up: Arc<FakeUpstream>) -> SocketAddr
{   let app = Router::new()
      .route("/models/{*model}", post(fake_model))
      .route("/v1/chat/completions", post(fake_chat))
      .with_state(up);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
      axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn test_config(upstream: SocketAddr, token: Option<&str>) -> GatewayConfig
{   let mut config = GatewayConfig::default();
    config.inference.token = token.map(str::to_string);
    config.inference.inference_base = format!("http://{}/models", upstream);
    config.inference.chat_url
      = format!("http://{}/v1/chat/completions", upstream);
    config.inference.timeout_secs = 5;
    config.retry.cold_start_delay_ms = 20;
    config.retry.max_cold_start_delay_ms = 50;
    config.retry.network_delay_ms = 20;
    config
}

async fn spawn_station(config: GatewayConfig) -> String
{   let station = Arc::new(Station::new(&config).unwrap());
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
      aistation::server::serve(listener, station).await.unwrap();
    });
    format!("http://{}", addr)
}

async fn setup(up: FakeUpstream, token: Option<&str>)
  -> (String, Arc<FakeUpstream>)
{   let up = Arc::new(up);
    let upstream = spawn_upstream(up.clone()).await;
    let gateway = spawn_station(test_config(upstream, token)).await;
    (gateway, up)
}

#[tokio::test]
async fn test_info_lists_models()
{   let (gateway, _up) = setup(FakeUpstream::default(), Some("hf_test")).await;
    let info: Value = reqwest::get(format!("{}/api/info", gateway))
      .await.unwrap()
      .json().await.unwrap();
    assert_eq!(
      info,
      json!({
        "status": "online",
        "models": ["flux", "sd3.5", "sdxl", "v1-5"],
        "token_set": true
      })
    );
}

#[tokio::test]
async fn test_info_reports_missing_token()
{   let (gateway, _up) = setup(FakeUpstream::default(), None).await;
    let info: Value = reqwest::get(format!("{}/api/info", gateway))
      .await.unwrap()
      .json().await.unwrap();
    assert_eq!(info["token_set"], json!(false));
}

#[tokio::test]
async fn test_index_page()
{   let (gateway, _up) = setup(FakeUpstream::default(), Some("hf_test")).await;
    let response = reqwest::get(format!("{}/", gateway)).await.unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let content_type = response.headers()["content-type"]
      .to_str().unwrap().to_string();
    assert!(content_type.starts_with("text/html"));
    assert!(response.text().await.unwrap().contains("/api/generate-image"));
}

#[tokio::test]
async fn test_generate_image_passes_bytes_through()
{   let (gateway, up) = setup(
      FakeUpstream::default().model(V15, 200, PNG),
      Some("hf_test")
    ).await;

    let response = reqwest::get(format!(
      "{}/api/generate-image?prompt=A%20cat&model=v1-5", gateway
    )).await.unwrap();

    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(response.headers()["content-type"], "image/png");
    assert_eq!(response.bytes().await.unwrap().as_ref(), PNG);
    assert_eq!(up.hits(), vec![V15.to_string()]);
    assert_eq!(up.bodies.lock().unwrap()[0], json!({ "inputs": "A cat" }));
    assert_eq!(up.auth.lock().unwrap()[0], "Bearer hf_test");
}

#[tokio::test]
async fn test_generate_image_falls_back_to_default()
{   let fallback = b"\x89PNGfrom-default";
    let (gateway, up) = setup(
      FakeUpstream::default()
        .model(SD35, 404, b"Not Found")
        .model(FLUX, 200, fallback),
      Some("hf_test")
    ).await;

    let response = reqwest::get(format!(
      "{}/api/generate-image?prompt=A%20cat&model=sd3.5", gateway
    )).await.unwrap();

    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(response.bytes().await.unwrap().as_ref(), fallback);
    assert_eq!(up.hits(), vec![SD35.to_string(), FLUX.to_string()]);
}

#[tokio::test]
async fn test_generate_image_surfaces_rejection_status()
{   let (gateway, up) = setup(
      FakeUpstream::default().model(FLUX, 402, b"Payment Required"),
      Some("hf_test")
    ).await;

    let response = reqwest::get(format!(
      "{}/api/generate-image?prompt=A%20cat", gateway
    )).await.unwrap();

    assert_eq!(response.status().as_u16(), 402);
    assert!(response.text().await.unwrap().contains("Payment Required"));
    assert_eq!(up.hits().len(), 1);
}

#[tokio::test]
async fn test_generate_image_without_token()
{   let (gateway, up) = setup(
      FakeUpstream::default().model(FLUX, 200, PNG),
      None
    ).await;

    let response = reqwest::get(format!(
      "{}/api/generate-image?prompt=A%20cat", gateway
    )).await.unwrap();

    assert_eq!(response.status().as_u16(), 500);
    assert!(response.text().await.unwrap().contains("Missing HF Token"));
    assert!(up.hits().is_empty());
}

#[tokio::test]
async fn test_generate_image_exhausts_on_cold_start()
{   let (gateway, up) = setup(
      FakeUpstream::default()
        .model(FLUX, 503, br#"{"error":"loading","estimated_time":0.01}"#),
      Some("hf_test")
    ).await;

    let response = reqwest::get(format!(
      "{}/api/generate-image?prompt=A%20cat", gateway
    )).await.unwrap();

    assert_eq!(response.status().as_u16(), 503);
    assert!(response.text().await.unwrap().contains("last status 503"));
    assert_eq!(up.hits(), vec![FLUX.to_string(); 3]);
}

#[tokio::test]
async fn test_generate_image_unreachable_upstream_is_busy()
{   let closed = {
      let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
      listener.local_addr().unwrap()
    };
    let gateway = spawn_station(test_config(closed, Some("hf_test"))).await;

    let response = reqwest::get(format!(
      "{}/api/generate-image?prompt=A%20cat", gateway
    )).await.unwrap();

    assert_eq!(response.status().as_u16(), 503);
    assert!(response.text().await.unwrap().contains("Server busy"));
}

#[tokio::test]
async fn test_generate_image_requires_prompt()
{   let (gateway, up) = setup(FakeUpstream::default(), Some("hf_test")).await;
    let response = reqwest::get(format!("{}/api/generate-image", gateway))
      .await.unwrap();
    assert_eq!(response.status().as_u16(), 400);
    assert!(up.hits().is_empty());
}

#[tokio::test]
async fn test_chat_returns_result()
{   let (gateway, up) = setup(
      FakeUpstream::default().chat(200, json!({
        "choices": [{
          "message": { "role": "assistant", "content": "Hello there" },
          "finish_reason": "stop"
        }]
      })),
      Some("hf_test")
    ).await;

    let response = reqwest::Client::new()
      .post(format!("{}/api/chat?prompt=Hi", gateway))
      .send().await.unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "result": "Hello there" }));

    let sent = up.bodies.lock().unwrap()[0].clone();
    assert_eq!(sent["model"], json!("HuggingFaceH4/zephyr-7b-beta"));
    assert_eq!(sent["max_tokens"], json!(500));
    assert_eq!(sent["messages"][0]["content"], json!("Hi"));
}

#[tokio::test]
async fn test_chat_upstream_failure_is_503()
{   let (gateway, up) = setup(
      FakeUpstream::default().chat(500, json!({ "error": "boom" })),
      Some("hf_test")
    ).await;

    let response = reqwest::Client::new()
      .post(format!("{}/api/chat?prompt=Hi", gateway))
      .send().await.unwrap();
    assert_eq!(response.status().as_u16(), 503);
    assert!(response.text().await.unwrap().contains("boom"));
    assert_eq!(up.hits().len(), 1);
}

#[tokio::test]
async fn test_chat_without_token()
{   let (gateway, up) = setup(FakeUpstream::default(), None).await;
    let response = reqwest::Client::new()
      .post(format!("{}/api/chat?prompt=Hi", gateway))
      .send().await.unwrap();
    assert_eq!(response.status().as_u16(), 500);
    assert!(up.hits().is_empty());
}

#[tokio::test]
async fn test_cors_allows_any_origin()
{   let (gateway, _up) = setup(FakeUpstream::default(), Some("hf_test")).await;
    let response = reqwest::Client::new()
      .get(format!("{}/api/info", gateway))
      .header("Origin", "https://apk.example")
      .send().await.unwrap();
    assert_eq!(
      response.headers()["access-control-allow-origin"],
      "*"
    );
}
