//! HTTP server for the curricular advancement engine.
//!
//! Mounts the JSON API from `curricula-api` under `/api` together with a
//! health probe, and defines the runtime configuration read by the binary.

use std::{path::PathBuf, sync::Arc};

use axum::{Router, routing::get};
use curricula_core::store::PlanStore;
use curricula_service::{PlanService, SyncPolicy};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `CURRICULA_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:        String,
  #[serde(default = "default_port")]
  pub port:        u16,
  #[serde(default = "default_store_path")]
  pub store_path:  PathBuf,
  #[serde(default)]
  pub sync_policy: SyncPolicy,
}

fn default_host() -> String { "127.0.0.1".to_string() }

fn default_port() -> u16 { 8080 }

fn default_store_path() -> PathBuf { PathBuf::from("curricula.db") }

impl ServerConfig {
  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

// ─── Router ───────────────────────────────────────────────────────────────────

pub fn router<S>(service: Arc<PlanService<S>>) -> Router
where
  S: PlanStore + 'static,
{
  Router::new()
    .route("/health", get(|| async { "ok" }))
    .nest("/api", curricula_api::api_router(service))
    .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, StatusCode},
  };
  use curricula_store_sqlite::SqliteStore;
  use tower::ServiceExt as _;

  async fn make_router() -> Router {
    let store = SqliteStore::open_in_memory().await.unwrap();
    router(Arc::new(PlanService::new(store, SyncPolicy::Eventual)))
  }

  async fn get_status(uri: &str) -> StatusCode {
    let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
    make_router().await.oneshot(req).await.unwrap().status()
  }

  #[tokio::test]
  async fn health_returns_ok() {
    assert_eq!(get_status("/health").await, StatusCode::OK);
  }

  #[tokio::test]
  async fn api_is_nested_under_prefix() {
    let student = "6f1c2a9e-3b4d-4e5f-8a7b-1c2d3e4f5a6b";
    assert_eq!(get_status(&format!("/api/students/{student}/plan")).await, StatusCode::OK);
    assert_eq!(get_status(&format!("/students/{student}/plan")).await, StatusCode::NOT_FOUND);
  }

  #[test]
  fn config_defaults_fill_missing_keys() {
    let cfg: ServerConfig = config::Config::builder()
      .set_override("port", 9000)
      .unwrap()
      .set_override("sync_policy", "strict")
      .unwrap()
      .build()
      .unwrap()
      .try_deserialize()
      .unwrap();

    assert_eq!(cfg.address(), "127.0.0.1:9000");
    assert_eq!(cfg.store_path, PathBuf::from("curricula.db"));
    assert_eq!(cfg.sync_policy, SyncPolicy::Strict);
  }
}
