use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;

use crate::{prelude::*, state::AppState};

#[derive(Debug, Serialize)]
pub struct Health {
  ok: bool,
  version: &'static str,
  msg: Option<String>,
}

pub async fn health(
  State(app): State<Arc<AppState>>,
) -> (StatusCode, Json<Health>) {
  let version = env!("CARGO_PKG_VERSION");

  match app.ping().await {
    Ok(()) => (StatusCode::OK, Json(Health { ok: true, version, msg: None })),
    Err(err) => {
      warn!("Health check failed: {err}");
      let status = if err.is_transient() {
        StatusCode::SERVICE_UNAVAILABLE
      } else {
        StatusCode::INTERNAL_SERVER_ERROR
      };
      (status, Json(Health { ok: false, version, msg: Some(err.user_message()) }))
    }
  }
}
