mod handlers;

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::{Router, routing::get};
use tower::ServiceBuilder;
use tower_governor::{GovernorLayer, governor::GovernorConfigBuilder};
use tower_http::{
  cors::{Any, CorsLayer},
  trace::TraceLayer,
};

use crate::{prelude::*, state::AppState};

/// Bind the liveness endpoint and serve it in the background.
pub async fn serve(app: Arc<AppState>) -> anyhow::Result<()> {
  let governor_conf = Arc::new(
    GovernorConfigBuilder::default()
      .per_second(2)
      .burst_size(100)
      .finish()
      .context("Failed to build rate limiter config")?,
  );

  let governor_limiter = governor_conf.limiter().clone();

  tokio::spawn(async move {
    loop {
      tokio::time::sleep(Duration::from_secs(60)).await;
      governor_limiter.retain_recent();
    }
  });

  let addr = SocketAddr::from(([0, 0, 0, 0], app.config.port));

  let router = Router::new()
    .route("/health", get(handlers::health))
    .layer(
      ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(GovernorLayer::new(governor_conf))
        .layer(
          CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
        ),
    )
    .with_state(app)
    .into_make_service_with_connect_info::<SocketAddr>();

  let listener = tokio::net::TcpListener::bind(addr)
    .await
    .with_context(|| format!("Failed to bind {addr}"))?;

  info!("HTTP server listening on {addr}");

  tokio::spawn(async move {
    if let Err(err) = axum::serve(listener, router).await {
      error!("HTTP server stopped: {err}");
    }
  });

  Ok(())
}
