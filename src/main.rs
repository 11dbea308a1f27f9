use estate_ledger::{
  prelude::*,
  server,
  state::{AppState, Config},
};
use tracing_subscriber::{
  EnvFilter, layer::SubscriberExt, util::SubscriberInitExt,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  dotenvy::dotenv().ok();

  tracing_subscriber::registry()
    .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
      "estate_ledger=debug,tower_http=debug,sea_orm=warn".into()
    }))
    .with(tracing_subscriber::fmt::layer())
    .init();

  let config = Config::from_env()?;

  info!("Starting estate-ledger v{}", env!("CARGO_PKG_VERSION"));

  let app = Arc::new(AppState::new(config).await?);

  if app.config.seed_defaults {
    app.seed_defaults().await?;
  }

  server::serve(app.clone()).await?;

  tokio::signal::ctrl_c().await?;
  info!("Shutting down");

  Ok(())
}
