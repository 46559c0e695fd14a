// storefront_app/src/main.rs

use actix_web::{web as actix_data, App, HttpServer};
use std::sync::Arc;
use tracing_subscriber::fmt::format::FmtSpan; // For span events in tracing
use tracing_subscriber::EnvFilter;

use storefront_app::db::seed_catalog;
use storefront_app::web::configure_app_routes;
use storefront_app::{build_catalog, AppConfig, AppState, LogFormat};

fn init_tracing(format: LogFormat) {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")); // RUST_LOG overrides
  let builder = tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_span_events(FmtSpan::CLOSE); // Log when spans close, showing duration
  match format {
    LogFormat::Json => builder.json().init(),
    LogFormat::Pretty => builder.init(),
  }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
  let app_config = match AppConfig::from_env() {
    Ok(cfg) => Arc::new(cfg),
    Err(e) => {
      init_tracing(LogFormat::default());
      tracing::error!(error = %e, "Failed to load application configuration.");
      return Err(std::io::Error::other(e));
    }
  };
  init_tracing(app_config.log_format);
  tracing::info!("Starting storefront catalog server...");

  let catalog = build_catalog(&app_config).await.map_err(|e| {
    tracing::error!(error = %e, "Failed to initialize the record store.");
    std::io::Error::other(e)
  })?;

  if app_config.seed_db {
    match seed_catalog(&catalog).await {
      Ok(created) => tracing::info!(created, "Database seeding finished."),
      Err(e) => tracing::error!(error = %e, "Failed to seed database."),
    }
  }

  let app_state = AppState::new(catalog, app_config.clone());

  let server_address = app_config.server_address();
  tracing::info!("Attempting to bind server to {}...", server_address);

  HttpServer::new(move || {
    App::new()
      .app_data(actix_data::Data::new(app_state.clone())) // Share AppState with handlers
      .wrap(tracing_actix_web::TracingLogger::default()) // Actix middleware for tracing requests
      .configure(configure_app_routes)
  })
  .bind(&server_address)?
  .run()
  .await
}
