//! # Newsletter Server
//!
//! The main entry point for the Actix-web HTTP server.

use actix_web::middleware::from_fn;
use actix_web::{App, HttpServer, web};
use tracing_actix_web::TracingLogger;

use newsletter_server::config::AppConfig;
use newsletter_server::handlers;
use newsletter_server::observability::request_id_middleware;
use newsletter_server::state::AppState;
use newsletter_server::telemetry::{TelemetryConfig, init_telemetry};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    init_telemetry(&TelemetryConfig::from_env());

    let config = AppConfig::from_env();

    tracing::info!(
        "Starting Newsletter Server on {}:{}",
        config.host,
        config.port
    );

    let state = AppState::new(&config).await;

    if let Some(admin) = &config.admin {
        state.bootstrap_admin(admin).await?;
    }

    HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .wrap(from_fn(request_id_middleware))
            .app_data(web::Data::new(state.clone()))
            .configure(handlers::configure_routes)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await?;

    Ok(())
}
