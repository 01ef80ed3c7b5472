mod api;
mod config;
mod database;
mod middleware;
mod models;
mod services;
mod state;
mod utils;

#[cfg(test)]
mod test_support;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use std::io;
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::AppConfig;
use crate::database::{InMemoryStore, MongoDB, SurveyStore};
use crate::services::{GotenbergRenderer, LogMailer, Mailer, OpenAiClient, SendGridMailer};
use crate::state::AppState;

fn startup_error(context: &str, e: impl std::fmt::Display) -> io::Error {
    log::error!("❌ {}: {}", context, e);
    io::Error::new(io::ErrorKind::Other, format!("{}: {}", context, e))
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = AppConfig::from_env().map_err(|e| startup_error("Invalid configuration", e))?;

    log::info!("🚀 Starting Insight Service...");

    let store: Arc<dyn SurveyStore> = if config.uses_memory_store() {
        log::warn!("⚠️  Using the in-memory store; data is lost on restart");
        Arc::new(InMemoryStore::new())
    } else {
        let db = MongoDB::new(&config.database_url)
            .await
            .map_err(|e| startup_error("Failed to connect to MongoDB", e))?;
        log::info!("✅ MongoDB connected successfully");
        Arc::new(db)
    };

    let generator = OpenAiClient::new(
        &config.openai_base_url,
        &config.openai_api_key,
        &config.openai_model,
        config.generation_timeout,
    )
    .map_err(|e| startup_error("Failed to build text generator", e))?;
    log::info!("🤖 Text generator: {} ({})", config.openai_base_url, config.openai_model);

    let mailer: Arc<dyn Mailer> = match &config.sendgrid_api_key {
        Some(key) => {
            log::info!("📧 Mail delivery via SendGrid from {}", config.from_email);
            Arc::new(
                SendGridMailer::new(key, &config.from_email)
                    .map_err(|e| startup_error("Failed to build mailer", e))?,
            )
        }
        None => {
            log::warn!("⚠️  SENDGRID_API_KEY not set; emails are logged, not sent");
            Arc::new(LogMailer)
        }
    };

    let renderer = GotenbergRenderer::new(&config.pdf_renderer_url)
        .map_err(|e| startup_error("Failed to build PDF renderer", e))?;

    let state = web::Data::new(AppState::new(
        store,
        Arc::new(generator),
        mailer,
        Arc::new(renderer),
        config.generation_timeout,
        &config.base_url,
    ));

    let host = config.host.clone();
    let port = config.port;
    let cors_origins = config.cors_origins.clone();

    log::info!("🌐 Server starting on {}:{}", host, port);
    log::info!("📚 Swagger UI available at: http://{}:{}/swagger-ui/", host, port);
    log::info!("📄 OpenAPI spec at: http://{}:{}/api-docs/openapi.json", host, port);

    HttpServer::new(move || {
        let cors = cors_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
            .allowed_methods(vec!["GET", "POST", "PUT", "OPTIONS"])
            .allowed_headers(vec![
                actix_web::http::header::CONTENT_TYPE,
                actix_web::http::header::ACCEPT,
            ])
            .expose_headers(vec![
                actix_web::http::header::CONTENT_TYPE,
                actix_web::http::header::CONTENT_DISPOSITION,
            ])
            .max_age(3600);

        let openapi = api::swagger::ApiDoc::openapi();

        App::new()
            .app_data(state.clone())
            .wrap(cors)
            .wrap(middleware::SecurityHeaders)
            // Route pattern instead of path: respondent URLs carry the token.
            .wrap(
                Logger::new("%a \"%{route}xi\" %s %b %T")
                    .custom_request_replace("route", |req| {
                        format!(
                            "{} {}",
                            req.method(),
                            req.match_pattern().unwrap_or_else(|| "-".to_string())
                        )
                    }),
            )
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", openapi.clone())
            )
            // Health check
            .route("/health", web::get().to(api::health::health_check))
            // Metrics
            .route("/metrics", web::get().to(api::metrics::get_metrics))
            .configure(api::configure)
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
