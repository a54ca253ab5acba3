//! Reimbursement Forms API library
//!
//! Customers, cost centers, users and reimbursement forms behind an axum
//! router backed by SeaORM.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod clock;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod migrator;
pub mod openapi;
pub mod services;
pub mod tracing;

use axum::{extract::DefaultBodyLimit, http::HeaderValue, Router};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
};

use crate::{config::AppConfig, db::DbPool, events::EventSender, handlers::AppServices};

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DbPool>,
    pub config: AppConfig,
    pub services: AppServices,
}

impl AppState {
    pub fn new(
        db: Arc<DbPool>,
        config: AppConfig,
        event_sender: Option<Arc<EventSender>>,
    ) -> Self {
        let services = AppServices::new(db.clone(), &config, event_sender);
        Self {
            db,
            config,
            services,
        }
    }
}

/// All JSON and form endpoints, without middleware
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(handlers::customers::customer_routes())
        .merge(handlers::cost_centers::cost_center_routes())
        .merge(handlers::users::user_routes())
        .merge(handlers::forms::form_routes())
        .merge(handlers::dashboard::dashboard_routes())
        .merge(handlers::health::health_routes())
}

/// CORS from configured origins, falling back to permissive where allowed.
pub fn cors_layer(cfg: &AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = cfg
        .cors_origins()
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();

    if !origins.is_empty() {
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    } else if cfg.should_allow_permissive_cors() {
        ::tracing::info!(
            "Using permissive CORS because explicit origins were not configured ({})",
            if cfg.is_development() {
                "development environment"
            } else {
                "explicit override enabled"
            }
        );
        CorsLayer::permissive()
    } else {
        ::tracing::warn!("No CORS origins configured; cross-origin requests will be refused");
        CorsLayer::new()
    }
}

/// The complete application: API routes, uploaded files, API docs and middleware.
pub fn build_router(state: AppState) -> Router {
    let uploads = ServeDir::new(&state.config.upload_dir);
    let uploads_prefix = state.config.uploads_url_prefix.clone();
    let body_limit = state.config.max_upload_bytes;
    let cors = cors_layer(&state.config);

    Router::new()
        .merge(api_routes())
        .nest_service(&uploads_prefix, uploads)
        .merge(openapi::swagger_ui())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(crate::tracing::configure_http_tracing())
        .layer(cors)
        // Ensure every request carries a request id for traceability
        .layer(axum::middleware::from_fn(crate::tracing::request_id_middleware))
        .with_state(state)
}
