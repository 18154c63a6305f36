//! HTTP handlers and route wiring

mod account;
mod auth;
mod devices;

pub use account::current_account;
pub use auth::{login, logout, refresh};
pub use devices::{list_devices, logout_all_devices, logout_device};

use actix_web::{web, HttpResponse};

use crate::models::HealthResponse;

/// Health check endpoint
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok".to_string(),
        message: "Service is running".to_string(),
    })
}

/// Wire every route onto an actix app. Shared between `main` and the
/// integration tests.
pub fn configure_services(cfg: &mut web::ServiceConfig) {
    cfg
        // Credential lifecycle endpoints
        .route("/api/login", web::post().to(login))
        .route("/api/refresh", web::post().to(refresh))
        .route("/api/logout", web::post().to(logout))
        // Device management endpoints
        .route("/api/devices", web::get().to(list_devices))
        .route("/api/devices/logout", web::post().to(logout_device))
        .route("/api/devices/logout_all", web::post().to(logout_all_devices))
        // Account endpoint
        .route("/api/account", web::get().to(current_account))
        // Health endpoint
        .route("/ping", web::get().to(health));
}
