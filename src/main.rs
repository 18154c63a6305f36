#![warn(clippy::pedantic)]
#![warn(clippy::cargo)]
#![deny(warnings)]
#![allow(clippy::multiple_crate_versions)]

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use chrono::Duration;
use grantrs::{
    handlers::configure_services, CredentialCodec, GrantrsSettings, SessionManager, SqliteStore,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load configuration from Settings.toml and environment variables
    let settings = GrantrsSettings::load()
        .map_err(|e| std::io::Error::other(format!("Failed to load settings: {e}")))?;
    settings.init_logging();

    // A misconfigured signing key is fatal here, before any request is taken
    let codec = CredentialCodec::new(&settings.credentials.signing_secret)
        .map_err(|e| std::io::Error::other(format!("Failed to initialize codec: {e}")))?;

    let store = SqliteStore::open(&settings.database.path)
        .map_err(|e| std::io::Error::other(format!("Failed to open session store: {e}")))?;

    let session_manager = SessionManager::new(
        codec,
        Arc::new(store),
        Duration::hours(settings.credentials.access_ttl_hours),
        Duration::hours(settings.credentials.refresh_ttl_hours),
    );

    start_server(session_manager, settings).await
}

/// Start the server
///
/// # Errors
///
/// Returns an error if:
/// - Server binding fails
/// - Server fails to start
async fn start_server(
    session_manager: SessionManager,
    settings: GrantrsSettings,
) -> std::io::Result<()> {
    let bind_address = settings.get_bind_address();
    print_startup_info(&bind_address, &settings);

    // Configure CORS for the web client
    let cors_origins = settings.get_cors_origins();

    HttpServer::new(move || {
        let cors_origins = cors_origins.clone();
        let cors = Cors::default()
            .allowed_origin_fn(move |origin, _| {
                cors_origins
                    .iter()
                    .any(|allowed| allowed == origin.to_str().unwrap_or(""))
            })
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec!["Authorization", "Content-Type", "Accept"])
            .supports_credentials()
            .max_age(3600);

        App::new()
            .app_data(web::Data::new(session_manager.clone()))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(configure_services)
    })
    .bind(&bind_address)?
    .run()
    .await
}

fn print_startup_info(bind_address: &str, settings: &GrantrsSettings) {
    println!("Starting grantrs session service on http://{bind_address}");
    println!("Session store: {}", settings.database.path);
    println!();
    println!("Credential endpoints:");
    println!("  POST /api/login              - Issue an access/refresh pair");
    println!("  POST /api/refresh            - Mint a new access token");
    println!("  POST /api/logout             - Revoke the calling session");
    println!();
    println!("Device endpoints:");
    println!("  GET  /api/devices            - List active devices");
    println!("  POST /api/devices/logout     - Revoke one device's credentials");
    println!("  POST /api/devices/logout_all - Revoke every device's credentials");
    println!();
    println!("System endpoints:");
    println!("  GET  /api/account            - Current account");
    println!("  GET  /ping                   - Health check");
}
