//! HTTP server setup.

use std::time::Duration;

use actix_web::{
    App, HttpServer,
    dev::Server,
    middleware::{Compress, Logger},
    web,
};

use crate::{
    api::v1::route::routes,
    middleware::{auth::Authentication, metrics::RequestMetrics},
    model::AppState,
};

/// Mount the V1 API under `context_path`.
///
/// Shared by [`main_server`] and the integration tests; the caller wraps the
/// `Authentication` middleware around the app.
pub fn configure_app(cfg: &mut web::ServiceConfig, context_path: &str) {
    cfg.service(web::scope(context_path).configure(routes));
}

/// Creates and binds the main HTTP server.
///
/// Signal handling is left to the caller, which stops the server through
/// its handle on shutdown.
pub fn main_server(
    app_state: web::Data<AppState>,
    context_path: String,
    address: String,
    port: u16,
    shutdown_timeout: Duration,
) -> Result<Server, std::io::Error> {
    Ok(HttpServer::new(move || {
        let context_path = context_path.clone();
        App::new()
            .wrap(Authentication)
            .wrap(RequestMetrics)
            .wrap(Compress::default())
            .wrap(Logger::default())
            .app_data(app_state.clone())
            .configure(move |cfg| configure_app(cfg, &context_path))
    })
    .shutdown_timeout(shutdown_timeout.as_secs())
    .disable_signals()
    .bind((address, port))?
    .run())
}
