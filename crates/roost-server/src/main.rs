//! Main entry point for the Roost server.

use std::sync::Arc;

use actix_web::web;
use tracing::{error, info, warn};

use roost_persistence::{
    ExternalDbPersistService, MemoryPersistService, PersistenceService, StorageMode,
};
use roost_server::{
    metrics,
    model::{AppState, Configuration},
    service::upload::S3UploadSigner,
    startup::{self, ShutdownSignal},
};

#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let configuration = Configuration::new()?;

    let _logging_guard = startup::init_logging(&configuration.logging_config())?;
    metrics::init_metrics();

    if configuration.token_secret_key().is_empty() {
        return Err("roost.auth.token.secret.key must be set to a base64 secret".into());
    }

    let shutdown_signal = ShutdownSignal::from_os_signals();

    let storage_mode = configuration.storage_mode();
    info!("Persistence mode: {}", storage_mode);

    let persistence: Arc<dyn PersistenceService> = match storage_mode {
        StorageMode::Memory => {
            warn!("Using in-memory storage, data is lost on restart");
            Arc::new(MemoryPersistService::new())
        }
        StorageMode::ExternalDb => {
            let db = configuration.database_connection().await?;
            let service = ExternalDbPersistService::new(db);

            match shutdown_signal.run_until(service.sync_schema()).await {
                Some(result) => result?,
                None => return Ok(()),
            }
            Arc::new(service)
        }
    };

    let upload_signer = Arc::new(S3UploadSigner::from_configuration(&configuration).await);

    let server_address = configuration.server_address();
    let server_port = configuration.server_port();
    let context_path = configuration.server_context_path();
    let shutdown_timeout = configuration.shutdown_timeout();

    let app_state = web::Data::new(AppState::new(configuration, persistence, upload_signer));

    info!(
        "Starting Roost server on {}:{}{}",
        server_address, server_port, context_path
    );
    let server = startup::main_server(
        app_state,
        context_path,
        server_address,
        server_port,
        shutdown_timeout,
    )?;
    let handle = server.handle();
    let mut server_task = actix_web::rt::spawn(server);

    tokio::select! {
        result = &mut server_task => {
            match result {
                Ok(Err(e)) => error!("Main server error: {}", e),
                Err(e) => error!("Main server task failed: {}", e),
                Ok(Ok(())) => {}
            }
        }
        _ = shutdown_signal.triggered() => {
            info!(
                "Main server shutting down, allowing up to {:?} for connections to close",
                shutdown_timeout
            );
            handle.stop(true).await;
        }
    }

    info!("Roost server shutdown complete");
    Ok(())
}
