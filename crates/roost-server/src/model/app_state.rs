//! Application state management
//!
//! This module defines the central application state shared across all handlers.

use std::sync::Arc;

use roost_persistence::PersistenceService;

use crate::service::{booking::BookingService, upload::UploadSigner};

use super::config::Configuration;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub configuration: Configuration,
    /// Unified persistence service (SQL or in-memory)
    pub persistence: Arc<dyn PersistenceService>,
    pub booking_service: Arc<BookingService>,
    /// Presigns client-side image uploads
    pub upload_signer: Arc<dyn UploadSigner>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("configuration", &self.configuration)
            .field("persistence", &self.persistence.storage_mode())
            .field("booking_service", &"<BookingService>")
            .field("upload_signer", &"<dyn UploadSigner>")
            .finish()
    }
}

impl AppState {
    pub fn new(
        configuration: Configuration,
        persistence: Arc<dyn PersistenceService>,
        upload_signer: Arc<dyn UploadSigner>,
    ) -> Self {
        let booking_service = Arc::new(BookingService::new(persistence.clone()));
        Self {
            configuration,
            persistence,
            booking_service,
            upload_signer,
        }
    }

    pub fn persistence(&self) -> &dyn PersistenceService {
        self.persistence.as_ref()
    }
}
