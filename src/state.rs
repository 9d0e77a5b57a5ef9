use std::sync::Arc;
use tokio::sync::watch;

use crate::application::services::PublicationService;

#[derive(Clone)]
pub struct AppState {
    pub publication_service: Arc<PublicationService>,
    /// Flips to `true` when the server starts shutting down, ending open
    /// event streams so graceful shutdown can complete.
    pub shutdown: watch::Receiver<bool>,
}

impl AppState {
    pub fn new(publication_service: Arc<PublicationService>) -> Self {
        let (_, shutdown) = watch::channel(false);
        Self {
            publication_service,
            shutdown,
        }
    }

    pub fn with_shutdown(mut self, shutdown: watch::Receiver<bool>) -> Self {
        self.shutdown = shutdown;
        self
    }
}
