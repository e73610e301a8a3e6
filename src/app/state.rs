//! Application state shared across the gateway and routes

use std::sync::Arc;

use crate::config::Config;
use crate::room::RoomDirectory;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub directory: Arc<RoomDirectory>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
            directory: Arc::new(RoomDirectory::new()),
        }
    }
}
