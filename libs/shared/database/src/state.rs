use std::sync::Arc;

use tracing::{info, warn};

use shared_config::{AppConfig, StorageBackend};
use shared_utils::time::{Clock, SystemClock};

use crate::memory::InMemoryStore;
use crate::store::SchedulingStore;
use crate::supabase_store::SupabaseStore;

/// Everything a cell handler needs: configuration, storage and the clock.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn SchedulingStore>,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn SchedulingStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            config: Arc::new(config),
            store,
            clock,
        }
    }

    pub fn from_config(config: AppConfig) -> Self {
        let store: Arc<dyn SchedulingStore> = match config.storage_backend {
            StorageBackend::Supabase => {
                info!("Using Supabase storage at {}", config.supabase_url);
                Arc::new(SupabaseStore::new(&config))
            }
            StorageBackend::Memory => {
                warn!("Using in-memory storage; data is lost on restart");
                Arc::new(InMemoryStore::new())
            }
        };

        Self::new(config, store, Arc::new(SystemClock))
    }
}
