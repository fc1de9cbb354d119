//! Shared lease service state

use std::sync::Arc;

use st_core::config::LeaseConfig;

use crate::lease::PortAllocator;

/// State shared by every lease API request
pub struct ServerState {
    /// Configuration
    pub config: LeaseConfig,
    /// Port allocator owning the lease table
    pub allocator: Arc<PortAllocator>,
}

impl ServerState {
    /// Create state with an allocator built from the configuration
    pub fn new(config: LeaseConfig) -> Self {
        let allocator = Arc::new(PortAllocator::new(&config));
        Self { config, allocator }
    }

    /// Create state around an existing allocator
    pub fn with_allocator(config: LeaseConfig, allocator: Arc<PortAllocator>) -> Self {
        Self { config, allocator }
    }

    /// Get the port allocator
    pub fn allocator(&self) -> &Arc<PortAllocator> {
        &self.allocator
    }
}
