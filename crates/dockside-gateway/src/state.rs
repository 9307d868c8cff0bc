//! Gateway application state.
//!
//! This module defines the shared state that is available to all request handlers.

use std::sync::Arc;

use dockside_lifecycle::ContainerLifecycle;

use crate::config::GatewayConfig;

/// Shared application state for the gateway.
pub struct GatewayState<L>
where
    L: ContainerLifecycle,
{
    /// The lifecycle manager all container operations go through.
    pub lifecycle: Arc<L>,
    /// Gateway configuration.
    pub config: GatewayConfig,
}

impl<L> GatewayState<L>
where
    L: ContainerLifecycle,
{
    /// Create a new gateway state.
    #[must_use]
    pub const fn new(lifecycle: Arc<L>, config: GatewayConfig) -> Self {
        Self { lifecycle, config }
    }
}

impl<L> Clone for GatewayState<L>
where
    L: ContainerLifecycle,
{
    fn clone(&self) -> Self {
        Self {
            lifecycle: Arc::clone(&self.lifecycle),
            config: self.config.clone(),
        }
    }
}
