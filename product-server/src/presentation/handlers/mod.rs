pub mod product;
pub mod system;

/// Switches for the product handlers, shared by every worker.
#[derive(Debug, Clone, Copy)]
pub struct GatewaySettings {
    /// Serve mock data instead of errors while the datastore is unusable.
    pub degraded_mode: bool,
}
