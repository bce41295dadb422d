use crate::services::portal::PortalClient;

/// Shared application state. Cloned per request; holds nothing mutable.
#[derive(Debug, Clone)]
pub struct AppState {
    pub portal: PortalClient,
}

impl AppState {
    pub fn new(portal: PortalClient) -> Self {
        Self { portal }
    }
}
