use std::sync::Arc;

use streamify_social::FriendshipService;

use crate::auth::AuthProvider;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<FriendshipService>,
    pub auth: Arc<dyn AuthProvider>,
}

impl AppState {
    pub fn new(service: Arc<FriendshipService>, auth: Arc<dyn AuthProvider>) -> Self {
        Self { service, auth }
    }
}
