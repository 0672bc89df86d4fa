//! Authentication state injected into the components that need it.

use std::sync::RwLock;

use savor_api::TokenSource;
use savor_types::{AuthState, Credentials};
use tracing::debug;

/// Read/write access to the client's authentication state.
pub trait AuthStore: Send + Sync {
    /// Record a successful login.
    fn set_credentials(&self, credentials: Credentials);
    /// Forget the current user and token.
    fn log_out(&self);
    fn snapshot(&self) -> AuthState;

    fn is_authenticated(&self) -> bool {
        self.snapshot().is_authenticated
    }
}

/// Process-local [`AuthStore`]; nothing is persisted.
#[derive(Debug, Default)]
pub struct InMemoryAuthStore {
    state: RwLock<AuthState>,
}

impl InMemoryAuthStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AuthStore for InMemoryAuthStore {
    fn set_credentials(&self, credentials: Credentials) {
        debug!(user = %credentials.user.id, "storing credentials");
        *self.state.write().expect("auth state lock poisoned") = AuthState::from_credentials(credentials);
    }

    fn log_out(&self) {
        *self.state.write().expect("auth state lock poisoned") = AuthState::default();
    }

    fn snapshot(&self) -> AuthState {
        self.state.read().expect("auth state lock poisoned").clone()
    }
}

impl TokenSource for InMemoryAuthStore {
    fn bearer_token(&self) -> Option<String> {
        self.state.read().expect("auth state lock poisoned").token.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use savor_types::StorefrontUser;

    fn credentials() -> Credentials {
        Credentials {
            access_token: "token-1".into(),
            user: StorefrontUser {
                id: "u1".into(),
                name: Some("Demo User".into()),
                ..StorefrontUser::default()
            },
        }
    }

    #[test]
    fn credentials_flow_into_the_token_source() {
        let store = InMemoryAuthStore::new();
        assert!(!store.is_authenticated());
        assert_eq!(store.bearer_token(), None);

        store.set_credentials(credentials());
        assert!(store.is_authenticated());
        assert_eq!(store.bearer_token().as_deref(), Some("token-1"));
        assert_eq!(store.snapshot().user.map(|user| user.id), Some("u1".to_string()));

        store.log_out();
        assert_eq!(store.snapshot(), AuthState::default());
    }
}
