use lazy_static::lazy_static;
use log::info;
use std::sync::{Arc, RwLock};

/// Authentication state as seen by the rest of the client.
///
/// Components that need to know whether a user is signed in, or need the
/// bearer token, receive one of these instead of reading storage directly.
pub trait SessionStore: Send + Sync {
    fn token(&self) -> Option<String>;

    /// Start a session after a successful sign-in. Replaces any existing token.
    fn begin(&self, token: String);

    /// Sign out.
    fn end(&self);

    fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }
}

#[derive(Debug, Default)]
pub struct MemorySession {
    token: RwLock<Option<String>>,
}

impl MemorySession {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySession {
    fn token(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn begin(&self, token: String) {
        let mut guard = self
            .token
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if guard.is_some() {
            info!("Replacing existing session token");
        } else {
            info!("Session started");
        }
        *guard = Some(token);
    }

    fn end(&self) {
        let mut guard = self
            .token
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if guard.take().is_some() {
            info!("Session ended");
        }
    }
}

lazy_static! {
    static ref GLOBAL_SESSION: Arc<MemorySession> = Arc::new(MemorySession::new());
}

/// The process-wide session shared by the binaries.
pub fn global_session() -> Arc<MemorySession> {
    Arc::clone(&GLOBAL_SESSION)
}
