use std::sync::{Arc, Mutex, PoisonError};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::storage::{MemoryStorage, SessionStorage};
use super::token::{self, DecodeError};
use crate::models::UserProfile;

/// Storage key the session is persisted under
pub const SESSION_STORAGE_KEY: &str = "auth-storage";

/// The persisted session triple. Transient UI flags never go in here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(default)]
pub struct SessionData {
    pub credential: Option<String>,
    pub principal: Option<UserProfile>,
    pub authenticated: bool,
}

impl SessionData {
    fn authenticated(credential: Option<String>, principal: UserProfile) -> Self {
        Self {
            credential,
            principal: Some(principal),
            authenticated: true,
        }
    }

    /// The bearer credential, if one is usable. An empty string is not a credential.
    pub fn bearer(&self) -> Option<&str> {
        self.credential.as_deref().filter(|c| !c.is_empty())
    }
}

pub fn serialize(data: &SessionData) -> Result<Vec<u8>> {
    serde_json::to_vec(data).context("Failed to serialize session")
}

pub fn deserialize(bytes: &[u8]) -> Result<SessionData> {
    serde_json::from_slice(bytes).context("Failed to parse persisted session")
}

/// Handle to the process-wide session.
///
/// Cloning is cheap and every clone observes the same state: the application
/// root creates one store and hands clones to the transport, the gateway and
/// the route guard. Each mutation replaces the whole triple; changes are
/// persisted after the state lock is released, so storage I/O never blocks
/// readers.
#[derive(Clone)]
pub struct SessionStore {
    state: Arc<watch::Sender<SessionData>>,
    storage: Arc<dyn SessionStorage>,
    /// Serializes writes so the last one stored is the latest state
    persist_lock: Arc<Mutex<()>>,
}

impl SessionStore {
    /// Rehydrate the session from storage. Missing or unreadable data starts
    /// an empty session.
    pub fn open(storage: Arc<dyn SessionStorage>) -> Self {
        let data = match Self::rehydrate(storage.as_ref()) {
            Ok(Some(data)) => {
                debug!(authenticated = data.authenticated, "Session rehydrated");
                data
            }
            Ok(None) => {
                debug!("No persisted session found");
                SessionData::default()
            }
            Err(e) => {
                warn!(error = %e, "Discarding unreadable persisted session");
                SessionData::default()
            }
        };

        let (state, _) = watch::channel(data);
        Self {
            state: Arc::new(state),
            storage,
            persist_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn in_memory() -> Self {
        Self::open(Arc::new(MemoryStorage::new()))
    }

    fn rehydrate(storage: &dyn SessionStorage) -> Result<Option<SessionData>> {
        storage
            .get(SESSION_STORAGE_KEY)?
            .map(|bytes| deserialize(&bytes))
            .transpose()
    }

    /// Start a session. Never fails: a persistence error is logged and the
    /// in-memory session stays active.
    ///
    /// An empty credential string is not a credential, so it leaves the
    /// store logged out.
    pub fn login(&self, credential: Option<String>, principal: UserProfile) {
        if credential.as_deref() == Some("") {
            warn!("Refusing to start a session with an empty credential");
            self.logout();
            return;
        }
        info!(user_id = principal.id, bearer = credential.is_some(), "Session started");
        self.replace(|_| SessionData::authenticated(credential, principal));
    }

    /// End the session. Calling it while logged out changes nothing.
    pub fn logout(&self) {
        if self.replace(|_| SessionData::default()) {
            info!("Session cleared");
        }
    }

    /// Replace the credential; the session counts as authenticated exactly
    /// when the new credential is non-empty.
    pub fn set_credential(&self, credential: Option<String>) {
        self.replace(|current| SessionData {
            authenticated: credential.as_deref().is_some_and(|c| !c.is_empty()),
            credential,
            principal: current.principal.clone(),
        });
    }

    pub fn set_principal(&self, principal: Option<UserProfile>) {
        self.replace(|current| SessionData {
            principal,
            ..current.clone()
        });
    }

    /// Validate the session.
    ///
    /// This is a command, not a query: when the stored credential carries an
    /// expiry in the past the session is logged out before `false` is
    /// returned. Credentials that cannot be decoded are accepted as opaque.
    pub fn check_auth(&self) -> bool {
        let data = self.snapshot();
        if !data.authenticated {
            return false;
        }

        // Cookie-backed sessions have no client-visible credential.
        let Some(credential) = data.bearer() else {
            return true;
        };

        match token::decode(credential) {
            Ok(claims) if claims.is_expired() => {
                info!(expiry = ?claims.expiry, "Credential expired, logging out");
                self.expire(credential);
                false
            }
            Ok(_) => true,
            Err(DecodeError::NotStructured(_)) => true,
            Err(e) => {
                // Malformed tokens fail open.
                debug!(error = %e, "Accepting undecodable credential as opaque");
                true
            }
        }
    }

    pub fn snapshot(&self) -> SessionData {
        self.state.borrow().clone()
    }

    /// The credential to present on outbound requests, read at call time.
    pub fn credential(&self) -> Option<String> {
        self.state.borrow().bearer().map(str::to_string)
    }

    pub fn principal(&self) -> Option<UserProfile> {
        self.state.borrow().principal.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().authenticated
    }

    /// Receiver that is notified whenever the session changes, so views can
    /// re-run the route guard.
    pub fn subscribe(&self) -> watch::Receiver<SessionData> {
        self.state.subscribe()
    }

    /// Log out only if the session still holds `credential`; a concurrent
    /// login with a fresh credential must not be undone.
    fn expire(&self, credential: &str) {
        let changed = self.state.send_if_modified(|current| {
            if current.bearer() != Some(credential) {
                return false;
            }
            *current = SessionData::default();
            true
        });
        if changed {
            self.persist();
        }
    }

    /// Swap in a new triple, persisting it if anything changed. Returns
    /// whether anything changed.
    fn replace(&self, next: impl FnOnce(&SessionData) -> SessionData) -> bool {
        let changed = self.state.send_if_modified(|current| {
            let replacement = next(&*current);
            if *current == replacement {
                return false;
            }
            *current = replacement;
            true
        });
        if changed {
            self.persist();
        }
        changed
    }

    /// Write the current state. The snapshot is taken under the persist lock,
    /// so a write racing with a newer change is followed by that change's own
    /// write.
    fn persist(&self) {
        let _guard = self
            .persist_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let data = self.snapshot();
        let result =
            serialize(&data).and_then(|bytes| self.storage.set(SESSION_STORAGE_KEY, &bytes));
        if let Err(e) = result {
            warn!(error = %e, "Failed to persist session");
        }
    }
}
