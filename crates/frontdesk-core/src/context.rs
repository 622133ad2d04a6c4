//! Application root: builds the single session store and hands it to every
//! consumer.

use std::sync::Arc;

use anyhow::Result;

use crate::api::AuthorizedTransport;
use crate::auth::{AuthGateway, SessionStorage, SessionStore};
use crate::config::Config;
use crate::guard::RouteGuard;
use crate::navigation::Navigator;

#[derive(Clone)]
pub struct AppContext {
    pub config: Config,
    pub session: SessionStore,
    pub transport: AuthorizedTransport,
    pub gateway: AuthGateway,
    pub guard: RouteGuard,
}

impl AppContext {
    /// Rehydrate the session from `storage` and wire every component to it.
    pub fn new(
        config: Config,
        storage: Arc<dyn SessionStorage>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self> {
        let session = SessionStore::open(storage);
        let transport = AuthorizedTransport::new(&config, session.clone(), navigator)?;
        let gateway = AuthGateway::new(&transport);
        let guard = RouteGuard::new(session.clone());

        Ok(Self {
            config,
            session,
            transport,
            gateway,
            guard,
        })
    }

    /// Use the storage backend named by the config.
    pub fn from_config(config: Config, navigator: Arc<dyn Navigator>) -> Result<Self> {
        let storage = config.open_storage()?;
        Self::new(config, storage, navigator)
    }
}
