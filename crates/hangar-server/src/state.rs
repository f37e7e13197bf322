//! Shared application state injected into all routes.

use crate::config::Config;
use crate::persistence::Db;
use crate::session::Sessions;

pub struct AppState {
    pub db: Db,
    pub sessions: Sessions,
    pub config: Config,
}

impl AppState {
    pub fn new(db: Db, config: Config) -> Self {
        let sessions = Sessions::new(&config.secret_key);
        Self {
            db,
            sessions,
            config,
        }
    }
}
