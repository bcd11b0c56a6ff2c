use sqlx::SqlitePool;

use crate::api::session::SessionRegistry;
use crate::services::{Authenticator, CourseStore};

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub store: CourseStore,
    pub auth: Authenticator,
    pub sessions: SessionRegistry,
}

impl AppState {
    pub fn new(db: SqlitePool, auth: Authenticator) -> Self {
        Self {
            store: CourseStore::new(db.clone()),
            db,
            auth,
            sessions: SessionRegistry::default(),
        }
    }
}
