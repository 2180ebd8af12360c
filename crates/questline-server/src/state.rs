use rusqlite::Connection;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Mutex<Connection>>,
}

impl AppState {
    pub fn new(connection: Connection) -> Self {
        Self { db: Arc::new(Mutex::new(connection)) }
    }
}
