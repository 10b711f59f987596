use actix::Addr;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

use crate::models::GameSession;
use crate::websocket::BoardSocket;

/// Application state shared between connections.
///
/// The mutex around the session is what serializes role assignment and
/// move application now that handlers run on a multi-threaded runtime.
pub struct AppState {
    pub session: Mutex<GameSession>,
    pub peers: Mutex<HashMap<Uuid, Addr<BoardSocket>>>,
}

impl AppState {
    pub fn new() -> Self {
        AppState {
            session: Mutex::new(GameSession::new()),
            peers: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
