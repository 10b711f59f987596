use actix::Message;
use serde::{Deserialize, Serialize};

/// A candidate move as it travels over the wire. Squares are lowercase
/// algebraic ("e2"); `promotion` is a single piece letter and is ignored
/// by the server unless the move actually promotes.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct MovePayload {
    pub from: String,
    pub to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promotion: Option<String>,
}

impl MovePayload {
    pub fn new(from: &str, to: &str) -> Self {
        MovePayload {
            from: from.to_string(),
            to: to.to_string(),
            promotion: None,
        }
    }
}

/// Events sent from client to server.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientEvent {
    Move(MovePayload),
}

/// Events sent from server to client.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerEvent {
    /// Role grant for a seated player: "w" or "b".
    PlayerRole(String),
    /// Both seats taken; the connection may only watch.
    SpectatorRole,
    /// Authoritative position snapshot as a FEN string.
    BoardState(String),
    /// A move that was applied to the shared game, echoed to everyone.
    Move(MovePayload),
    GameOver { result: String },
    /// Rejected by the rules engine; sent to the proposer only.
    InvalidMove(MovePayload),
    Error { message: String },
}

/// Text frame handed to a connection actor for delivery.
#[derive(Message)]
#[rtype(result = "()")]
pub struct BoardSocketMessage(pub String);
