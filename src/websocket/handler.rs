use actix::*;
use actix_web::web;
use actix_web_actors::ws;
use chess::Color;
use log::{debug, info, warn};
use uuid::Uuid;

use crate::models::{
    AppState, BoardSocketMessage, ClientEvent, MoveOutcome, MovePayload, RoleGrant, ServerEvent,
};

/// One connected client. The actor owns nothing but its id; the game and
/// the seat table live in [`AppState`] and are passed in explicitly.
pub struct BoardSocket {
    pub id: Uuid,
    pub app_state: web::Data<AppState>,
}

fn role_code(color: Color) -> &'static str {
    match color {
        Color::White => "w",
        Color::Black => "b",
    }
}

impl Actor for BoardSocket {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        self.app_state
            .peers
            .lock()
            .unwrap()
            .insert(self.id, ctx.address());

        let grant = self.app_state.session.lock().unwrap().connect(self.id);
        match grant {
            RoleGrant::Player(color) => {
                info!("connection {} seated as {}", self.id, role_code(color));
                self.send_event(ctx, &ServerEvent::PlayerRole(role_code(color).to_string()));
            }
            RoleGrant::Spectator { fen } => {
                info!("connection {} joins as spectator", self.id);
                self.send_event(ctx, &ServerEvent::SpectatorRole);
                self.send_event(ctx, &ServerEvent::BoardState(fen));
            }
        }
    }

    fn stopping(&mut self, _: &mut Self::Context) -> Running {
        if let Some(color) = self.app_state.session.lock().unwrap().disconnect(self.id) {
            info!(
                "connection {} disconnected, freeing the {} seat",
                self.id,
                role_code(color)
            );
        } else {
            info!("spectator {} disconnected", self.id);
        }
        self.app_state.peers.lock().unwrap().remove(&self.id);
        Running::Stop
    }
}

impl Handler<BoardSocketMessage> for BoardSocket {
    type Result = ();

    fn handle(&mut self, msg: BoardSocketMessage, ctx: &mut Self::Context) {
        ctx.text(msg.0);
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for BoardSocket {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(msg)) => {
                ctx.pong(&msg);
            }
            Ok(ws::Message::Pong(_)) => {}
            Ok(ws::Message::Text(text)) => match serde_json::from_str::<ClientEvent>(&text) {
                Ok(ClientEvent::Move(payload)) => self.handle_move(payload, ctx),
                Err(e) => {
                    warn!("connection {} sent an unparseable frame: {}", self.id, e);
                    self.send_event(
                        ctx,
                        &ServerEvent::Error {
                            message: format!("invalid message format: {}", e),
                        },
                    );
                }
            },
            Ok(ws::Message::Binary(_)) => {
                warn!("connection {} sent a binary frame", self.id);
                self.send_event(
                    ctx,
                    &ServerEvent::Error {
                        message: "binary messages are not supported".to_string(),
                    },
                );
            }
            Ok(ws::Message::Close(reason)) => {
                ctx.close(reason);
                ctx.stop();
            }
            _ => ctx.stop(),
        }
    }
}

impl BoardSocket {
    fn send_event(&self, ctx: &mut ws::WebsocketContext<Self>, event: &ServerEvent) {
        ctx.text(serde_json::to_string(event).unwrap());
    }

    /// Delivers an event to every connected client, the mover included.
    fn broadcast(&self, event: &ServerEvent) {
        let text = serde_json::to_string(event).unwrap();
        let peers = self.app_state.peers.lock().unwrap().clone();
        debug!("broadcasting {} frame to {} peers", text, peers.len());
        for addr in peers.values() {
            addr.do_send(BoardSocketMessage(text.clone()));
        }
    }

    fn handle_move(&self, payload: MovePayload, ctx: &mut ws::WebsocketContext<Self>) {
        // The guard is held across the broadcasts below: a move and its
        // snapshot must reach every mailbox before the next move's
        // fan-out starts.
        let mut session = self.app_state.session.lock().unwrap();

        match session.try_move(self.id, &payload) {
            Err(e) => {
                warn!("connection {} sent a malformed move: {}", self.id, e);
                self.send_event(
                    ctx,
                    &ServerEvent::Error {
                        message: e.to_string(),
                    },
                );
            }
            Ok(MoveOutcome::OutOfTurn) => {
                // Not this connection's turn (or not a player at all).
                debug!("dropping out-of-turn move from {}", self.id);
            }
            Ok(MoveOutcome::Rejected) => {
                info!(
                    "invalid move {}->{} from connection {}",
                    payload.from, payload.to, self.id
                );
                self.send_event(ctx, &ServerEvent::InvalidMove(payload));
            }
            Ok(MoveOutcome::Applied { fen, winner }) => {
                info!(
                    "move {}->{} applied by connection {}",
                    payload.from, payload.to, self.id
                );
                self.broadcast(&ServerEvent::Move(payload));
                self.broadcast(&ServerEvent::BoardState(fen));
                if let Some(result) = winner {
                    info!("game over: {}", result);
                    self.broadcast(&ServerEvent::GameOver { result });
                }
            }
        }
    }
}
