pub mod handler;

pub use handler::BoardSocket;

use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use log::info;
use uuid::Uuid;

use crate::models::AppState;

/// Upgrades an HTTP request to a WebSocket session.
pub async fn ws_index(
    req: HttpRequest,
    stream: web::Payload,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let id = Uuid::new_v4();
    info!("new websocket connection: {}", id);

    ws::start(
        BoardSocket {
            id,
            app_state: app_state.clone(),
        },
        &req,
        stream,
    )
}
