use actix_web::{web, App, HttpServer};
use log::info;

use chess_relay::models::AppState;
use chess_relay::routes;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    info!("starting chess relay at http://127.0.0.1:8080");

    // One shared session for the whole process; state is in-memory only
    // and resets on restart.
    let app_state = web::Data::new(AppState::new());

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .configure(routes::configure_routes)
    })
    .bind("127.0.0.1:8080")?
    .run()
    .await
}
