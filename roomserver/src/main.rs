//! Gateway entry point — §6.

mod activities;
mod config;
mod dto;
mod logging;
mod routes;
mod state;

use axum::routing::{get, put};
use axum::Router;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() {
    logging::init();

    let config = Config::from_env();
    let port = config.port;
    let app_state = AppState::new(config);

    let router = Router::new()
        .route("/ping", get(routes::ping))
        .route("/create/{workflow_id}", put(routes::create_mtv_room))
        .route("/play", put(routes::mtv_play))
        .route("/pause", put(routes::mtv_pause))
        .route("/go-to-next-track", put(routes::mtv_go_to_next_track))
        .route("/terminate", put(routes::mtv_terminate))
        .route("/join", put(routes::mtv_join))
        .route("/leave", put(routes::mtv_leave))
        .route(
            "/change-user-emitting-device",
            put(routes::mtv_change_user_emitting_device),
        )
        .route("/suggest-tracks", put(routes::mtv_suggest_tracks))
        .route("/state", put(routes::mtv_state))
        .route("/mpe/create/{workflow_id}", put(routes::create_mpe_room))
        .route("/mpe/signal", put(routes::mpe_signal))
        .route("/mpe/state", put(routes::mpe_state))
        .with_state(app_state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .expect("failed to bind gateway listener");

    tracing::info!(port, "room gateway listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("gateway server error");
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install ctrl-c handler");
    tracing::info!("shutdown signal received");
}
