mod config;
mod game;
mod room;
mod score;
mod state;
mod timer;
mod words;
mod ws;

use std::net::SocketAddr;

use anyhow::Context;
use axum::{Router, http::Method, routing::get};
use config::Config;
use room::TurnRules;
use state::AppState;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use words::WordList;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::load("config.json").await?;
    let rules = TurnRules::default();

    let words = match &config.game.words_file {
        Some(path) => WordList::load(path, rules.word_choices).await?,
        None => WordList::builtin(rules.word_choices)?,
    };
    info!(words = words.len(), "Vocabulary loaded.");

    let state = AppState::new(words, config.game.max_rounds, rules);

    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET])
        .allow_headers(tower_http::cors::Any);

    let app = Router::new()
        .route("/ws", get(ws::ws_handler))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(config.server.bind)
        .await
        .context("failed to bind to address")?;
    info!("Server listening on http://{}", config.server.bind);
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .context("server error")?;

    Ok(())
}
