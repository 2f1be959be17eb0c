use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use clap::Parser;
use futures_util::{SinkExt, StreamExt};
use pacman_arcade_server::config::ServerConfig;
use pacman_arcade_server::constants::TICK_MS;
use pacman_arcade_server::engine::{GameEngine, GameEngineOptions};
use pacman_arcade_server::error::{EngineError, RankingError};
use pacman_arcade_server::frame_loop::FrameLoop;
use pacman_arcade_server::ranking_store::RankingService;
use pacman_arcade_server::rng::Rng;
use pacman_arcade_server::server_protocol::{
    error_message, parse_client_message, pong_message, ranking_error_message, ranking_message,
    score_saved_message, state_message, welcome_message, ParsedClientMessage,
};
use pacman_arcade_server::server_utils::{parse_ranking_limit, sanitize_name};
use pacman_arcade_server::types::{RunPhase, RuntimeEvent, ScoreSubmission};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::{mpsc, Mutex};
use tower_http::services::{ServeDir, ServeFile};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

const OUTBOUND_QUEUE: usize = 256;

#[derive(Clone)]
struct AppState {
    rankings: RankingService,
    config: Arc<ServerConfig>,
}

/// One connection drives one run.
struct Session {
    engine: GameEngine,
    name: Option<String>,
    frame_loop: FrameLoop,
    outbox: Outbox,
}

type SharedSession = Arc<Mutex<Session>>;

#[derive(Clone)]
struct Outbox {
    tx: mpsc::Sender<String>,
}

impl Outbox {
    /// Drops the message when the client is not keeping up.
    fn send(&self, message: &Value) {
        if self.tx.try_send(message.to_string()).is_err() {
            debug!("outbound queue full or closed; dropping message");
        }
    }
}

#[derive(Debug, Deserialize)]
struct RankingQuery {
    limit: Option<String>,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ServerConfig::parse();
    let rankings = RankingService::connect(config.ranking_db.clone());
    let static_dir = config.resolve_static_dir();
    let bind_addr = config.bind_addr();
    let state = AppState {
        rankings,
        config: Arc::new(config),
    };

    let app = router(state);
    let app = if let Some(static_dir) = static_dir {
        let index_file = static_dir.join("index.html");
        info!(root = %static_dir.display(), "serving static files");
        app.fallback_service(
            ServeDir::new(static_dir).not_found_service(ServeFile::new(index_file)),
        )
    } else {
        warn!("static file root not found; only the API and game socket are served");
        app
    };

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!(addr = %bind_addr, "listening");
    axum::serve(listener, app).await
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/api/rankings", get(list_rankings).post(submit_ranking))
        .route("/api/rankings/test", get(ranking_diagnostics))
        .route("/ws", get(ws_handler))
        .with_state(state)
}

async fn healthz() -> impl IntoResponse {
    Json(json!({ "ok": true }))
}

fn ranking_error_response(error: &RankingError) -> Response {
    let status = match error {
        RankingError::Validation(_) => StatusCode::BAD_REQUEST,
        RankingError::NotConfigured | RankingError::Unavailable(_) => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status == StatusCode::INTERNAL_SERVER_ERROR {
        warn!(%error, "ranking request failed");
    }
    (status, Json(json!({ "error": error.to_string() }))).into_response()
}

async fn list_rankings(
    State(state): State<AppState>,
    Query(query): Query<RankingQuery>,
) -> Response {
    let limit =
        parse_ranking_limit(query.limit.as_deref()).unwrap_or(state.config.ranking_limit);
    match state.rankings.top(Some(limit)).await {
        Ok(entries) => Json(entries).into_response(),
        Err(error) => ranking_error_response(&error),
    }
}

async fn submit_ranking(State(state): State<AppState>, body: Bytes) -> Response {
    let result = match serde_json::from_slice::<Value>(&body) {
        Ok(value) => ScoreSubmission::from_json(&value),
        Err(_) => Err(RankingError::Validation("request body must be JSON".into())),
    };
    let submission = match result {
        Ok(submission) => submission,
        Err(error) => return ranking_error_response(&error),
    };
    match state.rankings.submit(submission).await {
        Ok(entry) => {
            info!(name = %entry.name, score = entry.score, level = entry.level, "score saved");
            Json(json!({ "success": true })).into_response()
        }
        Err(error) => ranking_error_response(&error),
    }
}

async fn ranking_diagnostics(State(state): State<AppState>) -> Response {
    match state.rankings.diagnostics().await {
        Ok(diagnostics) => Json(diagnostics).into_response(),
        Err(error) => {
            let status = match error {
                RankingError::NotConfigured | RankingError::Unavailable(_) => {
                    StatusCode::SERVICE_UNAVAILABLE
                }
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            (
                status,
                Json(json!({ "status": "error", "error": error.to_string() })),
            )
                .into_response()
        }
    }
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(state, socket))
}

async fn handle_socket(state: AppState, socket: WebSocket) {
    let (tx, mut rx) = mpsc::channel::<String>(OUTBOUND_QUEUE);
    let session = match open_session(&state, tx.clone()) {
        Ok(session) => session,
        Err(error) => {
            warn!(%error, "failed to create game engine");
            return;
        }
    };

    let (mut ws_sender, mut ws_receiver) = socket.split();
    let writer = tokio::spawn(async move {
        while let Some(payload) = rx.recv().await {
            if ws_sender.send(Message::Text(payload.into())).await.is_err() {
                break;
            }
        }
    });

    while let Some(received) = ws_receiver.next().await {
        let Ok(message) = received else {
            break;
        };

        match message {
            Message::Text(raw) => {
                handle_client_message(&state, &session, raw.as_str()).await;
            }
            Message::Binary(raw) => match std::str::from_utf8(&raw) {
                Ok(text) => handle_client_message(&state, &session, text).await,
                Err(_) => session
                    .lock()
                    .await
                    .outbox
                    .send(&error_message("invalid utf8 message")),
            },
            Message::Close(_) => break,
            _ => {}
        }
    }

    session.lock().await.frame_loop.cancel();
    debug!("session closed");
    drop(session);
    drop(tx);
    let _ = writer.await;
}

fn open_session(
    state: &AppState,
    tx: mpsc::Sender<String>,
) -> Result<SharedSession, EngineError> {
    let seed = state.config.seed.unwrap_or_else(Rng::random_seed);
    let engine = GameEngine::new(GameEngineOptions {
        seed,
        ..GameEngineOptions::default()
    })?;
    debug!(seed, "session opened");
    Ok(Arc::new(Mutex::new(Session {
        engine,
        name: None,
        frame_loop: FrameLoop::new(),
        outbox: Outbox { tx },
    })))
}

async fn handle_client_message(state: &AppState, session: &SharedSession, raw: &str) {
    let Some(message) = parse_client_message(raw) else {
        session.lock().await.outbox.send(&error_message("invalid message"));
        return;
    };

    let mut guard = session.lock().await;
    match message {
        ParsedClientMessage::Hello { name } => {
            let name = sanitize_name(&name);
            let reply = welcome_message(&name, guard.engine.seed(), &guard.engine.config);
            guard.name = Some(name);
            guard.outbox.send(&reply);
        }
        ParsedClientMessage::Start | ParsedClientMessage::Restart => {
            let Some(name) = guard.name.clone() else {
                guard.outbox.send(&error_message("send hello before starting"));
                return;
            };
            if let Err(error) = guard.engine.start_run(&name) {
                guard.outbox.send(&error_message(&error.to_string()));
                return;
            }
            let task = run_frames(state.clone(), session.clone());
            guard.frame_loop.arm(task);
        }
        ParsedClientMessage::Input { dir } => {
            guard.engine.receive_input(dir);
        }
        ParsedClientMessage::Pause { paused } => {
            let paused = paused.unwrap_or(guard.engine.phase() != RunPhase::Paused);
            guard.engine.set_paused(paused);
        }
        ParsedClientMessage::Ranking { limit } => {
            let outbox = guard.outbox.clone();
            push_ranking(state, outbox, limit);
        }
        ParsedClientMessage::Ping { t } => {
            guard.outbox.send(&pong_message(t));
        }
    }
}

/// Per-session tick task. Stops on its own once the run no longer wants frames.
async fn run_frames(state: AppState, session: SharedSession) {
    let mut interval = tokio::time::interval(Duration::from_millis(TICK_MS));
    loop {
        interval.tick().await;
        let mut guard = session.lock().await;
        guard.engine.step(TICK_MS);
        let snapshot = guard.engine.build_snapshot(true);
        guard.outbox.send(&state_message(&snapshot));

        if snapshot
            .events
            .iter()
            .any(|event| matches!(event, RuntimeEvent::RunStarted { .. }))
        {
            push_ranking(&state, guard.outbox.clone(), None);
        }
        if let Some(submission) = guard.engine.take_submission() {
            push_submission(&state, guard.outbox.clone(), submission);
        }
        if !guard.engine.wants_frames() {
            debug!(phase = ?guard.engine.phase(), "frame loop finished");
            return;
        }
    }
}

fn push_ranking(state: &AppState, outbox: Outbox, limit: Option<usize>) {
    let rankings = state.rankings.clone();
    let limit = limit.unwrap_or(state.config.ranking_limit);
    tokio::spawn(async move {
        match rankings.top(Some(limit)).await {
            Ok(entries) => outbox.send(&ranking_message(&entries)),
            Err(error) => {
                debug!(%error, "ranking fetch failed");
                outbox.send(&ranking_error_message(&error.to_string()));
            }
        }
    });
}

fn push_submission(state: &AppState, outbox: Outbox, submission: ScoreSubmission) {
    let rankings = state.rankings.clone();
    let limit = state.config.ranking_limit;
    tokio::spawn(async move {
        match rankings.submit(submission).await {
            Ok(entry) => {
                info!(name = %entry.name, score = entry.score, level = entry.level, "score saved");
                outbox.send(&score_saved_message(&entry));
                if let Ok(entries) = rankings.top(Some(limit)).await {
                    outbox.send(&ranking_message(&entries));
                }
            }
            Err(error) => {
                warn!(%error, "score submission failed");
                outbox.send(&ranking_error_message(&error.to_string()));
            }
        }
    });
}
