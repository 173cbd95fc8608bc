//! `POST /api/register` and `POST /api/submit` (spec §6).

use std::time::Instant;

use arena_common::identifiers::SnakeId;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use serde::{Deserialize, Serialize};

use crate::ai_pool::executor::scrub_source;
use crate::http::app_state::AppState;
use crate::kernel::KernelCommand;
use crate::server_config::MAX_SNAKE_NAME_CHARS;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    pub ai_function: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub snake_id: String,
    pub color: String,
    pub message: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequest {
    pub snake_id: String,
    pub ai_function: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error: String,
}

fn error(status: StatusCode, message: impl Into<String>) -> axum::response::Response {
    (status, Json(ErrorResponse { error: message.into() })).into_response()
}

fn validate_name(name: &str) -> Result<(), String> {
    if name.is_empty() || name.chars().count() > MAX_SNAKE_NAME_CHARS {
        return Err(format!("name must be between 1 and {} characters", MAX_SNAKE_NAME_CHARS));
    }
    Ok(())
}

/// Compiles the submitted program once in a throwaway engine to measure
/// the wall-clock cost recorded in the snake's submission history (spec
/// §3, `{tick, lineCount, wallClockMs}`). A failed compile here doesn't
/// reject the submission — the runtime will simply report `lastAiError`
/// on the snake's first tick — but the scrub does reject outright.
fn measure_wall_clock_ms(ai_function: &str) -> Result<u64, String> {
    if ai_function.is_empty() {
        return Err("aiFunction must be between 1 and 10000 characters".to_string());
    }
    scrub_source(ai_function)?;
    let started = Instant::now();
    let _ = rhai::Engine::new().compile(ai_function);
    Ok(started.elapsed().as_millis() as u64)
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> axum::response::Response {
    if let Err(message) = validate_name(&req.name) {
        return error(StatusCode::BAD_REQUEST, message);
    }
    let wall_clock_ms = match measure_wall_clock_ms(&req.ai_function) {
        Ok(ms) => ms,
        Err(message) => return error(StatusCode::BAD_REQUEST, message),
    };

    let (reply_tx, reply_rx) = tokio::sync::oneshot::channel();
    let sent = state.kernel.command_tx.send(KernelCommand::Register {
        name: req.name,
        ai_source: req.ai_function,
        wall_clock_ms,
        reply: reply_tx,
    });
    if sent.is_err() {
        return error(StatusCode::SERVICE_UNAVAILABLE, "simulation kernel is not running");
    }

    match reply_rx.await {
        Ok(outcome) => Json(RegisterResponse {
            snake_id: outcome.id.to_string(),
            color: outcome.color,
            message: if outcome.is_new { "registered".to_string() } else { "respawned with new program".to_string() },
        })
        .into_response(),
        Err(_) => error(StatusCode::SERVICE_UNAVAILABLE, "simulation kernel dropped the request"),
    }
}

pub async fn submit(State(state): State<AppState>, Json(req): Json<SubmitRequest>) -> axum::response::Response {
    let wall_clock_ms = match measure_wall_clock_ms(&req.ai_function) {
        Ok(ms) => ms,
        Err(message) => return error(StatusCode::BAD_REQUEST, message),
    };

    let (reply_tx, reply_rx) = tokio::sync::oneshot::channel();
    let sent = state.kernel.command_tx.send(KernelCommand::Submit {
        id: SnakeId::new(req.snake_id),
        ai_source: req.ai_function,
        wall_clock_ms,
        reply: reply_tx,
    });
    if sent.is_err() {
        return error(StatusCode::SERVICE_UNAVAILABLE, "simulation kernel is not running");
    }

    match reply_rx.await {
        Ok(Ok(())) => Json(serde_json::json!({"message": "submitted"})).into_response(),
        Ok(Err(message)) => error(StatusCode::NOT_FOUND, message),
        Err(_) => error(StatusCode::SERVICE_UNAVAILABLE, "simulation kernel dropped the request"),
    }
}
