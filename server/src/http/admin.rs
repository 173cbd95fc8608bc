//! `POST /api/admin/start|pause|reset`, `DELETE /api/admin/snake/:id`,
//! `POST /api/admin/config` (spec §6).

use arena_common::identifiers::SnakeId;
use arena_common::runtime_config::PartialRuntimeConfig;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};

use crate::http::app_state::AppState;
use crate::http::register::ErrorResponse;
use crate::kernel::KernelCommand;

fn error(status: StatusCode, message: impl Into<String>) -> axum::response::Response {
    (status, Json(ErrorResponse { error: message.into() })).into_response()
}

fn ok_message(message: &str) -> axum::response::Response {
    Json(serde_json::json!({"message": message})).into_response()
}

/// `start`/`pause`/`reset` carry no reply channel — the kernel applies
/// them synchronously at the top of its next drain pass (spec §5), and
/// the HTTP layer has nothing more meaningful to await than "accepted".
fn fire_and_forget(state: &AppState, cmd: KernelCommand) -> Result<(), axum::response::Response> {
    state
        .kernel
        .command_tx
        .send(cmd)
        .map_err(|_| error(StatusCode::SERVICE_UNAVAILABLE, "simulation kernel is not running"))
}

pub async fn start(State(state): State<AppState>) -> axum::response::Response {
    match fire_and_forget(&state, KernelCommand::Start) {
        Ok(()) => ok_message("running"),
        Err(response) => response,
    }
}

pub async fn pause(State(state): State<AppState>) -> axum::response::Response {
    match fire_and_forget(&state, KernelCommand::Pause) {
        Ok(()) => ok_message("paused"),
        Err(response) => response,
    }
}

pub async fn reset(State(state): State<AppState>) -> axum::response::Response {
    match fire_and_forget(&state, KernelCommand::Reset) {
        Ok(()) => ok_message("reset"),
        Err(response) => response,
    }
}

pub async fn remove_snake(State(state): State<AppState>, Path(id): Path<String>) -> axum::response::Response {
    let (reply_tx, reply_rx) = tokio::sync::oneshot::channel();
    let sent = state.kernel.command_tx.send(KernelCommand::Remove { id: SnakeId::new(id), reply: reply_tx });
    if sent.is_err() {
        return error(StatusCode::SERVICE_UNAVAILABLE, "simulation kernel is not running");
    }

    match reply_rx.await {
        Ok(Ok(())) => ok_message("removed"),
        Ok(Err(message)) => error(StatusCode::NOT_FOUND, message),
        Err(_) => error(StatusCode::SERVICE_UNAVAILABLE, "simulation kernel dropped the request"),
    }
}

pub async fn update_config(
    State(state): State<AppState>,
    Json(patch): Json<PartialRuntimeConfig>,
) -> axum::response::Response {
    let (reply_tx, reply_rx) = tokio::sync::oneshot::channel();
    let sent = state.kernel.command_tx.send(KernelCommand::UpdateConfig { patch, reply: reply_tx });
    if sent.is_err() {
        return error(StatusCode::SERVICE_UNAVAILABLE, "simulation kernel is not running");
    }

    match reply_rx.await {
        Ok(Ok(())) => ok_message("config updated"),
        Ok(Err(message)) => error(StatusCode::BAD_REQUEST, message),
        Err(_) => error(StatusCode::SERVICE_UNAVAILABLE, "simulation kernel dropped the request"),
    }
}
