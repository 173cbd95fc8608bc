//! `GET /api/state` and `GET /api/docs/ai-contract` (spec §6).

use arena_common::ai_contract::contract_doc_json;
use axum::extract::State;
use axum::response::Json;

use crate::http::app_state::AppState;

pub async fn get_state(State(state): State<AppState>) -> Json<serde_json::Value> {
    let doc = state.kernel.state_rx.borrow().clone();
    Json(serde_json::to_value(&*doc).unwrap_or_else(|_| serde_json::json!({})))
}

pub async fn get_ai_contract() -> Json<serde_json::Value> {
    Json(contract_doc_json())
}
