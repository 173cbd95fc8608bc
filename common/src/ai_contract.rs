//! The exact object handed to an untrusted participant program (spec §6
//! "AI input contract"). Deep-copy semantics are structural: this is a
//! plain, owned, serde-serializable snapshot built fresh every tick, so
//! nothing a program does to it can reach authoritative state.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SegmentView {
    pub x: f64,
    pub y: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YouView {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub angle: f64,
    pub speed: f64,
    pub segments: Vec<SegmentView>,
    pub length: usize,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OtherSnakeView {
    pub id: String,
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub angle: f64,
    pub segments: Vec<SegmentView>,
    pub length: usize,
    pub alive: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FoodView {
    pub x: f64,
    pub y: f64,
    pub value: i32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ArenaView {
    pub radius: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AiInput {
    pub you: YouView,
    pub arena: ArenaView,
    pub snakes: Vec<OtherSnakeView>,
    pub food: Vec<FoodView>,
    pub tick: u64,
}

/// `{targetAngle: number | null, error: string | null}` (spec §4.2).
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiDecision {
    pub target_angle: Option<f64>,
    pub error: Option<String>,
}

impl AiDecision {
    pub fn steer(angle: f64) -> Self {
        Self { target_angle: Some(angle), error: None }
    }

    pub fn hold() -> Self {
        Self { target_angle: None, error: None }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self { target_angle: None, error: Some(error.into()) }
    }
}

/// A human-readable, machine-parseable description of the contract,
/// returned verbatim by `GET /api/docs/ai-contract`.
pub fn contract_doc_json() -> serde_json::Value {
    serde_json::json!({
        "entryPoint": "fn move(state) -> number | #{x, y}",
        "input": {
            "you": {"id": "string", "x": "number", "y": "number", "angle": "radians", "speed": "number", "segments": [{"x": "number", "y": "number"}], "length": "integer"},
            "arena": {"radius": "number"},
            "snakes": [{"id": "string", "name": "string", "x": "number", "y": "number", "angle": "radians", "segments": [{"x": "number", "y": "number"}], "length": "integer", "alive": "bool"}],
            "food": [{"x": "number", "y": "number", "value": "integer"}],
            "tick": "integer",
        },
        "output": {
            "numeric": "an absolute target heading angle in radians",
            "point": "#{x, y} — converted to atan2(y - you.y, x - you.x)",
            "null": "no steering this tick; heading is preserved",
        },
        "helpers": ["angleTo(x1, y1, x2, y2)", "distTo(x1, y1, x2, y2)", "distFromCenter(x, y)"],
        "limits": {"maxSourceChars": 10000, "timeoutMs": "aiTimeoutMs (default 50)"},
    })
}
