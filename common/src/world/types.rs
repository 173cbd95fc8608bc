use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    Waiting,
    Running,
    Paused,
    Finished,
}

impl GameStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameStatus::Waiting => "waiting",
            GameStatus::Running => "running",
            GameStatus::Paused => "paused",
            GameStatus::Finished => "finished",
        }
    }
}

/// Events the kernel emits during a tick, consumed by the real-time
/// channel (spec §6) to fire named events alongside the per-tick
/// snapshot. Variant names are renamed to the literal colon-separated
/// event names spec §6 names (`game:started`, `snake:died`, ...).
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum GameEvent {
    #[serde(rename = "game:started")]
    Started,
    #[serde(rename = "game:paused")]
    Paused,
    #[serde(rename = "game:reset")]
    Reset,
    #[serde(rename = "game:finished")]
    Finished { winner_id: Option<String>, winner_name: Option<String> },
    #[serde(rename = "snake:registered")]
    SnakeRegistered { name: String, color: String },
    #[serde(rename = "snake:respawned")]
    SnakeRespawned { name: String },
    #[serde(rename = "snake:died")]
    SnakeDied { name: String, reason: String },
}
