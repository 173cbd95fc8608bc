//! The authoritative state document returned by `GET /api/state` and fed
//! to the persistence task, built fresh from `GameState`'s public fields
//! each publish (spec §6 "Authoritative state (debug)").

use arena_common::runtime_config::RuntimeConfig;
use arena_common::world::{Food, GameState, GameStatus, Snake};
use serde::Serialize;

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiStateDoc {
    pub tick: u64,
    pub status: GameStatus,
    pub winner_id: Option<String>,
    pub spectator_count: u32,
    pub config: RuntimeConfig,
    pub snakes: Vec<Snake>,
    pub food: Vec<Food>,
}

pub fn build_state_doc(state: &GameState) -> ApiStateDoc {
    ApiStateDoc {
        tick: state.tick,
        status: state.status,
        winner_id: state.winner_id.as_ref().map(|id| id.to_string()),
        spectator_count: state.spectator_count,
        config: state.config.clone(),
        snakes: state.snakes.values().cloned().collect(),
        food: state.food.clone(),
    }
}
