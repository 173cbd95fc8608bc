//! The lossy, bandwidth-trimmed view of [`crate::world::GameState`]
//! broadcast to spectators over the WebSocket feed (spec §4.5). Built once
//! per tick from the same `segment_cache` the collision pass just used, so
//! what spectators see and what killed a snake are always the same data.

use serde::{Deserialize, Serialize};

use crate::world::GameState;

const POSITION_ROUNDING: f64 = 0.1;
const ANGLE_ROUNDING: f64 = 0.01;
/// Every third cached segment is sent, always including the first and last,
/// to keep the wire payload small without losing the overall body shape.
const SEGMENT_STRIDE: usize = 3;

fn round_to(value: f64, step: f64) -> f64 {
    (value / step).round() * step
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SegmentSnapshot {
    pub x: f64,
    pub y: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnakeSnapshot {
    pub id: String,
    pub name: String,
    pub color: String,
    pub alive: bool,
    pub head_x: f64,
    pub head_y: f64,
    pub angle: f64,
    pub speed: f64,
    pub length: usize,
    pub best_length: usize,
    pub segments: Vec<SegmentSnapshot>,
    pub kills: u32,
    pub total_kills: u32,
    pub deaths: u32,
    pub death_reason: Option<String>,
    pub last_ai_error: Option<String>,
    pub submission_count: usize,
    pub last_submission_line_count: Option<usize>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FoodSnapshot {
    pub x: f64,
    pub y: f64,
    pub value: i32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub tick: u64,
    pub status: String,
    pub arena_radius: f64,
    pub spectator_count: u32,
    pub winner_id: Option<String>,
    pub snakes: Vec<SnakeSnapshot>,
    pub food: Vec<FoodSnapshot>,
}

fn strided_segments(points: &[crate::geometry::Point]) -> Vec<SegmentSnapshot> {
    if points.is_empty() {
        return Vec::new();
    }
    let last_index = points.len() - 1;
    points
        .iter()
        .enumerate()
        .filter(|(idx, _)| *idx == 0 || *idx == last_index || idx % SEGMENT_STRIDE == 0)
        .map(|(_, p)| SegmentSnapshot { x: round_to(p.x, POSITION_ROUNDING), y: round_to(p.y, POSITION_ROUNDING) })
        .collect()
}

pub fn build_snapshot(state: &GameState) -> Snapshot {
    let snakes = state
        .snakes
        .values()
        .map(|snake| {
            let head = snake.trail.front().copied().unwrap_or(crate::geometry::Point::new(0.0, 0.0));
            let segments = state.segment_cache.get(&snake.id).map(|segs| strided_segments(segs)).unwrap_or_default();
            SnakeSnapshot {
                id: snake.id.to_string(),
                name: snake.name.clone(),
                color: state.config.colors[snake.color_index % state.config.colors.len()].clone(),
                alive: snake.alive,
                head_x: round_to(head.x, POSITION_ROUNDING),
                head_y: round_to(head.y, POSITION_ROUNDING),
                angle: round_to(snake.angle, ANGLE_ROUNDING),
                speed: snake.speed,
                length: snake.length(),
                best_length: snake.best_length,
                segments,
                kills: snake.kills,
                total_kills: snake.total_kills,
                deaths: snake.deaths,
                death_reason: snake.death_reason.clone(),
                last_ai_error: snake.last_ai_error.clone(),
                submission_count: snake.submissions.len(),
                last_submission_line_count: snake.submissions.last().map(|s| s.line_count),
            }
        })
        .collect();

    let food = state
        .food
        .iter()
        .map(|f| FoodSnapshot { x: round_to(f.position.x, POSITION_ROUNDING), y: round_to(f.position.y, POSITION_ROUNDING), value: f.value })
        .collect();

    Snapshot {
        tick: state.tick,
        status: state.status.as_str().to_string(),
        arena_radius: state.config.arena_radius,
        spectator_count: state.spectator_count,
        winner_id: state.winner_id.as_ref().map(|id| id.to_string()),
        snakes,
        food,
    }
}
