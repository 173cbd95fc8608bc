use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::geometry::Point;
use crate::identifiers::SnakeId;
use crate::runtime_config::RuntimeConfig;

/// One `submit` or initial `register` event, recorded for the stats
/// surfaced in the spectator snapshot (spec §3, §4.5).
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub tick: u64,
    pub line_count: usize,
    pub wall_clock_ms: u64,
}

/// Points appended behind a freshly spawned head, trailing opposite the
/// spawn heading, used both for the ordinary respawn path and the
/// respawn-sweep's explicit "startingSegments × 3 points" trail (spec
/// §4.3 step 2, §4.4).
fn build_initial_trail(head: Point, heading: f64, point_count: usize, point_spacing: f64) -> VecDeque<Point> {
    let mut trail = VecDeque::with_capacity(point_count.max(1));
    trail.push_back(head);
    let back_x = -heading.cos();
    let back_y = -heading.sin();
    for i in 1..point_count {
        let d = i as f64 * point_spacing;
        trail.push_back(Point::new(head.x + back_x * d, head.y + back_y * d));
    }
    trail
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snake {
    pub id: SnakeId,
    pub name: String,
    pub color_index: usize,
    pub angle: f64,
    pub speed: f64,
    pub trail: VecDeque<Point>,
    pub segment_count: usize,
    pub alive: bool,
    pub died_at: Option<u64>,
    pub death_reason: Option<String>,
    pub respawn_at: Option<u64>,
    pub kills: u32,
    pub total_kills: u32,
    pub deaths: u32,
    pub best_length: usize,
    pub submissions: Vec<Submission>,
    #[serde(rename = "aiFunction")]
    pub ai_source: String,
    pub last_ai_error: Option<String>,
}

impl Snake {
    pub fn new(
        id: SnakeId,
        name: String,
        color_index: usize,
        ai_source: String,
        head: Point,
        heading: f64,
        config: &RuntimeConfig,
    ) -> Self {
        Self {
            id,
            name,
            color_index,
            angle: heading,
            speed: config.snake_speed,
            trail: build_initial_trail(head, heading, config.starting_segments * 3, config.segment_spacing / 2.0),
            segment_count: config.starting_segments,
            alive: true,
            died_at: None,
            death_reason: None,
            respawn_at: None,
            kills: 0,
            total_kills: 0,
            deaths: 0,
            best_length: config.starting_segments,
            submissions: Vec::new(),
            ai_source,
            last_ai_error: None,
        }
    }

    pub fn head(&self) -> Point {
        *self.trail.front().expect("alive snake's trail must never be empty")
    }

    /// Idempotent respawn per spec §4.4: never allocates an id or color;
    /// resets per-life state while preserving lifetime and submission
    /// stats.
    pub fn respawn(&mut self, head: Point, heading: f64, config: &RuntimeConfig) {
        self.angle = heading;
        self.speed = config.snake_speed;
        self.trail = build_initial_trail(head, heading, config.starting_segments * 3, config.segment_spacing / 2.0);
        self.segment_count = config.starting_segments;
        self.alive = true;
        self.died_at = None;
        self.death_reason = None;
        self.respawn_at = None;
        self.kills = 0;
        self.last_ai_error = None;
    }

    pub fn length(&self) -> usize {
        self.segment_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> RuntimeConfig {
        RuntimeConfig::default()
    }

    #[test]
    fn new_snake_head_matches_trail_front() {
        let s = Snake::new(
            SnakeId::new("a"),
            "A".into(),
            0,
            "fn move(s) { 0.0 }".into(),
            Point::new(10.0, 10.0),
            0.0,
            &config(),
        );
        assert_eq!(s.head(), Point::new(10.0, 10.0));
        assert!(s.alive);
        assert_eq!(s.segment_count, config().starting_segments);
    }

    #[test]
    fn respawn_preserves_lifetime_stats_and_resets_per_life_state() {
        let cfg = config();
        let mut s = Snake::new(SnakeId::new("a"), "A".into(), 0, "src".into(), Point::new(0.0, 0.0), 0.0, &cfg);
        s.kills = 3;
        s.total_kills = 9;
        s.deaths = 2;
        s.best_length = 40;
        s.alive = false;
        s.death_reason = Some("boundary".into());
        s.submissions.push(Submission { tick: 1, line_count: 4, wall_clock_ms: 2 });

        s.respawn(Point::new(5.0, 5.0), 1.0, &cfg);

        assert!(s.alive);
        assert_eq!(s.kills, 0);
        assert_eq!(s.total_kills, 9);
        assert_eq!(s.deaths, 2);
        assert_eq!(s.best_length, 40);
        assert_eq!(s.submissions.len(), 1);
        assert_eq!(s.death_reason, None);
        assert_eq!(s.head(), Point::new(5.0, 5.0));
    }
}
