use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use rand::Rng;

use crate::ai_contract::{AiDecision, AiInput, ArenaView, FoodView, OtherSnakeView, SegmentView, YouView};
use crate::geometry::{self, Point};
use crate::identifiers::SnakeId;
use crate::runtime_config::{PartialRuntimeConfig, RuntimeConfig};
use crate::session_rng::SessionRng;
use crate::world::food::Food;
use crate::world::snake::{Snake, Submission};
use crate::world::types::{GameEvent, GameStatus};

const TRAIL_SLACK_SEGMENTS: usize = 2;
const CORPSE_FOOD_VALUE_MULTIPLIER: i32 = 2;
const CORPSE_FOOD_RADIUS_MULTIPLIER: f64 = 1.5;
const CORPSE_JITTER: f64 = 5.0;
const NORMAL_FOOD_VALUE: i32 = 1;
/// How many extra food items to keep in the arena per living snake, on top
/// of `minFood`, so a crowded arena doesn't starve (spec §4.3 step 12).
const FOOD_PER_SNAKE: usize = 20;

pub struct RegisterOutcome {
    pub id: SnakeId,
    pub color: String,
    pub is_new: bool,
}

/// What the kernel must do between `begin_tick` and `finish_tick`: either
/// the tick is already done (no alive snakes — spec §4.3 step 3), or the
/// AI pool needs to be fanned out over the given inputs.
pub enum TickPhase {
    Done(TickReport),
    AwaitingAi(Vec<(SnakeId, AiInput)>),
}

#[derive(Clone, Debug, Default)]
pub struct TickReport {
    pub tick: u64,
    pub events: Vec<GameEvent>,
}

fn trail_snapshot(snake: &Snake) -> Vec<Point> {
    snake.trail.iter().copied().collect()
}

fn count_lines(source: &str) -> usize {
    source.lines().count()
}

pub struct GameState {
    pub snakes: IndexMap<SnakeId, Snake>,
    pub food: Vec<Food>,
    pub tick: u64,
    pub status: GameStatus,
    pub winner_id: Option<SnakeId>,
    pub spectator_count: u32,
    pub config: RuntimeConfig,
    /// Per-tick cache of sampled body positions, rebuilt at step 7 and
    /// reused for both collision detection and the spectator snapshot
    /// (spec §9 "Snapshot coupling").
    pub segment_cache: HashMap<SnakeId, Vec<Point>>,
    pending_begin_events: Vec<GameEvent>,
    tick_running: bool,
}

impl GameState {
    pub fn new(config: RuntimeConfig) -> Self {
        Self {
            snakes: IndexMap::new(),
            food: Vec::new(),
            tick: 0,
            status: GameStatus::Waiting,
            winner_id: None,
            spectator_count: 0,
            config,
            segment_cache: HashMap::new(),
            pending_begin_events: Vec::new(),
            tick_running: false,
        }
    }

    pub fn find_id_by_name(&self, name: &str) -> Option<SnakeId> {
        self.snakes.values().find(|s| s.name == name).map(|s| s.id.clone())
    }

    fn color_for_index(&self, index: usize) -> String {
        let palette = &self.config.colors;
        palette[index % palette.len()].clone()
    }

    // ---- commands (applied synchronously between ticks) ----

    pub fn register(
        &mut self,
        name: String,
        ai_source: String,
        wall_clock_ms: u64,
        rng: &mut SessionRng,
    ) -> RegisterOutcome {
        if let Some(existing_id) = self.find_id_by_name(&name) {
            self.submit(&existing_id, ai_source, wall_clock_ms, rng).expect("looked-up id must exist");
            let index = self.snakes.get_index_of(&existing_id).expect("looked-up id must exist");
            let color = self.color_for_index(index);
            return RegisterOutcome { id: existing_id, color, is_new: false };
        }

        let id = SnakeId::generate();
        let color_index = self.snakes.len();
        let color = self.color_for_index(color_index);
        let (head, heading) = geometry::spawn_position(self.config.arena_radius, rng.inner());

        let mut snake = Snake::new(id.clone(), name, color_index, ai_source, head, heading, &self.config);
        snake.submissions.push(Submission { tick: self.tick, line_count: count_lines(&snake.ai_source), wall_clock_ms });
        self.snakes.insert(id.clone(), snake);

        RegisterOutcome { id, color, is_new: true }
    }

    pub fn submit(
        &mut self,
        id: &SnakeId,
        ai_source: String,
        wall_clock_ms: u64,
        rng: &mut SessionRng,
    ) -> Result<(), String> {
        let (head, heading) = geometry::spawn_position(self.config.arena_radius, rng.inner());
        let config = self.config.clone();
        let tick = self.tick;
        let snake = self.snakes.get_mut(id).ok_or_else(|| "unknown snake id".to_string())?;
        snake.submissions.push(Submission { tick, line_count: count_lines(&ai_source), wall_clock_ms });
        snake.ai_source = ai_source;
        snake.respawn(head, heading, &config);
        Ok(())
    }

    pub fn remove(&mut self, id: &SnakeId) -> Result<(), String> {
        self.snakes.shift_remove(id).map(|_| ()).ok_or_else(|| "unknown snake id".to_string())
    }

    pub fn start(&mut self) {
        if self.status == GameStatus::Waiting || self.status == GameStatus::Paused {
            self.status = GameStatus::Running;
        }
    }

    pub fn pause(&mut self) {
        if self.status == GameStatus::Running {
            self.status = GameStatus::Paused;
        }
    }

    pub fn reset(&mut self, rng: &mut SessionRng) {
        self.tick = 0;
        self.food.clear();
        self.winner_id = None;
        self.segment_cache.clear();
        let config = self.config.clone();
        for snake in self.snakes.values_mut() {
            let (head, heading) = geometry::spawn_position(config.arena_radius, rng.inner());
            snake.respawn(head, heading, &config);
        }
        self.status = GameStatus::Waiting;
    }

    pub fn update_config(&mut self, patch: &PartialRuntimeConfig) -> Result<(), String> {
        self.config.apply_patch(patch)
    }

    /// Restores a previously persisted session (spec §4.6a): every snake
    /// comes back alive — a snake that was mid-death at save time is
    /// respawned fresh rather than left parked in the dead state forever
    /// — and the game always resumes as `waiting` regardless of what
    /// status was serialized.
    pub fn restore_from_save(&mut self, blob: crate::persistence::SaveBlob) {
        self.tick = blob.tick;
        self.food = blob.food;
        self.status = GameStatus::Waiting;
        self.winner_id = None;
        self.segment_cache.clear();

        let mut rng = SessionRng::from_random();
        let config = self.config.clone();
        self.snakes = IndexMap::new();
        for mut snake in blob.snakes {
            if !snake.alive {
                let (head, heading) = geometry::spawn_position(config.arena_radius, rng.inner());
                snake.respawn(head, heading, &config);
            }
            self.snakes.insert(snake.id.clone(), snake);
        }
    }

    // ---- tick pipeline ----

    /// Steps 1-4 of the pipeline (spec §4.3): tick increment, respawn
    /// sweep, the alive-check early exit, and building the AI inputs. The
    /// only `await` point in the whole tick lives between this call and
    /// `finish_tick`.
    pub fn begin_tick(&mut self, rng: &mut SessionRng) -> TickPhase {
        assert!(!self.tick_running, "tick re-entry guard tripped");
        self.tick_running = true;

        self.tick += 1;
        let mut events = Vec::new();

        if self.config.respawn_on_death {
            self.respawn_sweep(self.tick, rng, &mut events);
        }

        if self.snakes.values().all(|s| !s.alive) {
            self.tick_running = false;
            return TickPhase::Done(TickReport { tick: self.tick, events });
        }

        let inputs = self.build_ai_inputs();
        self.pending_begin_events = events;
        TickPhase::AwaitingAi(inputs)
    }

    fn respawn_sweep(&mut self, tick: u64, rng: &mut SessionRng, events: &mut Vec<GameEvent>) {
        let config = self.config.clone();
        let due: Vec<SnakeId> = self
            .snakes
            .iter()
            .filter(|(_, s)| !s.alive && s.respawn_at.map(|at| at <= tick).unwrap_or(false))
            .map(|(id, _)| id.clone())
            .collect();

        for id in due {
            let (head, heading) = geometry::spawn_position(config.arena_radius, rng.inner());
            let snake = self.snakes.get_mut(&id).expect("id from iteration must exist");
            snake.respawn(head, heading, &config);
            events.push(GameEvent::SnakeRespawned { name: snake.name.clone() });
        }
    }

    fn build_ai_inputs(&self) -> Vec<(SnakeId, AiInput)> {
        let snakes_view: Vec<OtherSnakeView> = self
            .snakes
            .values()
            .map(|s| {
                let trail = trail_snapshot(s);
                let segments = geometry::segment_positions(&trail, s.segment_count, self.config.segment_spacing)
                    .iter()
                    .map(|p| SegmentView { x: p.x, y: p.y })
                    .collect();
                OtherSnakeView {
                    id: s.id.to_string(),
                    name: s.name.clone(),
                    x: s.head().x,
                    y: s.head().y,
                    angle: s.angle,
                    segments,
                    length: s.length(),
                    alive: s.alive,
                }
            })
            .collect();

        let food_view: Vec<FoodView> =
            self.food.iter().map(|f| FoodView { x: f.position.x, y: f.position.y, value: f.value }).collect();

        self.snakes
            .values()
            .filter(|s| s.alive)
            .map(|s| {
                let trail = trail_snapshot(s);
                let you_segments = geometry::segment_positions(&trail, s.segment_count, self.config.segment_spacing)
                    .iter()
                    .map(|p| SegmentView { x: p.x, y: p.y })
                    .collect();
                let input = AiInput {
                    you: YouView {
                        id: s.id.to_string(),
                        x: s.head().x,
                        y: s.head().y,
                        angle: s.angle,
                        speed: s.speed,
                        segments: you_segments,
                        length: s.length(),
                    },
                    arena: ArenaView { radius: self.config.arena_radius },
                    snakes: snakes_view.clone(),
                    food: food_view.clone(),
                    tick: self.tick,
                };
                (s.id.clone(), input)
            })
            .collect()
    }

    /// Steps 5-13 of the pipeline: turn, move, segment cache rebuild, food
    /// eating, collisions, death processing, kill credit, food top-up, and
    /// (in tournament mode) the win check.
    pub fn finish_tick(&mut self, decisions: &HashMap<SnakeId, AiDecision>, rng: &mut SessionRng) -> TickReport {
        let mut events = std::mem::take(&mut self.pending_begin_events);

        // step 5: turn
        let max_turn_rate = self.config.max_turn_rate;
        for snake in self.snakes.values_mut() {
            if !snake.alive {
                continue;
            }
            let decision = decisions.get(&snake.id);
            snake.last_ai_error = decision.and_then(|d| d.error.clone());
            if let Some(target) = decision.and_then(|d| d.target_angle) {
                snake.angle = geometry::turn_toward(snake.angle, target, max_turn_rate);
            }
        }

        // step 6: move
        let config = self.config.clone();
        for snake in self.snakes.values_mut() {
            if !snake.alive {
                continue;
            }
            let head = snake.head();
            let new_head = Point::new(head.x + snake.angle.cos() * snake.speed, head.y + snake.angle.sin() * snake.speed);
            snake.trail.push_front(new_head);
            let max_arc = config.trail_retention_arc_length(snake.segment_count, TRAIL_SLACK_SEGMENTS);
            let mut as_vec: Vec<Point> = snake.trail.iter().copied().collect();
            geometry::prune_trail(&mut as_vec, max_arc);
            snake.trail = as_vec.into();
        }

        // step 7: rebuild visible segment cache (collision + broadcast)
        self.segment_cache.clear();
        for snake in self.snakes.values() {
            if !snake.alive {
                continue;
            }
            let trail = trail_snapshot(snake);
            let segs = geometry::segment_positions(&trail, snake.segment_count, self.config.segment_spacing);
            self.segment_cache.insert(snake.id.clone(), segs);
        }

        // step 8: food eating
        self.resolve_eating();

        // steps 9-11: collisions, death processing, kill credit
        self.resolve_collisions_and_deaths(&mut events, rng);

        // step 12: food top-up
        self.top_up_food(rng);

        // step 13: win check (tournament mode only)
        if !self.config.respawn_on_death {
            self.check_win_condition(&mut events);
        }

        self.tick_running = false;
        TickReport { tick: self.tick, events }
    }

    fn resolve_eating(&mut self) {
        let eat_radius_sq = self.config.eat_radius().powi(2);
        let food_snapshot = self.food.clone();
        let mut eaten: HashSet<usize> = HashSet::new();

        for snake in self.snakes.values_mut() {
            if !snake.alive {
                continue;
            }
            let head = snake.head();
            for (idx, food) in food_snapshot.iter().enumerate() {
                if eaten.contains(&idx) {
                    continue;
                }
                if head.dist_sq(&food.position) < eat_radius_sq {
                    snake.segment_count += food.value.max(0) as usize;
                    snake.best_length = snake.best_length.max(snake.segment_count);
                    eaten.insert(idx);
                }
            }
        }

        if !eaten.is_empty() {
            self.food = food_snapshot
                .into_iter()
                .enumerate()
                .filter(|(idx, _)| !eaten.contains(idx))
                .map(|(_, food)| food)
                .collect();
        }
    }

    fn resolve_collisions_and_deaths(&mut self, events: &mut Vec<GameEvent>, rng: &mut SessionRng) {
        let alive_ids: Vec<SnakeId> = self.snakes.iter().filter(|(_, s)| s.alive).map(|(id, _)| id.clone()).collect();
        let arena_radius = self.config.arena_radius;
        let collision_threshold_sq = (2.0 * self.config.snake_radius).powi(2);

        let mut pending: HashMap<SnakeId, (String, Option<SnakeId>)> = HashMap::new();

        // boundary
        for id in &alive_ids {
            let head = self.snakes[id].head();
            if !geometry::is_in_bounds(head.x, head.y, arena_radius) {
                pending.entry(id.clone()).or_insert(("boundary".to_string(), None));
            }
        }

        // head-vs-other-body (skip the opponent's own head at segment index 0)
        for a in &alive_ids {
            if pending.contains_key(a) {
                continue;
            }
            let a_head = self.snakes[a].head();
            for b in &alive_ids {
                if a == b {
                    continue;
                }
                let Some(b_segments) = self.segment_cache.get(b) else { continue };
                let hit = b_segments.iter().skip(1).any(|seg| a_head.dist_sq(seg) < collision_threshold_sq);
                if hit {
                    let b_name = self.snakes[b].name.clone();
                    pending.entry(a.clone()).or_insert((format!("snake:{}", b_name), Some(b.clone())));
                    break;
                }
            }
        }

        // head-vs-head (symmetric, only among snakes not already marked dead this tick)
        for i in 0..alive_ids.len() {
            for j in (i + 1)..alive_ids.len() {
                let a = &alive_ids[i];
                let b = &alive_ids[j];
                if pending.contains_key(a) || pending.contains_key(b) {
                    continue;
                }
                let a_head = self.snakes[a].head();
                let b_head = self.snakes[b].head();
                if a_head.dist_sq(&b_head) < collision_threshold_sq {
                    let a_name = self.snakes[a].name.clone();
                    let b_name = self.snakes[b].name.clone();
                    pending.insert(a.clone(), (format!("headon:{}", b_name), None));
                    pending.insert(b.clone(), (format!("headon:{}", a_name), None));
                }
            }
        }

        if pending.is_empty() {
            return;
        }

        // kill credit: revoked if the killer also died this tick (step 11)
        let credits: Vec<SnakeId> = pending
            .values()
            .filter_map(|(_, killer)| killer.clone())
            .filter(|killer_id| !pending.contains_key(killer_id))
            .collect();
        for killer_id in credits {
            if let Some(killer_snake) = self.snakes.get_mut(&killer_id) {
                killer_snake.kills += 1;
                killer_snake.total_kills += 1;
            }
        }

        // step 10: death processing
        let tick = self.tick;
        let respawn_delay_ticks = self.config.respawn_delay_ticks();
        let respawn_on_death = self.config.respawn_on_death;
        let max_food = self.config.max_food;
        let food_radius = self.config.food_radius;

        for (dead_id, (reason, _killer)) in pending {
            let segments = self.segment_cache.remove(&dead_id).unwrap_or_default();

            let snake = self.snakes.get_mut(&dead_id).expect("pending death id must exist");
            snake.alive = false;
            snake.deaths += 1;
            snake.died_at = Some(tick);
            snake.death_reason = Some(reason.clone());
            snake.respawn_at = if respawn_on_death { Some(tick + respawn_delay_ticks) } else { None };
            let name = snake.name.clone();
            snake.trail.clear();

            events.push(GameEvent::SnakeDied { name, reason });

            if !segments.is_empty() {
                let corpse_count = (segments.len() / 2).max(1);
                for i in 0..corpse_count {
                    if self.food.len() >= max_food {
                        break;
                    }
                    let idx = (i * segments.len() / corpse_count).min(segments.len() - 1);
                    let base = segments[idx];
                    let jitter_x: f64 = rng.inner().random_range(-CORPSE_JITTER..=CORPSE_JITTER);
                    let jitter_y: f64 = rng.inner().random_range(-CORPSE_JITTER..=CORPSE_JITTER);
                    let position = Point::new(base.x + jitter_x, base.y + jitter_y);
                    self.food.push(Food::new(
                        position,
                        NORMAL_FOOD_VALUE * CORPSE_FOOD_VALUE_MULTIPLIER,
                        food_radius * CORPSE_FOOD_RADIUS_MULTIPLIER,
                    ));
                }
            }
        }
    }

    fn top_up_food(&mut self, rng: &mut SessionRng) {
        let target = (self.config.min_food + FOOD_PER_SNAKE * self.snakes.len()).min(self.config.max_food);
        while self.food.len() < target {
            let position = geometry::spawn_food_position(self.config.arena_radius, rng.inner());
            self.food.push(Food::new(position, NORMAL_FOOD_VALUE, self.config.food_radius));
        }
    }

    fn check_win_condition(&mut self, events: &mut Vec<GameEvent>) {
        let total = self.snakes.len();
        let alive_count = self.snakes.values().filter(|s| s.alive).count();
        if alive_count <= 1 && total >= 2 && self.status != GameStatus::Finished {
            self.status = GameStatus::Finished;
            let winner = self.snakes.values().find(|s| s.alive);
            self.winner_id = winner.map(|s| s.id.clone());
            events.push(GameEvent::Finished {
                winner_id: winner.map(|s| s.id.to_string()),
                winner_name: winner.map(|s| s.name.clone()),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_state() -> GameState {
        GameState::new(RuntimeConfig::default())
    }

    fn register(state: &mut GameState, name: &str, rng: &mut SessionRng) -> SnakeId {
        state.register(name.to_string(), "fn move(s) { 0.0 }".to_string(), 1, rng).id
    }

    #[test]
    fn register_assigns_distinct_ids_and_round_robin_colors() {
        let mut state = new_state();
        let mut rng = SessionRng::new(1);
        let a = register(&mut state, "alpha", &mut rng);
        let b = register(&mut state, "beta", &mut rng);
        assert_ne!(a, b);
        assert_ne!(state.snakes[&a].color_index, state.snakes[&b].color_index);
    }

    #[test]
    fn re_registering_existing_name_respawns_rather_than_duplicating() {
        let mut state = new_state();
        let mut rng = SessionRng::new(1);
        let a = register(&mut state, "alpha", &mut rng);
        let outcome = state.register("alpha".to_string(), "fn move(s) { 1.0 }".to_string(), 2, &mut rng);
        assert_eq!(outcome.id, a);
        assert!(!outcome.is_new);
        assert_eq!(state.snakes.len(), 1);
        assert_eq!(state.snakes[&a].submissions.len(), 2);
    }

    #[test]
    fn reset_preserves_registrations_but_clears_tick_and_food() {
        let mut state = new_state();
        let mut rng = SessionRng::new(7);
        register(&mut state, "alpha", &mut rng);
        register(&mut state, "beta", &mut rng);
        state.tick = 42;
        state.food.push(Food::new(Point::new(0.0, 0.0), 1, 6.0));

        state.reset(&mut rng);

        assert_eq!(state.tick, 0);
        assert!(state.food.is_empty());
        assert_eq!(state.snakes.len(), 2);
        assert!(state.snakes.values().all(|s| s.alive));
    }

    #[test]
    fn a_tick_with_no_alive_snakes_completes_without_awaiting_ai() {
        let mut state = new_state();
        let mut rng = SessionRng::new(3);
        match state.begin_tick(&mut rng) {
            TickPhase::Done(report) => assert_eq!(report.tick, 1),
            TickPhase::AwaitingAi(_) => panic!("expected immediate completion with no snakes registered"),
        }
    }

    #[test]
    fn holding_decision_preserves_heading_and_moves_forward() {
        let mut state = new_state();
        let mut rng = SessionRng::new(3);
        let id = register(&mut state, "alpha", &mut rng);
        let start_head = state.snakes[&id].head();
        let start_angle = state.snakes[&id].angle;

        let inputs = match state.begin_tick(&mut rng) {
            TickPhase::AwaitingAi(inputs) => inputs,
            TickPhase::Done(_) => panic!("expected AI fan-out with one alive snake"),
        };
        assert_eq!(inputs.len(), 1);

        let mut decisions = HashMap::new();
        decisions.insert(id.clone(), AiDecision::hold());
        state.finish_tick(&decisions, &mut rng);

        let snake = &state.snakes[&id];
        assert_eq!(snake.angle, start_angle);
        assert!(snake.head().dist(&start_head) > 0.0);
    }

    #[test]
    fn a_snake_that_crosses_the_boundary_dies_with_reason_boundary() {
        let mut state = new_state();
        state.config.arena_radius = 50.0;
        let mut rng = SessionRng::new(9);
        let id = register(&mut state, "alpha", &mut rng);
        {
            let snake = state.snakes.get_mut(&id).unwrap();
            snake.angle = 0.0;
            snake.trail.push_front(Point::new(49.0, 0.0));
        }

        let inputs = match state.begin_tick(&mut rng) {
            TickPhase::AwaitingAi(inputs) => inputs,
            TickPhase::Done(_) => panic!("expected AI fan-out"),
        };
        let mut decisions = HashMap::new();
        decisions.insert(inputs[0].0.clone(), AiDecision::hold());
        state.finish_tick(&decisions, &mut rng);

        let snake = &state.snakes[&id];
        assert!(!snake.alive);
        assert_eq!(snake.death_reason.as_deref(), Some("boundary"));
    }

    #[test]
    fn head_on_collision_kills_both_snakes_symmetrically() {
        let mut state = new_state();
        let mut rng = SessionRng::new(11);
        let a = register(&mut state, "alpha", &mut rng);
        let b = register(&mut state, "beta", &mut rng);

        {
            let snake_a = state.snakes.get_mut(&a).unwrap();
            snake_a.trail.clear();
            snake_a.trail.push_front(Point::new(-2.0, 0.0));
            snake_a.angle = 0.0;
        }
        {
            let snake_b = state.snakes.get_mut(&b).unwrap();
            snake_b.trail.clear();
            snake_b.trail.push_front(Point::new(2.0, 0.0));
            snake_b.angle = std::f64::consts::PI;
        }

        let inputs = match state.begin_tick(&mut rng) {
            TickPhase::AwaitingAi(inputs) => inputs,
            TickPhase::Done(_) => panic!("expected AI fan-out"),
        };
        let mut decisions = HashMap::new();
        for (id, _) in &inputs {
            decisions.insert(id.clone(), AiDecision::hold());
        }
        state.finish_tick(&decisions, &mut rng);

        assert!(!state.snakes[&a].alive);
        assert!(!state.snakes[&b].alive);
        assert_eq!(state.snakes[&a].kills, 0);
        assert_eq!(state.snakes[&b].kills, 0);
    }

    #[test]
    fn killer_gets_credit_only_if_it_survives_the_tick() {
        let mut state = new_state();
        let mut rng = SessionRng::new(13);
        let victim = register(&mut state, "victim", &mut rng);
        let killer = register(&mut state, "killer", &mut rng);

        let killer_body_point = {
            let trail = trail_snapshot(&state.snakes[&killer]);
            let segs = geometry::segment_positions(&trail, state.snakes[&killer].segment_count, state.config.segment_spacing);
            segs[1]
        };
        {
            let snake_victim = state.snakes.get_mut(&victim).unwrap();
            snake_victim.trail.clear();
            snake_victim.trail.push_front(killer_body_point);
        }

        let inputs = match state.begin_tick(&mut rng) {
            TickPhase::AwaitingAi(inputs) => inputs,
            TickPhase::Done(_) => panic!("expected AI fan-out"),
        };
        let mut decisions = HashMap::new();
        for (id, _) in &inputs {
            decisions.insert(id.clone(), AiDecision::hold());
        }
        state.finish_tick(&decisions, &mut rng);

        assert!(!state.snakes[&victim].alive);
        assert!(state.snakes[&killer].alive);
        assert_eq!(state.snakes[&killer].kills, 1);
        assert_eq!(state.snakes[&killer].total_kills, 1);
    }

    #[test]
    fn tournament_mode_declares_a_winner_when_two_of_three_die_in_the_same_tick() {
        let mut state = new_state();
        state.config.respawn_on_death = false;
        let mut rng = SessionRng::new(17);
        let a = register(&mut state, "a", &mut rng);
        let b = register(&mut state, "b", &mut rng);
        let survivor = register(&mut state, "survivor", &mut rng);

        // a and b collide head-on; survivor is placed far away, unaffected.
        {
            let snake_a = state.snakes.get_mut(&a).unwrap();
            snake_a.trail.clear();
            snake_a.trail.push_front(Point::new(-2.0, 0.0));
            snake_a.angle = 0.0;
        }
        {
            let snake_b = state.snakes.get_mut(&b).unwrap();
            snake_b.trail.clear();
            snake_b.trail.push_front(Point::new(2.0, 0.0));
            snake_b.angle = std::f64::consts::PI;
        }
        {
            let snake_survivor = state.snakes.get_mut(&survivor).unwrap();
            snake_survivor.trail.clear();
            snake_survivor.trail.push_front(Point::new(500.0, 500.0));
        }

        let inputs = match state.begin_tick(&mut rng) {
            TickPhase::AwaitingAi(inputs) => inputs,
            TickPhase::Done(_) => panic!("expected AI fan-out"),
        };
        let mut decisions = HashMap::new();
        for (id, _) in &inputs {
            decisions.insert(id.clone(), AiDecision::hold());
        }
        let report = state.finish_tick(&decisions, &mut rng);

        assert_eq!(state.status, GameStatus::Finished);
        assert_eq!(state.winner_id, Some(survivor.clone()));
        assert!(!state.snakes[&a].alive);
        assert!(!state.snakes[&b].alive);
        assert!(state.snakes[&survivor].alive);
        assert!(report.events.iter().any(|e| matches!(e, GameEvent::Finished { winner_id, .. } if winner_id.as_deref() == Some(survivor.as_str()))));
    }

    #[test]
    fn eating_food_grows_the_snake_and_removes_the_tile_then_tops_back_up() {
        let mut state = new_state();
        state.config.min_food = 1;
        state.config.max_food = 5;
        let mut rng = SessionRng::new(19);
        let id = register(&mut state, "alpha", &mut rng);
        {
            let snake = state.snakes.get_mut(&id).unwrap();
            snake.trail.clear();
            snake.trail.push_front(Point::new(0.0, 0.0));
            snake.angle = 0.0;
        }
        state.food.clear();
        state.food.push(Food::new(Point::new(10.0, 0.0), 3, 6.0));
        let starting_segments = state.snakes[&id].segment_count;

        let inputs = match state.begin_tick(&mut rng) {
            TickPhase::AwaitingAi(inputs) => inputs,
            TickPhase::Done(_) => panic!("expected AI fan-out"),
        };
        let mut decisions = HashMap::new();
        decisions.insert(inputs[0].0.clone(), AiDecision::hold());
        state.finish_tick(&decisions, &mut rng);

        assert_eq!(state.snakes[&id].segment_count, starting_segments + 3);
        assert!(!state.food.iter().any(|f| f.position.dist(&Point::new(10.0, 0.0)) < 0.01));
        assert!(state.food.len() >= state.config.min_food);
    }

    #[test]
    fn a_single_tick_can_eat_every_unclaimed_tile_within_the_eat_radius() {
        let mut state = new_state();
        state.config.min_food = 0;
        state.config.max_food = 10;
        let mut rng = SessionRng::new(23);
        let id = register(&mut state, "alpha", &mut rng);
        {
            let snake = state.snakes.get_mut(&id).unwrap();
            snake.trail.clear();
            snake.trail.push_front(Point::new(0.0, 0.0));
            snake.angle = 0.0;
        }
        state.food.clear();
        // both tiles sit well inside eatRadius = snakeRadius(12) + foodRadius(6) = 18
        state.food.push(Food::new(Point::new(5.0, 0.0), 2, 6.0));
        state.food.push(Food::new(Point::new(-5.0, 0.0), 4, 6.0));
        let starting_segments = state.snakes[&id].segment_count;

        let inputs = match state.begin_tick(&mut rng) {
            TickPhase::AwaitingAi(inputs) => inputs,
            TickPhase::Done(_) => panic!("expected AI fan-out"),
        };
        let mut decisions = HashMap::new();
        decisions.insert(inputs[0].0.clone(), AiDecision::hold());
        state.finish_tick(&decisions, &mut rng);

        assert_eq!(state.snakes[&id].segment_count, starting_segments + 2 + 4);
        assert!(!state.food.iter().any(|f| f.position.dist(&Point::new(5.0, 0.0)) < 0.01));
        assert!(!state.food.iter().any(|f| f.position.dist(&Point::new(-5.0, 0.0)) < 0.01));
    }
}
