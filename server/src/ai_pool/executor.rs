//! One AI executor slot: an owned `rhai::Engine`, a single-entry compiled
//! AST cache keyed by exact source equality, and the cooperative progress
//! interrupt that approximates a wall-clock deadline (spec §4.2a).

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use arena_common::ai_contract::{AiDecision, AiInput};
use rhai::{AST, Dynamic, Engine, EvalAltResult, Scope};

use crate::server_config::MAX_AI_SOURCE_CHARS;

/// Rhai operations budgeted per millisecond of `aiTimeoutMs`. Calibrated so
/// a tight `while(true){}` trips the interrupt well inside the wall-clock
/// deadline enforced independently by `tokio::time::timeout` in the pool.
const OPS_PER_MS: u64 = 5_000;

const PROGRESS_INTERRUPT_TOKEN: &str = "__arena_ai_timeout__";

/// Identifiers the denylist scrub rejects outright, layered on top of
/// Rhai's own sandboxing (defense-in-depth, not the security boundary —
/// spec §9, Non-goals §1).
const DENYLIST: [&str; 4] = ["eval", "import", "export", "throw"];

fn register_helpers(engine: &mut Engine) {
    engine.register_fn("angleTo", |x1: f64, y1: f64, x2: f64, y2: f64| (y2 - y1).atan2(x2 - x1));
    engine.register_fn("distTo", |x1: f64, y1: f64, x2: f64, y2: f64| ((x2 - x1).powi(2) + (y2 - y1).powi(2)).sqrt());
    engine.register_fn("distFromCenter", |x: f64, y: f64| (x * x + y * y).sqrt());
}

pub fn scrub_source(source: &str) -> Result<(), String> {
    if source.chars().count() > MAX_AI_SOURCE_CHARS {
        return Err(format!("program exceeds {} characters", MAX_AI_SOURCE_CHARS));
    }
    for forbidden in DENYLIST {
        if source.contains(forbidden) {
            return Err(format!("program uses a scrubbed identifier: {}", forbidden));
        }
    }
    Ok(())
}

pub struct Executor {
    engine: Engine,
    op_budget: Arc<AtomicU64>,
    cached: Option<(String, AST)>,
}

impl Executor {
    pub fn new() -> Self {
        let op_budget = Arc::new(AtomicU64::new(u64::MAX));
        let budget_for_progress = op_budget.clone();
        let mut engine = Engine::new();
        engine.disable_symbol("eval");
        engine.set_max_expr_depths(64, 64);
        engine.on_progress(move |count| {
            if count > budget_for_progress.load(Ordering::Relaxed) {
                Some(Dynamic::from(PROGRESS_INTERRUPT_TOKEN.to_string()))
            } else {
                None
            }
        });
        register_helpers(&mut engine);
        Self { engine, op_budget, cached: None }
    }

    /// Recreates the engine and clears the AST cache. Called by the pool
    /// after a timeout or a panic so a misbehaving program can never leave
    /// state (e.g. a poisoned cache entry) in a slot reused by another
    /// snake.
    pub fn recycle(&mut self) {
        *self = Self::new();
    }

    pub fn run(&mut self, source: &str, ai_timeout_ms: u64, input: &AiInput) -> AiDecision {
        if let Err(err) = scrub_source(source) {
            return AiDecision::failed(err);
        }

        let ast = match self.compile_cached(source) {
            Ok(ast) => ast,
            Err(err) => return AiDecision::failed(format!("compile error: {}", err)),
        };

        self.op_budget.store(ai_timeout_ms.saturating_mul(OPS_PER_MS).max(1), Ordering::Relaxed);

        let state = match rhai::serde::to_dynamic(input) {
            Ok(state) => state,
            Err(err) => return AiDecision::failed(format!("failed to build AI state: {}", err)),
        };

        let mut scope = Scope::new();
        let result = self.engine.call_fn::<Dynamic>(&mut scope, &ast, "move", (state,));

        match result {
            Ok(value) => decision_from_return(&value, input.you.x, input.you.y),
            Err(err) => AiDecision::failed(describe_error(&err)),
        }
    }

    fn compile_cached(&mut self, source: &str) -> Result<AST, String> {
        if let Some((cached_source, ast)) = &self.cached {
            if cached_source == source {
                return Ok(ast.clone());
            }
        }
        let ast = self.engine.compile(source).map_err(|e| e.to_string())?;
        self.cached = Some((source.to_string(), ast.clone()));
        Ok(ast)
    }
}

impl Default for Executor {
    fn default() -> Self {
        Self::new()
    }
}

fn is_timeout(err: &EvalAltResult) -> bool {
    matches!(err, EvalAltResult::ErrorTerminated(token, _) if token.to_string() == PROGRESS_INTERRUPT_TOKEN)
}

fn describe_error(err: &EvalAltResult) -> String {
    if is_timeout(err) {
        "AI timed out".to_string()
    } else {
        format!("AI error: {}", err)
    }
}

/// Coerces a script's return value into a steering decision. A `{x, y}`
/// point is converted to a bearing *from the snake's own head*
/// (`head_x`/`head_y`, i.e. `AiInput.you.x/.y`) per spec §4.2/§6:
/// `atan2(y - head.y, x - head.x)`, not a bearing from the origin.
fn decision_from_return(value: &Dynamic, head_x: f64, head_y: f64) -> AiDecision {
    if value.is_unit() {
        return AiDecision::hold();
    }
    if let Some(raw) = raw_number(value) {
        return match finite(raw) {
            Some(angle) => AiDecision::steer(angle),
            None => AiDecision::failed("Invalid return"),
        };
    }
    if let Some(map) = value.clone().try_cast::<rhai::Map>() {
        let x = map.get("x").and_then(raw_number);
        let y = map.get("y").and_then(raw_number);
        if let (Some(x), Some(y)) = (x, y) {
            return match (finite(x), finite(y)) {
                (Some(x), Some(y)) => AiDecision::steer((y - head_y).atan2(x - head_x)),
                _ => AiDecision::failed("Invalid return"),
            };
        }
    }
    AiDecision::failed("Invalid return")
}

fn raw_number(value: &Dynamic) -> Option<f64> {
    if let Ok(f) = value.as_float() {
        return Some(f);
    }
    if let Ok(i) = value.as_int() {
        return Some(i as f64);
    }
    None
}

fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arena_common::ai_contract::{ArenaView, YouView};

    fn sample_input() -> AiInput {
        AiInput {
            you: YouView { id: "a".into(), x: 0.0, y: 0.0, angle: 0.0, speed: 4.0, segments: vec![], length: 10 },
            arena: ArenaView { radius: 2000.0 },
            snakes: vec![],
            food: vec![],
            tick: 1,
        }
    }

    #[test]
    fn numeric_return_steers_to_that_angle() {
        let mut executor = Executor::new();
        let decision = executor.run("fn move(state) { 1.5 }", 50, &sample_input());
        assert_eq!(decision.target_angle, Some(1.5));
        assert!(decision.error.is_none());
    }

    #[test]
    fn point_return_is_converted_to_bearing() {
        let mut executor = Executor::new();
        let decision = executor.run("fn move(state) { #{x: 10.0, y: 0.0} }", 50, &sample_input());
        assert_eq!(decision.target_angle, Some(0.0));
    }

    #[test]
    fn point_return_is_converted_to_bearing_from_the_snakes_head_not_the_origin() {
        let mut executor = Executor::new();
        let mut input = sample_input();
        input.you.x = 1000.0;
        input.you.y = 1000.0;
        let decision = executor.run("fn move(state) { #{x: 1000.0, y: 1100.0} }", 50, &input);
        assert!((decision.target_angle.unwrap() - std::f64::consts::FRAC_PI_2).abs() < 1e-9);
    }

    #[test]
    fn non_finite_numeric_return_is_rejected_as_invalid() {
        let mut executor = Executor::new();
        let decision = executor.run("fn move(state) { 0.0 / 0.0 }", 50, &sample_input());
        assert_eq!(decision.error.as_deref(), Some("Invalid return"));
        assert!(decision.target_angle.is_none());
    }

    #[test]
    fn non_finite_point_component_is_rejected_as_invalid() {
        let mut executor = Executor::new();
        let decision = executor.run("fn move(state) { #{x: 1.0 / 0.0, y: 0.0} }", 50, &sample_input());
        assert_eq!(decision.error.as_deref(), Some("Invalid return"));
        assert!(decision.target_angle.is_none());
    }

    #[test]
    fn unit_return_holds_heading() {
        let mut executor = Executor::new();
        let decision = executor.run("fn move(state) { }", 50, &sample_input());
        assert!(decision.target_angle.is_none());
        assert!(decision.error.is_none());
    }

    #[test]
    fn a_runaway_loop_is_interrupted_and_reports_timeout() {
        let mut executor = Executor::new();
        let decision = executor.run("fn move(state) { let x = 0; while (true) { x += 1; } }", 5, &sample_input());
        assert_eq!(decision.error.as_deref(), Some("AI timed out"));
        assert!(decision.target_angle.is_none());
    }

    #[test]
    fn denylisted_identifier_is_rejected_before_compilation() {
        let mut executor = Executor::new();
        let decision = executor.run("fn move(state) { eval(\"1\") }", 50, &sample_input());
        assert!(decision.error.is_some());
    }

    #[test]
    fn recompiling_identical_source_reuses_the_cached_ast() {
        let mut executor = Executor::new();
        let source = "fn move(state) { 0.5 }";
        executor.run(source, 50, &sample_input());
        assert!(executor.cached.is_some());
        let cached_source = executor.cached.as_ref().unwrap().0.clone();
        executor.run(source, 50, &sample_input());
        assert_eq!(cached_source, source);
    }
}
