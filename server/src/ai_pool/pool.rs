//! Fixed-size pool of AI executor slots (spec §4.2, §9 "Executor slot").
//! Jobs are assigned round-robin across slots and run concurrently via
//! `spawn_blocking`; `tokio::time::timeout` is the independent wall-clock
//! backstop behind Rhai's own cooperative `on_progress` interrupt.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use arena_common::ai_contract::{AiDecision, AiInput};
use arena_common::identifiers::SnakeId;
use arena_common::log;
use futures_util::future::join_all;

use crate::ai_pool::executor::Executor;

/// Grace period added to `aiTimeoutMs` before the pool gives up waiting on
/// a slot; Rhai's own progress interrupt should always fire first.
const TIMEOUT_SLACK_MS: u64 = 25;

pub struct AiPool {
    slots: Vec<Arc<Mutex<Executor>>>,
}

impl AiPool {
    pub fn new(size: usize) -> Self {
        Self { slots: (0..size.max(1)).map(|_| Arc::new(Mutex::new(Executor::new()))).collect() }
    }

    /// Runs every job's `move(state)` entry point, returning each snake's
    /// decision keyed by id. Jobs beyond the pool's slot count queue behind
    /// earlier ones on the same slot rather than spawning unboundedly.
    pub async fn dispatch(&self, ai_timeout_ms: u64, jobs: Vec<(SnakeId, String, AiInput)>) -> HashMap<SnakeId, AiDecision> {
        let deadline = Duration::from_millis(ai_timeout_ms + TIMEOUT_SLACK_MS);

        let futures = jobs.into_iter().enumerate().map(|(i, (id, source, input))| {
            let slot = self.slots[i % self.slots.len()].clone();
            async move {
                let id_for_log = id.clone();
                let task = tokio::task::spawn_blocking(move || {
                    let mut executor = slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
                    executor.run(&source, ai_timeout_ms, &input)
                });

                match tokio::time::timeout(deadline, task).await {
                    Ok(Ok(decision)) => (id, decision),
                    Ok(Err(join_err)) => {
                        log!("AI executor panicked for snake {}: {}", id_for_log, join_err);
                        recycle_slot(&slot);
                        (id, AiDecision::failed("executor crashed"))
                    }
                    Err(_elapsed) => {
                        log!("AI executor wall-clock timeout for snake {}", id_for_log);
                        recycle_slot(&slot);
                        (id, AiDecision::failed("AI timed out"))
                    }
                }
            }
        });

        join_all(futures).await.into_iter().collect()
    }
}

/// Replaces a slot's engine and cache after a crash or timeout (spec §9
/// "Executor crashes: the affected slot is replaced"). Uses `try_lock`
/// rather than blocking: if the offending `spawn_blocking` task is still
/// running, it will finish and drop its guard on its own; there is no
/// need to stall the async runtime waiting for it.
fn recycle_slot(slot: &Arc<Mutex<Executor>>) {
    if let Ok(mut executor) = slot.try_lock() {
        executor.recycle();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arena_common::ai_contract::{ArenaView, YouView};

    fn input(id: &str) -> AiInput {
        AiInput {
            you: YouView { id: id.to_string(), x: 0.0, y: 0.0, angle: 0.0, speed: 4.0, segments: vec![], length: 10 },
            arena: ArenaView { radius: 2000.0 },
            snakes: vec![],
            food: vec![],
            tick: 1,
        }
    }

    #[tokio::test]
    async fn dispatch_runs_every_job_and_keys_results_by_id() {
        let pool = AiPool::new(2);
        let jobs = vec![
            (SnakeId::new("a"), "fn move(state) { 1.0 }".to_string(), input("a")),
            (SnakeId::new("b"), "fn move(state) { 2.0 }".to_string(), input("b")),
        ];

        let decisions = pool.dispatch(50, jobs).await;

        assert_eq!(decisions.len(), 2);
        assert_eq!(decisions[&SnakeId::new("a")].target_angle, Some(1.0));
        assert_eq!(decisions[&SnakeId::new("b")].target_angle, Some(2.0));
    }

    #[tokio::test]
    async fn a_runaway_program_times_out_without_blocking_other_snakes() {
        let pool = AiPool::new(2);
        let jobs = vec![
            (SnakeId::new("slow"), "fn move(state) { let x = 0; while (true) { x += 1; } }".to_string(), input("slow")),
            (SnakeId::new("fast"), "fn move(state) { 0.5 }".to_string(), input("fast")),
        ];

        let decisions = pool.dispatch(5, jobs).await;

        assert!(decisions[&SnakeId::new("slow")].error.is_some());
        assert_eq!(decisions[&SnakeId::new("fast")].target_angle, Some(0.5));
    }

    #[tokio::test]
    async fn more_jobs_than_slots_all_still_complete() {
        let pool = AiPool::new(2);
        let jobs: Vec<_> = (0..5)
            .map(|i| (SnakeId::new(format!("s{}", i)), "fn move(state) { 0.0 }".to_string(), input("s")))
            .collect();

        let decisions = pool.dispatch(50, jobs).await;

        assert_eq!(decisions.len(), 5);
    }
}
