//! The kernel: a single task that owns `GameState` by value and is the
//! only writer in the system (spec §5). Runs the tick loop, drains the
//! command queue, and publishes both the authoritative state and the
//! lossy spectator snapshot after every tick.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use arena_common::log;
use arena_common::session_rng::SessionRng;
use arena_common::snapshot::{self, Snapshot};
use arena_common::world::{GameEvent, GameState, TickPhase, TickReport};
use tokio::sync::{Notify, mpsc, watch};

use crate::ai_pool::AiPool;
use crate::broadcaster::Broadcaster;
use crate::kernel::commands::KernelCommand;
use crate::state_doc::{ApiStateDoc, build_state_doc};

#[derive(Clone)]
pub struct KernelHandle {
    pub command_tx: mpsc::UnboundedSender<KernelCommand>,
    pub state_rx: watch::Receiver<Arc<ApiStateDoc>>,
    pub snapshot_rx: watch::Receiver<Arc<Snapshot>>,
}

pub struct Scheduler {
    state: GameState,
    rng: SessionRng,
    ai_pool: AiPool,
    command_rx: mpsc::UnboundedReceiver<KernelCommand>,
    state_tx: watch::Sender<Arc<ApiStateDoc>>,
    snapshot_tx: watch::Sender<Arc<Snapshot>>,
    broadcaster: Broadcaster,
    persistence_notify: Arc<Notify>,
    tick_running: AtomicBool,
}

pub fn spawn(
    initial_state: GameState,
    rng: SessionRng,
    ai_pool_size: usize,
    broadcaster: Broadcaster,
    persistence_notify: Arc<Notify>,
) -> KernelHandle {
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (state_tx, state_rx) = watch::channel(Arc::new(build_state_doc(&initial_state)));
    let (snapshot_tx, snapshot_rx) = watch::channel(Arc::new(snapshot::build_snapshot(&initial_state)));

    let scheduler = Scheduler {
        state: initial_state,
        rng,
        ai_pool: AiPool::new(ai_pool_size),
        command_rx,
        state_tx,
        snapshot_tx,
        broadcaster,
        persistence_notify,
        tick_running: AtomicBool::new(false),
    };

    tokio::spawn(scheduler.run());

    KernelHandle { command_tx, state_rx, snapshot_rx }
}

impl Scheduler {
    pub async fn run(mut self) {
        loop {
            let tick_rate_ms = self.state.config.tick_rate_ms;
            tokio::time::sleep(Duration::from_millis(tick_rate_ms)).await;

            self.drain_commands().await;
            self.maybe_run_tick().await;
        }
    }

    async fn drain_commands(&mut self) {
        while let Ok(cmd) = self.command_rx.try_recv() {
            self.apply_command(cmd).await;
        }
    }

    async fn apply_command(&mut self, cmd: KernelCommand) {
        match cmd {
            KernelCommand::Register { name, ai_source, wall_clock_ms, reply } => {
                let name_for_event = name.clone();
                let outcome = self.state.register(name, ai_source, wall_clock_ms, &mut self.rng);
                self.emit_event(&GameEvent::SnakeRegistered { name: name_for_event, color: outcome.color.clone() }).await;
                let _ = reply.send(outcome);
            }
            KernelCommand::Submit { id, ai_source, wall_clock_ms, reply } => {
                let result = self.state.submit(&id, ai_source, wall_clock_ms, &mut self.rng);
                let _ = reply.send(result);
            }
            KernelCommand::Remove { id, reply } => {
                let result = self.state.remove(&id);
                let _ = reply.send(result);
            }
            KernelCommand::Start => {
                self.state.start();
                self.emit_event(&GameEvent::Started).await;
            }
            KernelCommand::Pause => {
                self.state.pause();
                self.emit_event(&GameEvent::Paused).await;
            }
            KernelCommand::Reset => {
                self.state.reset(&mut self.rng);
                self.emit_event(&GameEvent::Reset).await;
            }
            KernelCommand::UpdateConfig { patch, reply } => {
                let result = self.state.update_config(&patch);
                let _ = reply.send(result);
            }
        }
    }

    async fn maybe_run_tick(&mut self) {
        use arena_common::world::GameStatus;
        if self.state.status != GameStatus::Running {
            return;
        }

        assert!(!self.tick_running.load(Ordering::SeqCst), "tick re-entry guard tripped");
        self.tick_running.store(true, Ordering::SeqCst);

        let phase = self.state.begin_tick(&mut self.rng);
        let report = match phase {
            TickPhase::Done(report) => report,
            TickPhase::AwaitingAi(inputs) => {
                let ai_timeout_ms = self.state.config.ai_timeout_ms;
                let jobs = inputs
                    .into_iter()
                    .map(|(id, input)| {
                        let source = self.state.snakes[&id].ai_source.clone();
                        (id, source, input)
                    })
                    .collect();
                let decisions = self.ai_pool.dispatch(ai_timeout_ms, jobs).await;
                self.state.finish_tick(&decisions, &mut self.rng)
            }
        };

        self.tick_running.store(false, Ordering::SeqCst);
        self.publish(&report).await;
    }

    async fn publish(&mut self, report: &TickReport) {
        self.state.spectator_count = self.broadcaster.connection_count().await;

        let doc = Arc::new(build_state_doc(&self.state));
        if self.state_tx.send(doc).is_err() {
            log!("no subscribers left on the state channel");
        }

        let snapshot = Arc::new(snapshot::build_snapshot(&self.state));
        let _ = self.snapshot_tx.send(snapshot.clone());
        self.persistence_notify.notify_one();

        self.broadcaster.broadcast_json(&serde_json::json!({"event": "game:tick", "data": &*snapshot})).await;
        for event in &report.events {
            self.emit_event(event).await;
        }
    }

    async fn emit_event(&self, event: &GameEvent) {
        if let Ok(value) = serde_json::to_value(event) {
            self.broadcaster.broadcast_json(&value).await;
        }
    }
}
