use arena_common::identifiers::SnakeId;
use arena_common::runtime_config::PartialRuntimeConfig;
use arena_common::world::RegisterOutcome;
use tokio::sync::oneshot;

/// Everything external callers (the HTTP layer) can ask the kernel to do.
/// Applied synchronously, drained completely at the top of every tick
/// (spec §5, §9's "queue drained between ticks").
pub enum KernelCommand {
    Register { name: String, ai_source: String, wall_clock_ms: u64, reply: oneshot::Sender<RegisterOutcome> },
    Submit { id: SnakeId, ai_source: String, wall_clock_ms: u64, reply: oneshot::Sender<Result<(), String>> },
    Remove { id: SnakeId, reply: oneshot::Sender<Result<(), String>> },
    Start,
    Pause,
    Reset,
    UpdateConfig { patch: PartialRuntimeConfig, reply: oneshot::Sender<Result<(), String>> },
}
