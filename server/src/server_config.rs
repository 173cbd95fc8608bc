use std::time::Duration;

pub const PERSISTENCE_SAVE_INTERVAL: Duration = Duration::from_secs(30);
pub const EXECUTOR_POOL_SIZE: usize = 8;
pub const MAX_AI_SOURCE_CHARS: usize = 10_000;
pub const MAX_SNAKE_NAME_CHARS: usize = 20;
