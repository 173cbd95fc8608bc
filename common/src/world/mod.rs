pub mod food;
pub mod snake;
pub mod state;
pub mod types;

pub use food::Food;
pub use snake::Snake;
pub use state::{GameState, RegisterOutcome, TickPhase, TickReport};
pub use types::{GameEvent, GameStatus};
