pub mod commands;
pub mod scheduler;

pub use commands::KernelCommand;
pub use scheduler::{KernelHandle, spawn};
