pub mod ai_contract;
pub mod config;
pub mod geometry;
pub mod identifiers;
pub mod logger;
pub mod persistence;
pub mod runtime_config;
pub mod session_rng;
pub mod snapshot;
pub mod world;
