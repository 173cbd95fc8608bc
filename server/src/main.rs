mod ai_pool;
mod broadcaster;
mod http;
mod kernel;
mod persistence_task;
mod server_config;
mod state_doc;

use std::sync::Arc;

use arena_common::config::ConfigManager;
use arena_common::runtime_config::RuntimeConfig;
use arena_common::session_rng::SessionRng;
use arena_common::world::GameState;
use arena_common::{log, logger};
use broadcaster::Broadcaster;
use clap::Parser;
use tokio::sync::Notify;

use crate::server_config::EXECUTOR_POOL_SIZE;

#[derive(Parser)]
#[command(name = "arena_server")]
struct Args {
    #[arg(long, default_value = "0.0.0.0:5050")]
    listen_addr: String,

    #[arg(long, default_value = "data/config.yaml")]
    config_path: String,

    #[arg(long, default_value = "data/arena.save.json")]
    save_path: String,

    #[arg(long)]
    use_log_prefix: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let prefix = if args.use_log_prefix { Some("Arena".to_string()) } else { None };
    logger::init_logger(prefix);

    let config_manager = ConfigManager::<_, RuntimeConfig>::from_yaml_file(&args.config_path);
    let config = config_manager.get_config().unwrap_or_else(|err| {
        log!("falling back to default config: {}", err);
        RuntimeConfig::default()
    });
    if let Err(err) = config_manager.set_config(&config) {
        log!("failed to persist config defaults: {}", err);
    }

    let save_path = std::path::PathBuf::from(&args.save_path);
    let mut state = GameState::new(config);
    if let Some(blob) = persistence_task::load_into(&save_path) {
        log!("restored save file at tick {}", blob.tick);
        state.restore_from_save(blob);
    }

    let rng = SessionRng::from_random();
    let broadcaster = Broadcaster::new();
    let dirty = Arc::new(Notify::new());

    let kernel = kernel::spawn(state, rng, EXECUTOR_POOL_SIZE, broadcaster.clone(), dirty.clone());

    tokio::spawn(persistence_task::run(save_path, kernel.state_rx.clone(), dirty));

    let app_state = http::AppState { kernel, broadcaster: broadcaster.clone() };
    let app = http::router(app_state);

    log!("arena server listening on {}", args.listen_addr);
    let listener = tokio::net::TcpListener::bind(&args.listen_addr).await?;

    let shutdown_signal = async move {
        tokio::signal::ctrl_c().await.expect("failed to listen for ctrl-c");
        log!("shutdown signal received");
    };

    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal).await?;

    log!("arena server shut down gracefully");
    Ok(())
}
