//! Debounced save-to-disk task (spec §4.6, §4.6a). Wakes on a 30-second
//! timer or on the kernel's dirty notification, whichever comes first, and
//! never reaches into kernel-owned state directly — it only reads the
//! latest published state document.

use std::path::PathBuf;
use std::sync::Arc;

use arena_common::log;
use arena_common::persistence::{PersistenceError, SaveBlob, save_atomically};
use tokio::sync::{Notify, watch};

use crate::server_config::PERSISTENCE_SAVE_INTERVAL;
use crate::state_doc::ApiStateDoc;

pub async fn run(save_path: PathBuf, mut state_rx: watch::Receiver<Arc<ApiStateDoc>>, dirty: Arc<Notify>) {
    let mut interval = tokio::time::interval(PERSISTENCE_SAVE_INTERVAL);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = interval.tick() => {}
            _ = dirty.notified() => {}
        }

        let doc = state_rx.borrow_and_update().clone();
        let blob = SaveBlob::new(doc.tick, doc.status, doc.snakes.clone(), doc.food.clone());

        if let Err(err) = save_atomically(&save_path, &blob) {
            log_save_error(&err);
        }
    }
}

fn log_save_error(err: &PersistenceError) {
    log!("persistence save failed: {}", err);
}

pub fn load_into(save_path: &std::path::Path) -> Option<arena_common::persistence::SaveBlob> {
    match arena_common::persistence::load_from_path(save_path) {
        Ok(blob) => blob,
        Err(err) => {
            log!("persistence load failed, starting fresh: {}", err);
            None
        }
    }
}
