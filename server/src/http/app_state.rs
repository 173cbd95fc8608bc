//! Shared state handed to every axum handler via the `State` extractor.

use crate::broadcaster::Broadcaster;
use crate::kernel::KernelHandle;

#[derive(Clone)]
pub struct AppState {
    pub kernel: KernelHandle,
    pub broadcaster: Broadcaster,
}
