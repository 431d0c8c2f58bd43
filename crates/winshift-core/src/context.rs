use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use crate::config::Config;

/// State shared between the polling loop and hotkey callbacks.
///
/// Callbacks run on the platform's hotkey context, so everything here is
/// either atomic or behind a lock. The config is swapped whole; readers
/// hold an `Arc` to the snapshot they started with.
#[derive(Debug)]
pub struct AppContext {
    exit: AtomicBool,
    reload: AtomicBool,
    config: RwLock<Arc<Config>>,
}

impl AppContext {
    pub fn new(config: Config) -> Arc<Self> {
        Arc::new(Self {
            exit: AtomicBool::new(false),
            reload: AtomicBool::new(false),
            config: RwLock::new(Arc::new(config)),
        })
    }

    /// Asks the loop to stop after its current tick.
    pub fn request_exit(&self) {
        self.exit.store(true, Ordering::SeqCst);
    }

    pub fn exit_requested(&self) -> bool {
        self.exit.load(Ordering::SeqCst)
    }

    /// Asks the loop to reload the config on its next tick.
    pub fn request_reload(&self) {
        self.reload.store(true, Ordering::SeqCst);
    }

    /// Returns and clears a pending reload request.
    pub fn take_reload_request(&self) -> bool {
        self.reload.swap(false, Ordering::SeqCst)
    }

    /// Returns the current config snapshot.
    pub fn config(&self) -> Arc<Config> {
        let guard = self
            .config
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(&guard)
    }

    pub fn replace_config(&self, config: Config) {
        let mut guard = self
            .config
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = Arc::new(config);
    }
}
