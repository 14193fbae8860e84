//! Cooperative cancellation for the event loop

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use signal_hook::consts::{SIGINT, SIGTERM};

/// Flag set asynchronously by SIGINT/SIGTERM and polled once per loop iteration
#[derive(Debug, Clone, Default)]
pub struct ShutdownSignal {
    requested: Arc<AtomicBool>,
}

impl ShutdownSignal {
    /// A signal that only trips through [`ShutdownSignal::trigger`]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register SIGINT and SIGTERM to set the flag instead of terminating
    pub fn install() -> io::Result<Self> {
        let signal = Self::new();
        signal_hook::flag::register(SIGINT, Arc::clone(&signal.requested))?;
        signal_hook::flag::register(SIGTERM, Arc::clone(&signal.requested))?;
        Ok(signal)
    }

    pub fn trigger(&self) {
        self.requested.store(true, Ordering::SeqCst);
    }

    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }
}
