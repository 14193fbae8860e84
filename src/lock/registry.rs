//! Set of paths a lock run is responsible for

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::lock::channel::NotificationChannel;
use crate::models::{MarkScope, WatchTarget};
use crate::output;

/// Canonical paths successfully marked with the notification channel.
///
/// Populated once at startup and read-only while the event loop runs.
#[derive(Debug, Default)]
pub struct WatchRegistry {
    paths: HashSet<PathBuf>,
}

impl WatchRegistry {
    /// Mark every target, keeping the ones the kernel accepted.
    ///
    /// A target that cannot be marked is logged and left out; the rest are
    /// still registered.
    pub fn populate<C: NotificationChannel>(
        channel: &mut C,
        targets: Vec<WatchTarget>,
        scope: MarkScope,
    ) -> Self {
        let mut registry = Self::default();

        for target in targets {
            match channel.mark(&target, scope) {
                Ok(()) => {
                    info!("{}", output::locked_line(target.as_path()));
                    registry.paths.insert(target.into_path_buf());
                }
                Err(e) => warn!("{}", e),
            }
        }

        registry
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.paths.contains(path)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}
