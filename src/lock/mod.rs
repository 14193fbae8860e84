//! File lock engine (`lordt nlock`)
//!
//! Startup resolves the configured patterns, marks every resolved file with a
//! fanotify group and records the marked paths. The event loop then reacts to
//! every open of a marked file by logging it and/or killing the opener.
//!
//! Enforcement is best-effort. fanotify notification events are delivered
//! after the open has already succeeded, so a process may read part of a file
//! before it is killed.

pub mod channel;
pub mod event_loop;
pub mod policy;
pub mod registry;
pub mod resolver;
pub mod shutdown;

pub use channel::{FanotifyChannel, NotificationChannel};
pub use policy::{AccessPolicy, PolicyEngine, PolicyStats, SignalTerminator, Terminator};
pub use registry::WatchRegistry;
pub use shutdown::ShutdownSignal;

use log::{info, warn};

use crate::models::{LockConfig, LockError};

/// Lock the configured files until `shutdown` is requested.
///
/// Only fanotify initialization failure is fatal; per-pattern, per-file and
/// per-event failures are logged and skipped. The fanotify group is closed on
/// return.
pub fn run_lock(config: &LockConfig, shutdown: &ShutdownSignal) -> Result<PolicyStats, LockError> {
    let mut channel = FanotifyChannel::initialize()?;
    Ok(run_lock_with(&mut channel, config, shutdown, SignalTerminator))
}

/// Same as [`run_lock`] over any channel and termination primitive
pub fn run_lock_with<C, T>(
    channel: &mut C,
    config: &LockConfig,
    shutdown: &ShutdownSignal,
    terminator: T,
) -> PolicyStats
where
    C: NotificationChannel,
    T: Terminator,
{
    let targets = resolver::resolve_all(&config.patterns);
    let registry = WatchRegistry::populate(channel, targets, config.mark_scope);

    if registry.is_empty() {
        warn!("no files locked, the patterns matched nothing that could be marked");
    } else {
        info!("locking {} file(s), press Ctrl+C to stop", registry.len());
    }

    let mut policy = PolicyEngine::new(config, terminator);
    event_loop::run(channel, &registry, &mut policy, shutdown, config.poll_interval);

    let stats = policy.stats();
    info!(
        "stopped: {} matched open(s), {} kill(s), {} failed kill(s)",
        stats.matched, stats.killed, stats.kill_failures
    );
    stats
}

/// In-memory doubles shared by the engine tests
#[cfg(test)]
pub(crate) mod testing {
    use std::collections::{HashSet, VecDeque};
    use std::path::PathBuf;
    use std::time::{Duration, UNIX_EPOCH};

    use nix::errno::Errno;

    use super::*;
    use crate::models::{AccessEvent, AccessKind, AccessMask, LockError, MarkScope, WatchTarget};

    enum Step {
        Reply(Result<Option<AccessEvent>, LockError>),
        Shutdown,
    }

    /// Channel replaying a fixed script, then requesting shutdown
    #[derive(Default)]
    pub struct ScriptedChannel {
        script: VecDeque<Step>,
        shutdown: Option<ShutdownSignal>,
        pub marks: Vec<(PathBuf, MarkScope)>,
        pub reject_marks: HashSet<PathBuf>,
        pub timeouts: Vec<Duration>,
    }

    impl ScriptedChannel {
        pub fn ending_with(shutdown: &ShutdownSignal) -> Self {
            Self {
                shutdown: Some(shutdown.clone()),
                ..Default::default()
            }
        }

        pub fn push(&mut self, reply: Result<Option<AccessEvent>, LockError>) {
            self.script.push_back(Step::Reply(reply));
        }

        pub fn push_event(&mut self, event: AccessEvent) {
            self.push(Ok(Some(event)));
        }

        /// Request shutdown when the loop reaches this point of the script
        pub fn push_shutdown(&mut self) {
            self.script.push_back(Step::Shutdown);
        }

        pub fn remaining(&self) -> usize {
            self.script.len()
        }

        fn request_shutdown(&self) {
            if let Some(shutdown) = &self.shutdown {
                shutdown.trigger();
            }
        }
    }

    impl NotificationChannel for ScriptedChannel {
        fn mark(&mut self, target: &WatchTarget, scope: MarkScope) -> Result<(), LockError> {
            if self.reject_marks.contains(target.as_path()) {
                return Err(LockError::Mark {
                    path: target.as_path().to_path_buf(),
                    source: Errno::ENOENT,
                });
            }
            self.marks.push((target.as_path().to_path_buf(), scope));
            Ok(())
        }

        fn next_event(&mut self, timeout: Duration) -> Result<Option<AccessEvent>, LockError> {
            self.timeouts.push(timeout);
            match self.script.pop_front() {
                Some(Step::Reply(reply)) => reply,
                Some(Step::Shutdown) | None => {
                    self.request_shutdown();
                    Ok(None)
                }
            }
        }
    }

    #[derive(Debug, Default)]
    pub struct RecordingPolicy {
        pub events: Vec<AccessEvent>,
    }

    impl AccessPolicy for RecordingPolicy {
        fn apply(&mut self, event: &AccessEvent) {
            self.events.push(event.clone());
        }
    }

    #[derive(Debug, Default)]
    pub struct RecordingTerminator {
        pub attempts: Vec<i32>,
        pub fail: bool,
    }

    impl Terminator for RecordingTerminator {
        fn terminate(&mut self, pid: i32) -> Result<(), LockError> {
            self.attempts.push(pid);
            if self.fail {
                return Err(LockError::Kill { pid, source: Errno::ESRCH });
            }
            Ok(())
        }
    }

    pub fn event_with(path: &str, pid: i32, mask: AccessMask) -> AccessEvent {
        AccessEvent {
            path: PathBuf::from(path),
            pid,
            mask,
            modified: UNIX_EPOCH,
        }
    }

    pub fn open_event(path: &str, pid: i32) -> AccessEvent {
        event_with(path, pid, AccessMask::from(AccessKind::Open))
    }
}
