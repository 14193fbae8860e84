//! Actions taken when a locked file is opened

use log::{info, warn};
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;

use crate::models::{AccessEvent, LockConfig, LockError};
use crate::output;

/// Reaction to a matched access. Fire-and-forget: failures are handled inside.
pub trait AccessPolicy {
    fn apply(&mut self, event: &AccessEvent);
}

/// Process termination primitive
pub trait Terminator {
    fn terminate(&mut self, pid: i32) -> Result<(), LockError>;
}

/// Sends SIGKILL to the offending process
#[derive(Debug, Default, Clone, Copy)]
pub struct SignalTerminator;

impl Terminator for SignalTerminator {
    fn terminate(&mut self, pid: i32) -> Result<(), LockError> {
        kill(Pid::from_raw(pid), Signal::SIGKILL).map_err(|source| LockError::Kill { pid, source })
    }
}

/// Counters reported when the run ends
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PolicyStats {
    pub matched: usize,
    pub killed: usize,
    pub kill_failures: usize,
}

/// Applies the configured log and kill actions to every matched event.
///
/// There is no deduplication: each event gets its own kill attempt even when
/// the same PID was already targeted.
#[derive(Debug)]
pub struct PolicyEngine<T: Terminator> {
    should_log: bool,
    should_kill: bool,
    terminator: T,
    stats: PolicyStats,
}

impl<T: Terminator> PolicyEngine<T> {
    pub fn new(config: &LockConfig, terminator: T) -> Self {
        Self {
            should_log: config.should_log,
            should_kill: config.should_kill,
            terminator,
            stats: PolicyStats::default(),
        }
    }

    pub fn stats(&self) -> PolicyStats {
        self.stats
    }

    pub fn terminator(&self) -> &T {
        &self.terminator
    }
}

impl<T: Terminator> AccessPolicy for PolicyEngine<T> {
    fn apply(&mut self, event: &AccessEvent) {
        self.stats.matched += 1;

        if self.should_log {
            info!("{}", output::open_line(event));
        }

        if self.should_kill {
            match self.terminator.terminate(event.pid) {
                Ok(()) => {
                    self.stats.killed += 1;
                    info!("{}", output::killed_line(event.pid));
                }
                Err(e) => {
                    self.stats.kill_failures += 1;
                    warn!("{}", e);
                }
            }
        }
    }
}
