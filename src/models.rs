//! Data models module
//!
//! Defines core data structures:
//! - LockConfig: Immutable run configuration (patterns + policy toggles)
//! - WatchTarget: Canonical absolute path selected for enforcement
//! - AccessEvent: One access reported by the kernel for a marked path
//! - LockError: Typed errors for every failure scope of a lock run

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use nix::errno::Errno;

use crate::constants::{DEFAULT_POLL_INTERVAL_MS, POLL_INTERVAL_MAX_MS, POLL_INTERVAL_MIN_MS};

/// How much of the filesystem a single mark covers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MarkScope {
    /// Mark only the resolved file itself
    #[default]
    Path,
    /// Mark the whole mount containing the resolved file
    Mount,
}

/// Configuration for one lock run
#[derive(Debug, Clone, PartialEq)]
pub struct LockConfig {
    /// Glob patterns selecting the files to lock, in the order given
    pub patterns: Vec<String>,
    /// Log every open of a locked file
    pub should_log: bool,
    /// Kill every process that opens a locked file
    pub should_kill: bool,
    /// Granularity of the kernel marks
    pub mark_scope: MarkScope,
    /// Longest time the event loop blocks before re-checking for shutdown
    pub poll_interval: Duration,
}

impl LockConfig {
    /// Create a configuration with both actions disabled
    pub fn new(patterns: Vec<String>) -> Self {
        Self {
            patterns,
            should_log: false,
            should_kill: false,
            mark_scope: MarkScope::Path,
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        }
    }

    /// Check the invariants every run relies on
    pub fn validate(&self) -> Result<(), LockError> {
        if self.patterns.iter().all(|p| p.trim().is_empty()) {
            return Err(LockError::NoPatterns);
        }

        let millis = u64::try_from(self.poll_interval.as_millis()).unwrap_or(u64::MAX);
        if !(POLL_INTERVAL_MIN_MS..=POLL_INTERVAL_MAX_MS).contains(&millis) {
            return Err(LockError::InvalidPollInterval(millis));
        }

        Ok(())
    }
}

/// An absolute, canonical path registered for enforcement.
///
/// Only constructed through [`WatchTarget::canonicalize`], so equality with
/// paths reported by the kernel never depends on the working directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WatchTarget(PathBuf);

impl WatchTarget {
    /// Resolve symlinks and relative components of an existing path
    pub fn canonicalize(path: &Path) -> io::Result<Self> {
        std::fs::canonicalize(path).map(Self)
    }

    pub fn as_path(&self) -> &Path {
        &self.0
    }

    pub fn into_path_buf(self) -> PathBuf {
        self.0
    }
}

impl fmt::Display for WatchTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// Kinds of access a mark reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessKind {
    Open,
    Modify,
    CloseWrite,
}

impl AccessKind {
    fn bit(self) -> u8 {
        match self {
            AccessKind::Open => 0b001,
            AccessKind::Modify => 0b010,
            AccessKind::CloseWrite => 0b100,
        }
    }

    fn label(self) -> &'static str {
        match self {
            AccessKind::Open => "OPEN",
            AccessKind::Modify => "MODIFY",
            AccessKind::CloseWrite => "CLOSE_WRITE",
        }
    }
}

/// Set of access kinds carried by one event
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccessMask(u8);

impl AccessMask {
    pub const fn empty() -> Self {
        Self(0)
    }

    pub fn with(self, kind: AccessKind) -> Self {
        Self(self.0 | kind.bit())
    }

    pub fn contains(self, kind: AccessKind) -> bool {
        self.0 & kind.bit() != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl From<AccessKind> for AccessMask {
    fn from(kind: AccessKind) -> Self {
        Self::empty().with(kind)
    }
}

impl fmt::Display for AccessMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let labels: Vec<&str> = [AccessKind::Open, AccessKind::Modify, AccessKind::CloseWrite]
            .into_iter()
            .filter(|kind| self.contains(*kind))
            .map(AccessKind::label)
            .collect();
        write!(f, "{}", labels.join("|"))
    }
}

/// One access reported by the notification channel
#[derive(Debug, Clone, PartialEq)]
pub struct AccessEvent {
    /// Absolute path of the accessed file
    pub path: PathBuf,
    /// PID of the process that performed the access
    pub pid: i32,
    /// Which kinds of access this event reports
    pub mask: AccessMask,
    /// Modification time of the file at the time of access
    pub modified: SystemTime,
}

/// Errors raised while configuring or running a lock
#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error("pattern option required")]
    NoPatterns,

    #[error("couldn't load conf: {}", .path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("couldn't parse conf {}: {reason}", .path.display())]
    ConfigParse { path: PathBuf, reason: String },

    /// Note: bounds must match POLL_INTERVAL_MIN_MS/MAX_MS in constants.rs
    #[error("Invalid poll interval: {0}ms. Must be between 10 and 10000 milliseconds")]
    InvalidPollInterval(u64),

    #[error("couldn't initialize fanotify (root or CAP_SYS_ADMIN is required)")]
    Init(#[source] Errno),

    #[error("couldn't lock {}: {source}", .path.display())]
    Mark { path: PathBuf, source: Errno },

    #[error("couldn't read fanotify events: {0}")]
    Read(Errno),

    #[error("fanotify event queue overflowed, some accesses were not observed")]
    QueueOverflow,

    #[error("couldn't resolve accessed file for PID:{pid}: {source}")]
    EventPath { pid: i32, source: io::Error },

    #[error("couldn't kill PID:{pid}: {source}")]
    Kill { pid: i32, source: Errno },

    #[error("invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        source: glob::PatternError,
    },
}
