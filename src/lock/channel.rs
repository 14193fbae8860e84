//! Kernel file-access notification channel
//!
//! [`NotificationChannel`] is the seam between the event loop and the kernel.
//! [`FanotifyChannel`] is the Linux implementation: one fanotify group, created
//! once per run and closed when the channel is dropped.

use std::collections::VecDeque;
use std::io;
use std::os::fd::{AsFd, AsRawFd, BorrowedFd};
use std::path::PathBuf;
use std::time::{Duration, SystemTime};

use log::trace;
use nix::errno::Errno;
use nix::poll::{poll, PollFd, PollFlags, PollTimeout};
use nix::sys::fanotify::{
    EventFFlags, Fanotify, FanotifyEvent, InitFlags, MarkFlags, MaskFlags,
};

use crate::models::{AccessEvent, AccessKind, AccessMask, LockError, MarkScope, WatchTarget};

/// Source of access events for marked paths
pub trait NotificationChannel {
    /// Start reporting open/modify/close-write accesses for `target`
    fn mark(&mut self, target: &WatchTarget, scope: MarkScope) -> Result<(), LockError>;

    /// Wait at most `timeout` for the next event.
    ///
    /// `Ok(None)` means nothing arrived in time. Errors concern a single read
    /// or a single event; the channel stays usable afterwards.
    fn next_event(&mut self, timeout: Duration) -> Result<Option<AccessEvent>, LockError>;
}

/// Every mark listens for these accesses
fn mark_mask() -> MaskFlags {
    MaskFlags::FAN_OPEN | MaskFlags::FAN_MODIFY | MaskFlags::FAN_CLOSE_WRITE
}

pub struct FanotifyChannel {
    group: Fanotify,
    /// Events already read from the kernel, in delivery order
    pending: VecDeque<Result<AccessEvent, LockError>>,
    own_pid: i32,
}

impl FanotifyChannel {
    /// Create the fanotify group. Requires CAP_SYS_ADMIN.
    pub fn initialize() -> Result<Self, LockError> {
        let group = Fanotify::init(
            InitFlags::FAN_CLOEXEC
                | InitFlags::FAN_CLASS_NOTIF
                | InitFlags::FAN_UNLIMITED_QUEUE
                | InitFlags::FAN_UNLIMITED_MARKS,
            EventFFlags::O_RDONLY | EventFFlags::O_LARGEFILE | EventFFlags::O_CLOEXEC,
        )
        .map_err(LockError::Init)?;

        Ok(Self {
            group,
            pending: VecDeque::new(),
            own_pid: std::process::id() as i32,
        })
    }

    /// Block until the group is readable or `timeout` elapses
    fn wait_readable(&self, timeout: Duration) -> Result<bool, LockError> {
        let millis = u16::try_from(timeout.as_millis()).unwrap_or(u16::MAX);
        let mut fds = [PollFd::new(self.group.as_fd(), PollFlags::POLLIN)];

        match poll(&mut fds, PollTimeout::from(millis)) {
            Ok(0) => Ok(false),
            Ok(_) => Ok(true),
            Err(Errno::EINTR) => Ok(false),
            Err(e) => Err(LockError::Read(e)),
        }
    }

    /// Read one batch from the kernel and convert it while the event fds are open
    fn fill_pending(&mut self) -> Result<(), LockError> {
        let events = match self.group.read_events() {
            Ok(events) => events,
            Err(Errno::EAGAIN) | Err(Errno::EINTR) => return Ok(()),
            Err(e) => return Err(LockError::Read(e)),
        };

        for event in &events {
            if event.pid() == self.own_pid {
                trace!("ignoring own access");
                continue;
            }
            self.pending.push_back(convert_event(event));
        }

        Ok(())
    }
}

impl NotificationChannel for FanotifyChannel {
    fn mark(&mut self, target: &WatchTarget, scope: MarkScope) -> Result<(), LockError> {
        let flags = match scope {
            MarkScope::Path => MarkFlags::FAN_MARK_ADD,
            MarkScope::Mount => MarkFlags::FAN_MARK_ADD | MarkFlags::FAN_MARK_MOUNT,
        };

        self.group
            .mark(flags, mark_mask(), None, Some(target.as_path()))
            .map_err(|source| LockError::Mark {
                path: target.as_path().to_path_buf(),
                source,
            })
    }

    fn next_event(&mut self, timeout: Duration) -> Result<Option<AccessEvent>, LockError> {
        if self.pending.is_empty() && self.wait_readable(timeout)? {
            self.fill_pending()?;
        }
        self.pending.pop_front().transpose()
    }
}

fn convert_event(event: &FanotifyEvent) -> Result<AccessEvent, LockError> {
    let mask = event.mask();
    if mask.contains(MaskFlags::FAN_Q_OVERFLOW) {
        return Err(LockError::QueueOverflow);
    }

    let pid = event.pid();
    let fd = event.fd().ok_or_else(|| LockError::EventPath {
        pid,
        source: io::Error::new(io::ErrorKind::NotFound, "event carries no file descriptor"),
    })?;
    let (path, modified) = describe_fd(fd).map_err(|source| LockError::EventPath { pid, source })?;

    Ok(AccessEvent {
        path,
        pid,
        mask: access_mask(mask),
        modified,
    })
}

/// Path and modification time of the file behind an event descriptor
fn describe_fd(fd: BorrowedFd<'_>) -> io::Result<(PathBuf, SystemTime)> {
    let link = PathBuf::from(format!("/proc/self/fd/{}", fd.as_raw_fd()));
    let path = std::fs::read_link(&link)?;
    // metadata() follows the magic link to the open file, not the name
    let modified = std::fs::metadata(&link)?.modified()?;
    Ok((path, modified))
}

fn access_mask(mask: MaskFlags) -> AccessMask {
    let mut access = AccessMask::empty();
    if mask.contains(MaskFlags::FAN_OPEN) {
        access = access.with(AccessKind::Open);
    }
    if mask.contains(MaskFlags::FAN_MODIFY) {
        access = access.with(AccessKind::Modify);
    }
    if mask.contains(MaskFlags::FAN_CLOSE_WRITE) {
        access = access.with(AccessKind::CloseWrite);
    }
    access
}
