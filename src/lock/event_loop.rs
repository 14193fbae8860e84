//! The read/react cycle
//!
//! Events are handled one at a time, in the order the kernel delivered them.
//! The shutdown flag is checked before every wait, and each wait is bounded
//! by the poll interval so a signal is noticed even when no files are touched.

use std::time::Duration;

use log::{debug, trace, warn};

use crate::lock::channel::NotificationChannel;
use crate::lock::policy::AccessPolicy;
use crate::lock::registry::WatchRegistry;
use crate::lock::shutdown::ShutdownSignal;
use crate::models::{AccessEvent, AccessKind};

/// Run until `shutdown` is requested.
///
/// Read errors and unresolvable events are logged and the loop keeps going.
pub fn run<C, P>(
    channel: &mut C,
    registry: &WatchRegistry,
    policy: &mut P,
    shutdown: &ShutdownSignal,
    poll_interval: Duration,
) where
    C: NotificationChannel,
    P: AccessPolicy,
{
    loop {
        if shutdown.is_requested() {
            debug!("shutdown requested, leaving event loop");
            return;
        }

        match channel.next_event(poll_interval) {
            Ok(Some(event)) => dispatch(&event, registry, policy),
            Ok(None) => {}
            Err(e) => warn!("{}", e),
        }
    }
}

/// Apply the policy to opens of registered paths; drop everything else
fn dispatch<P: AccessPolicy>(event: &AccessEvent, registry: &WatchRegistry, policy: &mut P) {
    if !registry.contains(&event.path) {
        trace!("ignoring {} on unlocked {}", event.mask, event.path.display());
        return;
    }

    if event.mask.contains(AccessKind::Open) {
        policy.apply(event);
    } else {
        trace!("PID:{} {} {}", event.pid, event.mask, event.path.display());
    }
}
