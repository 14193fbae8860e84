//! Output formatting module
//!
//! Line formats emitted while a lock is running:
//! - `locked: <path>` for each registered file
//! - `[OPEN] PID:<pid> <path> - <modtime>` for each matched open
//! - `[KILLED] PID:<pid>` for each successful kill

use std::path::Path;
use std::time::SystemTime;

use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::models::AccessEvent;

pub fn locked_line(path: &Path) -> String {
    format!("locked: {}", path.display())
}

pub fn open_line(event: &AccessEvent) -> String {
    format!(
        "[OPEN] PID:{} {} - {}",
        event.pid,
        event.path.display(),
        format_timestamp(event.modified)
    )
}

pub fn killed_line(pid: i32) -> String {
    format!("[KILLED] PID:{}", pid)
}

/// RFC 3339 rendering, falling back to the raw value for out-of-range times
pub fn format_timestamp(timestamp: SystemTime) -> String {
    OffsetDateTime::from(timestamp)
        .format(&Rfc3339)
        .unwrap_or_else(|_| format!("{:?}", timestamp))
}
