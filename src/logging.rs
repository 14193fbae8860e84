//! Logger setup
//!
//! Routes the `log` facade to stderr through env_logger. Lines carry a UTC
//! `YYYY/MM/DD HH:MM:SS` prefix; warnings and errors are tagged with their level.

use std::io::Write;

use anyhow::{anyhow, Result};
use env_logger::{Builder, Env, Target};
use log::Level;
use time::OffsetDateTime;

use crate::constants::{DEFAULT_LOG_FILTER, LOG_ENV_VAR};

/// Install the process-wide logger. Fails if one is already installed.
pub fn init_logger() -> Result<()> {
    let env = Env::new().filter_or(LOG_ENV_VAR, DEFAULT_LOG_FILTER);

    Builder::from_env(env)
        .target(Target::Stderr)
        .format(|buf, record| {
            let prefix = timestamp_prefix(OffsetDateTime::now_utc());
            match record.level() {
                Level::Error | Level::Warn => {
                    writeln!(buf, "{} {}: {}", prefix, record.level(), record.args())
                }
                _ => writeln!(buf, "{} {}", prefix, record.args()),
            }
        })
        .try_init()
        .map_err(|e| anyhow!("Failed to set logger: {}", e))
}

fn timestamp_prefix(now: OffsetDateTime) -> String {
    format!(
        "{:04}/{:02}/{:02} {:02}:{:02}:{:02}",
        now.year(),
        now.month() as u8,
        now.day(),
        now.hour(),
        now.minute(),
        now.second()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_prefix_layout() {
        let moment = OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap();
        assert_eq!(timestamp_prefix(moment), "2023/11/14 22:13:20");
    }
}
