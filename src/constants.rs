//! Global constants for lordt
//!
//! Centralized location for application-wide constants

/// Binary name, used in help output
pub const APP_NAME: &str = "lordt";

/// Subcommand for the fanotify-based file lock
pub const NLOCK_COMMAND: &str = "nlock";

/// Subcommand that prints the tool table
pub const HELP_COMMAND: &str = "help";

/// Environment variable holding an env_logger filter (e.g. `debug`)
pub const LOG_ENV_VAR: &str = "LORDT_LOG";

/// Filter used when LOG_ENV_VAR is unset
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Bounded wait between shutdown checks in the event loop
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 250;

/// Note: bounds must match the message in LockError::InvalidPollInterval
pub const POLL_INTERVAL_MIN_MS: u64 = 10;
pub const POLL_INTERVAL_MAX_MS: u64 = 10_000;

/// Config file option tokens
pub const OPTION_LOG: &str = "log";
pub const OPTION_KILL: &str = "kill";
pub const OPTION_MOUNT: &str = "mount";
