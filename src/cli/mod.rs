//! CLI argument parsing and dispatch
//!
//! Handles the command-line interface using clap, including:
//! - Tool dispatch (`help`, `nlock`) and version reporting
//! - nlock flags (`--pattern`, `--conf`, `-log`, `-kill`, ...)
//! - Go-style single-dash long flags such as `-log`

pub mod help;

use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use log::warn;

use crate::constants::{HELP_COMMAND, NLOCK_COMMAND};
use crate::models::{LockConfig, LockError, MarkScope};

/// What the binary should do for a given argument vector
#[derive(Debug, Clone, PartialEq)]
pub enum CliAction {
    /// Print the tool table
    Help,
    /// Print the version string
    Version,
    /// Print nlock usage
    NlockUsage,
    /// Run the lock with a validated configuration
    Lock(LockConfig),
}

/// Parse the process arguments
pub fn parse_args() -> Result<CliAction> {
    parse_args_from(std::env::args().skip(1))
}

/// Parse arguments, excluding the binary name
pub fn parse_args_from<I, S>(args: I) -> Result<CliAction>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let args: Vec<String> = args.into_iter().map(Into::into).collect();

    let Some((tool, rest)) = args.split_first() else {
        return Ok(CliAction::Help);
    };

    match tool.as_str() {
        HELP_COMMAND | "--help" | "-h" => Ok(CliAction::Help),
        "--version" | "-V" | "version" => Ok(CliAction::Version),
        NLOCK_COMMAND => parse_nlock_args(rest),
        other => {
            warn!("invalid command: {}", other);
            Ok(CliAction::Help)
        }
    }
}

fn nlock_command() -> Command {
    Command::new(NLOCK_COMMAND)
        .about("Lock files from being read while running")
        .arg(
            Arg::new("pattern")
                .long("pattern")
                .value_name("GLOB")
                .help("Pattern of the file(s) to lock, '**' matches any depth"),
        )
        .arg(
            Arg::new("conf")
                .long("conf")
                .value_name("PATH")
                .help("JSON (or .toml) config file; other options are ignored when set"),
        )
        .arg(
            Arg::new("log")
                .long("log")
                .help("Log processes that open locked files")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("kill")
                .long("kill")
                .help("Kill processes that open locked files")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("mount")
                .long("mount")
                .help("Mark the whole mount of each locked file")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("poll-interval-ms")
                .long("poll-interval-ms")
                .value_name("MS")
                .help("Longest wait for events before checking for shutdown")
                .value_parser(value_parser!(u64)),
        )
}

fn parse_nlock_args(args: &[String]) -> Result<CliAction> {
    if args.first().map_or(true, |arg| arg == HELP_COMMAND) {
        return Ok(CliAction::NlockUsage);
    }

    let argv = std::iter::once(NLOCK_COMMAND.to_string()).chain(normalize_flags(args));
    let matches = nlock_command().get_matches_from(argv);

    Ok(CliAction::Lock(lock_config_from_matches(&matches)?))
}

fn lock_config_from_matches(matches: &ArgMatches) -> Result<LockConfig, LockError> {
    let conf = matches
        .get_one::<String>("conf")
        .filter(|conf| !conf.is_empty());
    if let Some(conf) = conf {
        return LockConfig::load_from_file(Path::new(conf));
    }

    let pattern = matches
        .get_one::<String>("pattern")
        .filter(|pattern| !pattern.is_empty())
        .ok_or(LockError::NoPatterns)?;

    let mut config = LockConfig::new(vec![pattern.clone()]);
    config.should_log = matches.get_flag("log");
    config.should_kill = matches.get_flag("kill");
    if matches.get_flag("mount") {
        config.mark_scope = MarkScope::Mount;
    }
    if let Some(millis) = matches.get_one::<u64>("poll-interval-ms") {
        config.poll_interval = Duration::from_millis(*millis);
    }

    config.validate()?;
    Ok(config)
}

/// Rewrite `-name[=value]` to `--name[=value]` so Go-style flags parse.
///
/// Single-letter flags (`-h`) and anything not starting with a letter after
/// the dash are left untouched.
pub fn normalize_flags(args: &[String]) -> Vec<String> {
    args.iter()
        .map(|arg| {
            let name = arg.strip_prefix('-').filter(|rest| !rest.starts_with('-'));
            let is_long = name.is_some_and(|rest| {
                let flag = rest.split('=').next().unwrap_or_default();
                flag.len() > 1 && flag.starts_with(|c: char| c.is_ascii_alphabetic())
            });

            if is_long {
                format!("-{}", arg)
            } else {
                arg.clone()
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn strings(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_normalize_single_dash_long_flags() {
        let normalized = normalize_flags(&strings(&[
            "-log",
            "-kill",
            "-pattern=/tmp/*.txt",
            "--conf=/etc/nlock.json",
            "-h",
            "-",
            "-5",
        ]));

        assert_eq!(
            normalized,
            strings(&[
                "--log",
                "--kill",
                "--pattern=/tmp/*.txt",
                "--conf=/etc/nlock.json",
                "-h",
                "-",
                "-5",
            ])
        );
    }

    #[test]
    fn test_no_arguments_shows_help() {
        assert_eq!(parse_args_from(Vec::<String>::new()).unwrap(), CliAction::Help);
        assert_eq!(parse_args_from(["help"]).unwrap(), CliAction::Help);
        assert_eq!(parse_args_from(["bogus"]).unwrap(), CliAction::Help);
    }

    #[test]
    fn test_version_action() {
        assert_eq!(parse_args_from(["--version"]).unwrap(), CliAction::Version);
    }

    #[test]
    fn test_nlock_without_options_shows_usage() {
        assert_eq!(parse_args_from(["nlock"]).unwrap(), CliAction::NlockUsage);
        assert_eq!(parse_args_from(["nlock", "help"]).unwrap(), CliAction::NlockUsage);
    }

    #[test]
    fn test_pattern_with_go_style_flags() {
        let action = parse_args_from(["nlock", "--pattern=/tmp/t/*.txt", "-log", "-kill"]).unwrap();

        let CliAction::Lock(config) = action else {
            panic!("expected a lock action");
        };
        assert_eq!(config.patterns, strings(&["/tmp/t/*.txt"]));
        assert!(config.should_log);
        assert!(config.should_kill);
        assert_eq!(config.mark_scope, MarkScope::Path);
    }

    #[test]
    fn test_mount_and_poll_interval_flags() {
        let action = parse_args_from([
            "nlock",
            "--pattern",
            "/tmp/t/a.txt",
            "-mount",
            "--poll-interval-ms=40",
        ])
        .unwrap();

        let CliAction::Lock(config) = action else {
            panic!("expected a lock action");
        };
        assert!(!config.should_log);
        assert_eq!(config.mark_scope, MarkScope::Mount);
        assert_eq!(config.poll_interval, Duration::from_millis(40));
    }

    #[test]
    fn test_missing_pattern_is_fatal() {
        let err = parse_args_from(["nlock", "-log"]).unwrap_err();
        assert_eq!(err.to_string(), "pattern option required");
    }

    #[test]
    fn test_conf_overrides_flags() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nlock.json");
        fs::write(&path, r#"{ "patterns": ["/srv/a", "/srv/b"], "options": ["kill"] }"#).unwrap();

        let conf = format!("--conf={}", path.display());
        let action = parse_args_from(["nlock", conf.as_str(), "--pattern=/ignored", "-log"]).unwrap();

        let CliAction::Lock(config) = action else {
            panic!("expected a lock action");
        };
        assert_eq!(config.patterns, strings(&["/srv/a", "/srv/b"]));
        assert!(!config.should_log);
        assert!(config.should_kill);
    }

    #[test]
    fn test_empty_conf_falls_back_to_flags() {
        let action = parse_args_from(["nlock", "--conf=", "--pattern=/tmp/t/*.txt", "-log"]).unwrap();

        let CliAction::Lock(config) = action else {
            panic!("expected a lock action");
        };
        assert_eq!(config.patterns, strings(&["/tmp/t/*.txt"]));
        assert!(config.should_log);
        assert!(!config.should_kill);
    }

    #[test]
    fn test_unreadable_conf_is_fatal() {
        let err = parse_args_from(["nlock", "--conf=/nonexistent/nlock.json"]).unwrap_err();
        assert!(err.to_string().starts_with("couldn't load conf:"));
    }
}
