//! Human-readable help for the tool table and for nlock

use crate::constants::{APP_NAME, HELP_COMMAND, NLOCK_COMMAND};

/// Tool name and one-line description, in display order
pub const TOOLS: &[(&str, &str)] = &[
    (HELP_COMMAND, "Display helpful information about the Lordt CLI."),
    (
        NLOCK_COMMAND,
        "Lock a file or files from being read as long as this is running. (experimental, slow, unreliable)",
    ),
];

pub fn version_string() -> String {
    format!("{} ({})", env!("LORDT_VERSION"), env!("GIT_HASH"))
}

pub fn tools_help() -> String {
    let mut text = format!(
        "{APP_NAME} - guard files against access on Linux\n\nVersion: {}\n\nTools\n\n",
        version_string()
    );
    for (name, description) in TOOLS {
        text.push_str(&format!("{} -\t{}\n", name, description));
    }
    text.push_str(&format!(
        "\nTry `{APP_NAME} <tool> help` to get more details on a specific tool.\n"
    ));
    text
}

pub fn nlock_usage() -> String {
    format!(
        r#"Usage: {APP_NAME} {NLOCK_COMMAND} <options...>

nlock (notify-based lock) is an experimental tool for preventing processes from opening/reading files while it is running.

nlock uses fanotify to get file open events and responds as soon as it can. Notification arrives after the open has
succeeded, so the 'kill' option is best-effort: a process may read part of a file before it is killed.
Running nlock requires root (CAP_SYS_ADMIN).

---
Options
---
--pattern=...           - The file pattern, '**' matches any depth. (e.g '{APP_NAME} {NLOCK_COMMAND} --pattern=/home/user/*.txt')
-log                    - Print information on processes that try to access the locked files.
-kill                   - Kill processes that attempt to access the files.
-mount                  - Mark the whole mount of each file instead of the file itself.
--poll-interval-ms=...  - How long to wait for events before checking for Ctrl+C. (default 250)
--conf=...              - Load a config file which replaces the need to provide these flags.

Example Usage:
{APP_NAME} {NLOCK_COMMAND} --pattern=/home/user/**/*.txt -log -kill

Example config:

nlock.json
'''
{{
    "patterns": [
        "/home/user/example.txt",
        "/home/user/**/*.docx"
    ],
    "options": ["log", "kill"]
}}
'''

Config files ending in .toml are read as TOML with the same keys.
Set LORDT_LOG=debug for more detail.
"#
    )
}
