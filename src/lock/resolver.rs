//! Pattern resolution
//!
//! Expands glob patterns (including `**` for any depth) into canonical file
//! paths. Invalid patterns and unreadable entries are logged and skipped so
//! one bad pattern never prevents the others from being locked.

use std::collections::BTreeSet;
use std::path::Path;

use log::{debug, warn};

use crate::models::{LockError, WatchTarget};

/// Resolve one pattern into the canonical files it currently matches.
///
/// A pattern matching nothing yields an empty list. Directories are skipped.
pub fn resolve(pattern: &str) -> Result<Vec<WatchTarget>, LockError> {
    let entries = glob::glob(pattern).map_err(|source| LockError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })?;

    let mut targets = BTreeSet::new();
    for entry in entries {
        let path = match entry {
            Ok(path) => path,
            Err(e) => {
                warn!("skipping unreadable entry: {}", e);
                continue;
            }
        };

        match canonical_file(&path) {
            Ok(Some(target)) => {
                targets.insert(target);
            }
            Ok(None) => debug!("skipping directory {}", path.display()),
            Err(e) => warn!("skipping {}: {}", path.display(), e),
        }
    }

    Ok(targets.into_iter().collect())
}

/// Resolve every pattern, logging and skipping the ones that fail
pub fn resolve_all(patterns: &[String]) -> Vec<WatchTarget> {
    let mut targets = BTreeSet::new();

    for pattern in patterns {
        match resolve(pattern) {
            Ok(resolved) => {
                if resolved.is_empty() {
                    debug!("pattern '{}' matched no files", pattern);
                }
                targets.extend(resolved);
            }
            Err(e) => warn!("{}", e),
        }
    }

    targets.into_iter().collect()
}

fn canonical_file(path: &Path) -> std::io::Result<Option<WatchTarget>> {
    let target = WatchTarget::canonicalize(path)?;
    if target.as_path().is_dir() {
        return Ok(None);
    }
    Ok(Some(target))
}
