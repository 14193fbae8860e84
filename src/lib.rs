//! lordt - file access guard for Linux
//!
//! This library exposes the configuration models, the CLI parser and the
//! fanotify-based lock engine used by the `lordt nlock` tool.

#![forbid(unsafe_code)]

pub mod cli;
pub mod config;
pub mod constants;
pub mod lock;
pub mod logging;
pub mod models;
pub mod output;
