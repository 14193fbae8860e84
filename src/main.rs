#![forbid(unsafe_code)]

use anyhow::{Context, Result};

use lordt::cli::{self, help, CliAction};
use lordt::lock::{self, ShutdownSignal};
use lordt::logging;

fn main() -> Result<()> {
    logging::init_logger()?;

    match cli::parse_args()? {
        CliAction::Help => print!("{}", help::tools_help()),
        CliAction::Version => println!("lordt {}", help::version_string()),
        CliAction::NlockUsage => print!("{}", help::nlock_usage()),
        CliAction::Lock(config) => {
            let shutdown = ShutdownSignal::install()
                .context("Failed to register signal handlers")?;
            lock::run_lock(&config, &shutdown)?;
        }
    }

    Ok(())
}
