//! Console launcher
//!
//! Re-invokes the companion executable with `--console` prepended to
//! the arguments it was given. On Windows this binary is built for the
//! console subsystem, so the child inherits a real console; elsewhere it
//! is a plain pass-through.
//!
//! Every argument is forwarded; the launcher has no flags of its own.
//! It is configured through `console-launch.toml` (beside the
//! executable, or the file named by `CONSOLE_LAUNCH_CONFIG`) and logs
//! at the level given by `CONSOLE_LAUNCH_LOG`.

use anyhow::{Context, Result};
use std::ffi::OsString;
use std::path::PathBuf;

mod config;
mod launch;

use launch::{Launcher, FAILURE_EXIT_CODE};

/// Environment variable holding the log filter
const LOG_ENV: &str = "CONSOLE_LAUNCH_LOG";

/// Command line of the launcher
#[derive(Debug)]
struct Args {
    /// Arguments forwarded verbatim to the companion executable
    forwarded: Vec<OsString>,
}

impl Args {
    /// Take everything after the program name, `--` included
    fn from_os_args<I>(args: I) -> Self
    where
        I: IntoIterator<Item = OsString>,
    {
        Self {
            forwarded: args.into_iter().skip(1).collect(),
        }
    }
}

fn main() {
    let args = Args::from_os_args(std::env::args_os());

    init_logging();

    let code = match run(&args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{:#}", e);
            FAILURE_EXIT_CODE
        }
    };

    std::process::exit(code);
}

fn run(args: &Args) -> Result<i32> {
    let exe_dir = launcher_dir();
    log::debug!("Launcher directory: {:?}", exe_dir);

    let config = config::resolve_config(std::env::var_os(config::CONFIG_ENV), exe_dir.as_deref())
        .context("Failed to load launch configuration")?;

    let launcher = Launcher::from_config(&config, exe_dir.as_deref());
    let code = launcher.run(&args.forwarded)?;
    Ok(code)
}

/// Directory containing this executable, if it can be determined
fn launcher_dir() -> Option<PathBuf> {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(PathBuf::from))
}

/// Initialize logging from `CONSOLE_LAUNCH_LOG` (default: warn)
fn init_logging() {
    use env_logger::{Builder, Env};
    use std::io::Write;

    Builder::from_env(Env::new().filter_or(LOG_ENV, "warn"))
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}
