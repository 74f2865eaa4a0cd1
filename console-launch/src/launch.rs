//! Child process assembly and execution
//!
//! Builds `<program> <flag> ARGS...`, enforces the command line limit,
//! spawns the child with inherited stdio and waits for it.

use crate::config::LaunchConfig;
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

/// Exit code used when the launcher itself fails
pub const FAILURE_EXIT_CODE: i32 = 1;

/// Errors that can occur while launching the child
#[derive(Debug, thiserror::Error)]
pub enum LaunchError {
    #[error("Arguments string is too long! ({length} characters, limit {limit})")]
    ArgumentsTooLong { length: usize, limit: usize },

    #[error("Failed to launch {program}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed waiting for {program}")]
    Wait {
        program: String,
        #[source]
        source: io::Error,
    },
}

/// A resolved launch plan
#[derive(Debug, Clone)]
pub struct Launcher {
    program: PathBuf,
    flag: String,
    max_command_line: usize,
}

impl Launcher {
    /// Build a launcher, resolving a relative program next to `exe_dir`
    ///
    /// A relative program that does not exist there is left as is, so the
    /// platform's executable search applies.
    pub fn from_config(config: &LaunchConfig, exe_dir: Option<&Path>) -> Self {
        let program = match exe_dir {
            Some(dir) if config.program.is_relative() && dir.join(&config.program).is_file() => {
                dir.join(&config.program)
            }
            _ => config.program.clone(),
        };

        Self {
            program,
            flag: config.flag.clone(),
            max_command_line: config.max_command_line,
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Length of `<program> <flag> ARGS...` joined by single spaces
    pub fn command_line_length(&self, args: &[OsString]) -> usize {
        let head = self.program.as_os_str().len() + 1 + self.flag.len();
        args.iter().fold(head, |length, arg| length + 1 + arg.len())
    }

    /// Assemble the child command, checking the length limit
    pub fn command(&self, args: &[OsString]) -> Result<Command, LaunchError> {
        let length = self.command_line_length(args);
        if length >= self.max_command_line {
            return Err(LaunchError::ArgumentsTooLong {
                length,
                limit: self.max_command_line,
            });
        }

        let mut command = Command::new(&self.program);
        command.arg(&self.flag).args(args);
        Ok(command)
    }

    /// Spawn the child, wait for it and return its exit code
    pub fn run(&self, args: &[OsString]) -> Result<i32, LaunchError> {
        let program = self.program().display().to_string();
        let mut command = self.command(args)?;

        log::info!("Launching {} {} ({} forwarded arguments)", program, self.flag, args.len());

        let mut child = command.spawn().map_err(|source| LaunchError::Spawn {
            program: program.clone(),
            source,
        })?;

        let status = child
            .wait()
            .map_err(|source| LaunchError::Wait { program, source })?;

        log::debug!("Child exited with {}", status);
        Ok(exit_code(status))
    }
}

/// Child exit status as the launcher's own exit code
///
/// A child that ended without a code (killed by a signal) maps to
/// [`FAILURE_EXIT_CODE`].
pub fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(FAILURE_EXIT_CODE)
}
