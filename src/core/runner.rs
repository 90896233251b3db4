// Execution of external tools (pgrep, ietadm, lvcreate, lvremove)

use std::path::PathBuf;
use std::process::Command;

use crate::error::{IetError, Result};

/// Captured result of one external command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, `None` when the process was killed by a signal
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }
}

/// Runs a program with an argument vector and waits for it to finish.
///
/// Arguments are passed straight to the process, never through a shell.
pub trait CommandRunner {
    fn run(&self, program: &str, args: &[String]) -> Result<CommandOutput>;
}

impl<T: CommandRunner + ?Sized> CommandRunner for &T {
    fn run(&self, program: &str, args: &[String]) -> Result<CommandOutput> {
        (**self).run(program, args)
    }
}

/// Runner backed by `std::process::Command`
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl SystemRunner {
    fn locate(program: &str) -> Result<PathBuf> {
        which::which(program).map_err(|_| IetError::CommandNotFound(program.to_string()))
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[String]) -> Result<CommandOutput> {
        let path = Self::locate(program)?;
        log::debug!("Running {} {}", program, args.join(" "));

        let output = Command::new(&path).args(args).output()?;

        Ok(CommandOutput {
            status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}

/// Runs a command and turns a non-zero exit into `IetError::CommandFailed`
pub fn run_checked<R: CommandRunner + ?Sized>(
    runner: &R,
    program: &str,
    args: &[String],
) -> Result<CommandOutput> {
    let output = runner.run(program, args)?;
    if output.success() {
        return Ok(output);
    }

    let code = output.status.unwrap_or(-1);
    log::error!(
        "{} {} exited with status {}: {}",
        program,
        args.join(" "),
        code,
        output.stderr
    );
    Err(IetError::CommandFailed {
        program: program.to_string(),
        code,
        stderr: output.stderr,
    })
}

/// Builds an owned argument vector from string slices
pub fn args<I, S>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    items.into_iter().map(Into::into).collect()
}
