use crate::core::config::Settings;
use crate::core::runner::{args, CommandRunner};
use crate::error::Result;

/// Checks whether ietd is running on this node.
///
/// In an active/passive pair only the active node runs ietd, so every
/// mutating operation requires this to be true.
pub fn is_running<R: CommandRunner + ?Sized>(runner: &R, settings: &Settings) -> Result<bool> {
    let output = runner.run(
        "pgrep",
        &args(["-u", settings.daemon_user.as_str(), settings.daemon.as_str()]),
    )?;

    // pgrep exits 1 when nothing matched
    let running = output.success() && !output.stdout.trim().is_empty();
    if !running {
        log::warn!("{} is not running", settings.daemon);
    }
    Ok(running)
}
