// Command handlers module
pub mod config;
pub mod lun;
pub mod show;
pub mod target;
pub mod version;

use anyhow::Result;
use std::path::PathBuf;

use crate::core::{Config, Overrides, TargetManager};
use crate::platform::is_elevated;
use crate::ui;

// Re-exports for cleaner imports
pub use version::execute as version;

/// Collects the global --iqn-base/--volgroup/--ietd-config flags
pub fn overrides_from(matches: &clap::ArgMatches) -> Overrides {
    Overrides {
        iqn_base: matches.get_one::<String>("iqn-base").cloned(),
        volgroup: matches.get_one::<String>("volgroup").cloned(),
        ietd_config: matches.get_one::<PathBuf>("ietd-config").cloned(),
    }
}

/// Loads stored settings, applies the per-call flags and builds a manager
pub(crate) fn manager_from(matches: &clap::ArgMatches) -> Result<TargetManager> {
    if !is_elevated() {
        ui::warn("not running as root; ietadm and LVM commands will probably fail");
    }

    let config = Config::load()?;
    let settings = config.resolve(&overrides_from(matches))?;
    log::debug!("Resolved settings: {:?}", settings);
    Ok(TargetManager::new(settings))
}

/// Asks before a destructive step unless --yes was given
pub(crate) fn confirmed(matches: &clap::ArgMatches, prompt: &str) -> Result<bool> {
    if matches.get_flag("yes") {
        return Ok(true);
    }

    if ui::confirm(prompt)? {
        return Ok(true);
    }

    println!();
    ui::warn("Operation cancelled by user.");
    Ok(false)
}
