// LVM logical volume creation and removal.
// lvcreate/lvremove are run directly so their exit codes are never lost.

use crate::core::runner::{args, run_checked, CommandRunner};
use crate::error::Result;

/// Device path of a logical volume
pub fn volume_path(vg: &str, name: &str) -> String {
    format!("/dev/{}/{}", vg, name)
}

/// Name of the volume backing LUN `lun` of target `target`
pub fn lun_volume_name(target: &str, lun: u32) -> String {
    format!("{}_{}", target, lun)
}

pub fn create_volume<R: CommandRunner + ?Sized>(
    runner: &R,
    name: &str,
    vg: &str,
    size: &str,
) -> Result<String> {
    log::info!("Creating logical volume {}/{} ({})", vg, name, size);
    run_checked(runner, "lvcreate", &args(["-n", name, vg, "-L", size]))?;
    Ok(volume_path(vg, name))
}

/// Removes a volume by device path
pub fn remove_volume<R: CommandRunner + ?Sized>(runner: &R, path: &str) -> Result<()> {
    log::info!("Removing logical volume {}", path);
    run_checked(runner, "lvremove", &args(["-f", path]))?;
    Ok(())
}
