// ietadm control operations against the running daemon

use crate::core::config::IoType;
use crate::core::runner::{args, run_checked, CommandRunner};
use crate::error::Result;

const IETADM: &str = "ietadm";

pub fn new_target<R: CommandRunner + ?Sized>(runner: &R, tid: u32, iqn: &str) -> Result<()> {
    log::info!("Creating target {} (tid {})", iqn, tid);
    let tid = tid.to_string();
    let params = format!("Name={}", iqn);
    run_checked(
        runner,
        IETADM,
        &args(["--op", "new", "--tid", tid.as_str(), "--params", params.as_str()]),
    )?;
    Ok(())
}

pub fn delete_target<R: CommandRunner + ?Sized>(runner: &R, tid: u32) -> Result<()> {
    log::info!("Deleting target tid {}", tid);
    let tid = tid.to_string();
    run_checked(runner, IETADM, &args(["--op", "delete", "--tid", tid.as_str()]))?;
    Ok(())
}

/// Attaches `path` to target `tid` as LUN `lun`
pub fn new_lun<R: CommandRunner + ?Sized>(
    runner: &R,
    tid: u32,
    lun: u32,
    path: &str,
    iotype: IoType,
) -> Result<()> {
    log::info!("Attaching {} as LUN {} on tid {}", path, lun, tid);
    let tid = tid.to_string();
    let lun = lun.to_string();
    let params = format!("Path={},Type={}", path, iotype);
    run_checked(
        runner,
        IETADM,
        &args([
            "--op",
            "new",
            "--tid",
            tid.as_str(),
            "--lun",
            lun.as_str(),
            "--params",
            params.as_str(),
        ]),
    )?;
    Ok(())
}

pub fn delete_lun<R: CommandRunner + ?Sized>(runner: &R, tid: u32, lun: u32) -> Result<()> {
    log::info!("Detaching LUN {} from tid {}", lun, tid);
    let tid = tid.to_string();
    let lun = lun.to_string();
    run_checked(
        runner,
        IETADM,
        &args(["--op", "delete", "--tid", tid.as_str(), "--lun", lun.as_str()]),
    )?;
    Ok(())
}
