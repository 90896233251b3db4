/// ietadm and the LVM tools need root; running without it is allowed
/// (e.g. sudo wrappers) but worth a warning.
#[cfg(unix)]
pub fn is_elevated() -> bool {
    unsafe { libc::geteuid() == 0 }
}

#[cfg(not(unix))]
pub fn is_elevated() -> bool {
    false
}
