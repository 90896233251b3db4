// Input validation for values that end up on ietadm/lvm command lines
// and in ietd.conf

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{IetError, Result};

/// RFC 3720 limit for an iSCSI name
pub const MAX_IQN_LENGTH: usize = 223;

/// LVM refuses logical volume names longer than this
const MAX_LV_NAME_LENGTH: usize = 127;

static NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]*$").expect("valid regex"));

static IQN_BASE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^iqn\.[0-9]{4}-[0-9]{2}\.[a-z0-9][a-z0-9.-]*(:[A-Za-z0-9.:_-]+)?$")
        .expect("valid regex")
});

static VOLGROUP_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9+_.][A-Za-z0-9+_.-]*$").expect("valid regex"));

/// lvcreate -L accepts a number with an optional unit suffix
static SIZE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]+(\.[0-9]+)?[bBsSkKmMgGtTpPeE]?$").expect("valid regex"));

/// Validates the short target name that gets appended to the IQN base.
///
/// The name also becomes part of the logical volume name (`<name>_<lun>`),
/// so it must be safe for both.
pub fn validate_target_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(IetError::invalid_input("target name cannot be empty"));
    }
    if !NAME_RE.is_match(name) {
        return Err(IetError::invalid_input(format!(
            "target name '{}' may only contain letters, digits, '.', '_' and '-' and must start with a letter or digit",
            name
        )));
    }
    if name.len() + 12 > MAX_LV_NAME_LENGTH {
        return Err(IetError::invalid_input(format!(
            "target name '{}' is too long",
            name
        )));
    }
    Ok(())
}

pub fn validate_iqn_base(iqn_base: &str) -> Result<()> {
    if !IQN_BASE_RE.is_match(iqn_base) {
        return Err(IetError::invalid_input(format!(
            "'{}' is not a valid IQN base (expected e.g. iqn.2007-12.net.enpraxis)",
            iqn_base
        )));
    }
    Ok(())
}

/// Checks the assembled `<base>:<name>` against the iSCSI length limit
pub fn validate_full_iqn(iqn: &str) -> Result<()> {
    if iqn.len() > MAX_IQN_LENGTH {
        return Err(IetError::invalid_input(format!(
            "IQN '{}' is {} bytes long, max {}",
            iqn,
            iqn.len(),
            MAX_IQN_LENGTH
        )));
    }
    Ok(())
}

pub fn validate_volgroup(vg: &str) -> Result<()> {
    if !VOLGROUP_RE.is_match(vg) || vg == "." || vg == ".." {
        return Err(IetError::invalid_input(format!(
            "'{}' is not a valid volume group name",
            vg
        )));
    }
    Ok(())
}

pub fn validate_size(size: &str) -> Result<()> {
    if !SIZE_RE.is_match(size) {
        return Err(IetError::invalid_input(format!(
            "'{}' is not a valid size (expected e.g. 512M or 10G)",
            size
        )));
    }
    Ok(())
}
