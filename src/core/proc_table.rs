//! Reader for ietd's kernel volume table (`/proc/net/iet/volume`).
//!
//! The table lists one line per live target followed by one indented line per
//! LUN:
//!
//! ```text
//! tid:1 name:iqn.2007-12.net.enpraxis:test
//! 	lun:0 state:0 iotype:blockio iomode:wt blocks:2097152 blocksize:512 path:/dev/vg_spare/test_0
//! ```

use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;
use std::path::Path;

use crate::error::{IetError, Result};

/// `key:value` pairs; values may themselves contain ':' (IQNs)
static FIELD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\w+):(\S*)").expect("valid regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcLun {
    pub lun: u32,
    pub iotype: Option<String>,
    pub path: Option<String>,
    pub blocks: Option<u64>,
    pub blocksize: Option<u64>,
}

impl ProcLun {
    /// Capacity in bytes when the kernel reported block geometry
    pub fn size_bytes(&self) -> Option<u64> {
        Some(self.blocks? * self.blocksize?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcTarget {
    pub tid: u32,
    pub name: String,
    pub luns: Vec<ProcLun>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VolumeTable {
    targets: Vec<ProcTarget>,
}

fn fields(line: &str) -> impl Iterator<Item = (&str, &str)> {
    FIELD_RE.captures_iter(line).filter_map(|caps| {
        let key = caps.get(1)?.as_str();
        let value = caps.get(2)?.as_str();
        Some((key, value))
    })
}

fn field<'a>(line: &'a str, key: &str) -> Option<&'a str> {
    fields(line).find(|(k, _)| *k == key).map(|(_, v)| v)
}

impl VolumeTable {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(Self::parse(&content))
    }

    pub fn parse(content: &str) -> Self {
        let mut targets: Vec<ProcTarget> = Vec::new();

        for line in content.lines() {
            let trimmed = line.trim_start();
            if trimmed.starts_with("tid:") {
                let Some(tid) = field(trimmed, "tid").and_then(|v| v.parse().ok()) else {
                    log::warn!("Skipping malformed volume table line: {}", line);
                    continue;
                };
                targets.push(ProcTarget {
                    tid,
                    name: field(trimmed, "name").unwrap_or_default().to_string(),
                    luns: Vec::new(),
                });
            } else if trimmed.starts_with("lun:") {
                let (Some(target), Some(lun)) = (
                    targets.last_mut(),
                    field(trimmed, "lun").and_then(|v| v.parse().ok()),
                ) else {
                    log::warn!("Skipping stray volume table line: {}", line);
                    continue;
                };
                target.luns.push(ProcLun {
                    lun,
                    iotype: field(trimmed, "iotype").map(str::to_string),
                    path: field(trimmed, "path").map(str::to_string),
                    blocks: field(trimmed, "blocks").and_then(|v| v.parse().ok()),
                    blocksize: field(trimmed, "blocksize").and_then(|v| v.parse().ok()),
                });
            }
        }

        Self { targets }
    }

    pub fn targets(&self) -> &[ProcTarget] {
        &self.targets
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn find(&self, iqn: &str) -> Option<&ProcTarget> {
        self.targets.iter().find(|t| t.name == iqn)
    }

    /// One past the highest live TID, or 1 when no target exists.
    ///
    /// Deleted TIDs are never handed out again so a stale initiator cannot
    /// reconnect to a different target.
    pub fn next_tid(&self) -> Result<u32> {
        match self.targets.iter().map(|t| t.tid).max() {
            None => Ok(1),
            Some(max) => max.checked_add(1).ok_or(IetError::TidExhausted(max)),
        }
    }

    pub fn tid_of(&self, iqn: &str) -> Option<u32> {
        self.find(iqn).map(|t| t.tid)
    }

    /// Backing paths of every LUN attached to `iqn`
    pub fn volumes_of(&self, iqn: &str) -> Vec<String> {
        self.find(iqn)
            .map(|t| t.luns.iter().filter_map(|l| l.path.clone()).collect())
            .unwrap_or_default()
    }
}
