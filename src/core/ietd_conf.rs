//! Line-oriented editor for ietd's static configuration.
//!
//! Only `Target` lines and the `Lun` lines nested under them are interpreted;
//! everything else is carried through untouched. Lines keep their original
//! terminators so a rewrite leaves unrelated content byte-for-byte intact.

use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::core::config::IoType;
use crate::error::Result;

/// A `Lun` line to be written under a target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LunEntry {
    pub lun: u32,
    pub path: String,
    pub iotype: IoType,
}

impl fmt::Display for LunEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\tLun {} PATH={},Type={}", self.lun, self.path, self.iotype)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IetdConf {
    lines: Vec<String>,
}

fn keyword_args<'a>(line: &'a str, keyword: &str) -> Option<Vec<&'a str>> {
    let mut tokens = line.split_whitespace();
    if tokens.next()? != keyword {
        return None;
    }
    Some(tokens.collect())
}

fn is_target_line(line: &str) -> bool {
    keyword_args(line, "Target").is_some()
}

/// Name of the target declared on a `Target [<tid>] <name>` line
fn target_name(line: &str) -> Option<&str> {
    keyword_args(line, "Target")?.last().copied()
}

fn lun_number(line: &str) -> Option<u32> {
    keyword_args(line, "Lun")?.first()?.parse().ok()
}

/// Final target of `path`; a path that does not exist yet is used as is
fn resolve_link(path: &Path) -> Result<PathBuf> {
    match fs::canonicalize(path) {
        Ok(resolved) => Ok(resolved),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(path.to_path_buf()),
        Err(e) => Err(e.into()),
    }
}

/// Gives the replacement file the mode, owner and group of the original
#[cfg(unix)]
fn copy_ownership(tmp: &Path, original: &fs::Metadata) -> Result<()> {
    use std::os::unix::fs::MetadataExt;

    fs::set_permissions(tmp, original.permissions())?;

    let current = fs::metadata(tmp)?;
    if current.uid() != original.uid() || current.gid() != original.gid() {
        std::os::unix::fs::chown(tmp, Some(original.uid()), Some(original.gid()))?;
    }
    Ok(())
}

#[cfg(not(unix))]
fn copy_ownership(tmp: &Path, original: &fs::Metadata) -> Result<()> {
    fs::set_permissions(tmp, original.permissions())?;
    Ok(())
}

impl IetdConf {
    pub fn parse(content: &str) -> Self {
        Self {
            lines: content.split_inclusive('\n').map(str::to_string).collect(),
        }
    }

    /// Reads the file; a missing file is treated as empty
    pub fn load(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(content) => Ok(Self::parse(&content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::warn!("{:?} does not exist yet, starting from an empty file", path);
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn render(&self) -> String {
        self.lines.concat()
    }

    /// Replaces `path` with the rendered content via a temp file and rename.
    /// A symlinked `path` is followed so the link target is rewritten.
    pub fn save(&self, path: &Path) -> Result<()> {
        let path = resolve_link(path)?;
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };

        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(self.render().as_bytes())?;
        tmp.as_file().sync_all()?;

        match fs::metadata(&path) {
            Ok(meta) => copy_ownership(tmp.path(), &meta)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        tmp.persist(&path).map_err(|e| e.error)?;
        log::debug!("Rewrote {:?}", path);
        Ok(())
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(|l| l.trim_end_matches(['\n', '\r']))
    }

    /// Names of all declared targets, in file order
    pub fn target_names(&self) -> Vec<&str> {
        self.lines.iter().filter_map(|l| target_name(l)).collect()
    }

    /// LUN numbers declared under `iqn`
    pub fn luns_of(&self, iqn: &str) -> Vec<u32> {
        match self.block(iqn) {
            Some((start, end)) => self.lines[start + 1..end]
                .iter()
                .filter_map(|l| lun_number(l))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Half-open line range `[target line, next Target line or EOF)`
    fn block(&self, iqn: &str) -> Option<(usize, usize)> {
        let start = self
            .lines
            .iter()
            .position(|l| target_name(l) == Some(iqn))?;
        let end = self.lines[start + 1..]
            .iter()
            .position(|l| is_target_line(l))
            .map_or(self.lines.len(), |offset| start + 1 + offset);
        Some((start, end))
    }

    fn ensure_trailing_newline(&mut self) {
        if let Some(last) = self.lines.last_mut() {
            if !last.ends_with('\n') {
                last.push('\n');
            }
        }
    }

    pub fn add_target(&mut self, tid: u32, iqn: &str) {
        self.ensure_trailing_newline();
        self.lines.push(format!("Target {} {}\n", tid, iqn));
    }

    /// Removes the target line and everything up to the next target.
    /// Returns false when the target is not declared.
    pub fn remove_target(&mut self, iqn: &str) -> bool {
        match self.block(iqn) {
            Some((start, end)) => {
                self.lines.drain(start..end);
                true
            }
            None => false,
        }
    }

    /// Inserts the LUN after the last `Lun` line of the target's block, or
    /// appends a new block when the target is not declared yet
    pub fn add_lun(&mut self, tid: u32, iqn: &str, entry: &LunEntry) {
        let line = format!("{}\n", entry);

        match self.block(iqn) {
            Some((start, end)) => {
                let at = (start + 1..end)
                    .rev()
                    .find(|&i| lun_number(&self.lines[i]).is_some())
                    .map_or(start + 1, |i| i + 1);
                if at == self.lines.len() {
                    self.ensure_trailing_newline();
                }
                self.lines.insert(at, line);
            }
            None => {
                self.add_target(tid, iqn);
                self.lines.push(line);
            }
        }
    }

    /// Removes the LUN line(s) numbered `lun` from the target's block.
    /// Returns false when nothing matched.
    pub fn remove_lun(&mut self, iqn: &str, lun: u32) -> bool {
        let Some((start, end)) = self.block(iqn) else {
            return false;
        };

        let before = self.lines.len();
        let mut index = start + 1;
        let mut end = end;
        while index < end {
            if lun_number(&self.lines[index]) == Some(lun) {
                self.lines.remove(index);
                end -= 1;
            } else {
                index += 1;
            }
        }
        self.lines.len() != before
    }
}
