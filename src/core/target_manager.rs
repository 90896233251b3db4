//! iSCSI target and LUN lifecycle.
//!
//! Every mutating operation checks that ietd runs on this node, then holds the
//! node-wide lock while it allocates IDs, drives ietadm/LVM and rewrites
//! ietd.conf. Steps that cannot be undone are reported through
//! [`IetError::Partial`] when a later step fails.

use std::fs;

use crate::core::config::Settings;
use crate::core::ietd_conf::{IetdConf, LunEntry};
use crate::core::proc_table::VolumeTable;
use crate::core::runner::{CommandRunner, SystemRunner};
use crate::core::{daemon, ietadm, lvm, validation};
use crate::error::{IetError, Result};
use crate::platform::FileLock;

/// A target created by [`TargetManager::add_target`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetInfo {
    pub name: String,
    pub iqn: String,
    pub tid: u32,
}

/// Outcome of [`TargetManager::delete_target`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetRemoval {
    pub iqn: String,
    pub tid: u32,
    /// Volumes that were attached when the target was deleted
    pub volumes: Vec<String>,
    /// Subset of `volumes` that was removed with `purge_volumes`
    pub purged: Vec<String>,
}

/// A LUN handled by [`TargetManager::add_lun`] or [`TargetManager::delete_lun`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LunInfo {
    pub iqn: String,
    pub tid: u32,
    pub lun: u32,
    pub volume: String,
    pub path: String,
}

pub struct TargetManager<R: CommandRunner = SystemRunner> {
    settings: Settings,
    runner: R,
}

impl TargetManager<SystemRunner> {
    pub fn new(settings: Settings) -> Self {
        Self::with_runner(settings, SystemRunner)
    }
}

impl<R: CommandRunner> TargetManager<R> {
    /// Create a manager with a specific command runner (useful for testing)
    pub fn with_runner(settings: Settings, runner: R) -> Self {
        Self { settings, runner }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// `<iqn_base>:<name>`
    pub fn full_iqn(&self, name: &str) -> Result<String> {
        Ok(format!("{}:{}", self.settings.iqn_base()?, name))
    }

    fn ensure_running(&self) -> Result<()> {
        if daemon::is_running(&self.runner, &self.settings)? {
            Ok(())
        } else {
            Err(IetError::DaemonNotRunning)
        }
    }

    /// Precondition check plus the node-wide lock, in that order
    fn begin(&self) -> Result<FileLock> {
        self.ensure_running()?;
        FileLock::acquire(&self.settings.lock_path())
    }

    pub fn volume_table(&self) -> Result<VolumeTable> {
        VolumeTable::load(&self.settings.volume_table)
    }

    fn resolve_tid(&self, table: &VolumeTable, iqn: &str) -> Result<u32> {
        table.tid_of(iqn).ok_or_else(|| {
            log::error!("{} not found in {:?}", iqn, self.settings.volume_table);
            IetError::TargetNotFound(iqn.to_string())
        })
    }

    fn checked_iqn(&self, name: &str) -> Result<String> {
        validation::validate_target_name(name)?;
        let iqn = self.full_iqn(name)?;
        validation::validate_full_iqn(&iqn)?;
        Ok(iqn)
    }

    fn edit_ietd_conf<F>(&self, edit: F) -> Result<()>
    where
        F: FnOnce(&mut IetdConf),
    {
        let path = &self.settings.ietd_config;
        let mut conf = IetdConf::load(path)?;
        edit(&mut conf);
        conf.save(path)
    }

    /// Creates target `<iqn_base>:<name>` under a fresh TID and records it in
    /// ietd.conf
    pub fn add_target(&self, name: &str) -> Result<TargetInfo> {
        let iqn = self.checked_iqn(name)?;
        let _lock = self.begin()?;

        let table = self.volume_table()?;
        if table.tid_of(&iqn).is_some() {
            return Err(IetError::TargetExists(iqn));
        }
        let tid = table.next_tid()?;

        ietadm::new_target(&self.runner, tid, &iqn)?;

        self.edit_ietd_conf(|conf| conf.add_target(tid, &iqn))
            .map_err(|e| {
                IetError::partial(
                    format!("target {} was created in ietd", iqn),
                    format!("recording it in {:?}", self.settings.ietd_config),
                    e,
                )
            })?;

        log::info!("Target {} ready with tid {}", iqn, tid);
        Ok(TargetInfo {
            name: name.to_string(),
            iqn,
            tid,
        })
    }

    /// Deletes the target from ietd and ietd.conf. With `purge_volumes`, the
    /// logical volumes that backed its LUNs are removed as well.
    pub fn delete_target(&self, name: &str, purge_volumes: bool) -> Result<TargetRemoval> {
        let iqn = self.checked_iqn(name)?;
        let _lock = self.begin()?;

        let table = self.volume_table()?;
        let tid = self.resolve_tid(&table, &iqn)?;
        let volumes = table.volumes_of(&iqn);

        ietadm::delete_target(&self.runner, tid)?;

        self.edit_ietd_conf(|conf| {
            if !conf.remove_target(&iqn) {
                log::warn!("{} was not declared in ietd.conf", iqn);
            }
        })
        .map_err(|e| {
            IetError::partial(
                format!("target {} was deleted from ietd", iqn),
                format!("removing it from {:?}", self.settings.ietd_config),
                e,
            )
        })?;

        let mut purged = Vec::new();
        if purge_volumes {
            for path in &volumes {
                lvm::remove_volume(&self.runner, path).map_err(|e| {
                    IetError::partial(
                        format!("target {} was deleted and purged {:?}", iqn, purged),
                        format!("removing volume {}", path),
                        e,
                    )
                })?;
                purged.push(path.clone());
            }
        } else if !volumes.is_empty() {
            log::info!(
                "Target {} left {} volume(s) in place: {}",
                iqn,
                volumes.len(),
                volumes.join(", ")
            );
        }

        Ok(TargetRemoval {
            iqn,
            tid,
            volumes,
            purged,
        })
    }

    /// Creates a `<name>_<lun>` volume of `size` and attaches it to the target
    /// as LUN `lun`. If attaching fails the new volume is removed again.
    pub fn add_lun(&self, name: &str, lun: u32, size: &str) -> Result<LunInfo> {
        let iqn = self.checked_iqn(name)?;
        validation::validate_size(size)?;
        let vg = self.settings.volgroup()?.to_string();
        let _lock = self.begin()?;

        let table = self.volume_table()?;
        let tid = self.resolve_tid(&table, &iqn)?;

        let volume = lvm::lun_volume_name(name, lun);
        let path = lvm::create_volume(&self.runner, &volume, &vg, size)?;

        if let Err(attach_err) =
            ietadm::new_lun(&self.runner, tid, lun, &path, self.settings.iotype)
        {
            log::warn!("Attaching {} failed, removing the new volume", path);
            return match lvm::remove_volume(&self.runner, &path) {
                Ok(()) => Err(attach_err),
                Err(cleanup_err) => {
                    log::error!("Volume {} is orphaned: {}", path, cleanup_err);
                    Err(IetError::partial(
                        format!(
                            "volume {} was created and attaching it as LUN {} of {} failed ({}); the volume is left in place",
                            path, lun, iqn, attach_err
                        ),
                        format!("removing volume {}", path),
                        cleanup_err,
                    ))
                }
            };
        }

        let entry = LunEntry {
            lun,
            path: path.clone(),
            iotype: self.settings.iotype,
        };
        self.edit_ietd_conf(|conf| conf.add_lun(tid, &iqn, &entry))
            .map_err(|e| {
                IetError::partial(
                    format!("LUN {} was attached to {}", lun, iqn),
                    format!("recording it in {:?}", self.settings.ietd_config),
                    e,
                )
            })?;

        Ok(LunInfo {
            iqn,
            tid,
            lun,
            volume,
            path,
        })
    }

    /// Detaches LUN `lun`, drops it from ietd.conf and removes its volume
    pub fn delete_lun(&self, name: &str, lun: u32) -> Result<LunInfo> {
        let iqn = self.checked_iqn(name)?;
        let vg = self.settings.volgroup()?.to_string();
        let _lock = self.begin()?;

        let table = self.volume_table()?;
        let tid = self.resolve_tid(&table, &iqn)?;

        let volume = lvm::lun_volume_name(name, lun);
        let path = lvm::volume_path(&vg, &volume);

        ietadm::delete_lun(&self.runner, tid, lun)?;

        self.edit_ietd_conf(|conf| {
            if !conf.remove_lun(&iqn, lun) {
                log::warn!("LUN {} of {} was not declared in ietd.conf", lun, iqn);
            }
        })
        .map_err(|e| {
            IetError::partial(
                format!("LUN {} was detached from {}", lun, iqn),
                format!("removing it from {:?}", self.settings.ietd_config),
                e,
            )
        })?;

        lvm::remove_volume(&self.runner, &path).map_err(|e| {
            IetError::partial(
                format!("LUN {} was detached from {} and removed from ietd.conf", lun, iqn),
                format!("removing volume {}", path),
                e,
            )
        })?;

        Ok(LunInfo {
            iqn,
            tid,
            lun,
            volume,
            path,
        })
    }

    /// Raw contents of the kernel volume table
    pub fn list_volumes(&self) -> Result<String> {
        Ok(fs::read_to_string(&self.settings.volume_table)?)
    }

    /// Raw contents of the kernel session table
    pub fn list_sessions(&self) -> Result<String> {
        Ok(fs::read_to_string(&self.settings.session_table)?)
    }
}
