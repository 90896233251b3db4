// Core business logic module

pub mod config;
pub mod daemon;
pub mod ietadm;
pub mod ietd_conf;
pub mod lvm;
pub mod proc_table;
pub mod runner;
pub mod target_manager;
pub mod validation;

// Re-export commonly used items
pub use config::{Config, IoType, Overrides, Settings};
pub use ietd_conf::{IetdConf, LunEntry};
pub use proc_table::{ProcLun, ProcTarget, VolumeTable};
pub use runner::{CommandOutput, CommandRunner, SystemRunner};
pub use target_manager::{LunInfo, TargetInfo, TargetManager, TargetRemoval};
