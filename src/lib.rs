// ietlv Library - Public API

// Re-export error types
pub mod error;
pub use error::{IetError, Result};

// Module declarations
pub mod commands;
pub mod core;
pub mod platform;
pub mod ui;

// Re-export commonly used types
pub use crate::core::config::Config;
pub use crate::core::target_manager::TargetManager;

// Initialize logging; RUST_LOG overrides the default level
pub fn init_logging() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
}
