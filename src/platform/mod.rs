// Platform-specific code module

pub mod elevation;
pub mod lock;

pub use elevation::is_elevated;
pub use lock::FileLock;
