// UI and formatting module

pub mod formatters;
pub mod prompts;

// Re-export commonly used items for cleaner imports
pub use formatters::{format_size, render_volume_table};
pub use prompts::{confirm, error, warn};
