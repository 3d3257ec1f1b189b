//! Tool configuration module
//!
//! Handles the `hamconf` tool's own settings (`config.toml` in the platform
//! config directory), not the INI files it edits.

mod settings;

pub use settings::*;
