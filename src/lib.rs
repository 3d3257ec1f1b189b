//! hamconf - INI-style configuration store and text utilities for amateur radio tools
//!
//! The core is [`ConfigStore`], which loads an INI-style file into ordered
//! sections, answers typed lookups and writes the canonical form back out.
//!
//! # Modules
//!
//! - [`ini`] - Configuration store, sections and line parser
//! - [`text`] - Comment-skipping text reader and date/time formatting
//! - [`files`] - Recursive file listing
//! - [`config`] - Settings for the `hamconf` tool itself
//! - [`error`] - Error types

pub mod config;
pub mod error;
pub mod files;
pub mod ini;
pub mod text;

pub use config::Settings;
pub use error::{Error, Result};
pub use files::FileTree;
pub use ini::{ConfigStore, ConfigValue, DEFAULT_SECTION, Section, StoreState};
pub use text::TextReader;

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
