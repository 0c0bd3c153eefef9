//! # agrinova-settings
//!
//! Configuration management with layered sources.
//!
//! Settings are loaded from three layers (in priority order):
//! 1. **Compiled defaults**: [`AgriSettings::default()`]
//! 2. **User file**: `~/.agrinova/settings.json` or an explicit path
//! 3. **Environment variables**: `AGRINOVA_*` overrides
//!
//! The binary applies CLI flags on top of the loaded value.

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{deep_merge, load_settings, load_settings_from_path, settings_path};
pub use types::*;
