//! # fragwire-settings
//!
//! Layered configuration for the fragwire server.
//!
//! Settings are loaded from three layers (in priority order):
//! 1. **Compiled defaults** — [`FragwireSettings::default()`]
//! 2. **Settings file** — `fragwire.json` by default (deep-merged over defaults)
//! 3. **Environment variables** — `FRAGWIRE_*` overrides (highest priority)
//!
//! The binary applies CLI flags on top of the result.

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{DEFAULT_SETTINGS_FILE, apply_env_overrides, deep_merge, load_settings_from_path};
pub use types::*;
