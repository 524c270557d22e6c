// src/config/loader.rs

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::config::model::{Defaults, RawDefaults};
use crate::errors::Result;

/// Load a defaults file from a given path and return the raw `RawDefaults`.
///
/// This only performs TOML deserialization; it does **not** validate
/// durations or retry caps. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawDefaults> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let raw: RawDefaults = toml::from_str(&contents)?;

    Ok(raw)
}

/// Load a defaults file from path and validate it.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<Defaults> {
    let path = path.as_ref();
    let raw = load_from_path(path)?;
    let defaults = Defaults::try_from(raw)?;
    debug!(path = %path.display(), "loaded graph defaults");
    Ok(defaults)
}

/// Load defaults from `path` when given, otherwise fall back to the
/// built-in values.
pub fn load_or_default(path: Option<&Path>) -> Result<Defaults> {
    match path {
        Some(p) => load_and_validate(p),
        None => Ok(Defaults::default()),
    }
}
