// src/config/mod.rs

//! Graph defaults for paperboy-dag.
//!
//! Responsibilities:
//! - Define the TOML-backed data model and its validated form (`model.rs`).
//! - Load a defaults file from disk (`loader.rs`).
//! - Validate durations, limits and role names (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path, load_or_default};
pub use model::{
    DagDefaults, DagSection, Defaults, OperatorDefaults, OperatorSection, RawDefaults,
    RoleOverride, RoleOverrides, RoleSection,
};
