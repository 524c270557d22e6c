// src/job/mod.rs

//! Job and report inputs.
//!
//! - [`decode`] turns base64 transport strings into raw documents.
//! - [`model`] holds the raw and validated data types.
//! - [`validate`] converts raw documents into [`Job`] / [`Report`].

pub mod decode;
pub mod model;
pub mod validate;

pub use decode::{decode_job, decode_reports};
pub use model::{EntityId, Interval, Job, JobOverrides, RawJob, RawReport, Report, Schedule};
pub use validate::validate_reports;
