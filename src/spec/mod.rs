//! Spec layer: job JSON schema + deserialized job description.
//!
//! This module is intentionally separate from compilation and execution.
//! It owns:
//! - Job description (input/output repositories, files, task)
//! - Schema validation gate

pub mod job;
pub mod schema;

pub use job::{FileRecord, JobDescription};
pub use schema::{JobSchema, load_job};
