//! Workflow files and validation reports as returned by the dashboard API.
//!
//! - `WorkflowFile`: one entry of an application's workflow listing
//! - `ValidationResult`: the validator's verdict plus the parsed document

mod types;

pub use types::*;
