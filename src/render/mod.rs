//! Rendering module for exporting processed documents.

mod json;

pub use json::{to_json, JsonFormat};
