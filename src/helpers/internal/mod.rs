//! Internal utility modules
//!
//! Shared functionality used by the pipeline stages.

pub mod fs_utils;
pub mod progress;
pub mod url_utils;
