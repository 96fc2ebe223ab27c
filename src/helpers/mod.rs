//! Acquisition pipeline stages
//!
//! Each stage is a set of plain functions over explicit inputs, grouped by
//! the phase it serves:
//!
//! - **acquire**: fetch a remote resource into a temporary file
//! - **build**: sniff content and peel gzip / tar layers
//! - **install**: create destinations, place payloads, clean up layers
//! - **internal**: shared filesystem, URL and progress helpers

pub mod acquire;
pub mod build;
pub mod install;
pub mod internal;
