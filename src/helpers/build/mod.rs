//! BUILD phase - peeling encoding layers
//!
//! - **sniff**: classify content as gzip, tar or opaque by its leading bytes
//! - **extract**: gunzip one layer, unpack one tar layer

pub mod extract;
pub mod sniff;

pub use extract::{ArchiveLayer, UnpackSummary, gunzip, unpack_tar};
pub use sniff::{Format, classify, sniff_file};
