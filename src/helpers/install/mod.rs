//! INSTALL phase - placement and cleanup

pub mod placement;

pub use placement::{check_writable, discard, ensure_destination, place_flat};
