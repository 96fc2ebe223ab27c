//! Core infrastructure shared by the library and the CLI.

pub mod output;
