//! Shared test support for the solq crates.
pub mod fs;
pub mod strategies;

pub use fs::{create_file, create_json_file};
pub use scopeguard::defer;
