use std::{
    fs::{self, File},
    io::Write,
    path::PathBuf,
};

use serde_json::Value;

pub type TempDir = PathBuf;
pub type TempFile = PathBuf;

/// Writes `content` to `name` inside a directory private to this process.
///
/// Callers remove the file themselves, usually with [`crate::defer!`].
pub fn create_file(name: &str, content: &str) -> (TempDir, TempFile) {
    let temp_dir = std::env::temp_dir().join(format!("solq-test-{}", std::process::id()));
    fs::create_dir_all(&temp_dir).expect("Failed to create temp dir");

    let temp_file = temp_dir.join(name);
    let mut file = File::create(&temp_file).expect("Failed to create temp file");
    file.write_all(content.as_bytes())
        .expect("Failed to write to temp file");

    (temp_dir, temp_file)
}

/// Like [`create_file`] for a JSON document.
pub fn create_json_file(name: &str, document: &Value) -> (TempDir, TempFile) {
    create_file(name, &document.to_string())
}
