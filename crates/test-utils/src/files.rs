//! Temporary files for configuration and property-spec tests.

use std::fs;
use std::path::PathBuf;

/// Creates a temporary directory for test files.
///
/// The directory is automatically cleaned up when the returned `TempDir` is dropped.
pub fn temp_test_dir() -> tempfile::TempDir {
    tempfile::tempdir().expect("Failed to create temporary test directory")
}

/// Writes `contents` to `name` inside `dir` and returns the full path.
///
/// # Example
///
/// ```
/// use test_utils::{temp_test_dir, write_test_file};
///
/// let dir = temp_test_dir();
/// let path = write_test_file(&dir, "props.yaml", "air_temperature: {}\n");
/// assert!(path.exists());
/// ```
pub fn write_test_file(dir: &tempfile::TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("Failed to write test file");
    path
}
