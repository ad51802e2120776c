//! Filesystem Utilities.
//!
//! This module provides helper functions for common filesystem operations,
//! such as ensuring a directory exists, reading file contents to a string,
//! and copying a file verbatim. These functions are designed to integrate
//! with the crate's error handling by returning `CoreError`.

use crate::error::CoreError;
use std::fs;
use std::path::Path;

/// Ensures that a directory exists at the given path.
///
/// If the path does not exist, this function will attempt to create it, including
/// any necessary parent directories.
/// If the path already exists but is not a directory, an error is returned.
/// If the path exists and is a directory, the function succeeds.
///
/// # Arguments
///
/// * `path`: A reference to a `Path` representing the directory whose existence should be ensured.
///
/// # Returns
///
/// * `Ok(())` if the directory exists or was successfully created.
/// * `Err(CoreError)` if the path exists but is not a directory, or if directory creation fails.
pub fn ensure_dir_exists(path: &Path) -> Result<(), CoreError> {
    if path.exists() {
        if !path.is_dir() {
            Err(CoreError::Filesystem {
                message: "Path exists but is not a directory".to_string(),
                path: path.to_path_buf(),
                source: std::io::Error::new(
                    std::io::ErrorKind::AlreadyExists,
                    "Path exists but is not a directory",
                ),
            })
        } else {
            Ok(())
        }
    } else {
        fs::create_dir_all(path).map_err(|e| CoreError::Filesystem {
            message: "Failed to create directory".to_string(),
            path: path.to_path_buf(),
            source: e,
        })
    }
}

/// Reads the entire contents of a file into a string.
///
/// This is a convenience wrapper around `std::fs::read_to_string` that maps
/// the `std::io::Error` to `CoreError::Filesystem`.
///
/// # Arguments
///
/// * `path`: A reference to a `Path` representing the file to read.
///
/// # Returns
///
/// * `Ok(String)` containing the file contents if successful.
/// * `Err(CoreError)` if the file cannot be read (e.g., does not exist, permissions error).
pub fn read_to_string(path: &Path) -> Result<String, CoreError> {
    fs::read_to_string(path).map_err(|e| CoreError::Filesystem {
        message: "Failed to read file to string".to_string(),
        path: path.to_path_buf(),
        source: e,
    })
}

/// Writes a string to a file.
///
/// This is a convenience wrapper around `std::fs::write` that maps
/// the `std::io::Error` to `CoreError::Filesystem`. It will create the file
/// if it does not exist, and will truncate it if it does.
///
/// # Arguments
///
/// * `path`: A reference to a `Path` representing the file to write to.
/// * `content`: The string content to write to the file.
///
/// # Returns
///
/// * `Ok(())` if the content was successfully written.
/// * `Err(CoreError)` if the file cannot be written (e.g., permissions error, path is a directory).
pub fn write_string_to_file(path: &Path, content: &str) -> Result<(), CoreError> {
    fs::write(path, content).map_err(|e| CoreError::Filesystem {
        message: "Failed to write string to file".to_string(),
        path: path.to_path_buf(),
        source: e,
    })
}

/// Copies a file from `from` to `to`, byte for byte.
///
/// Wrapper around `std::fs::copy` that maps the `std::io::Error` to
/// `CoreError::Filesystem`. The destination is created or truncated.
/// The reported path in the error is the destination.
///
/// # Returns
///
/// * `Ok(())` if the copy succeeded.
/// * `Err(CoreError)` if the source cannot be read or the destination written.
pub fn copy_file(from: &Path, to: &Path) -> Result<(), CoreError> {
    fs::copy(from, to).map(|_| ()).map_err(|e| CoreError::Filesystem {
        message: format!("Failed to copy file from {:?}", from),
        path: to.to_path_buf(),
        source: e,
    })
}
