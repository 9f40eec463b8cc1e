//! Plain-text framing: the file is the level data.

use crate::error::{GmdError, Result};

/// Interpret the file contents as level data.
pub fn read_level_data(bytes: &[u8]) -> Result<String> {
    String::from_utf8(bytes.to_vec()).map_err(|_| GmdError::NotUtf8("level data"))
}

/// File contents for the given level data.
#[must_use]
pub fn write_level_data(level_data: &str) -> Vec<u8> {
    level_data.as_bytes().to_vec()
}
