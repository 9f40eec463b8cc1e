//! The level-dictionary codec seam.

use crate::error::Result;
use crate::level::Level;

/// Result of parsing a level document.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedLevel {
    pub level: Level,
    /// The document used the legacy plist layout.
    pub legacy: bool,
}

/// Converts between raw level-data text and a [`Level`].
///
/// The container codec treats implementations as trusted: it only hands
/// them text and only reads back the fields exposed on [`Level`].
pub trait LevelCodec {
    /// Parse raw level-data text.
    fn parse(&self, raw: &str) -> Result<ParsedLevel>;

    /// Serialize a level to raw level-data text.
    fn serialize(&self, level: &Level) -> Result<String>;
}
