//! Level model and dictionary codec for GMD level files.
//!
//! A level is persisted as a plist-style dictionary document. This crate owns
//! the in-memory [`Level`] and the [`LevelCodec`] seam used by the container
//! codec in `gmd-format`, together with [`PlistLevelCodec`], the default
//! implementation of that seam.
//!
//! # Example
//!
//! ```
//! use gmd_model::{Level, LevelCodec, PlistLevelCodec};
//!
//! let mut level = Level::new("Stereo Madness");
//! level.level_string = "kS38,1;1,1,2,15,3,15;".to_string();
//!
//! let codec = PlistLevelCodec::new();
//! let text = codec.serialize(&level).unwrap();
//! let parsed = codec.parse(&text).unwrap();
//! assert_eq!(parsed.level.name, "Stereo Madness");
//! assert!(!parsed.legacy);
//! ```

mod codec;
mod dictionary;
mod error;
mod level;
mod plist;

pub use codec::{LevelCodec, ParsedLevel};
pub use dictionary::{DictValue, Dictionary};
pub use error::{DictError, Result};
pub use level::{Level, LevelType, keys};
pub use plist::PlistLevelCodec;
