//! Deflate framing used by `.lvl` files.
//!
//! Written as a zlib stream. Gzip streams are accepted on read since older
//! writers produced them.

use std::io::{Read, Write};

use flate2::Compression;
use flate2::read::{GzDecoder, ZlibDecoder};
use flate2::write::ZlibEncoder;
use tracing::debug;

use crate::error::{GmdError, Result};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Inflate a compressed stream.
///
/// An empty result counts as a failure.
pub fn inflate(bytes: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    let read = if bytes.starts_with(&GZIP_MAGIC) {
        GzDecoder::new(bytes).read_to_end(&mut out)
    } else {
        ZlibDecoder::new(bytes).read_to_end(&mut out)
    };

    match read {
        Ok(0) => {
            debug!(input = bytes.len(), "inflate produced no data");
            Err(GmdError::Decompression)
        }
        Ok(len) => {
            debug!(input = bytes.len(), output = len, "inflated level data");
            Ok(out)
        }
        Err(e) => {
            debug!(error = %e, "inflate failed");
            Err(GmdError::Decompression)
        }
    }
}

/// Deflate data as a zlib stream.
pub fn deflate(data: &[u8]) -> Result<Vec<u8>> {
    let failed = |e: std::io::Error| {
        debug!(error = %e, "deflate failed");
        GmdError::Compression
    };
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).map_err(failed)?;
    let compressed = encoder.finish().map_err(failed)?;
    if compressed.is_empty() {
        return Err(GmdError::Compression);
    }
    debug!(input = data.len(), output = compressed.len(), "deflated level data");
    Ok(compressed)
}

/// Inflate a `.lvl` file into level data text.
pub fn read_level_data(bytes: &[u8]) -> Result<String> {
    let inflated = inflate(bytes)?;
    String::from_utf8(inflated).map_err(|_| GmdError::NotUtf8("decompressed level data"))
}
