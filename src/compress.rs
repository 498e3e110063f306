//! Zlib compression of upload payloads into a temporary file.

use std::fs::File;
use std::io::{self, BufWriter, Read, Write};

use flate2::write::ZlibEncoder;
use flate2::Compression;
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// Prefix and suffix of the temp files that hold compressed payloads.
pub const TEMP_PREFIX: &str = "temp";
pub const TEMP_SUFFIX: &str = ".zlib";

/// Creates an empty temp file for [`compress`] to write into.
pub fn temp_file() -> io::Result<NamedTempFile> {
    tempfile::Builder::new()
        .prefix(TEMP_PREFIX)
        .suffix(TEMP_SUFFIX)
        .tempfile()
}

/// Deflates all of `source` into `temp` and returns a fresh read handle on it.
///
/// `source` is consumed and closed. The returned handle starts at offset 0.
/// The temp file stays on disk until the caller drops or closes `temp`.
pub fn compress<R: Read>(mut source: R, temp: &NamedTempFile) -> io::Result<File> {
    info!(temp = %temp.path().display(), "Compressing payload to temp file");

    let writer = BufWriter::new(temp.reopen()?);
    let mut encoder = ZlibEncoder::new(writer, Compression::default());
    let copied = io::copy(&mut source, &mut encoder)?;
    drop(source);

    let mut writer = encoder.finish()?;
    writer.flush()?;
    drop(writer);

    let compressed = temp.reopen()?;
    let compressed_bytes = compressed.metadata()?.len();
    debug!(original_bytes = copied, compressed_bytes, "Compressed payload");
    Ok(compressed)
}
