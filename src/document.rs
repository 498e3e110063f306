//! Document record pushed alongside an uploaded binary.

use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Utc};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Serialize;
use tracing::warn;

/// Extension recorded when the file name has none.
pub const DEFAULT_EXTENSION: &str = ".txt";

/// Layout of the `date` field, always rendered in UTC.
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Everything except ASCII alphanumerics and `-._*` is escaped.
const DOCUMENT_ID_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'*');

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentRecord {
    #[serde(rename = "CompressedBinaryDataFileId")]
    pub compressed_binary_data_file_id: String,
    /// Uncompressed size of the uploaded file in bytes.
    pub size: u64,
    pub date: String,
    #[serde(rename = "FileExtension")]
    pub file_extension: String,
}

impl DocumentRecord {
    pub fn new(file_id: impl Into<String>, size: u64, modified: SystemTime, path: &Path) -> Self {
        Self {
            compressed_binary_data_file_id: file_id.into(),
            size,
            date: format_timestamp(modified),
            file_extension: file_extension(path),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Dot-prefixed extension of the final path component, case preserved.
///
/// Falls back to [`DEFAULT_EXTENSION`] when there is no extension or it is blank.
/// A leading dot counts as a separator, so `.bashrc` records `.bashrc`.
pub fn file_extension(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy())
        .and_then(|name| name.rsplit_once('.').map(|(_, ext)| ext.to_string()))
        .filter(|ext| !ext.trim().is_empty())
        .map(|ext| format!(".{ext}"))
        .unwrap_or_else(|| DEFAULT_EXTENSION.to_string())
}

/// Renders `time` in UTC. Times chrono cannot represent fall back to the Unix epoch.
pub fn format_timestamp(time: SystemTime) -> String {
    let (secs, nanos) = match time.duration_since(UNIX_EPOCH) {
        Ok(after) => (i64::try_from(after.as_secs()).ok(), after.subsec_nanos()),
        Err(e) => {
            let before = e.duration();
            match before.subsec_nanos() {
                0 => (i64::try_from(before.as_secs()).ok().map(|s| -s), 0),
                n => (
                    i64::try_from(before.as_secs()).ok().map(|s| -s - 1),
                    1_000_000_000 - n,
                ),
            }
        }
    };

    let datetime = secs
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, nanos))
        .unwrap_or_else(|| {
            warn!(?time, "Modification time out of range, recording the Unix epoch");
            DateTime::<Utc>::default()
        });
    datetime.format(DATE_FORMAT).to_string()
}

/// Percent-encodes a document identifier for use as a query parameter value.
pub fn encode_document_id(document_id: &str) -> String {
    utf8_percent_encode(document_id, DOCUMENT_ID_ENCODE_SET).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn missing_extension_defaults_to_txt() {
        assert_eq!(file_extension(Path::new("a/b/report")), ".txt");
        assert_eq!(file_extension(Path::new("a/b/report.")), ".txt");
    }

    #[test]
    fn extension_case_is_preserved() {
        assert_eq!(file_extension(Path::new("a/b/report.PDF")), ".PDF");
        assert_eq!(file_extension(Path::new("a/b/report.pdf")), ".pdf");
        assert_eq!(file_extension(Path::new("a/b.d/archive.tar.gz")), ".gz");
    }

    #[test]
    fn dotted_directory_does_not_leak_into_extension() {
        assert_eq!(file_extension(Path::new("a/v1.2/report")), ".txt");
    }

    #[test]
    fn dotfile_extension_is_kept() {
        assert_eq!(file_extension(Path::new("a/.bashrc")), ".bashrc");
        assert_eq!(file_extension(Path::new("data/.env")), ".env");
        assert_eq!(file_extension(Path::new("data/.")), ".txt");
    }

    #[test]
    fn timestamp_is_rendered_in_utc() {
        // 2021-03-04 05:06:07 UTC
        let time = UNIX_EPOCH + Duration::from_secs(1_614_834_367);
        assert_eq!(format_timestamp(time), "2021-03-04 05:06:07");
    }

    #[test]
    fn timestamp_before_epoch_rounds_down() {
        let time = UNIX_EPOCH - Duration::from_millis(1_500);
        assert_eq!(format_timestamp(time), "1969-12-31 23:59:58");
    }

    #[test]
    fn unrepresentable_timestamp_falls_back_to_epoch() {
        if let Some(time) = UNIX_EPOCH.checked_add(Duration::from_secs(i64::MAX as u64 / 2)) {
            assert_eq!(format_timestamp(time), "1970-01-01 00:00:00");
        }
    }

    #[test]
    fn document_id_is_percent_encoded() {
        assert_eq!(
            encode_document_id("http://www.test.com/a b.pdf"),
            "http%3A%2F%2Fwww.test.com%2Fa%20b.pdf"
        );
        assert_eq!(encode_document_id("http://x/y.pdf"), "http%3A%2F%2Fx%2Fy.pdf");
    }

    #[test]
    fn record_serialises_with_push_api_field_names() {
        let record = DocumentRecord {
            compressed_binary_data_file_id: "file-123".into(),
            size: 100,
            date: "2021-03-04 05:06:07".into(),
            file_extension: ".pdf".into(),
        };
        let value: serde_json::Value = serde_json::from_str(&record.to_json().unwrap()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "CompressedBinaryDataFileId": "file-123",
                "size": 100,
                "date": "2021-03-04 05:06:07",
                "FileExtension": ".pdf"
            })
        );
    }
}
