//! Event sources.
//!
//! A source hands the pipeline one finite, fully materialized batch of
//! [`RawEvent`]s. GH Archive partitions are gzip-compressed NDJSON; plain NDJSON is
//! accepted as well.

use std::fmt;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::NaiveDate;
use flate2::bufread::MultiGzDecoder;
use thiserror::Error;
use url::Url;

use crate::models::RawEvent;

pub mod archive;
pub mod gharchive;

pub use archive::ArchiveFile;
pub use gharchive::GhArchiveClient;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Errors raised while producing a batch of raw events.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read archive {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to read event stream: {0}")]
    Stream(#[from] std::io::Error),
    #[error("line {line} is not a valid event record: {source}")]
    MalformedLine {
        line: usize,
        source: serde_json::Error,
    },
    #[error("invalid archive hour '{value}': expected YYYY-MM-DD-H with hour 0-23")]
    InvalidArchiveHour { value: String },
    #[error("invalid archive url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("archive request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("archive download from {url} returned HTTP {status}")]
    HttpStatus { url: Url, status: u16 },
}

/// Anything able to supply a batch of raw events.
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Short label used in logs.
    fn describe(&self) -> String;

    async fn fetch_events(&self) -> Result<Vec<RawEvent>, SourceError>;
}

/// Parse newline-delimited JSON records. Blank lines are skipped; any other line
/// that is not a valid record fails the batch.
pub fn read_ndjson<R: BufRead>(reader: R) -> Result<Vec<RawEvent>, SourceError> {
    let mut events = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let event = serde_json::from_str(&line).map_err(|source| SourceError::MalformedLine {
            line: index + 1,
            source,
        })?;
        events.push(event);
    }

    Ok(events)
}

/// Read an archive body, decompressing it first when it starts with the gzip magic.
pub fn decode_archive<R: BufRead>(mut reader: R) -> Result<Vec<RawEvent>, SourceError> {
    let is_gzip = reader.fill_buf()?.starts_with(&GZIP_MAGIC);

    if is_gzip {
        read_ndjson(BufReader::new(MultiGzDecoder::new(reader)))
    } else {
        read_ndjson(reader)
    }
}

/// One hourly GH Archive partition, e.g. `2025-01-02-15`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveHour {
    pub date: NaiveDate,
    pub hour: u8,
}

impl ArchiveHour {
    pub fn new(date: NaiveDate, hour: u8) -> Option<Self> {
        (hour < 24).then_some(Self { date, hour })
    }

    /// `<partition>.json.gz`
    pub fn file_name(&self) -> String {
        format!("{self}.json.gz")
    }

    /// Location of this partition below `base`.
    pub fn url(&self, base: &Url) -> Result<Url, url::ParseError> {
        base.join(&self.file_name())
    }
}

impl fmt::Display for ArchiveHour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.date.format("%Y-%m-%d"), self.hour)
    }
}

impl FromStr for ArchiveHour {
    type Err = SourceError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = || SourceError::InvalidArchiveHour {
            value: value.to_string(),
        };

        let (date, hour) = value.trim().rsplit_once('-').ok_or_else(invalid)?;
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| invalid())?;
        if hour.is_empty() || hour.len() > 2 {
            return Err(invalid());
        }
        let hour: u8 = hour.parse().map_err(|_| invalid())?;

        Self::new(date, hour).ok_or_else(invalid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::{Compression, write::GzEncoder};
    use std::io::{Cursor, Write};

    const LINES: &str = concat!(
        r#"{"type":"PushEvent","actor":{"login":"a","id":1},"repo":{"name":"a/b","id":2},"payload":{"ref":"refs/heads/main"},"created_at":"2025-01-02T15:00:00Z"}"#,
        "\n",
        "\n",
        r#"{"type":"WatchEvent","actor":{"login":"c","id":3},"repo":{"name":"c/d","id":4},"payload":{},"created_at":"2025-01-02T15:00:01Z"}"#,
        "\n",
    );

    fn gzip(bytes: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(bytes).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn reads_ndjson_and_skips_blank_lines() {
        let events = read_ndjson(Cursor::new(LINES)).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].kind, "PushEvent");
        assert_eq!(events[1].kind, "WatchEvent");
    }

    #[test]
    fn malformed_line_reports_line_number() {
        let input = format!("{LINES}not json\n");
        let err = read_ndjson(Cursor::new(input)).unwrap_err();
        assert!(matches!(err, SourceError::MalformedLine { line: 4, .. }));
    }

    #[test]
    fn decodes_plain_and_gzip_bodies_alike() {
        let plain = decode_archive(Cursor::new(LINES.as_bytes())).unwrap();
        let compressed = gzip(LINES.as_bytes());
        let unzipped = decode_archive(Cursor::new(compressed)).unwrap();
        assert_eq!(plain, unzipped);
    }

    #[test]
    fn decodes_concatenated_gzip_members() {
        let mut body = gzip(LINES.as_bytes());
        body.extend(gzip(LINES.as_bytes()));
        assert_eq!(decode_archive(Cursor::new(body)).unwrap().len(), 4);
    }

    #[test]
    fn empty_body_is_an_empty_batch() {
        assert!(decode_archive(Cursor::new(Vec::<u8>::new())).unwrap().is_empty());
    }

    #[test]
    fn archive_hour_parses_and_displays_unpadded() {
        let hour: ArchiveHour = "2025-01-02-15".parse().unwrap();
        assert_eq!(hour.hour, 15);
        assert_eq!(hour.to_string(), "2025-01-02-15");

        let early: ArchiveHour = "2015-01-01-03".parse().unwrap();
        assert_eq!(early.to_string(), "2015-01-01-3");
        assert_eq!(early.file_name(), "2015-01-01-3.json.gz");
    }

    #[test]
    fn archive_hour_rejects_bad_values() {
        for value in ["2025-01-02", "2025-01-02-24", "2025-02-30-1", "2025-01-02-", "x"] {
            assert!(
                matches!(
                    value.parse::<ArchiveHour>(),
                    Err(SourceError::InvalidArchiveHour { .. })
                ),
                "{value} should be rejected"
            );
        }
    }

    #[test]
    fn archive_hour_url_joins_base() {
        let hour: ArchiveHour = "2025-01-02-15".parse().unwrap();
        let base = Url::parse("https://data.gharchive.org/").unwrap();
        assert_eq!(
            hour.url(&base).unwrap().as_str(),
            "https://data.gharchive.org/2025-01-02-15.json.gz"
        );
    }
}
