//! Local archive files.

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use async_trait::async_trait;
use tracing::info;

use super::{EventSource, SourceError, decode_archive};
use crate::models::RawEvent;

/// A partition already on disk, gzip-compressed or plain NDJSON.
#[derive(Debug, Clone)]
pub struct ArchiveFile {
    path: PathBuf,
}

impl ArchiveFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Blocking read of the whole file.
    pub fn read_events(&self) -> Result<Vec<RawEvent>, SourceError> {
        let file = File::open(&self.path).map_err(|source| SourceError::Io {
            path: self.path.clone(),
            source,
        })?;
        decode_archive(BufReader::new(file))
    }
}

#[async_trait]
impl EventSource for ArchiveFile {
    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }

    async fn fetch_events(&self) -> Result<Vec<RawEvent>, SourceError> {
        let file = self.clone();
        let events = tokio::task::spawn_blocking(move || file.read_events())
            .await
            .map_err(|err| SourceError::Stream(std::io::Error::other(err)))??;

        info!(path = %self.path.display(), events = events.len(), "Loaded archive file");
        Ok(events)
    }
}
