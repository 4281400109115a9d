//! Persist day documents through the repository layer.

use async_trait::async_trait;
use tracing::info;

use super::{DocumentSink, SinkError};
use crate::aggregation::DayDocument;
use crate::repositories::DayDocumentRepository;

/// Upserts each document keyed by `(date, id)`.
#[derive(Debug, Clone)]
pub struct DatabaseSink {
    repository: DayDocumentRepository,
    written: usize,
}

impl DatabaseSink {
    pub fn new(repository: DayDocumentRepository) -> Self {
        Self {
            repository,
            written: 0,
        }
    }

    pub fn written(&self) -> usize {
        self.written
    }
}

#[async_trait]
impl DocumentSink for DatabaseSink {
    async fn write_document(&mut self, document: &DayDocument) -> Result<(), SinkError> {
        let stored = self
            .repository
            .upsert(document)
            .await
            .map_err(|err| SinkError::Store {
                date: document.date.clone(),
                id: document.id,
                message: format!("{err:#}"),
            })?;

        self.written += 1;
        info!(
            date = %stored.date,
            id = stored.doc_id,
            registers = stored.register_count,
            "Stored day document"
        );
        Ok(())
    }
}
