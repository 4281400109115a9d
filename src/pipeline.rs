//! Normalize a batch of raw events and aggregate it into day documents.

use std::time::Instant;

use tracing::{info, info_span};

use crate::aggregation::{self, DayDocument, WeekdayNamer};
use crate::error::PipelineError;
use crate::models::RawEvent;
use crate::normalization;
use crate::sink::DocumentSink;
use crate::source::EventSource;

/// Result of one run: the canonical full document and the sample export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOutput {
    pub full: DayDocument,
    pub samples: Vec<DayDocument>,
}

/// Flatten, derive and re-nest one batch.
#[derive(Debug, Clone)]
pub struct Pipeline {
    namer: WeekdayNamer,
    sample_size: usize,
}

impl Pipeline {
    pub fn new(namer: WeekdayNamer, sample_size: usize) -> Self {
        Self { namer, sample_size }
    }

    pub fn sample_size(&self) -> usize {
        self.sample_size
    }

    /// Fails only when the batch is empty or its first timestamp has no date prefix.
    pub fn run(&self, events: &[RawEvent]) -> Result<PipelineOutput, PipelineError> {
        let _span = info_span!("pipeline", events = events.len()).entered();
        let started = Instant::now();

        let rows = normalization::normalize_events(events);
        let full = aggregation::build_day_document(rows, &self.namer)?;
        let samples = aggregation::sample_documents(&full, self.sample_size);

        info!(
            date = %full.date,
            dia = %full.dia,
            rows = full.registers.len(),
            samples = samples.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Aggregated day document"
        );

        Ok(PipelineOutput { full, samples })
    }

    /// Fetch from `source` and run the batch.
    pub async fn run_source(&self, source: &dyn EventSource) -> Result<PipelineOutput, PipelineError> {
        info!(source = %source.describe(), "Fetching events");
        let events = source.fetch_events().await?;
        self.run(&events)
    }
}

/// Hand `documents` to `sink` in order, then let it finish.
pub async fn deliver(
    sink: &mut dyn DocumentSink,
    documents: &[DayDocument],
) -> Result<(), PipelineError> {
    for document in documents {
        sink.write_document(document).await?;
    }
    sink.finish().await?;
    Ok(())
}
