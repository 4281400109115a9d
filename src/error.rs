//! # Error Handling
//!
//! Top-level error composing the failures each stage can surface. Sub-record
//! decode problems never reach this level; they degrade inside normalization.

use thiserror::Error;

use crate::aggregation::AggregationError;
use crate::config::ConfigError;
use crate::sink::SinkError;
use crate::source::SourceError;

/// Failure of a pipeline run, tagged by stage.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("event source failed: {0}")]
    Source(#[from] SourceError),
    #[error("aggregation failed: {0}")]
    Aggregation(#[from] AggregationError),
    #[error("sink failed: {0}")]
    Sink(#[from] SinkError),
}

impl PipelineError {
    /// True when the batch held no events at all.
    pub fn is_empty_input(&self) -> bool {
        matches!(self, PipelineError::Aggregation(AggregationError::EmptyInput))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_is_detectable_through_the_wrapper() {
        let err = PipelineError::from(AggregationError::EmptyInput);
        assert!(err.is_empty_input());
        assert_eq!(
            err.to_string(),
            "aggregation failed: cannot derive a document date from an empty row set"
        );

        let other = PipelineError::from(AggregationError::InvalidDate {
            value: "x".to_string(),
        });
        assert!(!other.is_empty_input());
    }
}
