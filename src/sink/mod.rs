//! Document sinks.
//!
//! Sinks receive the day documents produced by the pipeline, in order.

use std::io::Write;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use thiserror::Error;

use crate::aggregation::DayDocument;

pub mod database;

pub use database::DatabaseSink;

/// Width of the delimiter line written after each rendered document.
pub const DELIMITER_WIDTH: usize = 80;

const INDENT: &[u8] = b"    ";

/// Errors raised while handing documents to a sink.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("failed to write document: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to serialize document: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("document store rejected {date}/{id}: {message}")]
    Store {
        date: String,
        id: u32,
        message: String,
    },
}

/// Destination for day documents.
#[async_trait]
pub trait DocumentSink: Send {
    async fn write_document(&mut self, document: &DayDocument) -> Result<(), SinkError>;

    /// Called once after the last document.
    async fn finish(&mut self) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Render `document` as JSON indented by four spaces. Non-ASCII text is kept as-is.
pub fn render_document(document: &DayDocument) -> Result<String, SinkError> {
    let mut buffer = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(INDENT));
    document.serialize(&mut serializer)?;
    String::from_utf8(buffer)
        .map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidData, err).into())
}

/// Writes readable documents separated by a line of `=`.
#[derive(Debug)]
pub struct ConsoleSink<W> {
    writer: W,
}

impl<W: Write + Send> ConsoleSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl ConsoleSink<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

#[async_trait]
impl<W: Write + Send> DocumentSink for ConsoleSink<W> {
    async fn write_document(&mut self, document: &DayDocument) -> Result<(), SinkError> {
        let rendered = render_document(document)?;
        writeln!(self.writer, "{rendered}")?;
        writeln!(self.writer, "{}", "=".repeat(DELIMITER_WIDTH))?;
        Ok(())
    }

    async fn finish(&mut self) -> Result<(), SinkError> {
        self.writer.flush()?;
        Ok(())
    }
}
