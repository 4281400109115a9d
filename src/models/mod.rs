//! # Data Models
//!
//! Event records flowing through the pipeline and the SeaORM entity used to
//! persist aggregated day documents.

pub mod day_document;
pub mod event;

pub use day_document::Entity as DayDocumentEntity;
pub use event::{NormalizedRow, RawEvent};
