//! Repository layer for database operations
//!
//! Repository structs encapsulate SeaORM operations so that sinks and tests do
//! not deal with entities directly.

pub mod day_document;

pub use day_document::DayDocumentRepository;
