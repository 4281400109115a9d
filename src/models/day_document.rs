//! Day document entity model
//!
//! SeaORM entity for the `day_documents` table, which stores aggregated day
//! documents keyed by `(date, doc_id)`.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde_json::Value as JsonValue;
use thiserror::Error;

use crate::aggregation::DayDocument;

/// Persisted day document
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "day_documents")]
pub struct Model {
    /// Calendar date, `YYYY-MM-DD`
    #[sea_orm(primary_key, auto_increment = false)]
    pub date: String,

    /// Document sequence number within the date
    #[sea_orm(primary_key, auto_increment = false)]
    pub doc_id: i32,

    /// Localized weekday name
    pub dia: String,

    /// Number of normalized rows stored in `registers`
    pub register_count: i32,

    /// Normalized rows as a JSON array
    #[sea_orm(column_type = "JsonBinary")]
    pub registers: JsonValue,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// A stored row that no longer maps back onto a [`DayDocument`].
#[derive(Debug, Error)]
pub enum StoredDocumentError {
    #[error("stored document id {doc_id} is negative")]
    NegativeId { doc_id: i32 },
    #[error("stored registers are not normalized rows: {0}")]
    Registers(#[from] serde_json::Error),
}

impl Model {
    /// Rebuild the aggregated document from its stored form.
    pub fn into_document(self) -> Result<DayDocument, StoredDocumentError> {
        let id = u32::try_from(self.doc_id).map_err(|_| StoredDocumentError::NegativeId {
            doc_id: self.doc_id,
        })?;

        Ok(DayDocument {
            date: self.date,
            dia: self.dia,
            id,
            registers: serde_json::from_value(self.registers)?,
        })
    }
}
