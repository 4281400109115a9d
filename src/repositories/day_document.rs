//! Day document repository for database operations
//!
//! Stores aggregated day documents keyed by `(date, doc_id)`.

use anyhow::{Context, Result};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use std::sync::Arc;

use crate::aggregation::DayDocument;
use crate::models::day_document::{self, Entity as DayDocuments};

/// Repository for day document database operations
#[derive(Debug, Clone)]
pub struct DayDocumentRepository {
    /// Database connection pool
    pub db: Arc<DatabaseConnection>,
}

impl DayDocumentRepository {
    /// Creates a new DayDocumentRepository instance
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Finds a stored document by date and sequence number
    pub async fn find_by_key(&self, date: &str, id: u32) -> Result<Option<day_document::Model>> {
        let doc_id = i32::try_from(id).context("document id out of range")?;
        let found = DayDocuments::find_by_id((date.to_string(), doc_id))
            .one(&*self.db)
            .await?;
        Ok(found)
    }

    /// Lists every document stored for `date`, ordered by sequence number
    pub async fn list_by_date(&self, date: &str) -> Result<Vec<day_document::Model>> {
        let documents = DayDocuments::find()
            .filter(day_document::Column::Date.eq(date))
            .order_by_asc(day_document::Column::DocId)
            .all(&*self.db)
            .await?;
        Ok(documents)
    }

    /// Inserts the document, or replaces the stored one with the same `(date, id)`
    ///
    /// # Returns
    ///
    /// Returns the stored row as read back from the database
    pub async fn upsert(&self, document: &DayDocument) -> Result<day_document::Model> {
        let doc_id = i32::try_from(document.id).context("document id out of range")?;
        let register_count =
            i32::try_from(document.registers.len()).context("too many registers for one row")?;
        let registers =
            serde_json::to_value(&document.registers).context("serializing registers")?;

        if let Some(existing) = self.find_by_key(&document.date, document.id).await? {
            let mut am: day_document::ActiveModel = existing.into();
            am.dia = Set(document.dia.clone());
            am.register_count = Set(register_count);
            am.registers = Set(registers);
            am.updated_at = Set(Utc::now().fixed_offset());
            return Ok(am.update(&*self.db).await?);
        }

        let now = Utc::now().fixed_offset();
        let am = day_document::ActiveModel {
            date: Set(document.date.clone()),
            doc_id: Set(doc_id),
            dia: Set(document.dia.clone()),
            register_count: Set(register_count),
            registers: Set(registers),
            created_at: Set(now),
            updated_at: Set(now),
        };
        DayDocuments::insert(am).exec(&*self.db).await?;

        self.find_by_key(&document.date, document.id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("day document {}/{} not persisted", document.date, document.id))
    }

    /// Deletes every document stored for `date`, returning how many were removed
    pub async fn delete_by_date(&self, date: &str) -> Result<u64> {
        let result = DayDocuments::delete_many()
            .filter(day_document::Column::Date.eq(date))
            .exec(&*self.db)
            .await?;
        Ok(result.rows_affected)
    }
}
