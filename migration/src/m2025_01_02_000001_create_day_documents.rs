//! Migration to create the day_documents table.
//!
//! One row per aggregated day document, keyed by the calendar date and the
//! document sequence number. The normalized rows are kept as a JSON array.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(DayDocuments::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(DayDocuments::Date).text().not_null())
                    .col(ColumnDef::new(DayDocuments::DocId).integer().not_null())
                    .col(ColumnDef::new(DayDocuments::Dia).text().not_null())
                    .col(
                        ColumnDef::new(DayDocuments::RegisterCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(DayDocuments::Registers).json_binary().not_null())
                    .col(
                        ColumnDef::new(DayDocuments::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(DayDocuments::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .primary_key(
                        Index::create()
                            .name("pk_day_documents")
                            .col(DayDocuments::Date)
                            .col(DayDocuments::DocId),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DayDocuments::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum DayDocuments {
    Table,
    Date,
    DocId,
    Dia,
    RegisterCount,
    Registers,
    CreatedAt,
    UpdatedAt,
}
