//! Database migrations for persisted day documents.

pub use sea_orm_migration::prelude::*;

mod m2025_01_02_000001_create_day_documents;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m2025_01_02_000001_create_day_documents::Migration)]
    }
}
