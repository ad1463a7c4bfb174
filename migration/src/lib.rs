pub use sea_orm_migration::prelude::*;

mod m20250301_000001_create_schema;
mod m20250322_000001_add_genre_name_unique;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_schema::Migration),
            Box::new(m20250322_000001_add_genre_name_unique::Migration),
        ]
    }
}
