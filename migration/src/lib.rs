pub use sea_orm_migration::prelude::*;

mod m20251120_000001_create_roster;
mod m20251120_000002_create_activity_logs;
mod m20251122_000003_create_prizes;
mod m20251124_000004_create_milestone_events;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20251120_000001_create_roster::Migration),
            Box::new(m20251120_000002_create_activity_logs::Migration),
            Box::new(m20251122_000003_create_prizes::Migration),
            Box::new(m20251124_000004_create_milestone_events::Migration),
        ]
    }
}
