pub use sea_orm_migration::prelude::*;

mod m20260601_000001_auth_core;
mod m20260601_000002_org_core;
mod m20260601_000003_teams;
mod m20260601_000004_kpi_core;
mod m20260601_000005_reviews;

pub struct Migrator;
#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260601_000001_auth_core::Migration),
            Box::new(m20260601_000002_org_core::Migration),
            Box::new(m20260601_000003_teams::Migration),
            Box::new(m20260601_000004_kpi_core::Migration),
            Box::new(m20260601_000005_reviews::Migration),
        ]
    }
}
