pub use sea_orm_migration::prelude::*;

mod m20260815_000001_create_users;
mod m20260815_000002_create_companies;
mod m20260815_000003_create_funding_pools;
mod m20260815_000004_create_investments;
mod m20260815_000005_create_invitations;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260815_000001_create_users::Migration),
            Box::new(m20260815_000002_create_companies::Migration),
            Box::new(m20260815_000003_create_funding_pools::Migration),
            Box::new(m20260815_000004_create_investments::Migration),
            Box::new(m20260815_000005_create_invitations::Migration),
        ]
    }
}
