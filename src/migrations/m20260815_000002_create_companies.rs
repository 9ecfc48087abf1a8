//! Migration: Create companies table

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Companies::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Companies::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Companies::Name).string().not_null())
                    .col(ColumnDef::new(Companies::Description).string().null())
                    .col(ColumnDef::new(Companies::Category).string().null())
                    .col(ColumnDef::new(Companies::WebsiteUrl).string().null())
                    .col(ColumnDef::new(Companies::IconUrl).string().null())
                    .col(ColumnDef::new(Companies::Details).json().not_null())
                    .col(ColumnDef::new(Companies::FundingTeam).json().not_null())
                    .col(ColumnDef::new(Companies::SocialMedia).json().not_null())
                    .col(
                        ColumnDef::new(Companies::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_companies_name")
                    .table(Companies::Table)
                    .col(Companies::Name)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Companies::Table).if_exists().to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Companies {
    Table,
    Id,
    Name,
    Description,
    Category,
    #[iden = "website_url"]
    WebsiteUrl,
    #[iden = "icon_url"]
    IconUrl,
    Details,
    #[iden = "funding_team"]
    FundingTeam,
    #[iden = "social_media"]
    SocialMedia,
    #[iden = "created_at"]
    CreatedAt,
}
