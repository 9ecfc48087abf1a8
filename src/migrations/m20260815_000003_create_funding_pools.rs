//! Migration: Create funding_pools table

use sea_orm_migration::prelude::*;

use super::m20260815_000002_create_companies::Companies;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(FundingPools::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(FundingPools::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(FundingPools::Slug)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(FundingPools::Title).string().not_null())
                    .col(ColumnDef::new(FundingPools::Description).string().null())
                    .col(
                        ColumnDef::new(FundingPools::CompanyId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FundingPools::Status)
                            .string()
                            .not_null()
                            .default("DRAFT"),
                    )
                    .col(
                        ColumnDef::new(FundingPools::AuctionStart)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FundingPools::AuctionEnd)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FundingPools::Capacity)
                            .double()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(FundingPools::MinAmount)
                            .double()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(FundingPools::MaxAmount)
                            .double()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(FundingPools::PricePerToken).double().null())
                    .col(ColumnDef::new(FundingPools::Vesting).string().null())
                    .col(ColumnDef::new(FundingPools::SaleType).string().null())
                    .col(ColumnDef::new(FundingPools::TemplateId).string().null())
                    .col(ColumnDef::new(FundingPools::WalletAddress).string().null())
                    .col(
                        ColumnDef::new(FundingPools::ContractAddress)
                            .string()
                            .null(),
                    )
                    .col(ColumnDef::new(FundingPools::ReferrerFee).double().null())
                    .col(ColumnDef::new(FundingPools::Backers).json().not_null())
                    .col(ColumnDef::new(FundingPools::SaftFiles).json().not_null())
                    .col(
                        ColumnDef::new(FundingPools::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(FundingPools::Table, FundingPools::CompanyId)
                            .to(Companies::Table, Companies::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_funding_pools_slug")
                    .table(FundingPools::Table)
                    .col(FundingPools::Slug)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_funding_pools_company")
                    .table(FundingPools::Table)
                    .col(FundingPools::CompanyId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .table(FundingPools::Table)
                    .if_exists()
                    .to_owned(),
            )
            .await
    }
}

#[derive(Iden)]
#[iden = "funding_pools"]
pub enum FundingPools {
    Table,
    Id,
    Slug,
    Title,
    Description,
    #[iden = "company_id"]
    CompanyId,
    Status,
    #[iden = "auction_start"]
    AuctionStart,
    #[iden = "auction_end"]
    AuctionEnd,
    Capacity,
    #[iden = "min_amount"]
    MinAmount,
    #[iden = "max_amount"]
    MaxAmount,
    #[iden = "price_per_token"]
    PricePerToken,
    Vesting,
    #[iden = "sale_type"]
    SaleType,
    #[iden = "template_id"]
    TemplateId,
    #[iden = "wallet_address"]
    WalletAddress,
    #[iden = "contract_address"]
    ContractAddress,
    #[iden = "referrer_fee"]
    ReferrerFee,
    Backers,
    #[iden = "saft_files"]
    SaftFiles,
    #[iden = "created_at"]
    CreatedAt,
}
