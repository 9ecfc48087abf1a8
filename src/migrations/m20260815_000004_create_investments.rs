//! Migration: Create investments table

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Investments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Investments::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Investments::UserId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Investments::FundingPoolId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Investments::CompanyId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Investments::CompanyName).string().not_null())
                    .col(ColumnDef::new(Investments::CompanyImage).string().null())
                    .col(
                        ColumnDef::new(Investments::AmountInvested)
                            .double()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Investments::SaftId)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Investments::InvestmentDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Investments::PaymentDate)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Investments::TransactionHash)
                            .string()
                            .null(),
                    )
                    .col(ColumnDef::new(Investments::Gas).double().null())
                    .col(
                        ColumnDef::new(Investments::SuccessfullyCompleted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Investments::Verified)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_investments_user")
                    .table(Investments::Table)
                    .col(Investments::UserId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_investments_company")
                    .table(Investments::Table)
                    .col(Investments::CompanyId)
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
                    .table(Investments::Table)
                    .if_exists()
                    .to_owned(),
            )
            .await
    }
}

#[derive(Iden)]
pub enum Investments {
    Table,
    Id,
    #[iden = "user_id"]
    UserId,
    #[iden = "funding_pool_id"]
    FundingPoolId,
    #[iden = "company_id"]
    CompanyId,
    #[iden = "company_name"]
    CompanyName,
    #[iden = "company_image"]
    CompanyImage,
    #[iden = "amount_invested"]
    AmountInvested,
    #[iden = "saft_id"]
    SaftId,
    #[iden = "investment_date"]
    InvestmentDate,
    #[iden = "payment_date"]
    PaymentDate,
    #[iden = "transaction_hash"]
    TransactionHash,
    Gas,
    #[iden = "successfully_completed"]
    SuccessfullyCompleted,
    Verified,
}
