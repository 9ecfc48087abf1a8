//! Migration: Create users table

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::Name).string().null())
                    .col(ColumnDef::new(Users::Surname).string().null())
                    .col(
                        ColumnDef::new(Users::Email)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Users::HashedPassword).string().not_null())
                    .col(
                        ColumnDef::new(Users::Role)
                            .string()
                            .not_null()
                            .default("basic"),
                    )
                    .col(ColumnDef::new(Users::Bio).string().null())
                    .col(ColumnDef::new(Users::Country).string().null())
                    .col(ColumnDef::new(Users::Nationality).string().null())
                    .col(ColumnDef::new(Users::TwitterLink).string().null())
                    .col(ColumnDef::new(Users::InstagramLink).string().null())
                    .col(ColumnDef::new(Users::DiscordLink).string().null())
                    .col(ColumnDef::new(Users::ImageUrl).string().null())
                    .col(ColumnDef::new(Users::WalletAddresses).json().not_null())
                    .col(ColumnDef::new(Users::PrimaryWalletAddress).string().null())
                    .col(
                        ColumnDef::new(Users::KycPassed)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Users::IdentificationId).string().null())
                    .col(ColumnDef::new(Users::PasswordResetToken).string().null())
                    .col(
                        ColumnDef::new(Users::ReferralCode)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Users::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Users::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_users_email")
                    .table(Users::Table)
                    .col(Users::Email)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_users_referral_code")
                    .table(Users::Table)
                    .col(Users::ReferralCode)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Users::Table).if_exists().to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Users {
    Table,
    Id,
    Name,
    Surname,
    Email,
    #[iden = "hashed_password"]
    HashedPassword,
    Role,
    Bio,
    Country,
    Nationality,
    #[iden = "twitter_link"]
    TwitterLink,
    #[iden = "instagram_link"]
    InstagramLink,
    #[iden = "discord_link"]
    DiscordLink,
    #[iden = "image_url"]
    ImageUrl,
    #[iden = "wallet_addresses"]
    WalletAddresses,
    #[iden = "primary_wallet_address"]
    PrimaryWalletAddress,
    #[iden = "kyc_passed"]
    KycPassed,
    #[iden = "identification_id"]
    IdentificationId,
    #[iden = "password_reset_token"]
    PasswordResetToken,
    #[iden = "referral_code"]
    ReferralCode,
    #[iden = "created_at"]
    CreatedAt,
    #[iden = "updated_at"]
    UpdatedAt,
}
