use sea_orm::entity::prelude::*;
use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};

/// Platform role. Everything that is not an admin is a `basic` account.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum UserRole {
    #[sea_orm(string_value = "basic")]
    #[serde(rename = "basic")]
    Basic,
    #[sea_orm(string_value = "admin")]
    #[serde(rename = "admin")]
    Admin,
}

/// Wallet addresses a user has linked, in insertion order. At most one of
/// them is designated primary (`primary_wallet_address` on the row).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct WalletAddresses(pub Vec<String>);

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: Option<String>,
    pub surname: Option<String>,
    #[sea_orm(unique)]
    pub email: String,
    #[serde(skip_serializing)]
    pub hashed_password: String,
    pub role: UserRole,
    pub bio: Option<String>,
    pub country: Option<String>,
    pub nationality: Option<String>,
    pub twitter_link: Option<String>,
    pub instagram_link: Option<String>,
    pub discord_link: Option<String>,
    pub image_url: Option<String>,
    pub wallet_addresses: WalletAddresses,
    pub primary_wallet_address: Option<String>,
    pub kyc_passed: bool,
    /// Session id assigned by the identity-verification provider; the KYC
    /// webhook resolves the user through it.
    pub identification_id: Option<String>,
    #[serde(skip_serializing)]
    pub password_reset_token: Option<String>,
    #[sea_orm(unique)]
    pub referral_code: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::investment::Entity")]
    Investments,
    #[sea_orm(has_many = "super::invitation::Entity")]
    Invitations,
}

impl Related<super::investment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Investments.def()
    }
}

impl Related<super::invitation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Invitations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}
