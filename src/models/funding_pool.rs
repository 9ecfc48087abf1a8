use sea_orm::entity::prelude::*;
use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};

/// Deal visibility. `DRAFT` pools are hidden from every public listing;
/// `COMING SOON` pools are announced but not yet open; only `LIVE` pools can
/// accept investments (combined with the auction window and a set contract
/// address).
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, utoipa::ToSchema)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum PoolStatus {
    #[sea_orm(string_value = "DRAFT")]
    #[serde(rename = "DRAFT")]
    Draft,
    #[sea_orm(string_value = "COMING SOON")]
    #[serde(rename = "COMING SOON")]
    ComingSoon,
    #[sea_orm(string_value = "LIVE")]
    #[serde(rename = "LIVE")]
    Live,
}

/// One legal-document allocation on a pool: the SAFT issued to one backer.
///
/// A backer holds at most one entry with `is_valid == true` per pool at any
/// time. The entry is flipped invalid (never deleted) when the matching
/// investment is confirmed on-chain, and removed entirely only by the
/// administrative investment delete.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaftFile {
    /// Document id assigned by the e-signature provider.
    pub saft_id: String,
    #[serde(default)]
    pub procedure_id: Option<String>,
    #[serde(default)]
    pub signature_id: Option<String>,
    /// The user this document was issued to.
    pub owner_id: i64,
    pub is_valid: bool,
    /// Epoch milliseconds.
    pub created_at: i64,
}

/// Ordered SAFT allocations; list order is lookup order ("first match wins").
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult, utoipa::ToSchema)]
pub struct SaftFiles(pub Vec<SaftFile>);

impl SaftFiles {
    /// First valid entry owned by `user_id`, in list order.
    pub fn active_slot(&self, user_id: i64) -> Option<&SaftFile> {
        self.0
            .iter()
            .find(|f| f.owner_id == user_id && f.is_valid)
    }

    pub fn valid_count_for(&self, user_id: i64) -> usize {
        self.0
            .iter()
            .filter(|f| f.owner_id == user_id && f.is_valid)
            .count()
    }
}

/// Users who have initiated at least one investment against the pool.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult, utoipa::ToSchema)]
pub struct Backers(pub Vec<i64>);

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, utoipa::ToSchema)]
#[sea_orm(table_name = "funding_pools")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub slug: String,
    pub title: String,
    pub description: Option<String>,
    pub company_id: i64,
    pub status: PoolStatus,
    /// Auction window bounds, epoch milliseconds.
    pub auction_start: i64,
    pub auction_end: i64,
    pub capacity: f64,
    pub min_amount: f64,
    pub max_amount: f64,
    pub price_per_token: Option<f64>,
    pub vesting: Option<String>,
    pub sale_type: Option<String>,
    /// E-signature document template used when a backer signs the SAFT.
    pub template_id: Option<String>,
    /// Treasury wallet shown to investors once fundraising is enabled.
    pub wallet_address: Option<String>,
    /// On-chain fundraising contract; unset means the pool is not investable.
    pub contract_address: Option<String>,
    pub referrer_fee: Option<f64>,
    pub backers: Backers,
    pub saft_files: SaftFiles,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::company::Entity",
        from = "Column::CompanyId",
        to = "super::company::Column::Id"
    )]
    Company,
    #[sea_orm(has_many = "super::investment::Entity")]
    Investments,
}

impl Related<super::company::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Company.def()
    }
}

impl Related<super::investment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Investments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
