use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "investments")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    pub funding_pool_id: i64,
    // Company fields are denormalized at creation time for display.
    pub company_id: i64,
    pub company_name: String,
    pub company_image: Option<String>,
    pub amount_invested: f64,
    /// Document id of the SAFT slot this investment was registered against.
    /// Empty string when the investment was registered without a signed document.
    pub saft_id: String,
    pub investment_date: DateTimeUtc,
    pub payment_date: Option<DateTimeUtc>,
    pub transaction_hash: Option<String>,
    /// User-adjustable gas price hint for the payment transaction.
    pub gas: Option<f64>,
    pub successfully_completed: bool,
    /// Reserved for the on-chain verification job (currently disabled).
    pub verified: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
    #[sea_orm(
        belongs_to = "super::funding_pool::Entity",
        from = "Column::FundingPoolId",
        to = "super::funding_pool::Column::Id"
    )]
    FundingPool,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::funding_pool::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FundingPool.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
