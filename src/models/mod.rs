pub mod company;
pub mod funding_pool;
pub mod investment;
pub mod invitation;
pub mod user;

#[allow(unused_imports)]
pub mod prelude {
    pub use super::company::{self, Entity as Company};
    pub use super::funding_pool::{self, Entity as FundingPool};
    pub use super::investment::{self, Entity as Investment};
    pub use super::invitation::{self, Entity as Invitation};
    pub use super::user::{self, Entity as User};
}
