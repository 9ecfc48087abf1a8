pub mod auth;
pub mod pagination;

pub use auth::require_admin;
pub use auth::require_auth;
pub use auth::AuthenticatedUser;
pub use pagination::Pagination;
