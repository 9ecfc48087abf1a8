pub mod esign;
pub mod kyc;
pub mod lifecycle;
pub mod mailer;
pub mod security;
pub mod storage;

pub use esign::EsignClient;
pub use kyc::KycClient;
pub use mailer::Mailer;
pub use storage::StorageClient;
