use std::env;

/// Endpoints and credentials for the third-party providers. The clients
/// themselves are constructed once in the bootstrapper and injected through
/// `AppState`, so handlers stay testable without network access.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub esign_api_url: String,
    pub esign_api_key: String,
    pub kyc_api_url: String,
    pub kyc_api_key: String,
    /// Base URL the client is redirected to for an identity-verification session.
    pub kyc_start_url: String,
    pub storage_api_url: String,
    pub storage_bucket: String,
}

impl ProviderConfig {
    pub fn from_env() -> Self {
        Self {
            esign_api_url: env::var("PASSPAD_ESIGN_API_URL")
                .unwrap_or_else(|_| "https://staging-api.yousign.com".to_string()),
            esign_api_key: env::var("PASSPAD_ESIGN_API_KEY").unwrap_or_default(),
            kyc_api_url: env::var("PASSPAD_KYC_API_URL")
                .unwrap_or_else(|_| "https://sandbox-api.kyc.example.com".to_string()),
            kyc_api_key: env::var("PASSPAD_KYC_API_KEY").unwrap_or_default(),
            kyc_start_url: env::var("PASSPAD_KYC_START_URL")
                .unwrap_or_else(|_| "https://sandbox-idv.kyc.example.com/external".to_string()),
            storage_api_url: env::var("PASSPAD_STORAGE_API_URL")
                .unwrap_or_else(|_| "https://storage.googleapis.com".to_string()),
            storage_bucket: env::var("PASSPAD_STORAGE_BUCKET")
                .unwrap_or_else(|_| "passpad-uploads".to_string()),
        }
    }
}
