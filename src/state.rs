use sea_orm::DatabaseConnection;

use crate::config::CONFIG;
use crate::services::{EsignClient, KycClient, Mailer, StorageClient};

/// Database connection type alias
pub type DbConn = DatabaseConnection;

/// Application state containing all shared resources. Provider clients are
/// constructed once at startup and injected here; handlers never reach for
/// globals.
#[derive(Clone)]
pub struct AppState {
    pub db: DbConn,
    pub esign: EsignClient,
    pub kyc: KycClient,
    pub storage: StorageClient,
    pub mailer: Mailer,
}

impl AppState {
    pub fn new(
        db: DbConn,
        esign: EsignClient,
        kyc: KycClient,
        storage: StorageClient,
        mailer: Mailer,
    ) -> Self {
        Self {
            db,
            esign,
            kyc,
            storage,
            mailer,
        }
    }

    /// State wired to the configured providers.
    pub fn with_providers(db: DbConn, mailer: Mailer) -> Self {
        let providers = &CONFIG.providers;
        Self::new(
            db,
            EsignClient::new(&providers.esign_api_url, &providers.esign_api_key),
            KycClient::new(
                &providers.kyc_api_url,
                &providers.kyc_api_key,
                &providers.kyc_start_url,
            ),
            StorageClient::new(&providers.storage_api_url, &providers.storage_bucket),
            mailer,
        )
    }
}
