use std::env;

#[derive(Debug, Clone)]
pub struct EmailConfig {
    /// SMTP relay host. Empty disables outbound mail entirely.
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: String,
    pub from_address: String,
}

impl EmailConfig {
    pub fn from_env() -> Self {
        Self {
            smtp_host: env::var("PASSPAD_SMTP_HOST").unwrap_or_default(),
            smtp_port: env::var("PASSPAD_SMTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(587),
            smtp_username: env::var("PASSPAD_SMTP_USERNAME").unwrap_or_default(),
            smtp_password: env::var("PASSPAD_SMTP_PASSWORD").unwrap_or_default(),
            from_address: env::var("PASSPAD_EMAIL_FROM")
                .unwrap_or_else(|_| "noreply@passpad.io".to_string()),
        }
    }
}
