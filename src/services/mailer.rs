use lettre::{
    message::header::ContentType,
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use crate::config::email::EmailConfig;
use crate::error::{AppError, Result};

/// Outbound email sender. When no SMTP host is configured the mailer is
/// disabled: sends are logged and succeed, so the platform (and the test
/// suite) runs without a relay.
#[derive(Clone)]
pub struct Mailer {
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
    from_address: String,
}

impl Mailer {
    pub fn from_config(config: &EmailConfig) -> Result<Self> {
        if config.smtp_host.is_empty() {
            tracing::warn!("No SMTP host configured, outbound email is disabled");
            return Ok(Self::disabled());
        }

        let creds = Credentials::new(config.smtp_username.clone(), config.smtp_password.clone());
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
            .map_err(|e| AppError::Internal(format!("Failed to create SMTP transport: {}", e)))?
            .port(config.smtp_port)
            .credentials(creds)
            .build();

        Ok(Self {
            transport: Some(transport),
            from_address: config.from_address.clone(),
        })
    }

    pub fn disabled() -> Self {
        Self {
            transport: None,
            from_address: "noreply@passpad.io".to_string(),
        }
    }

    pub async fn send(&self, to: &str, subject: &str, body: &str) -> Result<()> {
        let transport = match &self.transport {
            Some(t) => t,
            None => {
                tracing::debug!(to, subject, "Outbound email disabled, skipping send");
                return Ok(());
            }
        };

        let from = format!("PassPad <{}>", self.from_address);
        let to_mailbox = to
            .parse()
            .map_err(|_| AppError::BadRequest("Invalid recipient email address".to_string()))?;
        let from_mailbox = from
            .parse()
            .map_err(|_| AppError::Internal("Invalid sender email address".to_string()))?;

        let email = Message::builder()
            .from(from_mailbox)
            .to(to_mailbox)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| AppError::Internal(format!("Failed to build email: {}", e)))?;

        transport.send(email).await?;
        Ok(())
    }

    pub async fn send_welcome(&self, to: &str) -> Result<()> {
        self.send(
            to,
            "Welcome to PassPad",
            "Welcome to PassPad!\n\nYour account has been created. You can now browse live deals and start investing.",
        )
        .await
    }

    pub async fn send_password_changed(&self, to: &str) -> Result<()> {
        self.send(
            to,
            "Your PassPad password was changed",
            "Your PassPad password was just changed.\n\nIf this wasn't you, reset your password immediately and contact support.",
        )
        .await
    }

    pub async fn send_referral_invite(&self, to: &str, frontend_url: &str, referral_code: &str) -> Result<()> {
        let body = format!(
            "You have been invited to join PassPad!\n\nSign up here: {}/signup?referralCode={}",
            frontend_url, referral_code
        );
        self.send(to, "You are invited to PassPad", &body).await
    }

    pub async fn send_password_reset(&self, to: &str, frontend_url: &str, token: &str) -> Result<()> {
        let body = format!(
            "A password reset was requested for your PassPad account.\n\nReset it here: {}/reset-password/{}\n\nIf you didn't request this, you can ignore this email.",
            frontend_url, token
        );
        self.send(to, "Reset your PassPad password", &body).await
    }
}
