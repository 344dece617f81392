//! Follow-up mailer — the "we'll be in touch" email promised on the
//! funnel's last step, sent over SMTP via lettre.

use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use secrecy::{ExposeSecret, SecretString};
use tracing::info;

use crate::error::NotifyError;

/// SMTP configuration, built from environment variables.
#[derive(Debug, Clone)]
pub struct MailerConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub username: String,
    pub password: SecretString,
    pub from_address: String,
}

impl MailerConfig {
    /// Build config from environment variables.
    /// Returns `None` if `SMTP_HOST` is not set (mailer disabled).
    pub fn from_env() -> Option<Self> {
        let smtp_host = std::env::var("SMTP_HOST").ok()?;

        let smtp_port: u16 = std::env::var("SMTP_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(587);

        let username = std::env::var("SMTP_USERNAME").unwrap_or_default();
        let password = SecretString::from(std::env::var("SMTP_PASSWORD").unwrap_or_default());
        let from_address =
            std::env::var("SMTP_FROM_ADDRESS").unwrap_or_else(|_| username.clone());

        Some(Self {
            smtp_host,
            smtp_port,
            username,
            password,
            from_address,
        })
    }
}

/// Sends the follow-up email after a low-rating journey finishes.
pub struct FollowUpMailer {
    config: MailerConfig,
}

impl FollowUpMailer {
    pub fn new(config: MailerConfig) -> Self {
        Self { config }
    }

    /// Send the follow-up. Blocking SMTP; call from `spawn_blocking`.
    pub fn send_follow_up(
        &self,
        to: &str,
        name: &str,
        vendor: &str,
        product: &str,
    ) -> Result<(), NotifyError> {
        let creds = Credentials::new(
            self.config.username.clone(),
            self.config.password.expose_secret().to_string(),
        );

        let transport = SmtpTransport::relay(&self.config.smtp_host)
            .map_err(|e| NotifyError::Send(format!("SMTP relay error: {e}")))?
            .port(self.config.smtp_port)
            .credentials(creds)
            .build();

        let email = Message::builder()
            .from(
                self.config
                    .from_address
                    .parse()
                    .map_err(|e| NotifyError::Address(format!("Invalid from address: {e}")))?,
            )
            .to(to
                .parse()
                .map_err(|e| NotifyError::Address(format!("Invalid to address: {e}")))?)
            .subject(format!("Thanks for your feedback on {product}"))
            .body(follow_up_body(name, vendor, product))
            .map_err(|e| NotifyError::Build(e.to_string()))?;

        transport
            .send(&email)
            .map_err(|e| NotifyError::Send(e.to_string()))?;

        info!(to, "Follow-up email sent");
        Ok(())
    }
}

fn follow_up_body(name: &str, vendor: &str, product: &str) -> String {
    format!(
        "Hi {name},\n\n\
         Thank you for telling us about your experience with {product}. \
         We're sorry it wasn't perfect — someone from {vendor} will be in \
         touch shortly to make it right.\n\n\
         {vendor}\n"
    )
}
