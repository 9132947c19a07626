use anyhow::{Context, Result};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use tracing::{info, warn};

use crate::config::SmtpConfig;

/// Outbound mail. Called from blocking context.
pub trait Mailer: Send + Sync {
    fn send_otp(&self, to: &str, code: &str) -> Result<()>;
}

pub struct SmtpMailer {
    config: SmtpConfig,
}

impl SmtpMailer {
    pub fn new(config: SmtpConfig) -> Self {
        Self { config }
    }
}

impl Mailer for SmtpMailer {
    fn send_otp(&self, to: &str, code: &str) -> Result<()> {
        let creds = Credentials::new(self.config.username.clone(), self.config.password.clone());

        let transport = SmtpTransport::starttls_relay(&self.config.host)
            .context("SMTP relay error")?
            .port(self.config.port)
            .credentials(creds)
            .build();

        let email = Message::builder()
            .from(self.config.from_address.parse().context("Invalid from address")?)
            .to(to.parse().context("Invalid to address")?)
            .subject("Your verification code")
            .body(format!(
                "Your verification code is {code}.\n\nIt expires in 2 minutes. If you did not request it, ignore this email."
            ))
            .context("Failed to build email")?;

        transport.send(&email).context("SMTP send failed")?;

        info!("OTP email sent to {to}");
        Ok(())
    }
}

/// Stand-in when SMTP is not configured: logs and reports non-delivery.
pub struct LogMailer;

impl Mailer for LogMailer {
    fn send_otp(&self, to: &str, _code: &str) -> Result<()> {
        warn!("SMTP not configured; OTP for {to} was not emailed");
        anyhow::bail!("email delivery is not configured")
    }
}
