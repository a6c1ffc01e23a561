//! Outbound reset-link dispatch.
//!
//! The reset flow only needs one contract: deliver a single-use link to an
//! address. Behind a trait so the SMTP transport stays an external
//! collaborator — tests inject a capturing mock, and a deployment without
//! SMTP configured gets a no-op dispatcher that surfaces the link in the
//! operational log instead of silently dropping it.

use crate::config::SmtpConfig;
use anyhow::{Context, Result};
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};

/// Subject line carried over from the original notification mail.
const RESET_SUBJECT: &str = "Password Reset Confirmation";

/// Dispatches a password-reset link to a destination address.
pub trait Mailer: Send + Sync {
    fn send_reset_link(&self, recipient: &str, link: &str) -> Result<()>;
}

/// SMTP dispatcher (lettre, TLS relay).
pub struct SmtpMailer {
    transport: SmtpTransport,
    from_address: String,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig) -> Result<Self> {
        let password = config
            .password
            .clone()
            .context("smtp.password not set (config or TIMEWISE_SMTP_PASSWORD)")?;
        let transport = SmtpTransport::relay(&config.host)
            .with_context(|| format!("invalid smtp relay host {}", config.host))?
            .credentials(Credentials::new(config.username.clone(), password))
            .build();
        Ok(Self {
            transport,
            from_address: config.from_address.clone(),
        })
    }
}

impl Mailer for SmtpMailer {
    fn send_reset_link(&self, recipient: &str, link: &str) -> Result<()> {
        let message = Message::builder()
            .from(self.from_address.parse().context("invalid from address")?)
            .to(recipient.parse().context("invalid recipient address")?)
            .subject(RESET_SUBJECT)
            .header(ContentType::TEXT_HTML)
            .body(reset_body(link))?;
        self.transport
            .send(&message)
            .with_context(|| format!("failed to send reset mail to {recipient}"))?;
        tracing::info!(recipient, "reset link dispatched");
        Ok(())
    }
}

/// Fallback when no SMTP transport is configured: the link goes to the
/// operational log so a developer can complete the flow by hand.
pub struct LogOnlyMailer;

impl Mailer for LogOnlyMailer {
    fn send_reset_link(&self, recipient: &str, link: &str) -> Result<()> {
        tracing::warn!(recipient, link, "smtp not configured — reset link logged only");
        Ok(())
    }
}

fn reset_body(link: &str) -> String {
    format!(
        "<html><body>\
         <p>A password reset was requested for your TimeWise account.</p>\
         <p><a href=\"{link}\">Reset your password</a></p>\
         <p>This link expires shortly. If you did not request a reset, you \
         can ignore this message.</p>\
         </body></html>"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_embeds_the_link() {
        let body = reset_body("https://timewise.example.com/reset-confirm?token=abc");
        assert!(body.contains("reset-confirm?token=abc"));
        assert!(body.starts_with("<html>"));
    }

    #[test]
    fn log_only_mailer_always_succeeds() {
        LogOnlyMailer
            .send_reset_link("a@x.com", "http://localhost/reset-confirm?token=t")
            .unwrap();
    }
}
