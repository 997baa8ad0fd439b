pub mod templates;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::SmtpConfig;

/// Outbound mail transport.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<(), String>;
}

pub async fn send_password_reset(
    mailer: &dyn Mailer,
    to_email: &str,
    reset_url: &str,
) -> Result<(), String> {
    let html = templates::render_password_reset(reset_url);
    mailer.send(to_email, "Reset Your Password", &html).await
}

pub async fn send_password_reset_success(mailer: &dyn Mailer, to_email: &str) -> Result<(), String> {
    let html = templates::render_password_reset_success();
    mailer.send(to_email, "Password Reset Successful", &html).await
}

/// Reject values that could smuggle extra headers into the message.
pub fn reject_header_injection(value: &str) -> Result<(), String> {
    if value.contains(['\r', '\n']) {
        Err("Invalid header value".to_string())
    } else {
        Ok(())
    }
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig) -> Result<Self, String> {
        let creds = Credentials::new(config.user.clone(), config.pass.clone());

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| format!("SMTP error: {e}"))?
            .port(config.port)
            .credentials(creds)
            .build();

        Ok(Self {
            transport,
            from: config.from.clone(),
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<(), String> {
        reject_header_injection(to)?;
        reject_header_injection(subject)?;

        let message = Message::builder()
            .from(
                self.from
                    .parse()
                    .map_err(|e| format!("Invalid from address: {e}"))?,
            )
            .to(to.parse().map_err(|e| format!("Invalid to address: {e}"))?)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html_body.to_string())
            .map_err(|e| format!("Failed to build email: {e}"))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| format!("Failed to send email: {e}"))?;

        Ok(())
    }
}

/// Stand-in used when SMTP is not configured. Nothing leaves the process.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<(), String> {
        reject_header_injection(to)?;
        reject_header_injection(subject)?;

        tracing::warn!(%to, %subject, "SMTP not configured, email not sent");
        tracing::debug!("Undelivered email body:\n{html_body}");
        Ok(())
    }
}
