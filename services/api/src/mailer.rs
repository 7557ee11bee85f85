//! Outbound mail for the password reset flow
//!
//! Delivery is fire-and-forget: the send runs on a spawned task and failures
//! are logged, never surfaced to the caller. Without SMTP configuration the
//! mailer runs disabled, which keeps local development working.

use anyhow::Result;
use lettre::{
    message::header::ContentType,
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use tracing::{info, warn};

/// SMTP configuration
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from_address: String,
}

impl SmtpConfig {
    /// Read SMTP settings from environment variables
    ///
    /// Returns `None` when `SMTP_HOST` is unset, which disables delivery.
    ///
    /// # Environment Variables
    /// - `SMTP_HOST`, `SMTP_PORT` (default: 587)
    /// - `SMTP_USERNAME`, `SMTP_PASSWORD`
    /// - `SMTP_FROM_ADDRESS` (default: "noreply@routes4life.app")
    pub fn from_env() -> Option<Self> {
        let host = std::env::var("SMTP_HOST").ok()?;
        let port = std::env::var("SMTP_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(587);
        let username = std::env::var("SMTP_USERNAME").unwrap_or_default();
        let password = std::env::var("SMTP_PASSWORD").unwrap_or_default();
        let from_address = std::env::var("SMTP_FROM_ADDRESS")
            .unwrap_or_else(|_| "noreply@routes4life.app".to_string());

        Some(Self {
            host,
            port,
            username,
            password,
            from_address,
        })
    }
}

/// Transactional mail sender
#[derive(Clone)]
pub struct Mailer {
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
    from_address: String,
}

impl Mailer {
    /// Build a mailer from the environment; disabled when SMTP is not configured
    pub fn from_env() -> Result<Self> {
        match SmtpConfig::from_env() {
            Some(config) => Self::new(&config),
            None => {
                warn!("SMTP_HOST not set, mail delivery disabled");
                Ok(Self {
                    transport: None,
                    from_address: String::new(),
                })
            }
        }
    }

    /// Create a mailer backed by an SMTP relay
    pub fn new(config: &SmtpConfig) -> Result<Self> {
        let credentials = Credentials::new(config.username.clone(), config.password.clone());
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?
            .port(config.port)
            .credentials(credentials)
            .build();

        Ok(Self {
            transport: Some(transport),
            from_address: config.from_address.clone(),
        })
    }

    /// Send a reset code to a user, fire-and-forget
    pub fn send_reset_code(&self, to: &str, code: &str) {
        let Some(transport) = self.transport.clone() else {
            info!("Mail delivery disabled, skipping reset code mail to {}", to);
            return;
        };

        let message = Message::builder()
            .from(match self.from_address.parse() {
                Ok(mailbox) => mailbox,
                Err(e) => {
                    warn!("Invalid sender address {}: {}", self.from_address, e);
                    return;
                }
            })
            .to(match to.parse() {
                Ok(mailbox) => mailbox,
                Err(e) => {
                    warn!("Invalid recipient address {}: {}", to, e);
                    return;
                }
            })
            .subject("Your Routes4Life password reset code")
            .header(ContentType::TEXT_PLAIN)
            .body(format!(
                "Your password reset code is {}. It expires in 2 minutes.",
                code
            ));

        let message = match message {
            Ok(message) => message,
            Err(e) => {
                warn!("Failed to build reset code mail: {}", e);
                return;
            }
        };

        let recipient = to.to_string();
        tokio::spawn(async move {
            if let Err(e) = transport.send(message).await {
                warn!("Failed to deliver reset code mail to {}: {}", recipient, e);
            }
        });
    }
}
