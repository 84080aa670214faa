// ============================================================================
// SERVICE : ENVOI D'EMAILS
// ============================================================================
//
// Description:
//   Envoi "best-effort" des emails de vérification. Une erreur d'envoi est
//   loggée mais jamais remontée à l'appelant : l'inscription, la vérification
//   et le renvoi continuent normalement.
//
// Backends:
//   - ConsoleMailer : écrit l'email dans les logs (développement)
//   - SmtpMailer : relais SMTP avec TLS obligatoire (lettre)
//
// ============================================================================

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::transport::smtp::PoolConfig;
use lettre::{Message, SmtpTransport, Transport};
use log::{error, info};
use std::sync::Arc;
use std::time::Duration;

use crate::config::{AppConfig, EmailBackend, SmtpSettings};
use crate::error::{AppError, AppResult};
use crate::models::users;
use crate::services::email_templates;
use crate::utils::uid;

const SMTP_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

//trait = Interface
#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, email: &OutgoingEmail) -> AppResult<()>;
}

/// Construit le backend configuré par EMAIL_BACKEND
pub fn build_sender(config: &AppConfig) -> AppResult<Arc<dyn EmailSender>> {
    match &config.email_backend {
        EmailBackend::Console => Ok(Arc::new(ConsoleMailer::new(&config.from_email))),
        EmailBackend::Smtp(settings) => Ok(Arc::new(SmtpMailer::new(settings, &config.from_email)?)),
    }
}

/// Backend console : l'email complet est écrit dans les logs
pub struct ConsoleMailer {
    from: String,
}

impl ConsoleMailer {
    pub fn new(from: &str) -> Self {
        Self { from: from.to_string() }
    }
}

#[async_trait]
impl EmailSender for ConsoleMailer {
    async fn send(&self, email: &OutgoingEmail) -> AppResult<()> {
        info!(
            "Email (console backend)\nFrom: {}\nTo: {}\nSubject: {}\n\n{}",
            self.from, email.to, email.subject, email.body
        );
        Ok(())
    }
}

/// Backend SMTP. Le transport (et son pool) est construit une seule fois ;
/// l'envoi, bloquant, tourne sur le pool de threads bloquants de tokio.
pub struct SmtpMailer {
    from: Mailbox,
    transport: SmtpTransport,
}

impl SmtpMailer {
    pub fn new(settings: &SmtpSettings, from: &str) -> AppResult<Self> {
        let from = from
            .parse::<Mailbox>()
            .map_err(|e| AppError::Config(format!("Invalid from address: {}", e)))?;

        let tls_parameters = TlsParameters::builder(settings.host.clone())
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build TLS parameters: {}", e)))?;

        let transport = SmtpTransport::relay(&settings.host)
            .map_err(|e| AppError::Config(format!("Failed to create SMTP transport: {}", e)))?
            .credentials(Credentials::new(settings.username.clone(), settings.password.clone()))
            .port(settings.port)
            .tls(Tls::Required(tls_parameters))
            .pool_config(PoolConfig::new().max_size(4))
            .timeout(Some(Duration::from_secs(SMTP_TIMEOUT_SECS)))
            .build();

        Ok(Self { from, transport })
    }
}

#[async_trait]
impl EmailSender for SmtpMailer {
    async fn send(&self, email: &OutgoingEmail) -> AppResult<()> {
        let to = email
            .to
            .parse::<Mailbox>()
            .map_err(|e| AppError::Mail(format!("Invalid to address: {}", e)))?;

        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(email.subject.clone())
            .header(ContentType::TEXT_PLAIN)
            .body(email.body.clone())
            .map_err(|e| AppError::Mail(format!("Failed to create email: {}", e)))?;

        let transport = self.transport.clone();
        tokio::task::spawn_blocking(move || transport.send(&message))
            .await
            .map_err(|e| AppError::Mail(format!("Mail task failed: {}", e)))?
            .map_err(|e| AppError::Mail(format!("Failed to send email: {}", e)))?;

        Ok(())
    }
}

/// Envoie le lien de vérification du compte. Best-effort : une erreur est
/// loggée puis ignorée.
pub async fn dispatch_verification_email(
    sender: &dyn EmailSender,
    site_url: &str,
    account: &users::Model,
) {
    let link = email_templates::verification_link(
        site_url,
        &uid::encode_uid(account.id),
        &account.verification_token,
    );
    let email = OutgoingEmail {
        to: account.email.clone(),
        subject: email_templates::VERIFICATION_SUBJECT.to_string(),
        body: email_templates::verification_email_body(&account.username, &link),
    };

    match sender.send(&email).await {
        Ok(()) => info!("Verification email sent to user {}", account.id),
        Err(e) => error!("Verification email to user {} failed: {}", account.id, e),
    }
}
