// ============================================================================
// CONFIGURATION
// ============================================================================
//
// Description:
//   Toute la configuration vient des variables d'environnement (fichier .env
//   chargé par dotenv dans main.rs).
//
// Variables:
//   - DATABASE_URL : requis si STORAGE=postgres
//   - STORAGE : "postgres" (défaut) ou "memory"
//   - BIND_ADDR : adresse d'écoute (défaut 127.0.0.1:8080)
//   - SITE_URL : base des liens envoyés par email (défaut http://127.0.0.1:8080)
//   - DEFAULT_FROM_EMAIL : expéditeur (défaut noreply@example.com)
//   - EMAIL_BACKEND : "console" (défaut) ou "smtp"
//   - SMTP_HOST / SMTP_PORT / SMTP_USERNAME / SMTP_PASSWORD : requis si smtp
//   - JWT_SECRET : clé de signature des JWT
//
// ============================================================================

use std::env;

use crate::error::AppError;

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
const DEFAULT_SITE_URL: &str = "http://127.0.0.1:8080";
const DEFAULT_FROM_EMAIL: &str = "noreply@example.com";
const DEFAULT_SMTP_PORT: u16 = 587;
const INSECURE_JWT_SECRET: &str = "default-insecure-key-change-this";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub enum EmailBackend {
    Console,
    Smtp(SmtpSettings),
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub storage: StorageBackend,
    pub database_url: Option<String>,
    pub bind_addr: String,
    pub site_url: String,
    pub from_email: String,
    pub email_backend: EmailBackend,
    pub jwt_secret: String,
}

impl AppConfig {
    /// Charge la config depuis l'environnement du process
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Charge la config depuis une fonction de lookup (permet de tester sans
    /// modifier l'environnement du process)
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let storage = match get("STORAGE").as_deref().map(str::to_ascii_lowercase).as_deref() {
            None | Some("postgres") => StorageBackend::Postgres,
            Some("memory") => StorageBackend::Memory,
            Some(other) => {
                return Err(AppError::Config(format!("Unknown STORAGE: {}", other)));
            }
        };

        let database_url = get("DATABASE_URL");
        if storage == StorageBackend::Postgres && database_url.is_none() {
            return Err(AppError::Config(
                "DATABASE_URL must be set in .env file".to_string(),
            ));
        }

        let email_backend = match get("EMAIL_BACKEND").as_deref().map(str::to_ascii_lowercase).as_deref() {
            None | Some("console") => EmailBackend::Console,
            Some("smtp") => {
                let require = |key: &str| {
                    get(key).ok_or_else(|| {
                        AppError::Config(format!("{} must be set when EMAIL_BACKEND=smtp", key))
                    })
                };
                let port = match get("SMTP_PORT") {
                    Some(raw) => raw
                        .parse::<u16>()
                        .map_err(|_| AppError::Config(format!("Invalid SMTP_PORT: {}", raw)))?,
                    None => DEFAULT_SMTP_PORT,
                };
                EmailBackend::Smtp(SmtpSettings {
                    host: require("SMTP_HOST")?,
                    port,
                    username: require("SMTP_USERNAME")?,
                    password: require("SMTP_PASSWORD")?,
                })
            }
            Some(other) => {
                return Err(AppError::Config(format!("Unknown EMAIL_BACKEND: {}", other)));
            }
        };

        let jwt_secret = get("JWT_SECRET").unwrap_or_else(|| {
            log::warn!("JWT_SECRET not found in .env, using default (INSECURE)");
            INSECURE_JWT_SECRET.to_string()
        });

        Ok(Self {
            storage,
            database_url,
            bind_addr: get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            site_url: get("SITE_URL")
                .unwrap_or_else(|| DEFAULT_SITE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            from_email: get("DEFAULT_FROM_EMAIL").unwrap_or_else(|| DEFAULT_FROM_EMAIL.to_string()),
            email_backend,
            jwt_secret,
        })
    }

    /// Config utilisée par les tests : stockage mémoire, emails en console
    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self {
            storage: StorageBackend::Memory,
            database_url: None,
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            site_url: "http://testserver".to_string(),
            from_email: DEFAULT_FROM_EMAIL.to_string(),
            email_backend: EmailBackend::Console,
            jwt_secret: "test-secret".to_string(),
        }
    }
}
