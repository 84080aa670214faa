use std::sync::Arc;

use crate::config::{AppConfig, StorageBackend};
use crate::db;
use crate::error::{AppError, AppResult};
use crate::repository::{AccountRepository, MemoryAccountRepository, SeaOrmAccountRepository};
use crate::services::account_service::AccountService;
use crate::services::mailer;

/// État partagé par tous les handlers (web::Data<AppState>)
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub accounts: AccountService,
}

impl AppState {
    pub fn new(config: AppConfig, accounts: AccountService) -> Self {
        Self { config, accounts }
    }

    /// Construit le stockage et le mailer selon la config
    pub async fn from_config(config: AppConfig) -> AppResult<Self> {
        let repository: Arc<dyn AccountRepository> = match config.storage {
            StorageBackend::Postgres => {
                let url = config
                    .database_url
                    .as_deref()
                    .ok_or_else(|| AppError::Config("DATABASE_URL must be set in .env file".to_string()))?;
                Arc::new(SeaOrmAccountRepository::new(db::establish_connection(url).await?))
            }
            StorageBackend::Memory => Arc::new(MemoryAccountRepository::new()),
        };
        let sender = mailer::build_sender(&config)?;

        let accounts = AccountService::new(repository, sender, config.site_url.clone(), config.jwt_secret.clone());
        Ok(Self::new(config, accounts))
    }
}
