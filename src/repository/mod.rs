// ============================================================================
// REPOSITORY - ACCÈS AUX COMPTES
// ============================================================================
//
// Description:
//   Interface explicite vers le stockage des comptes. Les services reçoivent
//   un Arc<dyn AccountRepository> au lieu d'accéder directement à la BD.
//
// Implémentations:
//   - SeaOrmAccountRepository : PostgreSQL via SeaORM (production)
//   - MemoryAccountRepository : HashMap en mémoire (tests, STORAGE=memory)
//
// Points d'attention:
//   - save() écrase le compte entier : le dernier qui écrit gagne
//   - create() insère compte + profil ensemble
//
// ============================================================================

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::AppResult;
use crate::models::{user_profiles, users};

pub use self::memory::MemoryAccountRepository;
pub use self::postgres::SeaOrmAccountRepository;

/// Données d'un compte à créer (l'id est attribué par le stockage)
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub verification_token: String,
    pub created_at: DateTime<Utc>,
}

#[async_trait]
pub trait AccountRepository: Send + Sync {
    async fn find_by_id(&self, id: i32) -> AppResult<Option<users::Model>>;

    async fn find_by_email(&self, email: &str) -> AppResult<Option<users::Model>>;

    async fn find_by_username(&self, username: &str) -> AppResult<Option<users::Model>>;

    async fn find_profile(&self, user_id: i32) -> AppResult<Option<user_profiles::Model>>;

    /// Crée le compte (non vérifié) et son profil
    async fn create(&self, account: NewAccount) -> AppResult<users::Model>;

    /// Persiste toutes les colonnes modifiables du compte
    async fn save(&self, account: &users::Model) -> AppResult<users::Model>;

    /// Nom du backend, exposé par /api/health
    fn backend_name(&self) -> &'static str;
}
