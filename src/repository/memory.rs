use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex as TokioMutex;

use super::{AccountRepository, NewAccount};
use crate::error::{AppError, AppResult};
use crate::models::{user_profiles, users};

// Données en mémoire (Mutex tokio pour le partage entre workers)
struct MemoryData {
    accounts: HashMap<i32, users::Model>,          // user_id -> compte
    profiles: HashMap<i32, user_profiles::Model>,  // user_id -> profil
    next_id: i32,
}

/// Stockage en mémoire, utile pour les tests et le développement local
pub struct MemoryAccountRepository {
    data: TokioMutex<MemoryData>,
}

impl MemoryAccountRepository {
    pub fn new() -> Self {
        Self {
            data: TokioMutex::new(MemoryData {
                accounts: HashMap::new(),
                profiles: HashMap::new(),
                next_id: 1,
            }),
        }
    }
}

impl Default for MemoryAccountRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AccountRepository for MemoryAccountRepository {
    async fn find_by_id(&self, id: i32) -> AppResult<Option<users::Model>> {
        let data = self.data.lock().await;
        Ok(data.accounts.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<users::Model>> {
        let data = self.data.lock().await;
        Ok(data.accounts.values().find(|a| a.email == email).cloned())
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<users::Model>> {
        let data = self.data.lock().await;
        Ok(data.accounts.values().find(|a| a.username == username).cloned())
    }

    async fn find_profile(&self, user_id: i32) -> AppResult<Option<user_profiles::Model>> {
        let data = self.data.lock().await;
        Ok(data.profiles.get(&user_id).cloned())
    }

    async fn create(&self, account: NewAccount) -> AppResult<users::Model> {
        let mut data = self.data.lock().await;

        // Mêmes contraintes UNIQUE que la table
        if data.accounts.values().any(|a| a.username == account.username) {
            return Err(AppError::Database(format!(
                "duplicate key value violates unique constraint: username={}",
                account.username
            )));
        }
        if data.accounts.values().any(|a| a.email == account.email) {
            return Err(AppError::Database(format!(
                "duplicate key value violates unique constraint: email={}",
                account.email
            )));
        }

        let id = data.next_id;
        data.next_id += 1;

        let user = users::Model {
            id,
            username: account.username,
            email: account.email,
            password_hash: account.password_hash,
            is_active: true,
            is_email_verified: false,
            verification_token: account.verification_token,
            verification_token_created_at: account.created_at,
            date_joined: account.created_at,
        };
        let profile = user_profiles::Model {
            id,
            user_id: id,
            created_at: account.created_at,
            updated_at: account.created_at,
        };

        data.accounts.insert(id, user.clone());
        data.profiles.insert(id, profile);
        Ok(user)
    }

    async fn save(&self, account: &users::Model) -> AppResult<users::Model> {
        let mut data = self.data.lock().await;
        match data.accounts.get_mut(&account.id) {
            Some(stored) => {
                *stored = account.clone();
                Ok(account.clone())
            }
            None => Err(AppError::NotFound(format!("User {} not found", account.id))),
        }
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
