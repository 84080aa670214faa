use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};

use super::{AccountRepository, NewAccount};
use crate::error::AppResult;
use crate::models::user_profiles::{ActiveModel as ProfileActiveModel, Column as ProfileColumn, Entity as Profiles};
use crate::models::users::{ActiveModel as UserActiveModel, Column as UserColumn, Entity as Users};
use crate::models::{user_profiles, users};

/// Comptes stockés dans PostgreSQL (tables users et user_profiles)
#[derive(Clone)]
pub struct SeaOrmAccountRepository {
    db: DatabaseConnection,
}

impl SeaOrmAccountRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AccountRepository for SeaOrmAccountRepository {
    async fn find_by_id(&self, id: i32) -> AppResult<Option<users::Model>> {
        Ok(Users::find_by_id(id).one(&self.db).await?)
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<users::Model>> {
        Ok(Users::find()
            .filter(UserColumn::Email.eq(email))
            .one(&self.db)
            .await?)
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<users::Model>> {
        Ok(Users::find()
            .filter(UserColumn::Username.eq(username))
            .one(&self.db)
            .await?)
    }

    async fn find_profile(&self, user_id: i32) -> AppResult<Option<user_profiles::Model>> {
        Ok(Profiles::find()
            .filter(ProfileColumn::UserId.eq(user_id))
            .one(&self.db)
            .await?)
    }

    async fn create(&self, account: NewAccount) -> AppResult<users::Model> {
        let txn = self.db.begin().await?;

        // 1. Créer le compte, non vérifié
        let user = UserActiveModel {
            username: Set(account.username),
            email: Set(account.email),
            password_hash: Set(account.password_hash),
            is_active: Set(true),
            is_email_verified: Set(false),
            verification_token: Set(account.verification_token),
            verification_token_created_at: Set(account.created_at),
            date_joined: Set(account.created_at),
            ..Default::default()
        }
            .insert(&txn)
            .await?;

        // 2. Créer le profil associé
        ProfileActiveModel {
            user_id: Set(user.id),
            created_at: Set(account.created_at),
            updated_at: Set(account.created_at),
            ..Default::default()
        }
            .insert(&txn)
            .await?;

        txn.commit().await?;
        Ok(user)
    }

    async fn save(&self, account: &users::Model) -> AppResult<users::Model> {
        let mut active_model: UserActiveModel = account.clone().into();
        active_model.username = Set(account.username.clone());
        active_model.email = Set(account.email.clone());
        active_model.password_hash = Set(account.password_hash.clone());
        active_model.is_active = Set(account.is_active);
        active_model.is_email_verified = Set(account.is_email_verified);
        active_model.verification_token = Set(account.verification_token.clone());
        active_model.verification_token_created_at = Set(account.verification_token_created_at);

        Ok(active_model.update(&self.db).await?)
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}
