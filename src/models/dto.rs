//pour les requêtes et réponses de l'API comptes
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{user_profiles, users};

// Formulaire d'inscription
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 150, message = "Username must be 3 to 150 characters"))]
    pub username: String,
    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    #[validate(must_match(other = "password", message = "The two password fields didn't match"))]
    pub password_confirm: String,
}

// Formulaire de connexion (username ou email)
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

// Formulaire de renvoi du lien de vérification
#[derive(Debug, Deserialize)]
pub struct ResendVerificationRequest {
    pub email: String,
}

// Réponse après login
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user_id: i32,
    pub username: String,
}

// Résumé du compte pour /profile et /dashboard
#[derive(Debug, Serialize)]
pub struct AccountResponse {
    pub user_id: i32,
    pub username: String,
    pub email: String,
    pub is_email_verified: bool,
    pub date_joined: DateTime<Utc>,
    pub profile_created_at: Option<DateTime<Utc>>,
}

impl AccountResponse {
    pub fn new(account: users::Model, profile: Option<user_profiles::Model>) -> Self {
        Self {
            user_id: account.id,
            username: account.username,
            email: account.email,
            is_email_verified: account.is_email_verified,
            date_joined: account.date_joined,
            profile_created_at: profile.map(|p| p.created_at),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageLevel {
    Success,
    Info,
    Warning,
    Error,
}

// Message affiché à l'utilisateur
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub level: MessageLevel,
    pub message: String,
}

impl MessageResponse {
    pub fn new(level: MessageLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }
}
