// ============================================================================
// SERVICE : COMPTES (INSCRIPTION, VÉRIFICATION EMAIL, LOGIN)
// ============================================================================
//
// Workflow:
//   1. POST /register/ : compte créé non vérifié + token + email de vérification
//   2. GET /verify/{uidb64}/{token}/ : voir verify_email()
//   3. POST /resend-verification/ : nouveau token + nouvel email
//   4. POST /login/ : refusé tant que l'email n'est pas vérifié
//
// Points d'attention:
//   - L'envoi d'email est best-effort (voir mailer.rs)
//   - `now` est passé en paramètre pour pouvoir tester l'expiration
//
// ============================================================================

use chrono::{DateTime, Utc};
use log::{info, warn};
use std::sync::Arc;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::models::dto::{AccountResponse, LoginRequest, RegisterRequest};
use crate::models::users;
use crate::repository::{AccountRepository, NewAccount};
use crate::services::mailer::{self, EmailSender};
use crate::services::token_service;
use crate::utils::logging::format_sensitive;
use crate::utils::{jwt, password, uid};

/// Résultat d'un clic sur le lien de vérification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationOutcome {
    /// Compte passé à vérifié
    Verified,
    /// Compte déjà vérifié, token correct : rien n'est modifié
    AlreadyVerified,
    /// Token correct mais trop vieux : un nouveau lien a été envoyé
    Expired,
    /// Clé illisible, compte inconnu ou token différent du token courant
    Invalid,
}

/// Résultat d'une demande de renvoi du lien
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResendOutcome {
    Sent,
    AlreadyVerified,
    NotFound,
}

#[derive(Clone)]
pub struct AccountService {
    accounts: Arc<dyn AccountRepository>,
    mailer: Arc<dyn EmailSender>,
    site_url: String,
    jwt_secret: String,
}

impl AccountService {
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        mailer: Arc<dyn EmailSender>,
        site_url: impl Into<String>,
        jwt_secret: impl Into<String>,
    ) -> Self {
        Self {
            accounts,
            mailer,
            site_url: site_url.into(),
            jwt_secret: jwt_secret.into(),
        }
    }

    pub fn storage_backend(&self) -> &'static str {
        self.accounts.backend_name()
    }

    pub fn jwt_secret(&self) -> &str {
        &self.jwt_secret
    }

    /// Inscription : valide le formulaire, crée le compte non vérifié et
    /// envoie le lien de vérification
    pub async fn register(
        &self,
        request: RegisterRequest,
        now: DateTime<Utc>,
    ) -> AppResult<users::Model> {
        // La validation porte sur les valeurs réellement stockées
        let request = RegisterRequest {
            username: request.username.trim().to_string(),
            email: normalize_email(&request.email),
            ..request
        };
        request.validate()?;

        let username = request.username;
        let email = request.email;

        // 1. Unicité du username et de l'email
        if self.accounts.find_by_username(&username).await?.is_some() {
            return Err(AppError::Conflict("A user with that username already exists.".to_string()));
        }
        if self.accounts.find_by_email(&email).await?.is_some() {
            return Err(AppError::Conflict("A user with that email already exists.".to_string()));
        }

        // 2. Hash du mot de passe
        let password_hash = password::hash_password(&request.password)?;

        // 3. Créer le compte avec un premier token
        let account = self
            .accounts
            .create(NewAccount {
                username,
                email,
                password_hash,
                verification_token: token_service::new_token(),
                created_at: now,
            })
            .await?;
        info!("Registered user {} ({})", account.id, format_sensitive(&account.email));

        // 4. Envoyer le lien
        self.send_verification(&account).await;

        Ok(account)
    }

    /// Valide un lien de vérification.
    /// Les erreurs de stockage remontent ; tout le reste est un VerificationOutcome.
    pub async fn verify_email(
        &self,
        encoded_uid: &str,
        token: &str,
        now: DateTime<Utc>,
    ) -> AppResult<VerificationOutcome> {
        // 1. Décoder la clé et retrouver le compte
        let account = match uid::decode_uid(encoded_uid) {
            Some(id) => self.accounts.find_by_id(id).await?,
            None => None,
        };

        let Some(mut account) = account else {
            warn!("Verification link with unknown account key {}", encoded_uid);
            return Ok(VerificationOutcome::Invalid);
        };

        // 2. Seul le token courant est accepté
        if account.verification_token != token {
            warn!(
                "Verification token mismatch for user {} (got {})",
                account.id,
                format_sensitive(token)
            );
            return Ok(VerificationOutcome::Invalid);
        }

        if account.is_email_verified {
            info!("User {} already verified", account.id);
            return Ok(VerificationOutcome::AlreadyVerified);
        }

        // 3. Token expiré : on en émet un nouveau et on renvoie le lien
        if token_service::is_expired(account.verification_token_created_at, now) {
            info!("Verification token expired for user {}, sending a new one", account.id);
            token_service::issue_token(self.accounts.as_ref(), &mut account, now).await?;
            self.send_verification(&account).await;
            return Ok(VerificationOutcome::Expired);
        }

        // 4. Marquer le compte vérifié
        account.is_email_verified = true;
        self.accounts.save(&account).await?;
        info!("Email verified for user {}", account.id);

        Ok(VerificationOutcome::Verified)
    }

    /// Renvoie un lien de vérification (nouveau token) à l'adresse donnée
    pub async fn resend_verification(
        &self,
        email: &str,
        now: DateTime<Utc>,
    ) -> AppResult<ResendOutcome> {
        let email = normalize_email(email);

        let Some(mut account) = self.accounts.find_by_email(&email).await? else {
            return Ok(ResendOutcome::NotFound);
        };

        if account.is_email_verified {
            return Ok(ResendOutcome::AlreadyVerified);
        }

        token_service::issue_token(self.accounts.as_ref(), &mut account, now).await?;
        self.send_verification(&account).await;
        info!("Verification email resent for user {}", account.id);

        Ok(ResendOutcome::Sent)
    }

    /// Login par username (ou email). Retourne le compte et un JWT.
    pub async fn login(&self, request: &LoginRequest) -> AppResult<(users::Model, String)> {
        let identifier = request.username.trim();

        // 1. Trouver le compte
        let account = match self.accounts.find_by_username(identifier).await? {
            Some(account) => Some(account),
            None => self.accounts.find_by_email(&normalize_email(identifier)).await?,
        };
        let account = account.ok_or(AppError::InvalidCredentials)?;

        // 2. Vérifier le mot de passe
        if !account.is_active || !password::verify_password(&request.password, &account.password_hash)? {
            warn!("Failed login for {}", format_sensitive(identifier));
            return Err(AppError::InvalidCredentials);
        }

        // 3. Email vérifié obligatoire
        if !account.is_email_verified {
            return Err(AppError::EmailNotVerified);
        }

        // 4. Générer le JWT
        let token = jwt::generate_token(account.id, &account.username, &account.email, &self.jwt_secret)?;
        info!("User {} logged in", account.id);

        Ok((account, token))
    }

    /// Résumé du compte pour /profile/ et /dashboard/
    pub async fn account_summary(&self, user_id: i32) -> AppResult<AccountResponse> {
        let account = self
            .accounts
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
        let profile = self.accounts.find_profile(user_id).await?;

        Ok(AccountResponse::new(account, profile))
    }

    async fn send_verification(&self, account: &users::Model) {
        mailer::dispatch_verification_email(self.mailer.as_ref(), &self.site_url, account).await;
    }
}

/// Normalise un email : espaces retirés, domaine en minuscules
pub fn normalize_email(email: &str) -> String {
    let email = email.trim();
    match email.rsplit_once('@') {
        Some((local, domain)) => format!("{}@{}", local, domain.to_lowercase()),
        None => email.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MemoryAccountRepository;
    use crate::services::mailer::testing::RecordingMailer;
    use chrono::Duration;

    struct Fixture {
        service: AccountService,
        repo: Arc<MemoryAccountRepository>,
        mailer: Arc<RecordingMailer>,
    }

    fn fixture_with(mailer: RecordingMailer) -> Fixture {
        let repo = Arc::new(MemoryAccountRepository::new());
        let mailer = Arc::new(mailer);
        let service = AccountService::new(repo.clone(), mailer.clone(), "http://testserver", "test-secret");
        Fixture { service, repo, mailer }
    }

    fn fixture() -> Fixture {
        fixture_with(RecordingMailer::new())
    }

    // Compte créé directement (sans hash PBKDF2 coûteux)
    async fn create_account(repo: &MemoryAccountRepository, email: &str, t0: DateTime<Utc>) -> users::Model {
        repo.create(NewAccount {
            username: email.split('@').next().unwrap_or("user").to_string(),
            email: email.to_string(),
            password_hash: "pbkdf2:sha256:1$c2FsdA$aGFzaA".to_string(),
            verification_token: token_service::new_token(),
            created_at: t0,
        })
        .await
        .unwrap()
    }

    async fn stored(repo: &MemoryAccountRepository, id: i32) -> users::Model {
        repo.find_by_id(id).await.unwrap().unwrap()
    }

    #[tokio::test]
    async fn test_verify_within_window() {
        let f = fixture();
        let t0 = Utc::now();
        let account = create_account(&f.repo, "alice@example.com", t0).await;
        let key = uid::encode_uid(account.id);

        let outcome = f
            .service
            .verify_email(&key, &account.verification_token, t0 + Duration::hours(1))
            .await
            .unwrap();

        assert_eq!(outcome, VerificationOutcome::Verified);
        let after = stored(&f.repo, account.id).await;
        assert!(after.is_email_verified);
        assert_eq!(after.verification_token, account.verification_token);
        assert_eq!(f.mailer.count().await, 0);
    }

    #[tokio::test]
    async fn test_verify_twice_is_already_verified() {
        let f = fixture();
        let t0 = Utc::now();
        let account = create_account(&f.repo, "alice@example.com", t0).await;
        let key = uid::encode_uid(account.id);
        let token = account.verification_token.clone();

        f.service.verify_email(&key, &token, t0 + Duration::hours(1)).await.unwrap();
        let second = f.service.verify_email(&key, &token, t0 + Duration::hours(2)).await.unwrap();

        assert_eq!(second, VerificationOutcome::AlreadyVerified);
        assert!(stored(&f.repo, account.id).await.is_email_verified);
    }

    #[tokio::test]
    async fn test_verify_expired_reissues_and_rotates() {
        let f = fixture();
        let t0 = Utc::now();
        let account = create_account(&f.repo, "alice@example.com", t0).await;
        let key = uid::encode_uid(account.id);
        let old_token = account.verification_token.clone();
        let t25 = t0 + Duration::hours(25);

        let outcome = f.service.verify_email(&key, &old_token, t25).await.unwrap();
        assert_eq!(outcome, VerificationOutcome::Expired);

        let after = stored(&f.repo, account.id).await;
        assert!(!after.is_email_verified);
        assert_ne!(after.verification_token, old_token);
        assert_eq!(after.verification_token_created_at, t25);

        // Le nouvel email contient le nouveau token
        assert_eq!(f.mailer.count().await, 1);
        let email = f.mailer.last().await.unwrap();
        assert!(email.body.contains(&after.verification_token));

        // L'ancien token n'est plus accepté
        let again = f.service.verify_email(&key, &old_token, t25).await.unwrap();
        assert_eq!(again, VerificationOutcome::Invalid);

        // Le nouveau token fonctionne
        let fresh = f
            .service
            .verify_email(&key, &after.verification_token, t25 + Duration::minutes(5))
            .await
            .unwrap();
        assert_eq!(fresh, VerificationOutcome::Verified);
    }

    #[tokio::test]
    async fn test_verify_expired_with_failing_mailer() {
        let f = fixture_with(RecordingMailer::failing());
        let t0 = Utc::now();
        let account = create_account(&f.repo, "alice@example.com", t0).await;
        let key = uid::encode_uid(account.id);

        let outcome = f
            .service
            .verify_email(&key, &account.verification_token, t0 + Duration::hours(30))
            .await
            .unwrap();

        assert_eq!(outcome, VerificationOutcome::Expired);
        assert_ne!(stored(&f.repo, account.id).await.verification_token, account.verification_token);
    }

    #[tokio::test]
    async fn test_verify_invalid_links() {
        let f = fixture();
        let t0 = Utc::now();
        let account = create_account(&f.repo, "alice@example.com", t0).await;
        let key = uid::encode_uid(account.id);
        let later = t0 + Duration::hours(1);

        // Token différent
        assert_eq!(
            f.service.verify_email(&key, "not-the-token", later).await.unwrap(),
            VerificationOutcome::Invalid
        );
        // Clé illisible
        assert_eq!(
            f.service.verify_email("%%%", &account.verification_token, later).await.unwrap(),
            VerificationOutcome::Invalid
        );
        // Compte inconnu
        assert_eq!(
            f.service
                .verify_email(&uid::encode_uid(999), &account.verification_token, later)
                .await
                .unwrap(),
            VerificationOutcome::Invalid
        );

        assert!(!stored(&f.repo, account.id).await.is_email_verified);
        assert_eq!(f.mailer.count().await, 0);
    }

    #[tokio::test]
    async fn test_reissue_invalidates_previous_token() {
        let f = fixture();
        let t0 = Utc::now();
        let account = create_account(&f.repo, "alice@example.com", t0).await;
        let key = uid::encode_uid(account.id);

        let resent = f.service.resend_verification("alice@example.com", t0 + Duration::minutes(10)).await.unwrap();
        assert_eq!(resent, ResendOutcome::Sent);

        let outcome = f
            .service
            .verify_email(&key, &account.verification_token, t0 + Duration::minutes(20))
            .await
            .unwrap();
        assert_eq!(outcome, VerificationOutcome::Invalid);
    }

    #[tokio::test]
    async fn test_verified_account_with_rotated_token_is_invalid() {
        let f = fixture();
        let t0 = Utc::now();
        let account = create_account(&f.repo, "alice@example.com", t0).await;
        let key = uid::encode_uid(account.id);
        let old_token = account.verification_token.clone();

        f.service.resend_verification("alice@example.com", t0).await.unwrap();
        let fresh = stored(&f.repo, account.id).await.verification_token;
        f.service.verify_email(&key, &fresh, t0 + Duration::hours(1)).await.unwrap();

        let outcome = f.service.verify_email(&key, &old_token, t0 + Duration::hours(2)).await.unwrap();
        assert_eq!(outcome, VerificationOutcome::Invalid);
    }

    #[tokio::test]
    async fn test_resend_sends_new_token() {
        let f = fixture();
        let t0 = Utc::now();
        let account = create_account(&f.repo, "alice@example.com", t0).await;

        let outcome = f.service.resend_verification("  alice@EXAMPLE.com ", t0 + Duration::hours(3)).await.unwrap();

        assert_eq!(outcome, ResendOutcome::Sent);
        let after = stored(&f.repo, account.id).await;
        assert_ne!(after.verification_token, account.verification_token);
        assert_eq!(after.verification_token_created_at, t0 + Duration::hours(3));
        assert_eq!(f.mailer.count().await, 1);
        assert_eq!(f.mailer.last().await.unwrap().to, "alice@example.com");
    }

    #[tokio::test]
    async fn test_resend_already_verified_keeps_token() {
        let f = fixture();
        let t0 = Utc::now();
        let account = create_account(&f.repo, "alice@example.com", t0).await;
        f.service
            .verify_email(&uid::encode_uid(account.id), &account.verification_token, t0)
            .await
            .unwrap();

        let outcome = f.service.resend_verification("alice@example.com", t0 + Duration::hours(1)).await.unwrap();

        assert_eq!(outcome, ResendOutcome::AlreadyVerified);
        let after = stored(&f.repo, account.id).await;
        assert_eq!(after.verification_token, account.verification_token);
        assert_eq!(after.verification_token_created_at, t0);
        assert_eq!(f.mailer.count().await, 0);
    }

    #[tokio::test]
    async fn test_resend_unknown_email() {
        let f = fixture();
        let t0 = Utc::now();
        let account = create_account(&f.repo, "alice@example.com", t0).await;

        let outcome = f.service.resend_verification("bob@example.com", t0).await.unwrap();

        assert_eq!(outcome, ResendOutcome::NotFound);
        assert_eq!(f.mailer.count().await, 0);
        assert_eq!(stored(&f.repo, account.id).await, account);
    }

    #[tokio::test]
    async fn test_register_then_login_flow() {
        let f = fixture();
        let t0 = Utc::now();

        let account = f
            .service
            .register(
                RegisterRequest {
                    username: "alice".to_string(),
                    email: "alice@Example.COM".to_string(),
                    password: "correct-horse".to_string(),
                    password_confirm: "correct-horse".to_string(),
                },
                t0,
            )
            .await
            .unwrap();

        assert_eq!(account.email, "alice@example.com");
        assert!(!account.is_email_verified);
        assert!(f.repo.find_profile(account.id).await.unwrap().is_some());
        assert_eq!(f.mailer.count().await, 1);

        let login = LoginRequest {
            username: "alice".to_string(),
            password: "correct-horse".to_string(),
        };

        // Refusé tant que l'email n'est pas vérifié, même avec le bon mot de passe
        assert!(matches!(f.service.login(&login).await, Err(AppError::EmailNotVerified)));

        f.service
            .verify_email(&uid::encode_uid(account.id), &account.verification_token, t0 + Duration::hours(1))
            .await
            .unwrap();

        let (logged_in, token) = f.service.login(&login).await.unwrap();
        assert_eq!(logged_in.id, account.id);
        assert_eq!(jwt::verify_token(&token, "test-secret").unwrap().sub, account.id);

        // Mauvais mot de passe
        let wrong = LoginRequest {
            username: "alice@example.com".to_string(),
            password: "battery-staple".to_string(),
        };
        assert!(matches!(f.service.login(&wrong).await, Err(AppError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_register_conflicts_and_validation() {
        let f = fixture();
        let t0 = Utc::now();
        create_account(&f.repo, "alice@example.com", t0).await;

        let duplicate_email = RegisterRequest {
            username: "alice2".to_string(),
            email: "alice@example.com".to_string(),
            password: "correct-horse".to_string(),
            password_confirm: "correct-horse".to_string(),
        };
        assert!(matches!(f.service.register(duplicate_email, t0).await, Err(AppError::Conflict(_))));

        let mismatch = RegisterRequest {
            username: "bob".to_string(),
            email: "bob@example.com".to_string(),
            password: "correct-horse".to_string(),
            password_confirm: "other".to_string(),
        };
        assert!(matches!(f.service.register(mismatch, t0).await, Err(AppError::Validation(_))));
        assert_eq!(f.mailer.count().await, 0);
    }

    #[tokio::test]
    async fn test_register_username_too_short_after_trim() {
        let f = fixture();
        let t0 = Utc::now();

        for username in ["   ", " ab ", "\tx\n"] {
            let request = RegisterRequest {
                username: username.to_string(),
                email: "bob@example.com".to_string(),
                password: "correct-horse".to_string(),
                password_confirm: "correct-horse".to_string(),
            };
            assert!(
                matches!(f.service.register(request, t0).await, Err(AppError::Validation(_))),
                "username {:?} should be rejected",
                username
            );
        }

        assert_eq!(f.repo.find_by_email("bob@example.com").await.unwrap(), None);
        assert_eq!(f.mailer.count().await, 0);
    }

    #[tokio::test]
    async fn test_register_stores_trimmed_username() {
        let f = fixture();
        let request = RegisterRequest {
            username: "  bob  ".to_string(),
            email: " bob@Example.com ".to_string(),
            password: "correct-horse".to_string(),
            password_confirm: "correct-horse".to_string(),
        };

        let account = f.service.register(request, Utc::now()).await.unwrap();

        assert_eq!(account.username, "bob");
        assert_eq!(account.email, "bob@example.com");
    }

    #[tokio::test]
    async fn test_register_succeeds_when_mail_fails() {
        let f = fixture_with(RecordingMailer::failing());
        let request = RegisterRequest {
            username: "carol".to_string(),
            email: "carol@example.com".to_string(),
            password: "correct-horse".to_string(),
            password_confirm: "correct-horse".to_string(),
        };

        let account = f.service.register(request, Utc::now()).await.unwrap();

        let stored_account = stored(&f.repo, account.id).await;
        assert_eq!(stored_account.email, "carol@example.com");
        assert!(!stored_account.is_email_verified);
        assert!(f.repo.find_profile(account.id).await.unwrap().is_some());
        assert_eq!(f.mailer.count().await, 0);
    }

    #[tokio::test]
    async fn test_login_unknown_user() {
        let f = fixture();
        let login = LoginRequest {
            username: "nobody".to_string(),
            password: "whatever".to_string(),
        };
        assert!(matches!(f.service.login(&login).await, Err(AppError::InvalidCredentials)));
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email(" Alice@Example.COM "), "Alice@example.com");
        assert_eq!(normalize_email("no-at-sign"), "no-at-sign");
    }
}
