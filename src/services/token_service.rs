// ============================================================================
// SERVICE : TOKENS DE VÉRIFICATION EMAIL
// ============================================================================
//
// Description:
//   Émission des tokens de vérification stockés sur le compte.
//
// Règles:
//   - Token = UUID v4 (128 bits aléatoires), comparé en tant que chaîne
//   - Un seul token valide par compte : émettre un token remplace l'ancien
//   - Token expiré si now - verification_token_created_at > 24 heures
//
// ============================================================================

use chrono::{DateTime, Duration, Utc};
use log::debug;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::users;
use crate::repository::AccountRepository;
use crate::utils::logging::format_sensitive;

pub const VERIFICATION_WINDOW_HOURS: i64 = 24;

pub fn verification_window() -> Duration {
    Duration::hours(VERIFICATION_WINDOW_HOURS)
}

/// Nouveau token aléatoire
pub fn new_token() -> String {
    Uuid::new_v4().to_string()
}

/// Vrai si le token émis à `issued_at` a dépassé la fenêtre de validité.
/// Exactement 24h est encore valide.
pub fn is_expired(issued_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    now - issued_at > verification_window()
}

/// Remplace le token du compte et persiste le changement (une seule écriture)
pub async fn issue_token(
    accounts: &dyn AccountRepository,
    account: &mut users::Model,
    now: DateTime<Utc>,
) -> AppResult<()> {
    account.verification_token = new_token();
    account.verification_token_created_at = now;
    *account = accounts.save(account).await?;

    debug!(
        "Issued verification token {} for user {}",
        format_sensitive(&account.verification_token),
        account.id
    );
    Ok(())
}
