// ============================================================================
// MODÈLE : USERS
// ============================================================================
//
// Description:
//   Compte utilisateur. Le token de vérification email est stocké directement
//   sur le compte : un seul token valide à la fois.
//
// Colonnes de la table users:
//   - id (INTEGER, PRIMARY KEY, SERIAL)
//   - username (VARCHAR, UNIQUE, NOT NULL)
//   - email (VARCHAR, UNIQUE, NOT NULL)
//   - password_hash (VARCHAR, NOT NULL) - pbkdf2:sha256:iterations$salt$hash
//   - is_active (BOOLEAN, DEFAULT TRUE)
//   - is_email_verified (BOOLEAN, DEFAULT FALSE)
//   - verification_token (VARCHAR, NOT NULL) - UUID v4
//   - verification_token_created_at (TIMESTAMPTZ, NOT NULL)
//   - date_joined (TIMESTAMPTZ, NOT NULL)
//
// Points d'attention:
//   - Régénérer le token invalide immédiatement l'ancien
//   - Token expire 24 heures après verification_token_created_at
//   - is_email_verified passe à true une seule fois
//
// ============================================================================

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub username: String,

    #[sea_orm(unique)]
    pub email: String,

    #[serde(skip_serializing)]
    pub password_hash: String,

    pub is_active: bool,

    pub is_email_verified: bool,

    #[serde(skip_serializing)]
    pub verification_token: String,

    pub verification_token_created_at: DateTimeUtc,

    pub date_joined: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "super::user_profiles::Entity")]
    Profile,
}

impl Related<super::user_profiles::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Profile.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
