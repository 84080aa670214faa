// ============================================================================
// MODELS - MODULE PRINCIPAL
// ============================================================================
//
// Description:
//   Point d'entrée pour tous les modèles de données.
//   Chaque table PostgreSQL a son entité SeaORM.
//
// Liste des modules:
//   - health : Health check API
//   - users : Comptes (email, mot de passe, token de vérification email)
//   - user_profiles : Profil lié 1-1 au compte
//   - dto : Data Transfer Objects (requêtes et réponses API)
//
// ============================================================================

pub mod health;
pub mod users;
pub mod user_profiles;
pub mod dto;
