use actix_web::{get, post, web, HttpResponse, ResponseError};
use chrono::Utc;

use crate::middleware::AuthUser;
use crate::models::dto::{
    AuthResponse, LoginRequest, MessageLevel, MessageResponse, RegisterRequest,
    ResendVerificationRequest,
};
use crate::services::account_service::{ResendOutcome, VerificationOutcome};
use crate::state::AppState;

/// POST /register/ - Créer un compte (PUBLIC)
#[post("/register/")]
pub async fn register(
    body: web::Json<RegisterRequest>,
    state: web::Data<AppState>,
) -> HttpResponse {
    match state.accounts.register(body.into_inner(), Utc::now()).await {
        Ok(_) => HttpResponse::Created().json(MessageResponse::new(
            MessageLevel::Success,
            "Registration successful! Please check your email to verify your account.",
        )),
        Err(e) => e.error_response(),
    }
}

/// POST /login/ - Se connecter (PUBLIC)
#[post("/login/")]
pub async fn login(
    body: web::Json<LoginRequest>,
    state: web::Data<AppState>,
) -> HttpResponse {
    match state.accounts.login(&body).await {
        Ok((account, token)) => HttpResponse::Ok().json(AuthResponse {
            token,
            user_id: account.id,
            username: account.username,
        }),
        Err(e) => e.error_response(),
    }
}

/// GET /verify/{uidb64}/{token}/ - Lien envoyé par email (PUBLIC)
#[get("/verify/{uidb64}/{token}/")]
pub async fn verify_email(
    path: web::Path<(String, String)>,
    state: web::Data<AppState>,
) -> HttpResponse {
    let (uidb64, token) = path.into_inner();

    match state.accounts.verify_email(&uidb64, &token, Utc::now()).await {
        Ok(VerificationOutcome::Verified) => HttpResponse::Ok().json(MessageResponse::new(
            MessageLevel::Success,
            "Email verified successfully! You can now log in.",
        )),
        Ok(VerificationOutcome::AlreadyVerified) => HttpResponse::Ok().json(MessageResponse::new(
            MessageLevel::Info,
            "Email already verified.",
        )),
        Ok(VerificationOutcome::Expired) => HttpResponse::Gone().json(MessageResponse::new(
            MessageLevel::Warning,
            "Verification link expired. A new link has been sent to your email.",
        )),
        Ok(VerificationOutcome::Invalid) => HttpResponse::BadRequest().json(MessageResponse::new(
            MessageLevel::Error,
            "Invalid verification link.",
        )),
        Err(e) => e.error_response(),
    }
}

/// POST /resend-verification/ - Renvoyer le lien (PUBLIC)
#[post("/resend-verification/")]
pub async fn resend_verification(
    body: web::Json<ResendVerificationRequest>,
    state: web::Data<AppState>,
) -> HttpResponse {
    match state.accounts.resend_verification(&body.email, Utc::now()).await {
        Ok(ResendOutcome::Sent) => HttpResponse::Ok().json(MessageResponse::new(
            MessageLevel::Success,
            "Verification email resent. Please check your inbox.",
        )),
        Ok(ResendOutcome::AlreadyVerified) => HttpResponse::Ok().json(MessageResponse::new(
            MessageLevel::Info,
            "Email already verified.",
        )),
        Ok(ResendOutcome::NotFound) => HttpResponse::NotFound().json(MessageResponse::new(
            MessageLevel::Error,
            "No account found with that email.",
        )),
        Err(e) => e.error_response(),
    }
}

/// GET /dashboard/ - Résumé du compte (PROTÉGÉE)
#[get("/dashboard/")]
pub async fn dashboard(auth_user: AuthUser, state: web::Data<AppState>) -> HttpResponse {
    match state.accounts.account_summary(auth_user.user_id).await {
        Ok(summary) => HttpResponse::Ok().json(summary),
        Err(e) => e.error_response(),
    }
}

/// GET /profile/ - Gardée pour compatibilité, redirige vers /dashboard/ (PROTÉGÉE)
#[get("/profile/")]
pub async fn profile(_auth_user: AuthUser) -> HttpResponse {
    HttpResponse::Found()
        .insert_header(("Location", "/dashboard/"))
        .finish()
}

pub fn account_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(register)
        .service(login)
        .service(verify_email)
        .service(resend_verification)
        .service(dashboard)
        .service(profile);
}
