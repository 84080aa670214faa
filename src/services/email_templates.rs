use crate::services::token_service::VERIFICATION_WINDOW_HOURS;

pub const VERIFICATION_SUBJECT: &str = "Verify your email address";

/// Lien de vérification : {site}/verify/{uid}/{token}/
pub fn verification_link(site_url: &str, uid: &str, token: &str) -> String {
    format!("{}/verify/{}/{}/", site_url.trim_end_matches('/'), uid, token)
}

pub fn verification_email_body(username: &str, link: &str) -> String {
    format!(
        "Hi {},\n\
        \n\
        Thanks for signing up! Please confirm your email address by opening the link below:\n\
        \n\
        {}\n\
        \n\
        This link will expire in {} hours. If it has expired, opening it will send you a new one.\n\
        \n\
        If you did not create an account, you can ignore this email.",
        username, link, VERIFICATION_WINDOW_HOURS
    )
}
