pub mod account_service;
pub mod email_templates;
pub mod mailer;
pub mod token_service;
