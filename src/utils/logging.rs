use env_logger::{Builder, Env, WriteStyle};
use log::info;

/// Initialise les logs sur stderr. Niveau "info" par défaut, RUST_LOG
/// permet de le surcharger (ex: RUST_LOG=accounts_backend=debug)
pub fn initialize_logging() {
    Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .format_module_path(true)
        .write_style(WriteStyle::Auto)
        .init();

    info!("Logging system initialized");
}

/// Masque une donnée sensible (token, email) avant de la logger
pub fn format_sensitive(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..2].iter().collect();
    let tail: String = chars[chars.len() - 2..].iter().collect();
    format!("{}***{}", head, tail)
}
