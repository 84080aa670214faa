use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};

/// Encode l'id du compte pour le lien de vérification : base64 URL-safe
/// sans padding de la représentation décimale ("42" -> "NDI")
pub fn encode_uid(id: i32) -> String {
    URL_SAFE_NO_PAD.encode(id.to_string())
}

/// Décode la clé du lien. None si le base64, l'UTF-8 ou l'entier est invalide.
/// Le padding '=' éventuel est toléré.
pub fn decode_uid(encoded: &str) -> Option<i32> {
    let bytes = URL_SAFE_NO_PAD.decode(encoded.trim_end_matches('=')).ok()?;
    let text = String::from_utf8(bytes).ok()?;
    text.parse::<i32>().ok()
}
