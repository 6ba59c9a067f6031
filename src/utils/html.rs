use ammonia;

use crate::error::AppError;

/// Clean HTML content using the ammonia library.
///
/// Whitelist-based: safe tags (like <b>, <p>) survive, while <script>, <iframe>
/// and event-handler attributes are stripped.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input)
}

/// Trims and sanitizes user text, rejecting input that ends up empty or longer
/// than `max_chars`.
///
/// The length is measured after sanitizing, since escaping (`&` to `&amp;`) grows
/// the text. `field` names the input in the error message.
pub fn clean_text(input: &str, field: &str, max_chars: usize) -> Result<String, AppError> {
    let cleaned = clean_html(input.trim());
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return Err(AppError::BadRequest(format!("{} must not be empty", field)));
    }
    if cleaned.chars().count() > max_chars {
        return Err(AppError::BadRequest(format!(
            "{} must be at most {} characters after sanitizing",
            field, max_chars
        )));
    }
    Ok(cleaned.to_string())
}
