//! Text helpers shared by matching and validation code.

/// Trim and lowercase, the comparison form used for labels and keywords.
pub fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Number of user-visible characters, not bytes.
pub fn char_len(value: &str) -> usize {
    value.chars().count()
}
