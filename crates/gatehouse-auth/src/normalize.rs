//! Normalization of registration and sign-in input.

/// Derive a tenant slug from an organization name.
///
/// Lowercases, keeps every alphanumeric character in any script, collapses
/// each run of other characters into one `-` and trims separators from
/// both ends. The whole name is kept, so names differ in slug exactly when
/// they differ outside case and punctuation. Returns `None` when nothing
/// usable remains.
pub fn slugify(input: &str) -> Option<String> {
    let mut slug = String::new();
    let mut prev_dash = false;
    for ch in input.trim().to_lowercase().chars() {
        if ch.is_alphanumeric() {
            slug.push(ch);
            prev_dash = false;
        } else if !prev_dash {
            slug.push('-');
            prev_dash = true;
        }
    }
    let normalized = slug.trim_matches('-');
    if normalized.is_empty() {
        return None;
    }
    Some(normalized.to_string())
}

/// Emails are matched case-insensitively and without surrounding space.
pub fn normalize_email(input: &str) -> String {
    input.trim().to_lowercase()
}
