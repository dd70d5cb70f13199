//! URL slugs derived from titles.

/// Lowercase `title`, keep ASCII alphanumerics, and collapse every other run
/// of characters into a single `-`. Leading and trailing dashes are dropped.
///
/// Returns an empty string when `title` has no ASCII alphanumerics.
pub fn slugify(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    let mut pending_dash = false;

    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    out
}
