//! Slug derivation for organization names
//!
//! A slug is derived exactly once when an organization is registered and is
//! never recomputed afterwards, even if the name is edited.

/// Derive a URL-safe slug from an organization name.
///
/// Lower-cases the name, collapses every run of non-alphanumeric characters
/// into a single hyphen, and trims leading/trailing hyphens.
///
/// # Examples
///
/// ```
/// use skf_common::slug::slugify;
///
/// assert_eq!(slugify("Acme Corp"), "acme-corp");
/// assert_eq!(slugify("Hustle Culture, LLC"), "hustle-culture-llc");
/// ```
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_was_hyphen = false;

    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_was_hyphen = false;
        } else if !last_was_hyphen {
            slug.push('-');
            last_was_hyphen = true;
        }
    }

    slug.trim_matches('-').to_string()
}
