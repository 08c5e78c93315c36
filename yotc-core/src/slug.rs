//! URL slugs for clubs.

/// Generates a slug from a club name by taking the first letter of each word.
///
/// Words are separated by runs of whitespace and hyphens. The result is
/// lowercase; a blank name yields an empty slug.
///
/// ```
/// use yotc_core::slug::generate_slug_from_name;
/// assert_eq!(generate_slug_from_name("Denver Radio Club"), "drc");
/// assert_eq!(generate_slug_from_name("Rocky Mountain Radio League"), "rmrl");
/// ```
#[must_use]
pub fn generate_slug_from_name(club_name: &str) -> String {
    club_name
        .split(|c: char| c.is_whitespace() || c == '-')
        .filter_map(|word| word.chars().next())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Returns `true` if `slug` only contains lowercase ASCII letters, digits
/// and hyphens.
#[must_use]
pub fn is_slug_charset(slug: &str) -> bool {
    slug.chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}
