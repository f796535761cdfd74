//! URL-safe slugs derived from display names.

/// Builds a slug: lowercase, spaces become `-`, and every character outside
/// `[a-z0-9-]` is dropped.
///
/// Pure and idempotent: `create_slug(&create_slug(s)) == create_slug(s)`.
pub fn create_slug(input: &str) -> String {
    input
        .to_lowercase()
        .chars()
        .map(|c| if c == ' ' { '-' } else { c })
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-')
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_slug() {
        assert_eq!(create_slug("Maison Francis Kurkdjian"), "maison-francis-kurkdjian");
        assert_eq!(create_slug("Noir Eau De Parfum"), "noir-eau-de-parfum");
    }

    #[test]
    fn test_strips_punctuation_and_non_ascii() {
        assert_eq!(create_slug("L'Artisan Parfumeur"), "lartisan-parfumeur");
        assert_eq!(create_slug("Hermès"), "herms");
        assert_eq!(create_slug("No. 5"), "no-5");
    }

    #[test]
    fn test_empty_and_symbol_only() {
        assert_eq!(create_slug(""), "");
        assert_eq!(create_slug("!!!"), "");
    }

    #[test]
    fn test_idempotent_and_charset() {
        for input in ["Chanel N°5", "  Tom   Ford  ", "Ébène Fumé", "a-B-c 1 2 3", "ß İ"] {
            let once = create_slug(input);
            assert_eq!(create_slug(&once), once);
            assert!(once
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
        }
    }
}
