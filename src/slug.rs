//! Slugs: the URL-safe identifiers roadmaps are addressed by.

/// Encodes a roadmap title as a slug.
///
/// The title is lowercased and every run of whitespace becomes a single `-`.
/// Punctuation is kept. Slugs are not unique: distinct titles may collide.
pub fn encode(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut in_whitespace = false;

    for c in title.chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                slug.push('-');
                in_whitespace = true;
            }
        } else {
            slug.extend(c.to_lowercase());
            in_whitespace = false;
        }
    }

    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_simple_title() {
        assert_eq!(encode("Machine Learning"), "machine-learning");
    }

    #[test]
    fn test_encode_collapses_whitespace_runs() {
        assert_eq!(encode("Web   Development\t\n101"), "web-development-101");
    }

    #[test]
    fn test_encode_keeps_edge_whitespace_as_hyphen() {
        assert_eq!(encode("  Rust  "), "-rust-");
    }

    #[test]
    fn test_encode_keeps_punctuation() {
        assert_eq!(encode("C++ & Rust: Part 2"), "c++-&-rust:-part-2");
    }

    #[test]
    fn test_encode_empty() {
        assert_eq!(encode(""), "");
    }

    #[test]
    fn test_encode_is_stable_when_reapplied() {
        for title in ["Machine Learning", "  a  B\tc ", "Already-a-slug", "ÜBER Straße"] {
            let once = encode(title);
            assert_eq!(encode(&once), once);
        }
    }

    #[test]
    fn test_encode_has_no_whitespace_or_uppercase() {
        for title in ["Hello World", "MiXeD\u{00a0}Case\u{2003}Title", "ÄÖÜ  ÉÈ"] {
            let slug = encode(title);
            assert!(!slug.chars().any(char::is_whitespace), "{slug:?}");
            assert!(!slug.chars().any(char::is_uppercase), "{slug:?}");
        }
    }

    #[test]
    fn test_encode_colliding_titles() {
        assert_eq!(encode("Machine Learning"), encode("machine   LEARNING"));
    }
}
