//! Filesystem-safe name filtering.

/// Returns true for characters kept by [`sanitize`].
fn is_allowed(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '(' | ')' | '!' | ',' | ';' | '.' | ' ')
}

/// Removes every character outside `A-Z a-z 0-9 - _ ( ) ! , ; .` and space.
///
/// Characters are dropped, not replaced, so distinct inputs may map to the
/// same output. No length limit is applied.
pub fn sanitize(text: &str) -> String {
    text.chars().filter(|&c| is_allowed(c)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_allowed_set() {
        assert_eq!(sanitize("Test Mix (Vol. 2)!"), "Test Mix (Vol. 2)!");
        assert_eq!(sanitize("a-b_c,d;e.mp3"), "a-b_c,d;e.mp3");
    }

    #[test]
    fn removes_path_separators_and_symbols() {
        assert_eq!(sanitize("../etc/passwd"), "..etcpasswd");
        assert_eq!(sanitize("AC/DC: Back in Black?"), "ACDC Back in Black");
        assert_eq!(sanitize("tab\there\nnewline"), "tabherenewline");
    }

    #[test]
    fn removes_non_ascii() {
        assert_eq!(sanitize("Beyoncé – Halo"), "Beyonc  Halo");
        assert_eq!(sanitize("日本語"), "");
    }

    #[test]
    fn distinct_inputs_can_collide() {
        assert_eq!(sanitize("a/b.mp3"), sanitize("a?b.mp3"));
    }

    #[test]
    fn idempotent() {
        for s in ["", "plain", "Mötley Crüe/Dr. Feelgood*.flac", "%20 ~`@#$^&+=[]{}|\\:'\"<>?"] {
            let once = sanitize(s);
            assert_eq!(sanitize(&once), once);
            assert!(once.chars().all(is_allowed));
        }
    }
}
