//! World invitation codes.
//!
//! Codes are meant to be read aloud at the table, so each half alternates
//! consonants and vowels (`BOKA-TEMI`).

use rand::Rng;

/// Consonants used in codes (no Q or Y).
const CONSONANTS: &[u8] = b"BCDFGHJKLMNPRSTVWXZ";
const VOWELS: &[u8] = b"AEIOU";

/// How many times to retry when a generated code collides.
pub const MAX_CODE_ATTEMPTS: usize = 10;

/// Default number of days before an invitation expires, when not given.
pub const DEFAULT_EXPIRY_DAYS: i64 = 30;

fn half(rng: &mut impl Rng) -> String {
    (0..4)
        .map(|i| {
            let pool = if i % 2 == 0 { CONSONANTS } else { VOWELS };
            char::from(pool[rng.random_range(0..pool.len())])
        })
        .collect()
}

/// Generate a fresh `XXXX-XXXX` code.
pub fn generate_code() -> String {
    let mut rng = rand::rng();
    format!("{}-{}", half(&mut rng), half(&mut rng))
}

/// Canonical form of user input: no spaces, uppercase, hyphen in the middle.
pub fn normalize_code(input: &str) -> String {
    let compact: String = input
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase();
    if compact.len() == 8 && compact.is_ascii() && !compact.contains('-') {
        return format!("{}-{}", &compact[..4], &compact[4..]);
    }
    compact
}

/// `true` when `input` normalizes to four letters, a hyphen, four letters.
pub fn is_valid_code_format(input: &str) -> bool {
    let code = normalize_code(input);
    let bytes = code.as_bytes();
    bytes.len() == 9
        && bytes[4] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 4 || b.is_ascii_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_codes_have_expected_shape() {
        for _ in 0..50 {
            let code = generate_code();
            assert_eq!(code.len(), 9);
            assert!(is_valid_code_format(&code), "bad code {code}");
            assert!(!code.contains('Q') && !code.contains('Y'));
        }
    }

    #[test]
    fn generated_codes_vary() {
        let codes: std::collections::HashSet<String> = (0..20).map(|_| generate_code()).collect();
        assert!(codes.len() > 1);
    }

    #[test]
    fn normalize_handles_case_spaces_and_missing_hyphen() {
        assert_eq!(normalize_code("  abcd-efgh "), "ABCD-EFGH");
        assert_eq!(normalize_code("AB CD-EF GH"), "ABCD-EFGH");
        assert_eq!(normalize_code("mintruby"), "MINT-RUBY");
        assert_eq!(normalize_code("   "), "");
    }

    #[test]
    fn format_checks() {
        assert!(is_valid_code_format("frog-axle"));
        assert!(is_valid_code_format("ABCDEFGH"));
        assert!(!is_valid_code_format(""));
        assert!(!is_valid_code_format("ABC-DEFG"));
        assert!(!is_valid_code_format("ABCDE-FGH"));
        assert!(!is_valid_code_format("ABC1-EFGH"));
    }
}
