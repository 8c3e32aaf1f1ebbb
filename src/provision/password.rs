use rand::Rng;
use rand::rngs::OsRng;

/// Symbols a generated credential may contain: ASCII letters, digits, and
/// ten shifted-digit punctuation marks. 72 symbols total.
const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789!@#$%^&*()";

pub const DEFAULT_PASSWORD_LENGTH: usize = 10;

/// Generates credentials for live logins, always from the operating
/// system's entropy source. Deliberately not seedable.
pub struct PasswordGenerator {
    length: usize,
}

impl PasswordGenerator {
    #[must_use]
    pub fn new(length: usize) -> Self {
        Self { length }
    }

    #[must_use]
    pub fn generate(&self) -> String {
        let mut rng = OsRng;
        (0..self.length)
            .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
            .collect()
    }
}

impl Default for PasswordGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_PASSWORD_LENGTH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alphabet_has_no_duplicates() {
        let mut seen = std::collections::HashSet::new();
        for &b in ALPHABET {
            assert!(seen.insert(b), "duplicate symbol {}", b as char);
        }
        assert_eq!(ALPHABET.len(), 72);
    }

    #[test]
    fn test_generated_length() {
        assert_eq!(PasswordGenerator::default().generate().len(), 10);
        assert_eq!(PasswordGenerator::new(32).generate().len(), 32);
    }

    #[test]
    fn test_generated_symbols_stay_in_alphabet() {
        let password = PasswordGenerator::new(256).generate();
        for c in password.bytes() {
            assert!(ALPHABET.contains(&c), "unexpected symbol {}", c as char);
        }
    }

    #[test]
    fn test_consecutive_passwords_differ() {
        let generator = PasswordGenerator::default();
        assert_ne!(generator.generate(), generator.generate());
    }
}
