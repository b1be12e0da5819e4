//! Random, filesystem-safe names for mocked entries.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use rand::RngCore;

/// Number of random bytes a mock name is derived from.
pub const MOCK_NAME_BYTES: usize = 16;

/// Returns a fresh alphanumeric token.
///
/// The token is the base64 form of [`MOCK_NAME_BYTES`] bytes from a
/// cryptographically secure generator, with `+`, `/` and `=` stripped.
pub fn mock_name() -> String {
    let mut bytes = [0u8; MOCK_NAME_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    BASE64
        .encode(bytes)
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_mock_name_is_alphanumeric() {
        for _ in 0..100 {
            let name = mock_name();
            assert!(!name.is_empty());
            assert!(name.chars().all(|ch| ch.is_ascii_alphanumeric()), "{name}");
            // 24 base64 chars, two of them padding
            assert!(name.len() <= 22);
        }
    }

    #[test]
    fn test_mock_names_do_not_collide() {
        let names: HashSet<_> = (0..1000).map(|_| mock_name()).collect();
        assert_eq!(names.len(), 1000);
    }
}
