//! Storage-name sanitization shared by every sandboxed file operation.

use super::types::StorageError;

/// Longest sanitized name accepted by the sandboxed store.
pub const MAX_STORAGE_NAME_LEN: usize = 9;

/// Projects a caller-supplied key onto its ASCII-letter characters.
///
/// The result is the sole identity of a stored file. Digits, punctuation, separators and
/// non-ASCII letters are dropped; letter case is preserved.
///
/// # Errors
///
/// Returns [`StorageError::InvalidName`] when the projection is empty or longer than
/// [`MAX_STORAGE_NAME_LEN`].
pub fn sanitize_storage_name(raw: &str) -> Result<String, StorageError> {
    let safe: String = raw.chars().filter(char::is_ascii_alphabetic).collect();
    if safe.is_empty() || safe.len() > MAX_STORAGE_NAME_LEN {
        return Err(StorageError::InvalidName);
    }
    Ok(safe)
}

#[cfg(test)]
mod tests {
    use super::{sanitize_storage_name, StorageError};

    #[test]
    fn sanitize_storage_name_matches_expected_cases() {
        let cases = [
            ("trips", Ok("trips")),
            ("../etc/passwd", Ok("etcpasswd")),
            ("Trip 2026!", Ok("Trip")),
            ("a.b-c_d", Ok("abcd")),
            ("ñandú", Ok("and")),
            ("abcdefghi", Ok("abcdefghi")),
            ("abcdefghij", Err(StorageError::InvalidName)),
            ("a1b2c3d4e5f6g7h8i9j0", Err(StorageError::InvalidName)),
            ("", Err(StorageError::InvalidName)),
            ("2026/01", Err(StorageError::InvalidName)),
        ];

        for (input, expected) in cases {
            assert_eq!(
                sanitize_storage_name(input),
                expected.map(str::to_string),
                "input={input:?}"
            );
        }
    }
}
