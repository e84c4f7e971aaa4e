//! Canonical HMAC message for a `(session id, random value)` pair.

use base64::prelude::*;

/// Separates the fields of the HMAC message. Never part of the base64 alphabets.
const FIELD_SEPARATOR: char = '!';

/// Builds the message that gets signed for a session id and a random value.
///
/// Each field is prefixed with its length, so no choice of session id or random
/// value can be read back as a different pair:
///
/// ```text
/// len(b64(session_id)) ! b64(session_id) ! len(random_value) ! random_value
/// ```
///
/// The session id is encoded with the standard, padded base64 alphabet before
/// its length is taken. The message is only ever fed to the HMAC and never
/// leaves the server.
pub fn message_payload(session_id: &str, random_value: &str) -> String {
    let session_id = BASE64_STANDARD.encode(session_id.as_bytes());

    format!(
        "{}{FIELD_SEPARATOR}{}{FIELD_SEPARATOR}{}{FIELD_SEPARATOR}{}",
        session_id.len(),
        session_id,
        random_value.len(),
        random_value,
    )
}

#[cfg(test)]
mod tests {
    use super::message_payload;

    #[test]
    fn prefixes_lengths() {
        // "u-42" -> "dS00Mg=="
        assert_eq!(message_payload("u-42", "abc"), "8!dS00Mg==!3!abc");
    }

    #[test]
    fn empty_session() {
        assert_eq!(message_payload("", "abc"), "0!!3!abc");
    }

    #[test]
    fn is_deterministic() {
        assert_eq!(message_payload("u-42", "abc"), message_payload("u-42", "abc"));
        assert_ne!(message_payload("u-42", "abc"), message_payload("u-43", "abc"));
    }

    #[test]
    fn separator_in_fields_does_not_collide() {
        // Both pairs concatenate to "A!B!C" without length prefixes.
        let left = message_payload("A!B", "C");
        let right = message_payload("A", "B!C");

        assert_ne!(left, right);
    }
}
