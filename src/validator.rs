use subtle::ConstantTimeEq;

use crate::{
    canonical::message_payload, signature::hmac_sha256, Error, SessionIdentifierProvider,
    SigningSecret, TOKEN_SEPARATOR,
};

/// Outcome of checking a token against a session.
///
/// Only [`Verdict::Accepted`] lets a request through. The other variants exist
/// for diagnostics and must not be echoed to clients.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    Accepted,
    /// Not exactly one separator, or an empty random value.
    Malformed,
    /// The signature doesn't match the session and random value.
    Mismatched,
    /// No secret is configured. Unsigned tokens are always rejected.
    SigningDisabled,
}

impl Verdict {
    pub fn is_accepted(self) -> bool {
        self == Verdict::Accepted
    }
}

/// Checks tokens issued by [`TokenGenerator`](crate::TokenGenerator).
#[derive(Clone, Debug)]
pub struct TokenValidator {
    secret: Option<SigningSecret>,
}

impl TokenValidator {
    pub fn new(secret: Option<SigningSecret>) -> Self {
        Self { secret }
    }

    /// `Ok(true)` only when `token` was signed for `session_id` with our secret.
    ///
    /// Malformed and forged tokens are `Ok(false)`. An `Err` means the validator
    /// itself is misconfigured.
    pub fn validate(&self, token: &str, session_id: &str) -> Result<bool, Error> {
        self.verify(token, session_id).map(Verdict::is_accepted)
    }

    /// Validates `token` against the session `provider` finds on `request`.
    pub fn validate_for<R, P>(&self, token: &str, request: &R, provider: &P) -> Result<bool, Error>
    where
        P: SessionIdentifierProvider<R> + ?Sized,
    {
        let session_id = P::find_session_id(provider, request).unwrap_or_default();

        self.validate(token, &session_id)
    }

    pub fn verify(&self, token: &str, session_id: &str) -> Result<Verdict, Error> {
        let Some((claimed_hmac, random_value)) = split(token) else {
            tracing::debug!("rejecting malformed csrf token");

            return Ok(Verdict::Malformed);
        };

        let Some(secret) = &self.secret else {
            tracing::debug!("rejecting csrf token, no signing secret configured");

            return Ok(Verdict::SigningDisabled);
        };

        let expected_hmac = hmac_sha256(&message_payload(session_id, random_value), secret)?;

        if bool::from(expected_hmac.as_bytes().ct_eq(claimed_hmac.as_bytes())) {
            Ok(Verdict::Accepted)
        } else {
            tracing::debug!("rejecting csrf token, signature mismatch");

            Ok(Verdict::Mismatched)
        }
    }
}

/// Splits a token into `(hmac, random value)`.
fn split(token: &str) -> Option<(&str, &str)> {
    let (hmac, random_value) = token.split_once(TOKEN_SEPARATOR)?;

    if random_value.is_empty() || random_value.contains(TOKEN_SEPARATOR) {
        return None;
    }

    Some((hmac, random_value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{generator::DEFAULT_RANDOM_VALUE_SIZE, TokenGenerator};

    fn pair(secret: &str) -> (TokenGenerator, TokenValidator) {
        let secret = SigningSecret::new(secret);

        (
            TokenGenerator::new(secret.clone(), DEFAULT_RANDOM_VALUE_SIZE),
            TokenValidator::new(secret),
        )
    }

    #[test]
    fn split_requires_exactly_one_separator() {
        assert_eq!(split("abc.def"), Some(("abc", "def")));
        assert_eq!(split(".def"), Some(("", "def")));
        assert_eq!(split("abcdef"), None);
        assert_eq!(split("abc."), None);
        assert_eq!(split("a.b.c"), None);
        assert_eq!(split(""), None);
        assert_eq!(split("."), None);
    }

    #[test]
    fn concrete_scenario() {
        let (generator, validator) = pair("s3cr3t");
        let token = generator.generate("u-42").unwrap();

        assert!(validator.validate(&token, "u-42").unwrap());
        assert!(!validator.validate(&token, "u-43").unwrap());
        assert!(!validator
            .validate(&token[..token.len() - 1], "u-42")
            .unwrap());
    }

    #[test]
    fn verdicts() {
        let (generator, validator) = pair("s3cr3t");
        let token = generator.generate("u-42").unwrap();

        assert_eq!(validator.verify(&token, "u-42").unwrap(), Verdict::Accepted);
        assert_eq!(
            validator.verify(&token, "u-43").unwrap(),
            Verdict::Mismatched
        );
        assert_eq!(
            validator.verify(&token.replace('.', ""), "u-42").unwrap(),
            Verdict::Malformed
        );
        assert_eq!(
            validator.verify(&format!("{token}.x"), "u-42").unwrap(),
            Verdict::Malformed
        );
    }

    #[test]
    fn tampered_hmac_is_rejected() {
        let (generator, validator) = pair("s3cr3t");
        let token = generator.generate("u-42").unwrap();
        let (hmac, random) = token.split_once('.').unwrap();

        for index in 0..hmac.len() {
            let mut tampered = hmac.as_bytes().to_vec();
            tampered[index] = if tampered[index] == b'A' { b'B' } else { b'A' };
            let tampered = format!("{}.{random}", String::from_utf8(tampered).unwrap());

            assert!(!validator.validate(&tampered, "u-42").unwrap(), "{index}");
        }
    }

    #[test]
    fn unsigned_random_value_is_rejected() {
        let (_, validator) = pair("s3cr3t");

        assert!(!validator.validate(".abcdefg", "u-42").unwrap());
        assert!(!validator.validate("abcdefg", "u-42").unwrap());
    }

    #[test]
    fn hmac_without_session_is_rejected() {
        // Signature over the bare random value, not the session bound message.
        let (_, validator) = pair("s3cr3t");
        let secret = SigningSecret::new("s3cr3t").unwrap();
        let hmac = hmac_sha256("abcdefg", &secret).unwrap();

        assert!(!validator
            .validate(&format!("{hmac}.abcdefg"), "123456789")
            .unwrap());
    }

    #[test]
    fn other_secret_is_rejected() {
        let (generator, _) = pair("s3cr3t");
        let (_, validator) = pair("evil");
        let token = generator.generate("u-42").unwrap();

        assert!(!validator.validate(&token, "u-42").unwrap());
    }

    #[test]
    fn separator_splicing_changes_the_signature() {
        let (generator, validator) = pair("s3cr3t");

        assert_ne!(
            generator.hmac("A!B", "C").unwrap(),
            generator.hmac("A", "B!C").unwrap()
        );

        let hmac = generator.hmac("A!B", "C").unwrap();
        assert!(validator.validate(&format!("{hmac}.C"), "A!B").unwrap());
        assert!(!validator.validate(&format!("{hmac}.B!C"), "A").unwrap());
    }

    #[test]
    fn fails_closed_without_secret() {
        let (generator, validator) = pair("");
        let token = generator.generate("u-42").unwrap();

        assert!(token.starts_with('.'));
        assert_eq!(
            validator.verify(&token, "u-42").unwrap(),
            Verdict::SigningDisabled
        );
        assert!(!validator.validate(&token, "u-42").unwrap());
    }

    #[test]
    fn anonymous_session() {
        let (generator, validator) = pair("s3cr3t");
        let anonymous = |_: &()| None::<String>;
        let token = generator.generate_for(&(), &anonymous).unwrap();

        assert!(validator.validate_for(&token, &(), &anonymous).unwrap());
        assert!(validator.validate(&token, "").unwrap());
        assert!(!validator.validate(&token, "u-42").unwrap());
    }
}
