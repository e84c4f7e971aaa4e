use std::num::NonZeroUsize;

use base64::prelude::*;
use rand::{thread_rng, CryptoRng, RngCore};

use crate::{
    canonical::message_payload, signature::hmac_sha256, Error, SessionIdentifierProvider,
    SigningSecret, TOKEN_SEPARATOR,
};

/// Size of the random value when nothing else is configured, in bytes.
pub const DEFAULT_RANDOM_VALUE_SIZE: NonZeroUsize = match NonZeroUsize::new(16) {
    Some(size) => size,
    None => unreachable!(),
};

/// Issues `<hmac>.<random value>` tokens bound to a session id.
///
/// Only the random value travels with the token. The session id is signed but
/// left out, since the server already knows it from the request.
#[derive(Clone, Debug)]
pub struct TokenGenerator {
    secret: Option<SigningSecret>,
    random_value_size: NonZeroUsize,
}

impl TokenGenerator {
    pub fn new(secret: Option<SigningSecret>, random_value_size: NonZeroUsize) -> Self {
        Self {
            secret,
            random_value_size,
        }
    }

    /// Issues a token for `session_id`, drawing the random value from the
    /// thread local CSPRNG.
    pub fn generate(&self, session_id: &str) -> Result<String, Error> {
        self.generate_with_rng(&mut thread_rng(), session_id)
    }

    pub fn generate_with_rng<R>(&self, rng: &mut R, session_id: &str) -> Result<String, Error>
    where
        R: RngCore + CryptoRng,
    {
        let mut random = vec![0u8; self.random_value_size.get()];
        rng.fill_bytes(&mut random);
        let random = BASE64_URL_SAFE_NO_PAD.encode(random);

        let hmac = self.hmac(session_id, &random)?;

        Ok(format!("{hmac}{TOKEN_SEPARATOR}{random}"))
    }

    /// Issues a token for the session `provider` finds on `request`.
    pub fn generate_for<R, P>(&self, request: &R, provider: &P) -> Result<String, Error>
    where
        P: SessionIdentifierProvider<R> + ?Sized,
    {
        let session_id = P::find_session_id(provider, request).unwrap_or_default();

        self.generate(&session_id)
    }

    /// Signature of the `(session_id, random_value)` pair, empty without a secret.
    pub fn hmac(&self, session_id: &str, random_value: &str) -> Result<String, Error> {
        match &self.secret {
            Some(secret) => hmac_sha256(&message_payload(session_id, random_value), secret),
            None => Ok(String::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;

    fn generator(secret: &str) -> TokenGenerator {
        TokenGenerator::new(SigningSecret::new(secret), DEFAULT_RANDOM_VALUE_SIZE)
    }

    #[test]
    fn token_shape() {
        let token = generator("s3cr3t").generate("u-42").unwrap();
        let (hmac, random) = token.split_once('.').expect("separator");

        assert_eq!(hmac.len(), 43);
        // 16 bytes -> 22 chars
        assert_eq!(random.len(), 22);
        assert!(!random.contains('.'));
        assert!(!token.contains("u-42"));
    }

    #[test]
    fn random_value_is_fresh() {
        let generator = generator("s3cr3t");

        assert_ne!(
            generator.generate("u-42").unwrap(),
            generator.generate("u-42").unwrap()
        );
    }

    #[test]
    fn same_rng_same_token() {
        let generator = generator("s3cr3t");
        let a = generator
            .generate_with_rng(&mut StdRng::seed_from_u64(7), "u-42")
            .unwrap();
        let b = generator
            .generate_with_rng(&mut StdRng::seed_from_u64(7), "u-42")
            .unwrap();

        assert_eq!(a, b);
    }

    #[test]
    fn respects_random_value_size() {
        let generator = TokenGenerator::new(
            SigningSecret::new("s3cr3t"),
            NonZeroUsize::new(32).unwrap(),
        );
        let token = generator.generate("u-42").unwrap();
        let (_, random) = token.split_once('.').unwrap();

        assert_eq!(random.len(), 43);
    }

    #[test]
    fn unsigned_without_secret() {
        let token = generator("").generate("u-42").unwrap();

        assert!(token.starts_with('.'));
        assert_eq!(token.matches('.').count(), 1);
    }

    #[test]
    fn missing_session_is_empty_session() {
        let generator = generator("s3cr3t");
        let token = generator
            .generate_for(&(), &|_: &()| None::<String>)
            .unwrap();
        let (hmac, random) = token.split_once('.').unwrap();

        assert_eq!(hmac, generator.hmac("", random).unwrap());
    }
}
