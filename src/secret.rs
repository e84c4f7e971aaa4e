use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

/// The key used to sign CSRF tokens.
///
/// Signing is modelled as `Option<SigningSecret>`: an empty secret can't be
/// constructed, and [`SigningSecret::new`] returns `None` for it, which turns
/// signing off. Tokens issued without a secret are never accepted.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SigningSecret(Vec<u8>);

impl SigningSecret {
    pub fn new(secret: impl Into<Vec<u8>>) -> Option<Self> {
        let secret = secret.into();

        if secret.is_empty() {
            tracing::warn!("empty csrf secret, token signing is disabled");

            return None;
        }

        Some(Self(secret))
    }

    pub(crate) fn expose(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SigningSecret(..)")
    }
}
