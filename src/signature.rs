use base64::prelude::*;
use hmac::Mac;

use crate::{Error, HmacSha256, SigningSecret};

/// HMAC-SHA-256 of `message`, encoded as URL-safe base64 without padding.
pub fn hmac_sha256(message: &str, secret: &SigningSecret) -> Result<String, Error> {
    let mut mac = HmacSha256::new_from_slice(secret.expose())?;
    mac.update(message.as_bytes());

    Ok(BASE64_URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes()))
}
