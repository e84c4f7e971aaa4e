use std::sync::Arc;

use subtle::ConstantTimeEq;
use tower_cookies::Cookies;

use crate::{error::Error, surf::Protocol};

/// Per request handle on the CSRF token cookie.
///
/// Available as a request extension (and as an `axum` extractor) behind
/// [`Surf`](crate::Surf).
#[derive(Clone)]
pub struct Token {
    pub(crate) protocol: Arc<Protocol>,
    pub(crate) cookies: Cookies,
    /// Session the request belongs to, empty for anonymous requests.
    pub(crate) session_id: Arc<str>,
    /// Token cookie as sent by the client.
    pub(crate) received: Option<Arc<str>>,
}

impl Token {
    pub(crate) fn create(&self) -> Result<(), Error> {
        self.issue(&self.session_id)
    }

    /// Replace the token with one bound to `session_id`.
    ///
    /// Call this whenever the session changes, e.g. right after login.
    pub fn set(&self, session_id: impl AsRef<str>) -> Result<(), Error> {
        self.issue(session_id.as_ref())
    }

    /// The token the response will carry.
    pub fn get(&self) -> Result<String, Error> {
        self.cookies
            .get(&self.protocol.config.cookie_name())
            .map(|cookie| cookie.value().to_owned())
            .ok_or(Error::NoCookie)
    }

    pub fn reset(&self) {
        self.cookies.remove(self.protocol.config.cookie(""));
    }

    /// Checks a token the client echoed back, e.g. in a header.
    ///
    /// The echoed token must equal the cookie the request carried and be signed
    /// for the request's session.
    pub fn verify(&self, submitted: &str) -> Result<bool, Error> {
        let Some(received) = self.received.as_deref() else {
            tracing::debug!("rejecting request without csrf cookie");

            return Ok(false);
        };

        if !bool::from(received.as_bytes().ct_eq(submitted.as_bytes())) {
            tracing::debug!("rejecting request, csrf cookie and submitted token differ");

            return Ok(false);
        }

        self.protocol.validator.validate(submitted, &self.session_id)
    }

    fn issue(&self, session_id: &str) -> Result<(), Error> {
        let token = self.protocol.generator.generate(session_id)?;

        self.cookies.add(self.protocol.config.cookie(token));

        Ok(())
    }
}
