use http::StatusCode;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The secret can't key HMAC-SHA-256. Maps [`hmac::digest::InvalidLength`].
    #[error("invalid secret key for signing the csrf token")]
    InvalidKey(#[from] hmac::digest::InvalidLength),
    /// An expected extension was missing.
    #[error("couldn't extract `{0}`. is the `Surf` layer applied?")]
    ExtensionNotFound(String),
    /// The token cookie couldn't be found by the name given.
    #[error("no csrf token cookie")]
    NoCookie,
}

impl Error {
    pub(crate) fn make_layer_error<T: Default, E>(
        err: impl std::error::Error,
    ) -> Result<http::Response<T>, E> {
        tracing::error!(err = %err, "csrf layer failed");

        let mut response = http::Response::default();
        *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;

        Ok(response)
    }

    pub(crate) fn make_layer_forbidden<T: Default, E>() -> Result<http::Response<T>, E> {
        let mut response = http::Response::default();
        *response.status_mut() = StatusCode::FORBIDDEN;

        Ok(response)
    }
}
