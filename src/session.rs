use http::Request;

/// Resolves the session a request belongs to.
///
/// A missing session is treated as the empty session id, so anonymous requests
/// still get tokens, bound to the empty session.
pub trait SessionIdentifierProvider<R> {
    fn find_session_id(&self, request: &R) -> Option<String>;
}

impl<R, F> SessionIdentifierProvider<R> for F
where
    F: Fn(&R) -> Option<String>,
{
    fn find_session_id(&self, request: &R) -> Option<String> {
        self(request)
    }
}

/// Session id of the current request, inserted into the request extensions by
/// whatever authenticates the request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Reads the [`SessionId`] extension. The default provider of [`Surf`](crate::Surf).
#[derive(Clone, Copy, Debug, Default)]
pub struct ExtensionSessionId;

impl<B> SessionIdentifierProvider<Request<B>> for ExtensionSessionId {
    fn find_session_id(&self, request: &Request<B>) -> Option<String> {
        request
            .extensions()
            .get::<SessionId>()
            .map(|id| id.as_str().to_owned())
    }
}
