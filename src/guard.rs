use futures_util::future::BoxFuture;
use http::{Method, Request, Response};
use std::task::{Context, Poll};
use tower_service::Service;

use crate::{Error, Token};

/// Rejects state changing requests that don't echo a valid token.
#[derive(Clone)]
pub struct GuardService<S> {
    inner: S,
}

impl<S> GuardService<S> {
    pub(crate) fn new(inner: S) -> Self {
        Self { inner }
    }
}

fn is_guarded(method: &Method) -> bool {
    [Method::POST, Method::PUT, Method::PATCH, Method::DELETE].contains(method)
}

impl<S, Q, R> Service<Request<Q>> for GuardService<S>
where
    S: Service<Request<Q>, Response = Response<R>> + Send + 'static,
    S::Future: Send + 'static,
    Q: Send + 'static,
    R: Default + Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<Q>) -> Self::Future {
        if !is_guarded(request.method()) {
            return Box::pin(self.inner.call(request));
        }

        let token = match request
            .extensions()
            .get::<Token>()
            .ok_or(Error::ExtensionNotFound("Token".into()))
        {
            Ok(token) => token,
            Err(err) => return Box::pin(async move { Error::make_layer_error(err) }),
        };

        if token.protocol.config.is_exempt(request.uri().path()) {
            return Box::pin(self.inner.call(request));
        }

        let Some(submitted) = request
            .headers()
            .get(&token.protocol.config.header_name)
            .and_then(|h| h.to_str().ok())
        else {
            tracing::debug!("rejecting request without csrf header");

            return Box::pin(async move { Error::make_layer_forbidden() });
        };

        match token.verify(submitted) {
            Ok(true) => Box::pin(self.inner.call(request)),
            Ok(false) => Box::pin(async move { Error::make_layer_forbidden() }),
            Err(err) => Box::pin(async move { Error::make_layer_error(err) }),
        }
    }
}
