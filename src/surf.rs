use futures_util::future::BoxFuture;
use http::{Request, Response};
use std::{
    fmt,
    num::NonZeroUsize,
    sync::Arc,
    task::{Context, Poll},
};
use tower_cookies::{
    cookie::{Expiration, SameSite},
    Cookie, CookieManager, Cookies,
};
use tower_layer::Layer;
use tower_service::Service;

use crate::{
    generator::DEFAULT_RANDOM_VALUE_SIZE, guard::GuardService, Error, ExtensionSessionId,
    SessionIdentifierProvider, SigningSecret, Token, TokenGenerator, TokenValidator,
};

#[derive(Clone, Debug)]
pub(crate) struct Config {
    pub(crate) secret: Option<SigningSecret>,
    pub(crate) random_value_size: NonZeroUsize,
    pub(crate) cookie_name: String,
    pub(crate) expires: Expiration,
    pub(crate) header_name: String,
    pub(crate) http_only: bool,
    pub(crate) prefix: bool,
    pub(crate) same_site: SameSite,
    pub(crate) secure: bool,
    pub(crate) exempt: Option<Exempt>,
}

impl Config {
    /// Browsers drop `__Host-` cookies that aren't `Secure`, so the prefix
    /// only applies to secure cookies.
    pub(crate) fn cookie_name(&self) -> String {
        if self.prefix && self.secure {
            format!("__Host-{}", self.cookie_name)
        } else {
            self.cookie_name.clone()
        }
    }

    /// The token cookie. Removal cookies need the same attributes, or
    /// browsers ignore them.
    pub(crate) fn cookie(&self, value: impl Into<String>) -> Cookie<'static> {
        Cookie::build((self.cookie_name(), value.into()))
            .path("/")
            .expires(self.expires)
            .http_only(self.http_only)
            .same_site(self.same_site)
            .secure(self.secure)
            .build()
    }

    pub(crate) fn is_exempt(&self, path: &str) -> bool {
        self.exempt.as_ref().is_some_and(|exempt| (exempt.0)(path))
    }
}

/// Paths the guard lets through without a token.
#[derive(Clone)]
pub(crate) struct Exempt(Arc<dyn Fn(&str) -> bool + Send + Sync>);

impl fmt::Debug for Exempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Exempt(..)")
    }
}

/// Everything a request needs to issue and check tokens, built once per layer.
#[derive(Debug)]
pub(crate) struct Protocol {
    pub(crate) config: Config,
    pub(crate) generator: TokenGenerator,
    pub(crate) validator: TokenValidator,
}

impl Protocol {
    fn new(config: Config) -> Self {
        Self {
            generator: TokenGenerator::new(config.secret.clone(), config.random_value_size),
            validator: TokenValidator::new(config.secret.clone()),
            config,
        }
    }
}

/// Double submit cookie CSRF protection.
///
/// Issues a token cookie bound to the current session and rejects `POST`,
/// `PUT`, `PATCH` and `DELETE` requests whose header doesn't echo a valid one,
/// unless their path is [`exempt`](Surf::exempt).
/// The session comes from `P`, by default the [`SessionId`](crate::SessionId)
/// request extension.
pub struct Surf<P = ExtensionSessionId> {
    pub(crate) config: Config,
    provider: Arc<P>,
}

impl<P> Clone for Surf<P> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            provider: self.provider.clone(),
        }
    }
}

impl Surf {
    /// An empty `secret` disables signing, after which every token is rejected.
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            config: Config {
                secret: SigningSecret::new(secret),
                random_value_size: DEFAULT_RANDOM_VALUE_SIZE,
                cookie_name: "csrf_token".into(),
                expires: Expiration::Session,
                header_name: "X-CSRF-Token".into(),
                http_only: true,
                prefix: true,
                same_site: SameSite::Strict,
                secure: true,
                exempt: None,
            },
            provider: Arc::new(ExtensionSessionId),
        }
    }
}

impl<P> Surf<P> {
    /// Resolve sessions with `provider` instead of the [`SessionId`](crate::SessionId) extension.
    pub fn session_provider<T>(self, provider: T) -> Surf<T> {
        Surf {
            config: self.config,
            provider: Arc::new(provider),
        }
    }

    pub fn random_value_size(mut self, random_value_size: NonZeroUsize) -> Self {
        self.config.random_value_size = random_value_size;

        self
    }

    pub fn cookie_name(mut self, cookie_name: impl Into<String>) -> Self {
        self.config.cookie_name = cookie_name.into();

        self
    }

    pub fn expires(mut self, expires: Expiration) -> Self {
        self.config.expires = expires;

        self
    }

    pub fn header_name(mut self, header_name: impl Into<String>) -> Self {
        self.config.header_name = header_name.into();

        self
    }

    pub fn http_only(mut self, http_only: bool) -> Self {
        self.config.http_only = http_only;

        self
    }

    /// Prefix the cookie name with `__Host-`. Ignored unless the cookie is
    /// [`secure`](Surf::secure).
    pub fn prefix(mut self, prefix: bool) -> Self {
        self.config.prefix = prefix;

        self
    }

    pub fn same_site(mut self, same_site: SameSite) -> Self {
        self.config.same_site = same_site;

        self
    }

    pub fn secure(mut self, secure: bool) -> Self {
        self.config.secure = secure;

        self
    }

    /// Skip the token check for request paths matching `exempt`, e.g. a
    /// login form posted before any session exists.
    ///
    /// The cookie is still issued on exempt paths.
    pub fn exempt<F>(mut self, exempt: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.config.exempt = Some(Exempt(Arc::new(exempt)));

        self
    }
}

impl<S, P> Layer<S> for Surf<P> {
    type Service = CookieManager<SurfService<GuardService<S>, P>>;

    fn layer(&self, inner: S) -> Self::Service {
        CookieManager::new(SurfService {
            protocol: Arc::new(Protocol::new(self.config.clone())),
            provider: self.provider.clone(),
            inner: GuardService::new(inner),
        })
    }
}

pub struct SurfService<S, P = ExtensionSessionId> {
    protocol: Arc<Protocol>,
    provider: Arc<P>,
    inner: S,
}

impl<S: Clone, P> Clone for SurfService<S, P> {
    fn clone(&self) -> Self {
        Self {
            protocol: self.protocol.clone(),
            provider: self.provider.clone(),
            inner: self.inner.clone(),
        }
    }
}

impl<S, P, Q, R> Service<Request<Q>> for SurfService<S, P>
where
    S: Service<Request<Q>, Response = Response<R>> + Send + 'static,
    S::Future: Send + 'static,
    P: SessionIdentifierProvider<Request<Q>>,
    Q: Send + 'static,
    R: Default + Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut request: Request<Q>) -> Self::Future {
        let cookies = match request
            .extensions()
            .get::<Cookies>()
            .ok_or(Error::ExtensionNotFound("Cookies".into()))
        {
            Ok(cookies) => cookies.clone(),
            Err(err) => return Box::pin(async move { Error::make_layer_error(err) }),
        };

        let session_id = P::find_session_id(&self.provider, &request).unwrap_or_default();
        let received = cookies
            .get(&self.protocol.config.cookie_name())
            .map(|cookie| cookie.value().to_owned());

        // Issue a fresh token when there is none, or when the one we got was
        // signed for another session.
        let stale = match &received {
            Some(received) => match self.protocol.validator.validate(received, &session_id) {
                Ok(valid) => !valid,
                Err(err) => return Box::pin(async move { Error::make_layer_error(err) }),
            },
            None => true,
        };

        let token = Token {
            protocol: self.protocol.clone(),
            cookies,
            session_id: session_id.into(),
            received: received.map(Into::into),
        };

        if stale {
            if let Err(err) = token.create() {
                return Box::pin(async move { Error::make_layer_error(err) });
            }
        }

        request.extensions_mut().insert(token);

        Box::pin(self.inner.call(request))
    }
}
