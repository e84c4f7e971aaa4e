//! ## Overview
//!
//! Stateless CSRF tokens, signed with HMAC-SHA-256 and bound to the session,
//! following the [signed double submit cookie pattern][owasp-double-submit].
//!
//! ### Tokens
//!
//! A token looks like `<hmac>.<random value>`, both parts URL-safe base64
//! without padding:
//!
//! - The **random value** is drawn fresh from a CSPRNG for every token
//!   (16 bytes unless configured otherwise).
//! - The **hmac** signs a canonical message built from the **session id** and
//!   the random value. Each field of the message is prefixed with its length,
//!   so a session id containing the separator can't be spliced into a
//!   different `(session id, random value)` pair (see
//!   [`canonical::message_payload`]).
//! - The session id itself never leaves the server.
//!
//! Nothing is stored: a token is valid when re-signing its random value for
//! the current session under the secret yields the same hmac. The hmacs are
//! compared in constant time.
//!
//! Without a secret ([`SigningSecret::new`] returns `None` for an empty one)
//! tokens are issued with an empty hmac and **always rejected**.
//!
//! ### Middleware
//!
//! [`Surf`] sets the token as a cookie (`HTTPOnly`, `SameSite: Strict`,
//! `Secure` and `__Host-` prefixed by default) and rejects `POST`, `PUT`,
//! `PATCH` and `DELETE` requests with a `403` unless the `X-CSRF-Token` header
//! echoes the cookie and the token is valid for the request's session.
//! Paths can be [exempted](Surf::exempt), e.g. a login form posted before any
//! session exists. The `__Host-` prefix only applies to `Secure` cookies.
//!
//! The session comes from a [`SessionIdentifierProvider`], by default the
//! [`SessionId`] request extension your authentication layer inserts.
//!
//! ## Usage
//!
//! ### With [`axum`][crate-axum]
//!
//! ```rust, no_run
//! use std::net::SocketAddr;
//!
//! use axum::{routing::{get, post}, Router};
//! use http::StatusCode;
//! use tower_hmac_csrf::{Surf, Token};
//!
//! #[tokio::main]
//! async fn main() {
//!     let app = Router::new()
//!         .route("/login", post(login))
//!         .route("/token", get(token))
//!         .layer(
//!             Surf::new("secret-key")
//!                 .secure(false)
//!                 .prefix(false)
//!                 .exempt(|path: &str| path == "/login"),
//!         );
//!
//!     let addr = SocketAddr::from(([127, 0, 0, 1], 3000));
//!     let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
//!
//!     axum::serve(listener, app.into_make_service())
//!         .await
//!         .unwrap();
//! }
//!
//! async fn login(token: Token) -> Result<StatusCode, StatusCode> {
//!     token.set("new-session-id").map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
//!
//!     Ok(StatusCode::OK)
//! }
//!
//! async fn token(token: Token) -> Result<String, StatusCode> {
//!     token.get().map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
//! }
//! ```
//!
//! ### Without middleware
//!
//! ```rust
//! use std::num::NonZeroUsize;
//!
//! use tower_hmac_csrf::{SigningSecret, TokenGenerator, TokenValidator};
//!
//! let secret = SigningSecret::new("s3cr3t");
//! let generator = TokenGenerator::new(secret.clone(), NonZeroUsize::new(16).unwrap());
//! let validator = TokenValidator::new(secret);
//!
//! let token = generator.generate("u-42").unwrap();
//!
//! assert!(validator.validate(&token, "u-42").unwrap());
//! assert!(!validator.validate(&token, "u-43").unwrap());
//! ```
//!
//! [crate-axum]: https://github.com/tokio-rs/axum
//! [owasp-double-submit]: https://cheatsheetseries.owasp.org/cheatsheets/Cross-Site_Request_Forgery_Prevention_Cheat_Sheet.html#signed-double-submit-cookie-recommended

use hmac::Hmac;
use sha2::Sha256;

pub(crate) type HmacSha256 = Hmac<Sha256>;

/// Separates the hmac from the random value in a token.
pub const TOKEN_SEPARATOR: char = '.';

pub use error::Error;
pub use generator::{TokenGenerator, DEFAULT_RANDOM_VALUE_SIZE};
pub use guard::GuardService;
pub use secret::SigningSecret;
pub use session::{ExtensionSessionId, SessionId, SessionIdentifierProvider};
pub use surf::{Surf, SurfService};
pub use token::Token;
pub use validator::{TokenValidator, Verdict};

pub mod canonical;
pub mod signature;

mod error;
mod generator;
mod guard;
mod secret;
mod session;
mod surf;
mod token;
mod validator;

#[cfg(feature = "axum")]
mod extract;
