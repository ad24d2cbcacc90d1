//! Per-issuer OpenID Connect access token verification
//!
//! A verifier is bound to an issuer at the moment a token is presented. The
//! issuer's discovery document is fetched from
//! `{issuer}/.well-known/openid-configuration`, its JSON Web Key Set (JWKS)
//! is fetched from the advertised `jwks_uri`, and the token is verified
//! against that key set. Keys are not cached between verifications.
//!
//! Because the issuer is taken from a token that has not yet been verified,
//! the [`IssuerPolicy`] decides which issuers may be contacted at all before
//! any network request is made.
//!
//! ```no_run
//! use aliri::{jwt, JwtRef};
//! use tollgate_oidc::{AccessTokenVerifier, IssuerPolicy, OidcVerifier, VerifierConfig};
//!
//! # async fn verify(raw: &str) -> Result<(), Box<dyn std::error::Error>> {
//! let config = VerifierConfig::default().with_issuer_policy(
//!     IssuerPolicy::default().allow_issuer(jwt::Issuer::from_static("https://example.okta.com/oauth2/default")),
//! );
//! let verifier = OidcVerifier::new(config)?;
//!
//! let claims = verifier
//!     .verify_access_token(
//!         jwt::IssuerRef::from_str("https://example.okta.com/oauth2/default"),
//!         JwtRef::from_str(raw),
//!         &jwt::Audiences::single(jwt::Audience::from_static("api://default")),
//!     )
//!     .await?;
//!
//! println!("client: {:?}", claims.client_id());
//! # Ok(())
//! # }
//! ```
//!
//! # Feature flags
//!
//! This crate enables `rustls-tls` in `reqwest` by default so that issuers
//! can be reached over HTTPS. Use `default-tls` instead to link against the
//! platform TLS library.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(
    missing_docs,
    unused_import_braces,
    unused_imports,
    unused_qualifications
)]
#![deny(
    missing_debug_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code,
    unused_must_use
)]

mod authority;
mod claims;
pub mod discovery;
mod error;
mod verifier;

pub use authority::IssuerAuthority;
pub use claims::{AccessTokenClaims, ClientId, ClientIdRef};
pub use error::VerifyError;
pub use verifier::{
    AccessTokenVerifier, IssuerPolicy, OidcVerifier, VerifierConfig, DEFAULT_LEEWAY,
};
