//! An API gateway `TOKEN` authorizer
//!
//! Each request's bearer token is verified against the OpenID Connect issuer
//! it claims, and the token's client identifier (`cid`) is then compared
//! with the `clientid` of a reference credential kept in the secrets
//! manager. The gateway receives an `Allow` policy only when both checks
//! pass; every other outcome is a `Deny`.
//!
//! ```no_run
//! use tollgate::{Authorizer, PolicyScope, TokenAuthorizerEvent};
//! use tollgate_oidc::{OidcVerifier, VerifierConfig};
//! use tollgate_params::{stores::InMemoryParameterStore, ParameterResolver};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let verifier = OidcVerifier::new(VerifierConfig::default())?;
//! let store = InMemoryParameterStore::new().with_parameter(
//!     "/aws/reference/secretsmanager/payments/okta",
//!     r#"{"clientid":"client-42"}"#,
//! );
//!
//! let authorizer = Authorizer::new(verifier, ParameterResolver::new(store), "payments/okta")
//!     .with_policy_scope(PolicyScope::MethodArn);
//!
//! let event = TokenAuthorizerEvent::with_token("Bearer eyJ...");
//! let response = authorizer.authorize(&event).await;
//! println!("{}", serde_json::to_string(&response)?);
//! # Ok(())
//! # }
//! ```

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

pub mod bearer;
mod braids;
pub mod config;
pub mod credential;
mod decision;
mod event;
pub mod policy;

pub use braids::{
    AuthorizationToken, AuthorizationTokenRef, ClientSecret, ClientSecretRef, Password,
    PasswordRef,
};
pub use config::Config;
pub use credential::ReferenceCredential;
pub use decision::{
    Authorizer, DenialReporter, DenyReason, TerseDenials, VerboseDenials, PRINCIPAL_ID,
};
pub use event::TokenAuthorizerEvent;
pub use policy::{AuthorizerResponse, Effect, PolicyScope};
