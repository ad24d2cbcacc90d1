//! Parameter and secret lookup against a hierarchical parameter store
//!
//! Parameters are addressed by a logical key which is turned into a concrete
//! parameter name in one of three ways:
//!
//! * as a secret, under the secrets manager reference prefix
//!   (`/aws/reference/secretsmanager/{key}`),
//! * as a namespaced path, `/{root}/{system}/{environment}/{secure|insecure}/{key}`,
//! * or verbatim.
//!
//! Values are always fetched with decryption requested. Any failure in the
//! underlying store is reported as a [`ParameterError`] without retrying.
//!
//! ```
//! use tollgate_params::{stores::InMemoryParameterStore, ParameterRequest, ParameterResolver};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), tollgate_params::ParameterError> {
//! let store = InMemoryParameterStore::new()
//!     .with_parameter("/csaa/pmtctrl/dev/insecure/feature", "on");
//!
//! let resolver = ParameterResolver::new(store);
//! let value = resolver
//!     .get_parameter(&ParameterRequest::new("feature").resolve_path())
//!     .await?;
//!
//! assert_eq!(value, "on");
//! # Ok(())
//! # }
//! ```
//!
//! # Features
//!
//! * `ssm` (default): provides [`stores::SsmParameterStore`], backed by AWS
//!   Systems Manager Parameter Store.

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

mod resolver;
pub mod stores;

pub use resolver::{
    ParameterError, ParameterRequest, ParameterResolver, ParameterSettings, DEFAULT_ENVIRONMENT,
    DEFAULT_ROOT, DEFAULT_SYSTEM, SECRETS_MANAGER_PREFIX,
};
