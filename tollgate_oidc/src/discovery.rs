//! OpenID Connect discovery

use aliri::jwt::IssuerRef;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// The subset of an OpenID provider's configuration needed to verify tokens
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct OidcConfiguration {
    /// The issuer identifier the provider asserts for itself
    pub issuer: String,
    /// Where the provider publishes its JSON Web Key Set
    pub jwks_uri: String,
}

/// The well-known location of an issuer's discovery document
pub fn discovery_url(issuer: &IssuerRef) -> String {
    format!(
        "{}/.well-known/openid-configuration",
        issuer.as_str().trim_end_matches('/')
    )
}

/// Gets the OpenID configuration published by an issuer
///
/// # Errors
///
/// Returns an error on transport failure, a non-success status, or a
/// document that does not carry `issuer` and `jwks_uri`.
#[tracing::instrument(skip_all, fields(oidc.url = tracing::field::Empty))]
pub async fn fetch_oidc_configuration(
    client: &Client,
    issuer: &IssuerRef,
) -> Result<OidcConfiguration, reqwest::Error> {
    let url = discovery_url(issuer);
    tracing::Span::current().record("oidc.url", url.as_str());

    let response = client.get(&url).send().await?;
    response.error_for_status_ref()?;

    let oidc_document = response.json::<OidcConfiguration>().await?;

    Ok(oidc_document)
}
