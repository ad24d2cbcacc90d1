use aliri::{
    jwt::{self, CoreHeaders, HasAlgorithm, Issuer, IssuerRef},
    Jwks, JwtRef,
};
use reqwest::Client;

use crate::{discovery, AccessTokenClaims, VerifyError};

/// An authority bound to a single issuer and the key set it published
///
/// Construct one per verification with [`discover()`][Self::discover]; the
/// key set is not refreshed afterwards.
#[derive(Debug)]
#[must_use]
pub struct IssuerAuthority {
    issuer: Issuer,
    jwks: Jwks,
    validator: jwt::CoreValidator,
}

impl IssuerAuthority {
    /// Constructs an authority from an already known key set
    pub fn new(issuer: Issuer, jwks: Jwks, validator: jwt::CoreValidator) -> Self {
        Self {
            issuer,
            jwks,
            validator,
        }
    }

    /// Discovers the issuer's key set through its OpenID configuration
    ///
    /// No retries are attempted.
    ///
    /// # Errors
    ///
    /// Returns an error if either document cannot be retrieved, or if the
    /// discovery document names a different issuer.
    #[tracing::instrument(skip_all, fields(issuer = %issuer, jwks.url = tracing::field::Empty))]
    pub async fn discover(
        client: &Client,
        issuer: &IssuerRef,
        validator: jwt::CoreValidator,
    ) -> Result<Self, VerifyError> {
        let configuration = discovery::fetch_oidc_configuration(client, issuer).await?;

        if configuration.issuer != issuer.as_str() {
            tracing::debug!(
                discovered = %configuration.issuer,
                "discovery document names a different issuer"
            );
            return Err(VerifyError::IssuerMismatch {
                claimed: issuer.as_str().to_owned(),
                discovered: configuration.issuer,
            });
        }

        tracing::Span::current().record("jwks.url", configuration.jwks_uri.as_str());

        let response = client.get(&configuration.jwks_uri).send().await?;
        if let Err(err) = response.error_for_status_ref() {
            let error: &dyn std::error::Error = &err;
            tracing::warn!(
                error,
                http.status_code = response.status().as_u16(),
                "JWKS fetch failed; unexpected response status",
            );
            return Err(err.into());
        }

        let jwks = response.json::<Jwks>().await?;
        tracing::debug!(keys = jwks.keys().len(), "JWKS fetched");

        Ok(Self::new(issuer.to_owned(), jwks, validator))
    }

    /// The issuer this authority is bound to
    pub fn issuer(&self) -> &IssuerRef {
        &self.issuer
    }

    /// Authenticates the token against the issuer's keys and validator
    ///
    /// # Errors
    ///
    /// Returns an error if no key matches the token header, or if the token
    /// is malformed, badly signed, or rejected by the validator.
    pub fn verify_token(&self, token: &JwtRef) -> Result<AccessTokenClaims, VerifyError> {
        let decomposed: jwt::Decomposed = token.decompose()?;

        let validated: jwt::Validated<AccessTokenClaims>;
        {
            let key = {
                let kid = decomposed.kid();
                let alg = decomposed.alg();

                self.jwks.get_key_by_opt(kid, alg).ok_or_else(|| {
                    if let Some(kid) = kid {
                        tracing::debug!(%kid, %alg, "unable to find matching key");
                    } else {
                        tracing::debug!(%alg, "unable to find matching key");
                    }
                    VerifyError::UnknownKeyId
                })?
            };

            validated = decomposed.verify(key, &self.validator)?;
        }

        let (_, claims) = validated.extract();

        Ok(claims)
    }
}
