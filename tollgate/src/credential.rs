//! The reference credential an access token's client must match

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tollgate_oidc::{ClientId, ClientIdRef};
use tollgate_params::{stores::ParameterStore, ParameterError, ParameterRequest, ParameterResolver};

use crate::{ClientSecret, ClientSecretRef, Password, PasswordRef};

/// A credential record stored in the secrets manager
///
/// Only the client identifier takes part in authorization decisions.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceCredential {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    password: Option<Password>,
    #[serde(rename = "clientid", default)]
    client_id: Option<ClientId>,
    #[serde(rename = "clientsecret", default)]
    client_secret: Option<ClientSecret>,
    #[serde(rename = "apigclientid", default)]
    gateway_client_id: Option<ClientId>,
}

impl ReferenceCredential {
    /// The credential type
    pub fn kind(&self) -> Option<&str> {
        self.kind.as_deref()
    }

    /// The user name
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// The password
    pub fn password(&self) -> Option<&PasswordRef> {
        self.password.as_deref()
    }

    /// The client identifier access tokens must carry
    pub fn client_id(&self) -> Option<&ClientIdRef> {
        self.client_id.as_deref()
    }

    /// The client secret
    pub fn client_secret(&self) -> Option<&ClientSecretRef> {
        self.client_secret.as_deref()
    }

    /// The client identifier registered with the API gateway
    pub fn gateway_client_id(&self) -> Option<&ClientIdRef> {
        self.gateway_client_id.as_deref()
    }
}

/// Why the reference credential could not be obtained
#[derive(Debug, Error)]
pub enum CredentialError {
    /// The secret store failed
    #[error(transparent)]
    Fetch(#[from] ParameterError),
    /// The secret exists but holds no value
    #[error("reference credential '{0}' has no value")]
    Empty(String),
    /// The secret does not hold a credential record
    #[error("reference credential is not a valid credential record")]
    Unparseable(#[from] serde_json::Error),
}

/// Fetches the named credential from the secrets manager
///
/// # Errors
///
/// Returns an error if the fetch fails, the secret is empty, or its value is
/// not a credential record.
pub async fn fetch_reference_credential<S>(
    parameters: &ParameterResolver<S>,
    secret_name: &str,
) -> Result<ReferenceCredential, CredentialError>
where
    S: ParameterStore,
{
    let value = parameters
        .get_parameter(&ParameterRequest::secret(secret_name))
        .await?;

    if value.is_empty() {
        return Err(CredentialError::Empty(secret_name.to_owned()));
    }

    Ok(serde_json::from_str(&value)?)
}

#[cfg(test)]
mod tests {
    use color_eyre::Result;
    use tollgate_params::stores::InMemoryParameterStore;

    use super::*;

    const RECORD: &str = r#"{
        "type": "oauth",
        "username": "svc-payments",
        "password": "hunter2",
        "clientid": "client-42",
        "clientsecret": "s3cr3t-value",
        "apigclientid": "gateway-7"
    }"#;

    #[test]
    fn parses_full_record() -> Result<()> {
        let credential: ReferenceCredential = serde_json::from_str(RECORD)?;

        assert_eq!(credential.kind(), Some("oauth"));
        assert_eq!(credential.username(), Some("svc-payments"));
        assert_eq!(credential.client_id().map(|c| c.as_str()), Some("client-42"));
        assert_eq!(
            credential.gateway_client_id().map(|c| c.as_str()),
            Some("gateway-7")
        );
        assert_eq!(credential.password().map(|p| p.as_str()), Some("hunter2"));
        assert_eq!(
            credential.client_secret().map(|s| s.as_str()),
            Some("s3cr3t-value")
        );
        Ok(())
    }

    #[test]
    fn debug_output_hides_secrets() -> Result<()> {
        let credential: ReferenceCredential = serde_json::from_str(RECORD)?;
        let debug = format!("{credential:?}");

        assert!(!debug.contains("hunter2"));
        assert!(!debug.contains("s3cr3t-value"));
        assert!(debug.contains("client-42"));
        Ok(())
    }

    #[test]
    fn partial_record_is_accepted() -> Result<()> {
        let credential: ReferenceCredential = serde_json::from_str(r#"{"clientid":"c"}"#)?;
        assert_eq!(credential.client_id().map(|c| c.as_str()), Some("c"));
        assert!(credential.password().is_none());
        Ok(())
    }

    #[test]
    fn numeric_client_id_is_rejected() {
        let parsed = serde_json::from_str::<ReferenceCredential>(r#"{"clientid":42}"#);
        assert!(parsed.is_err());
    }

    #[tokio::test]
    async fn fetches_through_secrets_manager_reference() -> Result<()> {
        let store = InMemoryParameterStore::new()
            .with_parameter("/aws/reference/secretsmanager/payments/okta", RECORD);
        let parameters = ParameterResolver::new(store);

        let credential = fetch_reference_credential(&parameters, "payments/okta").await?;

        assert_eq!(credential.client_id().map(|c| c.as_str()), Some("client-42"));
        Ok(())
    }

    #[tokio::test]
    async fn empty_secret_is_an_error() {
        let store = InMemoryParameterStore::new()
            .with_empty_parameter("/aws/reference/secretsmanager/payments/okta");
        let parameters = ParameterResolver::new(store);

        let err = fetch_reference_credential(&parameters, "payments/okta")
            .await
            .unwrap_err();

        assert!(matches!(err, CredentialError::Empty(_)), "{err:?}");
    }

    #[tokio::test]
    async fn unreadable_secret_is_an_error() {
        let store = InMemoryParameterStore::new()
            .with_parameter("/aws/reference/secretsmanager/payments/okta", "clientid=c");
        let parameters = ParameterResolver::new(store);

        let err = fetch_reference_credential(&parameters, "payments/okta")
            .await
            .unwrap_err();

        assert!(matches!(err, CredentialError::Unparseable(_)), "{err:?}");
    }

    #[tokio::test]
    async fn missing_secret_is_a_fetch_error() {
        let parameters = ParameterResolver::new(InMemoryParameterStore::new());

        let err = fetch_reference_credential(&parameters, "payments/okta")
            .await
            .unwrap_err();

        assert!(matches!(err, CredentialError::Fetch(_)), "{err:?}");
    }
}
