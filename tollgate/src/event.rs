use serde::{Deserialize, Serialize};

use crate::AuthorizationToken;

/// The event delivered to a `TOKEN` authorizer by the API gateway
///
/// Every field is untrusted and may be absent.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenAuthorizerEvent {
    /// The authorizer type, normally `TOKEN`
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    /// The raw value of the `Authorization` header
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorization_token: Option<AuthorizationToken>,

    /// The ARN of the method being invoked
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method_arn: Option<String>,
}

impl TokenAuthorizerEvent {
    /// A `TOKEN` event carrying the given header value
    pub fn with_token(token: impl Into<AuthorizationToken>) -> Self {
        Self {
            kind: Some("TOKEN".to_owned()),
            authorization_token: Some(token.into()),
            method_arn: None,
        }
    }

    /// Sets the method ARN
    #[must_use]
    pub fn with_method_arn(self, method_arn: impl Into<String>) -> Self {
        Self {
            method_arn: Some(method_arn.into()),
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use color_eyre::Result;

    use super::*;

    #[test]
    fn parses_gateway_event() -> Result<()> {
        let event: TokenAuthorizerEvent = serde_json::from_str(
            r#"{
                "type": "TOKEN",
                "authorizationToken": "Bearer abc.def.ghi",
                "methodArn": "arn:aws:execute-api:us-west-2:123456789012:api/prod/GET/pets"
            }"#,
        )?;

        assert_eq!(event.kind.as_deref(), Some("TOKEN"));
        assert_eq!(
            event.authorization_token.as_deref().map(|t| t.as_str()),
            Some("Bearer abc.def.ghi")
        );
        assert_eq!(
            event.method_arn.as_deref(),
            Some("arn:aws:execute-api:us-west-2:123456789012:api/prod/GET/pets")
        );
        Ok(())
    }

    #[test]
    fn tolerates_missing_fields() -> Result<()> {
        let event: TokenAuthorizerEvent = serde_json::from_str("{}")?;
        assert_eq!(event, TokenAuthorizerEvent::default());
        Ok(())
    }

    #[test]
    fn debug_output_hides_the_token() {
        let event = TokenAuthorizerEvent::with_token("Bearer super.secret.token");
        assert!(!format!("{event:?}").contains("secret"));
    }
}
