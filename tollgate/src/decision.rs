use std::error::Error as StdError;

use thiserror::Error;
use tollgate_oidc::{AccessTokenClaims, AccessTokenVerifier, VerifyError};
use tollgate_params::{stores::ParameterStore, ParameterResolver};

use crate::{
    bearer::{self, TokenError, UnverifiedClaims},
    credential::{self, CredentialError},
    AuthorizationTokenRef, AuthorizerResponse, PolicyScope, TokenAuthorizerEvent,
};

/// The principal named in every policy
pub const PRINCIPAL_ID: &str = "*";

/// Why a request was denied
#[derive(Debug, Error)]
pub enum DenyReason {
    /// No bearer token was supplied
    #[error("token not supplied for authorization")]
    MissingToken,
    /// The bearer token failed the sanity check or could not be decoded
    #[error("token supplied for authorization is malformed")]
    MalformedToken(#[source] TokenError),
    /// The token claims no subject
    #[error("subject missing in decoded token")]
    MissingSubjectClaim,
    /// The token was rejected by its claimed issuer
    #[error("token failed verification")]
    VerificationFailure(#[source] VerifyError),
    /// The verified claims carry no client identifier
    #[error("verified token carries no client identifier")]
    ClaimsMissing,
    /// The reference credential could not be obtained
    #[error("reference credential unavailable")]
    SecretFetchFailure(#[source] CredentialError),
    /// The token's client does not match the reference credential
    #[error("client identifier does not match reference credential")]
    CredentialMismatch,
}

impl DenyReason {
    /// A stable, machine-friendly name for the reason
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingToken => "missing_token",
            Self::MalformedToken(_) => "malformed_token",
            Self::MissingSubjectClaim => "missing_subject_claim",
            Self::VerificationFailure(_) => "verification_failure",
            Self::ClaimsMissing => "claims_missing",
            Self::SecretFetchFailure(_) => "secret_fetch_failure",
            Self::CredentialMismatch => "credential_mismatch",
        }
    }
}

impl From<TokenError> for DenyReason {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Missing => Self::MissingToken,
            err => Self::MalformedToken(err),
        }
    }
}

/// Handler for reporting denied requests
///
/// Reporters only observe a denial; they never alter the response.
pub trait DenialReporter {
    /// Called once for every denied request
    fn on_denied(&self, reason: &DenyReason);
}

macro_rules! delegate_impls {
    ($($ty:ty)*) => {
        $(
            impl<T> DenialReporter for $ty
            where
                T: DenialReporter + ?Sized,
            {
                fn on_denied(&self, reason: &DenyReason) {
                    T::on_denied(self, reason)
                }
            }
        )*
    }
}

delegate_impls!(
    &'_ T
    Box<T>
    std::rc::Rc<T>
    std::sync::Arc<T>
);

/// Reports only the reason for a denial
#[derive(Clone, Copy, Debug, Default)]
pub struct TerseDenials;

impl DenialReporter for TerseDenials {
    #[inline]
    fn on_denied(&self, reason: &DenyReason) {
        tracing::info!(decision.reason = reason.kind(), "deny policy: {reason}");
    }
}

/// Reports a denial along with its full chain of causes
#[derive(Clone, Copy, Debug, Default)]
pub struct VerboseDenials;

impl DenialReporter for VerboseDenials {
    fn on_denied(&self, reason: &DenyReason) {
        let mut causes = vec![reason.to_string()];
        let mut err: &dyn StdError = reason;
        while let Some(next) = err.source() {
            causes.push(next.to_string());
            err = next;
        }

        let description = causes.join(": ");
        tracing::info!(decision.reason = reason.kind(), "deny policy: {description}");
    }
}

/// Decides whether a gateway request may proceed
///
/// A request is allowed only when its bearer token verifies against the
/// issuer it claims, and the token's client identifier equals the one held
/// in the reference credential. Verification always happens before the
/// credential is fetched.
#[derive(Debug)]
pub struct Authorizer<V, S, R = TerseDenials> {
    verifier: V,
    parameters: ParameterResolver<S>,
    secret_name: String,
    scope: PolicyScope,
    reporter: R,
}

impl<V, S> Authorizer<V, S> {
    /// Constructs an authorizer that checks tokens against the named secret
    pub fn new(verifier: V, parameters: ParameterResolver<S>, secret_name: impl Into<String>) -> Self {
        Self {
            verifier,
            parameters,
            secret_name: secret_name.into(),
            scope: PolicyScope::default(),
            reporter: TerseDenials,
        }
    }
}

impl<V, S, R> Authorizer<V, S, R> {
    /// Sets the resource scope of the returned policies
    #[must_use]
    pub fn with_policy_scope(self, scope: PolicyScope) -> Self {
        Self { scope, ..self }
    }

    /// Replaces the denial reporter
    #[must_use]
    pub fn with_denial_reporter<R2>(self, reporter: R2) -> Authorizer<V, S, R2> {
        Authorizer {
            verifier: self.verifier,
            parameters: self.parameters,
            secret_name: self.secret_name,
            scope: self.scope,
            reporter,
        }
    }

    /// The resource scope of the returned policies
    pub fn policy_scope(&self) -> PolicyScope {
        self.scope
    }

    /// The name of the secret holding the reference credential
    pub fn secret_name(&self) -> &str {
        &self.secret_name
    }
}

impl<V, S, R> Authorizer<V, S, R>
where
    V: AccessTokenVerifier,
    S: ParameterStore,
    R: DenialReporter,
{
    /// Produces the policy for a gateway request
    ///
    /// Every failure yields a `Deny` policy; no error escapes.
    #[tracing::instrument(skip_all, fields(decision.effect = tracing::field::Empty))]
    pub async fn authorize(&self, event: &TokenAuthorizerEvent) -> AuthorizerResponse {
        let resource = self.scope.resource(event);
        let header = event.authorization_token.as_deref();

        match self.decide(header).await {
            Ok(_) => {
                tracing::Span::current().record("decision.effect", "Allow");
                tracing::info!("success - allow policy");
                AuthorizerResponse::allow(PRINCIPAL_ID, resource)
            }
            Err(reason) => {
                tracing::Span::current().record("decision.effect", "Deny");
                self.reporter.on_denied(&reason);
                AuthorizerResponse::deny(PRINCIPAL_ID, resource)
            }
        }
    }

    /// Runs the checks for an `Authorization` header value
    ///
    /// Returns the verified claims when the request may proceed.
    ///
    /// # Errors
    ///
    /// Returns the reason for the first check that fails.
    pub async fn decide(
        &self,
        header: Option<&AuthorizationTokenRef>,
    ) -> Result<AccessTokenClaims, DenyReason> {
        let token = bearer::extract_bearer(header.map(AuthorizationTokenRef::as_str))?;

        let claimed = UnverifiedClaims::decode(&token)?;
        if claimed.subject().is_none() {
            return Err(DenyReason::MissingSubjectClaim);
        }
        tracing::debug!(issuer = %claimed.issuer(), "token claims decoded");

        let claims = self
            .verifier
            .verify_access_token(claimed.issuer(), &token, claimed.audiences())
            .await
            .map_err(DenyReason::VerificationFailure)?;

        let client_id = claims.client_id().ok_or(DenyReason::ClaimsMissing)?;

        let credential =
            credential::fetch_reference_credential(&self.parameters, &self.secret_name)
                .await
                .map_err(DenyReason::SecretFetchFailure)?;

        match credential.client_id() {
            Some(expected) if expected == client_id => Ok(claims),
            _ => Err(DenyReason::CredentialMismatch),
        }
    }
}

#[cfg(test)]
mod tests {
    use tracing_test::traced_test;

    use super::*;

    #[test]
    fn missing_token_error_maps_to_missing_token() {
        let reason = DenyReason::from(TokenError::Missing);
        assert!(matches!(reason, DenyReason::MissingToken));
        assert_eq!(reason.kind(), "missing_token");
    }

    #[test]
    fn other_token_errors_map_to_malformed_token() {
        let reason = DenyReason::from(TokenError::Malformed);
        assert!(matches!(reason, DenyReason::MalformedToken(_)));
        assert_eq!(reason.kind(), "malformed_token");
    }

    #[test]
    #[traced_test]
    fn terse_reporter_logs_reason_only() {
        TerseDenials.on_denied(&DenyReason::from(TokenError::Malformed));

        assert!(logs_contain("deny policy: token supplied for authorization is malformed"));
        assert!(!logs_contain("payload segment missing or too short"));
    }

    #[test]
    #[traced_test]
    fn verbose_reporter_logs_cause_chain() {
        VerboseDenials.on_denied(&DenyReason::from(TokenError::Malformed));

        assert!(logs_contain(
            "deny policy: token supplied for authorization is malformed: \
             payload segment missing or too short"
        ));
    }

    #[test]
    #[traced_test]
    fn swapping_the_reporter_keeps_other_settings() {
        let store = tollgate_params::stores::InMemoryParameterStore::new();
        let authorizer = Authorizer::new((), ParameterResolver::new(store), "payments/okta")
            .with_policy_scope(PolicyScope::MethodArn)
            .with_denial_reporter(VerboseDenials);

        assert_eq!(authorizer.policy_scope(), PolicyScope::MethodArn);
        assert_eq!(authorizer.secret_name(), "payments/okta");

        authorizer
            .reporter
            .on_denied(&DenyReason::from(TokenError::Malformed));
        assert!(logs_contain("payload segment missing or too short"));
    }

    #[test]
    #[traced_test]
    fn boxed_reporter_delegates() {
        let reporter: Box<dyn DenialReporter + Send + Sync> = Box::new(TerseDenials);
        reporter.on_denied(&DenyReason::CredentialMismatch);

        assert!(logs_contain("credential_mismatch"));
    }
}
