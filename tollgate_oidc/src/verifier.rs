use std::time::Duration;

use aliri::{
    jwa,
    jwt::{self, Audiences, Issuer, IssuerRef},
    JwtRef,
};
use async_trait::async_trait;
use reqwest::{Client, Url};

use crate::{AccessTokenClaims, IssuerAuthority, VerifyError};

/// Clock skew tolerated on either side of the `exp` and `nbf` claims
pub const DEFAULT_LEEWAY: Duration = Duration::from_secs(120);

/// Verifies access tokens on behalf of the issuer they claim
#[async_trait]
pub trait AccessTokenVerifier: Send + Sync {
    /// Verifies the token as issued by `issuer` for one of `audiences`
    ///
    /// # Errors
    ///
    /// Returns an error if the issuer is not trusted, its keys cannot be
    /// retrieved, or the token fails verification for any reason.
    async fn verify_access_token(
        &self,
        issuer: &IssuerRef,
        token: &JwtRef,
        audiences: &Audiences,
    ) -> Result<AccessTokenClaims, VerifyError>;
}

macro_rules! delegate_impls {
    ($($ty:ty)*) => {
        $(
            #[async_trait]
            impl<T> AccessTokenVerifier for $ty
            where
                T: AccessTokenVerifier + ?Sized,
            {
                async fn verify_access_token(
                    &self,
                    issuer: &IssuerRef,
                    token: &JwtRef,
                    audiences: &Audiences,
                ) -> Result<AccessTokenClaims, VerifyError> {
                    T::verify_access_token(self, issuer, token, audiences).await
                }
            }
        )*
    }
}

delegate_impls!(
    Box<T>
    std::sync::Arc<T>
);

/// Determines which claimed issuers may be contacted for keys
///
/// By default any `https` issuer is accepted. Once any issuer is explicitly
/// allowed, only allowed issuers are accepted.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[must_use]
pub struct IssuerPolicy {
    allowed: Vec<Issuer>,
    allow_insecure: bool,
}

impl IssuerPolicy {
    /// Adds a single issuer to the allow-list
    #[inline]
    pub fn allow_issuer(self, issuer: Issuer) -> Self {
        let mut this = self;
        this.allowed.push(issuer);
        this
    }

    /// Adds multiple issuers to the allow-list
    #[inline]
    pub fn extend_allowed_issuers<I: IntoIterator<Item = Issuer>>(self, issuers: I) -> Self {
        let mut this = self;
        this.allowed.extend(issuers);
        this
    }

    /// Accepts plain `http` issuers
    ///
    /// Only meant for local identity providers.
    #[inline]
    pub fn allow_insecure(self) -> Self {
        Self {
            allow_insecure: true,
            ..self
        }
    }

    /// The explicitly allowed issuers
    pub fn allowed_issuers(&self) -> &[Issuer] {
        &self.allowed
    }

    /// Whether plain `http` issuers are accepted
    pub fn allows_insecure(&self) -> bool {
        self.allow_insecure
    }

    /// Checks whether the claimed issuer may be trusted
    ///
    /// # Errors
    ///
    /// Returns [`VerifyError::UntrustedIssuer`] if the issuer is not an
    /// absolute URL, uses a disallowed scheme, or is not on a configured
    /// allow-list.
    pub fn check(&self, issuer: &IssuerRef) -> Result<(), VerifyError> {
        let untrusted = |reason| VerifyError::UntrustedIssuer {
            issuer: issuer.as_str().to_owned(),
            reason,
        };

        let url = Url::parse(issuer.as_str()).map_err(|_| untrusted("not an absolute URL"))?;

        match url.scheme() {
            "https" => {}
            "http" if self.allow_insecure => {}
            _ => return Err(untrusted("issuer must use https")),
        }

        if !self.allowed.is_empty() && !self.allowed.iter().any(|a| a.as_str() == issuer.as_str())
        {
            return Err(untrusted("issuer is not on the allow-list"));
        }

        Ok(())
    }
}

/// Settings applied to every verification
#[derive(Clone, Debug)]
#[must_use]
pub struct VerifierConfig {
    issuers: IssuerPolicy,
    algorithms: Vec<jwa::Algorithm>,
    leeway: Duration,
}

impl Default for VerifierConfig {
    /// Any `https` issuer, RS256 only, with the default leeway
    fn default() -> Self {
        Self {
            issuers: IssuerPolicy::default(),
            algorithms: vec![jwa::Algorithm::RS256],
            leeway: DEFAULT_LEEWAY,
        }
    }
}

impl VerifierConfig {
    /// Uses the given issuer policy
    #[inline]
    pub fn with_issuer_policy(self, issuers: IssuerPolicy) -> Self {
        Self { issuers, ..self }
    }

    /// Replaces the set of approved signing algorithms
    #[inline]
    pub fn with_approved_algorithms<I: IntoIterator<Item = jwa::Algorithm>>(self, algs: I) -> Self {
        Self {
            algorithms: algs.into_iter().collect(),
            ..self
        }
    }

    /// Allows a grace period for the `exp` and `nbf` claims
    #[inline]
    pub fn with_leeway(self, leeway: Duration) -> Self {
        Self { leeway, ..self }
    }

    /// The issuer policy in use
    pub fn issuer_policy(&self) -> &IssuerPolicy {
        &self.issuers
    }

    /// The approved signing algorithms
    pub fn approved_algorithms(&self) -> &[jwa::Algorithm] {
        &self.algorithms
    }

    /// The configured leeway
    pub fn leeway(&self) -> Duration {
        self.leeway
    }

    fn validator_for(&self, issuer: &IssuerRef, audiences: &Audiences) -> jwt::CoreValidator {
        jwt::CoreValidator::default()
            .with_leeway(self.leeway)
            .check_expiration()
            .extend_approved_algorithms(self.algorithms.iter().copied())
            .extend_allowed_audiences(audiences.iter().map(ToOwned::to_owned))
            .require_issuer(issuer.to_owned())
    }
}

/// Verifies access tokens by discovering the claimed issuer's keys
///
/// A fresh [`IssuerAuthority`] is constructed for every token; the HTTP
/// client is shared.
#[derive(Debug, Clone)]
pub struct OidcVerifier {
    client: Client,
    config: VerifierConfig,
}

impl OidcVerifier {
    /// Constructs a verifier with its own HTTP client
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new(config: VerifierConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(concat!("tollgate_oidc/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self::with_client(client, config))
    }

    /// Constructs a verifier around an existing HTTP client
    pub fn with_client(client: Client, config: VerifierConfig) -> Self {
        Self { client, config }
    }

    /// The settings applied to every verification
    pub fn config(&self) -> &VerifierConfig {
        &self.config
    }
}

#[async_trait]
impl AccessTokenVerifier for OidcVerifier {
    #[tracing::instrument(skip_all, fields(issuer = %issuer))]
    async fn verify_access_token(
        &self,
        issuer: &IssuerRef,
        token: &JwtRef,
        audiences: &Audiences,
    ) -> Result<AccessTokenClaims, VerifyError> {
        self.config.issuers.check(issuer)?;

        if audiences.is_empty() {
            return Err(VerifyError::MissingAudience);
        }

        let validator = self.config.validator_for(issuer, audiences);
        let authority = IssuerAuthority::discover(&self.client, issuer, validator).await?;

        let claims = authority.verify_token(token)?;
        tracing::debug!("token verified");

        Ok(claims)
    }
}
