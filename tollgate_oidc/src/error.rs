use thiserror::Error;

/// Indicates that an access token could not be verified
#[derive(Debug, Error)]
pub enum VerifyError {
    /// The claimed issuer may not be contacted
    #[error("issuer '{issuer}' is not trusted: {reason}")]
    UntrustedIssuer {
        /// The issuer claimed by the token
        issuer: String,
        /// Why the issuer was refused
        reason: &'static str,
    },
    /// No audience was supplied to check the token against
    #[error("no expected audience provided")]
    MissingAudience,
    /// The issuer's discovery document or key set could not be retrieved
    #[error("unable to retrieve signing keys from issuer")]
    Discovery(#[from] reqwest::Error),
    /// The discovery document belongs to a different issuer
    #[error("discovery document names issuer '{discovered}' rather than '{claimed}'")]
    IssuerMismatch {
        /// The issuer claimed by the token
        claimed: String,
        /// The issuer named in the discovery document
        discovered: String,
    },
    /// Indicates that the authority cannot verify the JWT because it cannot
    /// find a key matching the `kid` and `alg` in the token header
    #[error("no matching key found to validate JWT")]
    UnknownKeyId,
    /// Indicates that the JWT was malformed or otherwise defective
    #[error("invalid JWT")]
    JwtVerifyError(#[from] aliri::error::JwtVerifyError),
}
