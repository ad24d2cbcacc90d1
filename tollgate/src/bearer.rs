//! Bearer token extraction and unverified claim decoding

use aliri::{
    jwt::{Audience, Audiences, Issuer, IssuerRef, Subject, SubjectRef},
    Jwt, JwtRef,
};
use aliri_base64::Base64Url;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// The shortest payload segment accepted before any verification is attempted
pub const MIN_PAYLOAD_SEGMENT_LEN: usize = 64;

const BEARER_MARKER: &str = "Bearer";

/// Why a header could not yield a plausible bearer token
#[derive(Debug, Error)]
pub enum TokenError {
    /// No header, no `Bearer` marker, or nothing following it
    #[error("token not supplied for authorization")]
    Missing,
    /// The token lacks a payload segment, or the payload is implausibly short
    #[error("payload segment missing or too short")]
    Malformed,
    /// The payload segment is not valid base64url
    #[error("bearer token payload is not base64url encoded")]
    PayloadEncoding(#[from] aliri_base64::InvalidBase64Data),
    /// The payload does not decode to a claims object
    #[error("bearer token payload is not a claims object")]
    PayloadClaims(#[from] serde_json::Error),
}

/// Extracts the bearer token from an `Authorization` header value
///
/// The header must contain the literal `Bearer`; the second
/// whitespace-separated item is taken as the token. This is a shallow
/// sanity check only: the token must have a payload segment of at least
/// [`MIN_PAYLOAD_SEGMENT_LEN`] characters.
///
/// # Errors
///
/// Returns [`TokenError::Missing`] if no token is present, or
/// [`TokenError::Malformed`] if it fails the sanity check.
pub fn extract_bearer(header: Option<&str>) -> Result<Jwt, TokenError> {
    let header = header
        .filter(|h| h.contains(BEARER_MARKER))
        .ok_or(TokenError::Missing)?;

    let candidate = header
        .split_whitespace()
        .nth(1)
        .ok_or(TokenError::Missing)?;

    match payload_segment(candidate) {
        Some(payload) if payload.len() >= MIN_PAYLOAD_SEGMENT_LEN => Ok(Jwt::from(candidate)),
        _ => Err(TokenError::Malformed),
    }
}

fn payload_segment(token: &str) -> Option<&str> {
    token.split('.').nth(1)
}

/// Claims read from a token payload without checking its signature
///
/// These values are untrusted; they only select which issuer to verify
/// against and which audiences to accept. A claim of an unexpected JSON
/// type is read as absent rather than failing the decode.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(from = "RawClaims")]
pub struct UnverifiedClaims {
    sub: Option<Subject>,
    iss: Option<Issuer>,
    aud: Audiences,
}

#[derive(Deserialize)]
struct RawClaims {
    #[serde(default)]
    sub: Value,
    #[serde(default)]
    iss: Value,
    #[serde(default)]
    aud: Value,
}

impl From<RawClaims> for UnverifiedClaims {
    fn from(raw: RawClaims) -> Self {
        let sub = match raw.sub {
            Value::String(s) => Some(Subject::new(s)),
            Value::Number(n) => Some(Subject::new(n.to_string())),
            _ => None,
        };

        let iss = match raw.iss {
            Value::String(s) => Some(Issuer::new(s)),
            _ => None,
        };

        let aud = match raw.aud {
            Value::String(s) => Audiences::from(Audience::new(s)),
            Value::Array(values) => values
                .into_iter()
                .filter_map(|v| match v {
                    Value::String(s) => Some(Audience::new(s)),
                    _ => None,
                })
                .collect::<Vec<_>>()
                .into(),
            _ => Audiences::empty(),
        };

        Self { sub, iss, aud }
    }
}

impl UnverifiedClaims {
    /// Decodes the payload segment of a token
    ///
    /// # Errors
    ///
    /// Returns an error if the token has no payload segment, or the payload
    /// is not base64url encoded JSON claims.
    pub fn decode(token: &JwtRef) -> Result<Self, TokenError> {
        let payload = payload_segment(token.as_str()).ok_or(TokenError::Malformed)?;
        let raw = Base64Url::from_encoded(payload)?;
        Ok(serde_json::from_slice(raw.as_slice())?)
    }

    /// The claimed subject, if present and non-empty
    pub fn subject(&self) -> Option<&SubjectRef> {
        self.sub.as_deref().filter(|s| !s.as_str().is_empty())
    }

    /// The claimed issuer, empty if absent
    pub fn issuer(&self) -> &IssuerRef {
        self.iss
            .as_deref()
            .unwrap_or_else(|| IssuerRef::from_str(""))
    }

    /// The claimed audiences
    pub fn audiences(&self) -> &Audiences {
        &self.aud
    }
}
