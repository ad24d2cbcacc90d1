use aliri::jwt::{self, Audience, Audiences, Issuer, IssuerRef, Subject, SubjectRef};
use aliri_braid::braid;
use aliri_clock::{Clock, System, UnixTime};
use serde::{Deserialize, Serialize};

/// An OAuth2 client identifier
#[braid(serde)]
pub struct ClientId;

/// Claims carried by an access token
///
/// Beyond the registered claims, this holds the client identifier (`cid`),
/// user identifier (`uid`), and granted scopes (`scp`) as issued by Okta-style
/// authorization servers.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[must_use]
pub struct AccessTokenClaims {
    #[serde(default, skip_serializing_if = "Audiences::is_empty")]
    aud: Audiences,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    iss: Option<Issuer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sub: Option<Subject>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    exp: Option<UnixTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    nbf: Option<UnixTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    iat: Option<UnixTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    cid: Option<ClientId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    uid: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    scp: Vec<String>,
}

impl AccessTokenClaims {
    /// An empty set of claims
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the audience
    pub fn with_audience(mut self, aud: impl Into<Audience>) -> Self {
        self.aud = Audiences::single(aud);
        self
    }

    /// Sets the issuer
    pub fn with_issuer(mut self, iss: impl Into<Issuer>) -> Self {
        self.iss = Some(iss.into());
        self
    }

    /// Sets the subject
    pub fn with_subject(mut self, sub: impl Into<Subject>) -> Self {
        self.sub = Some(sub.into());
        self
    }

    /// Sets the client identifier
    pub fn with_client_id(mut self, cid: impl Into<ClientId>) -> Self {
        self.cid = Some(cid.into());
        self
    }

    /// Sets the expiration to a number of seconds from now
    pub fn with_future_expiration(mut self, secs: u64) -> Self {
        let n = System.now();
        self.exp = Some(UnixTime(n.0 + secs));
        self
    }

    /// Sets the expiration
    pub fn with_expiration(mut self, time: UnixTime) -> Self {
        self.exp = Some(time);
        self
    }

    /// The client identifier (`cid`) the token was issued to
    pub fn client_id(&self) -> Option<&ClientIdRef> {
        self.cid.as_deref()
    }

    /// The user identifier (`uid`), if the token was issued on behalf of a user
    pub fn user_id(&self) -> Option<&str> {
        self.uid.as_deref()
    }

    /// The scopes (`scp`) granted to the token
    pub fn scopes(&self) -> &[String] {
        &self.scp
    }

    /// The time the token was issued
    pub fn issued_at(&self) -> Option<UnixTime> {
        self.iat
    }
}

impl jwt::CoreClaims for AccessTokenClaims {
    #[inline]
    fn nbf(&self) -> Option<UnixTime> {
        self.nbf
    }

    #[inline]
    fn exp(&self) -> Option<UnixTime> {
        self.exp
    }

    #[inline]
    fn aud(&self) -> &Audiences {
        &self.aud
    }

    #[inline]
    fn iss(&self) -> Option<&IssuerRef> {
        self.iss.as_deref()
    }

    #[inline]
    fn sub(&self) -> Option<&SubjectRef> {
        self.sub.as_deref()
    }
}
