//! Verification against an identity provider served by wiremock.

use aliri::{
    jwa, jwk,
    jwt::{self, Audiences},
    Jwk, Jwks, Jwt, JwtRef,
};
use aliri_base64::Base64UrlRef;
use aliri_clock::UnixTime;
use color_eyre::Result;
use tollgate_oidc::{
    AccessTokenClaims, AccessTokenVerifier, ClientId, IssuerPolicy, OidcVerifier, VerifierConfig,
    VerifyError,
};
use tracing_test::traced_test;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const KEY_ID: &str = "test-key";
const AUDIENCE: &str = "api://default";

fn signing_key(kid: &'static str) -> Jwk {
    let secret = Base64UrlRef::from_slice(b"shared secret for the test provider").to_owned();
    Jwk::from(jwa::Hmac::new(secret))
        .with_algorithm(jwa::Algorithm::HS256)
        .with_key_id(jwk::KeyId::from_static(kid))
}

fn sign(kid: &'static str, claims: &AccessTokenClaims) -> Result<Jwt> {
    let headers =
        jwt::BasicHeaders::with_key_id(jwa::Algorithm::HS256, jwk::KeyId::from_static(kid));
    Ok(Jwt::try_from_parts_with_signature(
        &headers,
        claims,
        &signing_key(kid),
    )?)
}

fn claims_for(issuer: &str) -> AccessTokenClaims {
    AccessTokenClaims::new()
        .with_issuer(jwt::Issuer::new(issuer.to_owned()))
        .with_audience(jwt::Audience::from_static(AUDIENCE))
        .with_subject(jwt::Subject::from_static("u1"))
        .with_client_id(ClientId::from_static("client-42"))
        .with_future_expiration(300)
}

fn audiences() -> Audiences {
    Audiences::single(jwt::Audience::from_static(AUDIENCE))
}

fn local_verifier() -> Result<OidcVerifier> {
    let config = VerifierConfig::default()
        .with_issuer_policy(IssuerPolicy::default().allow_insecure())
        .with_approved_algorithms([jwa::Algorithm::HS256]);
    Ok(OidcVerifier::new(config)?)
}

/// Serves a discovery document naming `discovered_issuer` and a key set
/// holding the test key.
async fn mount_provider(server: &MockServer, discovered_issuer: &str) {
    let mut jwks = Jwks::default();
    jwks.add_key(signing_key(KEY_ID));

    Mock::given(method("GET"))
        .and(path("/.well-known/openid-configuration"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "issuer": discovered_issuer,
            "jwks_uri": format!("{}/v1/keys", server.uri()),
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/keys"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&jwks))
        .mount(server)
        .await;
}

#[tokio::test]
async fn verifies_token_through_discovered_keys() -> Result<()> {
    let server = MockServer::start().await;
    let issuer = server.uri();
    mount_provider(&server, &issuer).await;

    let token = sign(KEY_ID, &claims_for(&issuer))?;
    let claims = local_verifier()?
        .verify_access_token(jwt::IssuerRef::from_str(&issuer), &token, &audiences())
        .await?;

    assert_eq!(claims.client_id().map(|c| c.as_str()), Some("client-42"));
    Ok(())
}

#[tokio::test]
async fn rejects_token_for_unexpected_audience() -> Result<()> {
    let server = MockServer::start().await;
    let issuer = server.uri();
    mount_provider(&server, &issuer).await;

    let token = sign(KEY_ID, &claims_for(&issuer))?;
    let other = Audiences::single(jwt::Audience::from_static("api://other"));
    let err = local_verifier()?
        .verify_access_token(jwt::IssuerRef::from_str(&issuer), &token, &other)
        .await
        .unwrap_err();

    assert!(matches!(err, VerifyError::JwtVerifyError(_)), "{err:?}");
    Ok(())
}

#[tokio::test]
async fn rejects_expired_token() -> Result<()> {
    let server = MockServer::start().await;
    let issuer = server.uri();
    mount_provider(&server, &issuer).await;

    let token = sign(
        KEY_ID,
        &claims_for(&issuer).with_expiration(UnixTime(1_000)),
    )?;
    let err = local_verifier()?
        .verify_access_token(jwt::IssuerRef::from_str(&issuer), &token, &audiences())
        .await
        .unwrap_err();

    assert!(matches!(err, VerifyError::JwtVerifyError(_)), "{err:?}");
    Ok(())
}

#[tokio::test]
async fn rejects_token_signed_by_unpublished_key() -> Result<()> {
    let server = MockServer::start().await;
    let issuer = server.uri();
    mount_provider(&server, &issuer).await;

    let token = sign("rotated-away", &claims_for(&issuer))?;
    let err = local_verifier()?
        .verify_access_token(jwt::IssuerRef::from_str(&issuer), &token, &audiences())
        .await
        .unwrap_err();

    assert!(matches!(err, VerifyError::UnknownKeyId), "{err:?}");
    Ok(())
}

#[tokio::test]
#[traced_test]
async fn reports_key_set_outage_as_discovery_failure() -> Result<()> {
    let server = MockServer::start().await;
    let issuer = server.uri();

    Mock::given(method("GET"))
        .and(path("/.well-known/openid-configuration"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "issuer": issuer,
            "jwks_uri": format!("{}/v1/keys", server.uri()),
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/keys"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let token = sign(KEY_ID, &claims_for(&issuer))?;
    let err = local_verifier()?
        .verify_access_token(jwt::IssuerRef::from_str(&issuer), &token, &audiences())
        .await
        .unwrap_err();

    assert!(matches!(err, VerifyError::Discovery(_)), "{err:?}");
    assert!(logs_contain("JWKS fetch failed"));
    assert!(logs_contain("http.status_code=503"));
    Ok(())
}

#[tokio::test]
#[traced_test]
async fn rejects_discovery_document_for_another_issuer() -> Result<()> {
    let server = MockServer::start().await;
    let issuer = server.uri();
    mount_provider(&server, "https://impostor.example.com").await;

    let token = sign(KEY_ID, &claims_for(&issuer))?;
    let err = local_verifier()?
        .verify_access_token(jwt::IssuerRef::from_str(&issuer), &token, &audiences())
        .await
        .unwrap_err();

    assert!(matches!(err, VerifyError::IssuerMismatch { .. }), "{err:?}");
    assert!(logs_contain("discovery document names a different issuer"));
    assert!(logs_contain("https://impostor.example.com"));
    Ok(())
}

#[tokio::test]
async fn reports_unreachable_discovery_as_discovery_failure() -> Result<()> {
    let server = MockServer::start().await;
    let issuer = server.uri();

    Mock::given(method("GET"))
        .and(path("/.well-known/openid-configuration"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let token = sign(KEY_ID, &claims_for(&issuer))?;
    let err = local_verifier()?
        .verify_access_token(jwt::IssuerRef::from_str(&issuer), &token, &audiences())
        .await
        .unwrap_err();

    assert!(matches!(err, VerifyError::Discovery(_)), "{err:?}");
    Ok(())
}

#[tokio::test]
async fn never_contacts_insecure_issuer_by_default() -> Result<()> {
    let server = MockServer::start().await;
    let issuer = server.uri();

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let token = sign(KEY_ID, &claims_for(&issuer))?;
    let verifier = OidcVerifier::new(
        VerifierConfig::default().with_approved_algorithms([jwa::Algorithm::HS256]),
    )?;
    let err = verifier
        .verify_access_token(jwt::IssuerRef::from_str(&issuer), &token, &audiences())
        .await
        .unwrap_err();

    assert!(matches!(err, VerifyError::UntrustedIssuer { .. }), "{err:?}");
    Ok(())
}

#[tokio::test]
async fn never_contacts_issuer_outside_allow_list() -> Result<()> {
    let server = MockServer::start().await;
    let issuer = server.uri();

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let config = VerifierConfig::default()
        .with_issuer_policy(
            IssuerPolicy::default()
                .allow_insecure()
                .allow_issuer(jwt::Issuer::from_static("http://trusted.example.com")),
        )
        .with_approved_algorithms([jwa::Algorithm::HS256]);
    let token = sign(KEY_ID, &claims_for(&issuer))?;
    let err = OidcVerifier::new(config)?
        .verify_access_token(jwt::IssuerRef::from_str(&issuer), &token, &audiences())
        .await
        .unwrap_err();

    assert!(matches!(err, VerifyError::UntrustedIssuer { .. }), "{err:?}");
    Ok(())
}

#[tokio::test]
async fn refuses_to_verify_without_expected_audience() -> Result<()> {
    let server = MockServer::start().await;
    let issuer = server.uri();
    mount_provider(&server, &issuer).await;

    let err = local_verifier()?
        .verify_access_token(
            jwt::IssuerRef::from_str(&issuer),
            JwtRef::from_str("a.b.c"),
            &Audiences::default(),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, VerifyError::MissingAudience), "{err:?}");
    Ok(())
}
