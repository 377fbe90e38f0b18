//! Handshake tests against a mock OAuth server

use super::*;
use crate::error::Error;
use pretty_assertions::assert_eq;
use wiremock::matchers::{header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn consumer_credentials() -> Credentials {
    Credentials::consumer("test-consumer-key", "test-consumer-secret")
}

#[tokio::test]
async fn test_begin_handshake_returns_authorization_request() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth/request_token"))
        .and(header_exists("authorization"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "oauth_token=req-token&oauth_token_secret=req-secret&oauth_callback_confirmed=true",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let session = OauthSession::new(consumer_credentials())
        .with_endpoints(OauthEndpoints::with_base(&server.uri()));

    let request = session
        .begin_handshake("https://example.com/callback")
        .await
        .unwrap();

    assert_eq!(request.request_token, "req-token");
    assert_eq!(request.request_token_secret, "req-secret");
    assert!(request.callback_confirmed);
    assert_eq!(
        request.authorization_url,
        format!("{}/oauth/authorize?oauth_token=req-token", server.uri())
    );
}

#[tokio::test]
async fn test_begin_handshake_rejected_consumer() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth/request_token"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Invalid consumer"))
        .expect(1)
        .mount(&server)
        .await;

    let session = OauthSession::new(consumer_credentials())
        .with_endpoints(OauthEndpoints::with_base(&server.uri()));

    let err = session
        .begin_handshake("https://example.com/callback")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Auth { .. }));
}

#[tokio::test]
async fn test_begin_handshake_missing_token_field() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth/request_token"))
        .respond_with(ResponseTemplate::new(200).set_body_string("oauth_token_secret=only-secret"))
        .mount(&server)
        .await;

    let session = OauthSession::new(consumer_credentials())
        .with_endpoints(OauthEndpoints::with_base(&server.uri()));

    let err = session
        .begin_handshake("https://example.com/callback")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Auth { .. }));
}

#[tokio::test]
async fn test_complete_handshake_yields_user_credentials() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth/access_token"))
        .and(header_exists("authorization"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "oauth_token=access-token&oauth_token_secret=access-secret&user_id=42&screen_name=tester",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let session = OauthSession::new(consumer_credentials().with_bearer("app-bearer"))
        .with_endpoints(OauthEndpoints::with_base(&server.uri()));

    let request = AuthorizationRequest {
        request_token: "req-token".to_string(),
        request_token_secret: "req-secret".to_string(),
        authorization_url: format!("{}/oauth/authorize?oauth_token=req-token", server.uri()),
        callback_url: "https://example.com/callback".to_string(),
        callback_confirmed: true,
    };

    let credentials = session
        .complete_handshake(&request, "verifier-pin")
        .await
        .unwrap();

    assert!(credentials.has_user_context());
    assert_eq!(credentials.access_token(), Some("access-token"));
    assert_eq!(credentials.access_token_secret(), Some("access-secret"));
    // the app bearer carries over into the new credential set
    assert_eq!(credentials.bearer_token(), Some("app-bearer"));
}

#[tokio::test]
async fn test_complete_handshake_invalid_verifier() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth/access_token"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Invalid verifier"))
        .expect(1)
        .mount(&server)
        .await;

    let session = OauthSession::new(consumer_credentials())
        .with_endpoints(OauthEndpoints::with_base(&server.uri()));

    let request = AuthorizationRequest {
        request_token: "req-token".to_string(),
        request_token_secret: "req-secret".to_string(),
        authorization_url: format!("{}/oauth/authorize?oauth_token=req-token", server.uri()),
        callback_url: "https://example.com/callback".to_string(),
        callback_confirmed: true,
    };

    let err = session
        .complete_handshake(&request, "wrong-pin")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Auth { .. }));
}

#[tokio::test]
async fn test_invalidate_access_token() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/1.1/oauth/invalidate_token"))
        .and(header_exists("authorization"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"access_token\":\"at\"}"))
        .expect(1)
        .mount(&server)
        .await;

    let session = OauthSession::new(Credentials::oauth1("ck", "cs", "at", "ats"))
        .with_endpoints(OauthEndpoints::with_base(&server.uri()));

    session.invalidate_access_token().await.unwrap();
}
