//! End-to-end authorization code flow against the in-memory backend.
//!
//! Exercises the full engine the way an embedding HTTP server would:
//! client registration, authorization grant, PKCE-bound code exchange,
//! refresh rotation, reuse containment, and revocation.

use std::sync::Arc;

use mcpresso_oauth::error::AuthError;
use mcpresso_oauth::oauth::{AuthorizationRequest, TokenRequest};
use mcpresso_oauth::registry::{ClientRegistration, ClientRegistry};
use mcpresso_oauth::storage::RefreshTokenStorage;
use mcpresso_oauth::token::{RevocationRequest, RevocationService, TokenConfig, TokenService};
use mcpresso_oauth::types::{hash_token, Client, GrantType, User};
use mcpresso_oauth::{AuthorizationConfig, AuthorizationService, PkceChallenge, PkceVerifier};
use mcpresso_oauth_memory::MemoryStorage;
use time::{Duration, OffsetDateTime};

struct Harness {
    storage: Arc<MemoryStorage>,
    registry: ClientRegistry,
    authorization: AuthorizationService,
    tokens: Arc<TokenService>,
    revocation: RevocationService,
}

fn build_harness(authorization_config: AuthorizationConfig) -> Harness {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_test_writer()
        .try_init();

    let storage = Arc::new(MemoryStorage::new());
    let tokens = Arc::new(TokenService::new(
        storage.clone(),
        storage.clone(),
        TokenConfig::default(),
    ));
    let revocation = RevocationService::new(storage.clone(), storage.clone());
    let authorization = AuthorizationService::new(
        storage.clone(),
        storage.clone(),
        storage.clone(),
        revocation.clone(),
        tokens.clone(),
        authorization_config,
    );
    let registry = ClientRegistry::new(storage.clone());

    Harness {
        storage,
        registry,
        authorization,
        tokens,
        revocation,
    }
}

async fn setup() -> (Harness, Client) {
    let harness = build_harness(AuthorizationConfig::default());

    harness
        .storage
        .add_user(User {
            id: "alice".to_string(),
            username: "alice".to_string(),
            email: Some("alice@example.com".to_string()),
            password_hash: None,
            grantable_scopes: vec![],
            created_at: OffsetDateTime::now_utc(),
        })
        .await;

    let registered = harness
        .registry
        .register(ClientRegistration {
            name: "Demo App".to_string(),
            redirect_uris: vec!["https://app.example.com/callback".to_string()],
            scopes: vec!["read".to_string(), "write".to_string()],
            grant_types: vec![GrantType::AuthorizationCode, GrantType::RefreshToken],
            confidential: false,
            access_token_lifetime: None,
            refresh_token_lifetime: None,
        })
        .await
        .expect("client registration");

    (harness, registered.client)
}

fn authorization_request(client: &Client, challenge: &PkceChallenge) -> AuthorizationRequest {
    AuthorizationRequest {
        response_type: "code".to_string(),
        client_id: client.client_id.clone(),
        redirect_uri: "https://app.example.com/callback".to_string(),
        scope: "read write".to_string(),
        state: "xyz-state".to_string(),
        code_challenge: challenge.as_str().to_string(),
        code_challenge_method: "S256".to_string(),
    }
}

fn exchange_request(client: &Client, code: &str, verifier: &PkceVerifier) -> TokenRequest {
    TokenRequest {
        grant_type: "authorization_code".to_string(),
        code: Some(code.to_string()),
        redirect_uri: Some("https://app.example.com/callback".to_string()),
        code_verifier: Some(verifier.as_str().to_string()),
        client_id: Some(client.client_id.clone()),
        client_secret: None,
        refresh_token: None,
        scope: None,
    }
}

fn refresh_request(client: &Client, token: &str, scope: Option<&str>) -> TokenRequest {
    TokenRequest {
        grant_type: "refresh_token".to_string(),
        code: None,
        redirect_uri: None,
        code_verifier: None,
        client_id: Some(client.client_id.clone()),
        client_secret: None,
        refresh_token: Some(token.to_string()),
        scope: scope.map(String::from),
    }
}

#[tokio::test]
async fn full_flow_grant_exchange_refresh() {
    let (harness, client) = setup().await;
    let verifier = PkceVerifier::generate();
    let challenge = PkceChallenge::from_verifier(&verifier);

    // Grant
    let grant = harness
        .authorization
        .authorize(&authorization_request(&client, &challenge), "alice")
        .await
        .expect("authorization grant");
    assert_eq!(grant.state, "xyz-state");

    let redirect = grant
        .to_redirect_url("https://app.example.com/callback")
        .unwrap();
    assert!(redirect.contains("code="));
    assert!(redirect.contains("state=xyz-state"));

    // Exchange
    let pair = harness
        .authorization
        .exchange_code(&exchange_request(&client, &grant.code, &verifier), &client)
        .await
        .expect("code exchange");
    assert_eq!(pair.token_type, "Bearer");
    assert_eq!(pair.expires_in, 3600);
    assert_eq!(pair.scope, "read write");

    // The access token validates and introspects
    let record = harness
        .tokens
        .validate_access_token(&pair.access_token)
        .await
        .expect("valid access token");
    assert_eq!(record.user_id, "alice");
    assert_eq!(record.client_id, client.client_id);

    let introspection = harness.tokens.introspect(&pair.access_token).await.unwrap();
    assert!(introspection.active);
    assert_eq!(introspection.sub.as_deref(), Some("alice"));

    // Refresh rotates
    let old_refresh = pair.refresh_token.expect("refresh token issued");
    let refreshed = harness
        .tokens
        .refresh(&refresh_request(&client, &old_refresh, None), &client)
        .await
        .expect("refresh");
    assert_ne!(refreshed.access_token, pair.access_token);
    assert_ne!(refreshed.refresh_token.as_ref().unwrap(), &old_refresh);
}

#[tokio::test]
async fn code_is_single_use_and_replay_revokes_tokens() {
    let (harness, client) = setup().await;
    let verifier = PkceVerifier::generate();
    let challenge = PkceChallenge::from_verifier(&verifier);

    let grant = harness
        .authorization
        .authorize(&authorization_request(&client, &challenge), "alice")
        .await
        .unwrap();

    let pair = harness
        .authorization
        .exchange_code(&exchange_request(&client, &grant.code, &verifier), &client)
        .await
        .unwrap();

    // Replay fails
    let result = harness
        .authorization
        .exchange_code(&exchange_request(&client, &grant.code, &verifier), &client)
        .await;
    assert!(matches!(result, Err(AuthError::InvalidGrant { .. })));

    // ...and the refresh token from the first exchange is dead
    let refresh = pair.refresh_token.unwrap();
    let stored = RefreshTokenStorage::find_by_hash(harness.storage.as_ref(), &hash_token(&refresh))
        .await
        .unwrap()
        .unwrap();
    assert!(stored.is_revoked());
}

#[tokio::test]
async fn wrong_verifier_is_rejected() {
    let (harness, client) = setup().await;
    let verifier = PkceVerifier::generate();
    let challenge = PkceChallenge::from_verifier(&verifier);

    let grant = harness
        .authorization
        .authorize(&authorization_request(&client, &challenge), "alice")
        .await
        .unwrap();

    let wrong_verifier = PkceVerifier::generate();
    let result = harness
        .authorization
        .exchange_code(
            &exchange_request(&client, &grant.code, &wrong_verifier),
            &client,
        )
        .await;
    assert!(matches!(result, Err(AuthError::InvalidGrant { .. })));
}

#[tokio::test]
async fn plain_challenge_method_is_rejected() {
    let (harness, client) = setup().await;
    let verifier = PkceVerifier::generate();
    let challenge = PkceChallenge::from_verifier(&verifier);

    let mut request = authorization_request(&client, &challenge);
    request.code_challenge_method = "plain".to_string();

    let result = harness.authorization.authorize(&request, "alice").await;
    assert!(matches!(result, Err(AuthError::InvalidRequest { .. })));
}

#[tokio::test]
async fn redirect_uri_must_match_byte_exactly() {
    let (harness, client) = setup().await;
    let verifier = PkceVerifier::generate();
    let challenge = PkceChallenge::from_verifier(&verifier);

    let grant = harness
        .authorization
        .authorize(&authorization_request(&client, &challenge), "alice")
        .await
        .unwrap();

    // Trailing slash is a different URI
    let mut request = exchange_request(&client, &grant.code, &verifier);
    request.redirect_uri = Some("https://app.example.com/callback/".to_string());

    let result = harness.authorization.exchange_code(&request, &client).await;
    assert!(matches!(result, Err(AuthError::InvalidGrant { .. })));
}

#[tokio::test]
async fn expired_code_is_rejected() {
    let harness = build_harness(
        AuthorizationConfig::new().with_code_lifetime(Duration::seconds(-1)),
    );
    harness
        .storage
        .add_user(User {
            id: "alice".to_string(),
            username: "alice".to_string(),
            email: None,
            password_hash: None,
            grantable_scopes: vec![],
            created_at: OffsetDateTime::now_utc(),
        })
        .await;
    let registered = harness
        .registry
        .register(ClientRegistration {
            name: "Demo App".to_string(),
            redirect_uris: vec!["https://app.example.com/callback".to_string()],
            scopes: vec![],
            grant_types: vec![GrantType::AuthorizationCode, GrantType::RefreshToken],
            confidential: false,
            access_token_lifetime: None,
            refresh_token_lifetime: None,
        })
        .await
        .unwrap();
    let client = registered.client;

    let verifier = PkceVerifier::generate();
    let challenge = PkceChallenge::from_verifier(&verifier);
    let mut request = authorization_request(&client, &challenge);
    request.scope = "read".to_string();

    let grant = harness.authorization.authorize(&request, "alice").await.unwrap();

    let result = harness
        .authorization
        .exchange_code(&exchange_request(&client, &grant.code, &verifier), &client)
        .await;
    assert!(matches!(result, Err(AuthError::InvalidGrant { .. })));
}

#[tokio::test]
async fn refresh_reuse_kills_the_family() {
    let (harness, client) = setup().await;
    let verifier = PkceVerifier::generate();
    let challenge = PkceChallenge::from_verifier(&verifier);

    let grant = harness
        .authorization
        .authorize(&authorization_request(&client, &challenge), "alice")
        .await
        .unwrap();
    let pair = harness
        .authorization
        .exchange_code(&exchange_request(&client, &grant.code, &verifier), &client)
        .await
        .unwrap();

    // Rotation chain: t0 -> t1 -> t2
    let t0 = pair.refresh_token.unwrap();
    let r1 = harness
        .tokens
        .refresh(&refresh_request(&client, &t0, None), &client)
        .await
        .unwrap();
    let t1 = r1.refresh_token.unwrap();
    let r2 = harness
        .tokens
        .refresh(&refresh_request(&client, &t1, None), &client)
        .await
        .unwrap();
    let t2 = r2.refresh_token.unwrap();

    // An attacker replays t0: theft detected, the whole family dies
    let result = harness
        .tokens
        .refresh(&refresh_request(&client, &t0, None), &client)
        .await;
    assert!(matches!(result, Err(AuthError::TokenReuseDetected)));

    // The current token t2 no longer works either
    let result = harness
        .tokens
        .refresh(&refresh_request(&client, &t2, None), &client)
        .await;
    assert!(matches!(result, Err(AuthError::TokenReuseDetected)));
}

#[tokio::test]
async fn refresh_scope_narrowing_and_expansion() {
    let (harness, client) = setup().await;
    let verifier = PkceVerifier::generate();
    let challenge = PkceChallenge::from_verifier(&verifier);

    let grant = harness
        .authorization
        .authorize(&authorization_request(&client, &challenge), "alice")
        .await
        .unwrap();
    let pair = harness
        .authorization
        .exchange_code(&exchange_request(&client, &grant.code, &verifier), &client)
        .await
        .unwrap();
    let token = pair.refresh_token.unwrap();

    // Narrowing is allowed
    let narrowed = harness
        .tokens
        .refresh(&refresh_request(&client, &token, Some("read")), &client)
        .await
        .unwrap();
    assert_eq!(narrowed.scope, "read");

    // Expansion past the original grant is not
    let token = narrowed.refresh_token.unwrap();
    let result = harness
        .tokens
        .refresh(
            &refresh_request(&client, &token, Some("read write admin")),
            &client,
        )
        .await;
    assert!(matches!(result, Err(AuthError::InvalidScope { .. })));
}

#[tokio::test]
async fn revocation_endpoint_flow() {
    let (harness, client) = setup().await;
    let verifier = PkceVerifier::generate();
    let challenge = PkceChallenge::from_verifier(&verifier);

    let grant = harness
        .authorization
        .authorize(&authorization_request(&client, &challenge), "alice")
        .await
        .unwrap();
    let pair = harness
        .authorization
        .exchange_code(&exchange_request(&client, &grant.code, &verifier), &client)
        .await
        .unwrap();

    // Revoke the refresh token; the family goes with it
    harness
        .revocation
        .revoke(
            &RevocationRequest {
                token: pair.refresh_token.clone().unwrap(),
                token_type_hint: None,
            },
            &client.client_id,
        )
        .await
        .unwrap();

    let result = harness
        .tokens
        .refresh(
            &refresh_request(&client, pair.refresh_token.as_ref().unwrap(), None),
            &client,
        )
        .await;
    assert!(matches!(result, Err(AuthError::TokenReuseDetected)));

    // ...including the access token minted alongside it
    let result = harness.tokens.validate_access_token(&pair.access_token).await;
    assert!(matches!(result, Err(AuthError::InvalidGrant { .. })));

    // Standalone access token revocation is immediate
    let standalone = harness
        .tokens
        .issue_access_token(&client, "alice", "read")
        .await
        .unwrap();
    harness
        .revocation
        .revoke(
            &RevocationRequest {
                token: standalone.access_token.clone(),
                token_type_hint: None,
            },
            &client.client_id,
        )
        .await
        .unwrap();

    let result = harness
        .tokens
        .validate_access_token(&standalone.access_token)
        .await;
    assert!(matches!(result, Err(AuthError::InvalidGrant { .. })));

    let introspection = harness
        .tokens
        .introspect(&standalone.access_token)
        .await
        .unwrap();
    assert!(!introspection.active);
}

#[tokio::test]
async fn confidential_client_authentication() {
    let (harness, _) = setup().await;

    let registered = harness
        .registry
        .register(ClientRegistration {
            name: "Backend Service".to_string(),
            redirect_uris: vec!["https://service.example.com/cb".to_string()],
            scopes: vec![],
            grant_types: vec![GrantType::AuthorizationCode, GrantType::RefreshToken],
            confidential: true,
            access_token_lifetime: None,
            refresh_token_lifetime: None,
        })
        .await
        .unwrap();
    let secret = registered.client_secret.expect("secret returned once");

    let client = harness
        .registry
        .authenticate(&registered.client.client_id, Some(&secret))
        .await
        .expect("authentication with correct secret");
    assert_eq!(client.client_id, registered.client.client_id);

    let result = harness
        .registry
        .authenticate(&registered.client.client_id, Some("wrong"))
        .await;
    assert!(matches!(result, Err(AuthError::InvalidClient { .. })));
}
