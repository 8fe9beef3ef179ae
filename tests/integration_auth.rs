use axum::http::StatusCode;
mod common;

#[tokio::test]
async fn test_auth_redirects_to_consent_page() {
    let app = common::TestApp::spawn().await;

    let resp = app.get("/auth").await;
    assert_eq!(resp.status(), StatusCode::FOUND);

    let location: reqwest::Url = common::location(&resp).parse().unwrap();
    assert_eq!(location.path(), "/api/oauth/authorize");

    let params: std::collections::HashMap<String, String> = location.query_pairs().into_owned().collect();
    assert_eq!(params["client_id"], common::CLIENT_ID);
    assert_eq!(params["redirect_uri"], common::REDIRECT_URI);
    assert_eq!(params["response_type"], "code");
    assert_eq!(params["scope"], "design:read profile:read");
}

#[tokio::test]
async fn test_unconfigured_client_disables_auth() {
    let app = common::TestApp::spawn_with(|config| config.canva.client_id = None).await;

    let resp = app.get("/auth").await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(resp.text().await.unwrap().contains("not configured"));

    let page = app.get("/").await.text().await.unwrap();
    assert!(!page.contains(r#"href="/auth""#));
    assert!(page.contains("CANVA_CLIENT_ID"));
}

#[tokio::test]
async fn test_callback_without_code_is_rejected() {
    let app = common::TestApp::spawn().await;

    let resp = app.get("/auth/callback").await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(resp.text().await.unwrap(), "Authorization code not provided");

    let resp = app.get("/auth/callback?code=").await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    assert!(app.provider.token_requests().is_empty());

    let resp = app.get("/profile").await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(common::location(&resp), "/auth");
}

#[tokio::test]
async fn test_callback_exchanges_code_once() {
    let app = common::TestApp::spawn().await;

    app.login().await;

    let requests = app.provider.token_requests();
    assert_eq!(requests.len(), 1);

    let form = &requests[0];
    assert_eq!(form["grant_type"], "authorization_code");
    assert_eq!(form["client_id"], common::CLIENT_ID);
    assert_eq!(form["client_secret"], common::CLIENT_SECRET);
    assert_eq!(form["redirect_uri"], common::REDIRECT_URI);
    assert_eq!(form["code"], "valid-code");

    let page = app.get("/").await.text().await.unwrap();
    assert!(page.contains(r#"href="/profile""#));
    assert!(page.contains(r#"href="/logout""#));
}

#[tokio::test]
async fn test_rejected_exchange_leaves_session_unauthenticated() {
    let app = common::TestApp::spawn().await;
    app.provider.fail_token_exchange(StatusCode::UNAUTHORIZED);

    let resp = app.get("/auth/callback?code=xyz").await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = resp.text().await.unwrap();
    assert_eq!(body, "Error during authentication");
    assert!(!body.contains(common::CLIENT_SECRET));

    // Exactly one attempt, no retries
    assert_eq!(app.provider.token_requests().len(), 1);

    let resp = app.get("/profile").await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(common::location(&resp), "/auth");
    assert!(app.provider.api_calls().is_empty());
}

#[tokio::test]
async fn test_unreachable_token_endpoint_is_internal_error() {
    let app = common::TestApp::spawn_with(|config| {
        config.canva.token_url = "http://127.0.0.1:9/rest/v1/oauth/token".to_string();
    })
    .await;

    let resp = app.get("/auth/callback?code=xyz").await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_logout_destroys_session() {
    let app = common::TestApp::spawn().await;
    app.login().await;

    let resp = app.get("/profile").await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app.get("/logout").await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(common::location(&resp), "/");

    let resp = app.get("/profile").await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(common::location(&resp), "/auth");

    // Logging out again is harmless
    let resp = app.get("/logout").await;
    assert_eq!(resp.status(), StatusCode::FOUND);
}

#[tokio::test]
async fn test_logout_with_stale_cookie_still_unauthenticated() {
    let app = common::TestApp::spawn().await;
    let client = common::cookieless_client();

    let resp = client.get(app.url("/")).send().await.unwrap();
    let cookie = common::session_cookie(&resp).unwrap();
    let cookie = cookie.split(';').next().unwrap().to_string();

    let resp = client
        .get(app.url("/auth/callback?code=valid-code"))
        .header("cookie", &cookie)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FOUND);

    client.get(app.url("/logout")).header("cookie", &cookie).send().await.unwrap();

    // Replaying the old cookie does not resurrect the tokens
    let resp = client.get(app.url("/designs")).header("cookie", &cookie).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(common::location(&resp), "/auth");
}

#[tokio::test]
async fn test_login_after_logout_issues_fresh_session() {
    let app = common::TestApp::spawn().await;
    let client = common::cookieless_client();

    let resp = client.get(app.url("/")).send().await.unwrap();
    let cookie = common::session_cookie(&resp).unwrap();
    let cookie = cookie.split(';').next().unwrap().to_string();

    client.get(app.url("/auth/callback?code=first")).header("cookie", &cookie).send().await.unwrap();
    client.get(app.url("/logout")).header("cookie", &cookie).send().await.unwrap();

    let resp = client
        .get(app.url("/auth/callback?code=second"))
        .header("cookie", &cookie)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(common::location(&resp), "/");
    assert_eq!(app.provider.token_requests().len(), 2);

    let fresh = common::session_cookie(&resp).expect("tokens should move to a new session");
    let fresh = fresh.split(';').next().unwrap().to_string();
    assert_ne!(fresh, cookie);

    let resp = client.get(app.url("/profile")).header("cookie", &fresh).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    // The logged-out id stays logged out
    let resp = client.get(app.url("/profile")).header("cookie", &cookie).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(common::location(&resp), "/auth");
}

#[tokio::test]
async fn test_browser_can_log_in_again_after_logout() {
    let app = common::TestApp::spawn().await;
    app.login().await;
    app.get("/logout").await;

    app.login().await;
    assert_eq!(app.get("/profile").await.status(), StatusCode::OK);
}
