//! Session bootstrap integration tests
//!
//! Login, user lookup, notices and navigation against a mocked backend.

use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;
use pretty_assertions::assert_eq;
use projet_client::client::token_store::{PreferenceChange, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};
use projet_client::client::{
    ApiError, BootstrapError, LoginOutcome, Preferences, Screen, SessionError, SessionState,
};
use projet_client::shared::{Credentials, SessionTokens, SignupRequest};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, ResponseTemplate};

use crate::common::{login_body, user_body, RecordingPreferences, TestBackend};

fn alice() -> Credentials {
    Credentials::new("alice", "secret1")
}

fn signup_form() -> SignupRequest {
    SignupRequest {
        firstname: "Bob".to_string(),
        lastname: "Durand".to_string(),
        username: "bob".to_string(),
        email: "bob@example.com".to_string(),
        password: "hunter22".to_string(),
        confirm_password: "hunter22".to_string(),
    }
}

#[tokio::test]
async fn test_login_happy_path() {
    let backend = TestBackend::start().await;
    backend.mock_alice().await;
    let prefs = Arc::new(RecordingPreferences::new());
    let mut session = backend.session(prefs.clone());

    let user = crate::assert_ok!(session.login(alice()).await);

    assert_eq!(user.id, "u1");
    assert_eq!(user.username, "alice");
    assert_matches!(session.state(), SessionState::LoggedIn(u) if u.id == "u1");
    assert_eq!(session.current_screen(), Screen::Home);
    assert!(!session.is_login_pending());

    assert_eq!(prefs.edit_count(), 1);
    assert_eq!(
        prefs.edits()[0],
        vec![
            PreferenceChange::put(ACCESS_TOKEN_KEY, "AT1"),
            PreferenceChange::put(REFRESH_TOKEN_KEY, "RT1"),
        ]
    );
    assert_eq!(prefs.get(ACCESS_TOKEN_KEY).as_deref(), Some("AT1"));
    assert_eq!(prefs.get(REFRESH_TOKEN_KEY).as_deref(), Some("RT1"));

    let notices = session.take_notices();
    crate::assert_notice!(notices, "Login Successful!");
    crate::assert_notice!(notices, "Welcome alice!");
}

#[tokio::test]
async fn test_login_rejected_leaves_store_untouched() {
    let backend = TestBackend::start().await;
    backend
        .mock_login(
            "alice",
            "wrong",
            ResponseTemplate::new(401).set_body_string("Invalid credentials"),
        )
        .await;
    backend.forbid_user_detail("u1").await;
    let prefs = Arc::new(RecordingPreferences::new());
    let mut session = backend.session(prefs.clone());

    let result = session.login(Credentials::new("alice", "wrong")).await;

    crate::assert_err!(
        result,
        SessionError::Bootstrap(BootstrapError::Login(ApiError::HttpError { status: 401, .. }))
    );
    assert_eq!(session.state(), &SessionState::LoggedOut);
    assert_eq!(session.current_screen(), Screen::Login);
    assert_eq!(prefs.edit_count(), 0);
    assert!(session.stored_tokens().is_none());

    let notices = session.take_notices();
    crate::assert_notice!(notices, "Login Failed: Invalid credentials");
}

#[tokio::test]
async fn test_user_detail_failure_keeps_tokens() {
    let backend = TestBackend::start().await;
    backend
        .mock_login(
            "alice",
            "secret1",
            ResponseTemplate::new(200).set_body_json(login_body("AT1", "RT1", "u1", "alice")),
        )
        .await;
    backend
        .mock_user_detail("u1", "AT1", ResponseTemplate::new(404).set_body_string("Not found"))
        .await;
    let prefs = Arc::new(RecordingPreferences::new());
    let mut session = backend.session(prefs.clone());

    let result = session.login(alice()).await;

    match result {
        Err(SessionError::Bootstrap(BootstrapError::UserDetail(error))) => {
            assert!(error.is_not_found());
        }
        other => panic!("Expected user detail failure, got {:?}", other),
    }
    assert_eq!(session.state(), &SessionState::LoggedOut);
    assert_eq!(session.current_screen(), Screen::Login);
    assert_eq!(prefs.edit_count(), 1);

    let tokens = session.stored_tokens().expect("tokens were saved");
    assert_eq!(tokens.access_token, "AT1");
    assert_eq!(tokens.refresh_token, "RT1");

    let notices = session.take_notices();
    crate::assert_notice!(notices, "Login Successful!");
    crate::assert_notice!(notices, "Failed to fetch user details");
}

#[tokio::test]
async fn test_login_timeout_reported_once() {
    let backend = TestBackend::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(login_body("AT1", "RT1", "u1", "alice"))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&backend.server)
        .await;
    let prefs = Arc::new(RecordingPreferences::new());
    let mut session = backend.session_with_timeout(prefs.clone(), Duration::from_millis(200));

    crate::assert_ok!(session.submit_login(alice()));
    let outcome = session.next_outcome().await;

    match outcome {
        Some(LoginOutcome::Failed(BootstrapError::Login(ApiError::NetworkError { message }))) => {
            assert!(message.contains("timed out"), "unexpected message: {}", message);
        }
        other => panic!("Expected a network error, got {:?}", other),
    }
    assert!(session.poll().is_none());
    assert!(session.next_outcome().await.is_none());
    assert_eq!(session.state(), &SessionState::LoggedOut);
    assert_eq!(prefs.edit_count(), 0);

    let notices = session.take_notices();
    assert_eq!(notices.len(), 1);
    assert!(notices[0].message.starts_with("Error: "));
}

#[tokio::test]
async fn test_empty_login_body() {
    let backend = TestBackend::start().await;
    backend.mock_login("alice", "secret1", ResponseTemplate::new(200)).await;
    backend.forbid_user_detail("u1").await;
    let prefs = Arc::new(RecordingPreferences::new());
    let mut session = backend.session(prefs.clone());

    let result = session.login(alice()).await;

    crate::assert_err!(
        result,
        SessionError::Bootstrap(BootstrapError::Login(ApiError::EmptyResponseBody))
    );
    assert_eq!(prefs.edit_count(), 0);
    crate::assert_notice!(session.take_notices(), "Login response is empty");
}

#[tokio::test]
async fn test_second_submit_refused_while_in_flight() {
    let backend = TestBackend::start().await;
    backend.mock_alice().await;
    let prefs = Arc::new(RecordingPreferences::new());
    let mut session = backend.session(prefs.clone());

    crate::assert_ok!(session.submit_login(alice()));
    crate::assert_err!(session.submit_login(alice()), SessionError::LoginInFlight);
    assert!(session.is_login_pending());

    let outcome = session.next_outcome().await;
    assert_matches!(outcome, Some(LoginOutcome::LoggedIn(_)));

    crate::assert_err!(session.submit_login(alice()), SessionError::AlreadyLoggedIn);
    assert_eq!(prefs.edit_count(), 1);
}

#[tokio::test]
async fn test_blank_credentials_rejected_locally() {
    let backend = TestBackend::start().await;
    let prefs = Arc::new(RecordingPreferences::new());
    let mut session = backend.session(prefs.clone());

    crate::assert_err!(
        session.submit_login(Credentials::new("  ", "secret1")),
        SessionError::Validation(_)
    );
    assert!(!session.is_login_pending());
    crate::assert_notice!(session.take_notices(), "Username and password are required");

    let received = backend.server.received_requests().await.unwrap_or_default();
    assert!(received.is_empty());
}

#[tokio::test]
async fn test_navigating_away_abandons_login() {
    let backend = TestBackend::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(login_body("AT1", "RT1", "u1", "alice"))
                .set_delay(Duration::from_millis(500)),
        )
        .expect(0..=1)
        .mount(&backend.server)
        .await;
    backend.forbid_user_detail("u1").await;
    let prefs = Arc::new(RecordingPreferences::new());
    let mut session = backend.session(prefs.clone());

    crate::assert_ok!(session.submit_login(alice()));
    session.navigate(Screen::Register);

    assert!(!session.is_login_pending());
    assert_eq!(session.current_screen(), Screen::Register);

    tokio::time::sleep(Duration::from_millis(800)).await;

    assert!(session.poll().is_none());
    assert_eq!(session.state(), &SessionState::LoggedOut);
    assert_eq!(prefs.edit_count(), 0);
}

#[tokio::test]
async fn test_navigating_away_while_loading_user() {
    let backend = TestBackend::start().await;
    backend
        .mock_login(
            "alice",
            "secret1",
            ResponseTemplate::new(200).set_body_json(login_body("AT1", "RT1", "u1", "alice")),
        )
        .await;
    Mock::given(method("GET"))
        .and(path("/auth/u1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(user_body("u1", "alice"))
                .set_delay(Duration::from_millis(500)),
        )
        .expect(0..=1)
        .mount(&backend.server)
        .await;
    let prefs = Arc::new(RecordingPreferences::new());
    let mut session = backend.session(prefs.clone());

    crate::assert_ok!(session.submit_login(alice()));
    for _ in 0..200 {
        assert!(session.poll().is_none());
        if matches!(session.state(), SessionState::AwaitingUserDetail { .. }) {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert_matches!(session.state(), SessionState::AwaitingUserDetail { user_id } if user_id == "u1");

    session.navigate(Screen::Home);

    assert!(!session.is_login_pending());
    assert_eq!(session.state(), &SessionState::LoggedOut);
    assert_eq!(session.current_screen(), Screen::Login);

    tokio::time::sleep(Duration::from_millis(800)).await;

    assert!(session.poll().is_none());
    assert!(session.next_outcome().await.is_none());
    assert_eq!(session.state(), &SessionState::LoggedOut);
    assert_eq!(prefs.edit_count(), 1);
    assert_eq!(session.stored_tokens(), Some(SessionTokens::new("AT1", "RT1")));

    let notices = session.take_notices();
    crate::assert_notice!(notices, "Login Successful!");
    assert!(notices.iter().all(|n| n.message != "Welcome alice!"));
}

#[tokio::test]
async fn test_cancel_without_pending_login() {
    let backend = TestBackend::start().await;
    let mut session = backend.session(Arc::new(RecordingPreferences::new()));

    crate::assert_err!(session.cancel_login(), SessionError::NoLoginPending);
}

#[tokio::test]
async fn test_poll_until_finished() {
    let backend = TestBackend::start().await;
    backend.mock_alice().await;
    let mut session = backend.session(Arc::new(RecordingPreferences::new()));

    crate::assert_ok!(session.submit_login(alice()));

    let mut outcome = None;
    for _ in 0..200 {
        if let Some(result) = session.poll() {
            outcome = Some(result);
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    match outcome {
        Some(LoginOutcome::LoggedIn(user)) => assert_eq!(user.username, "alice"),
        other => panic!("Expected login to finish, got {:?}", other),
    }
    assert!(session.poll().is_none());
}

#[tokio::test]
async fn test_protected_screen_requires_login() {
    let backend = TestBackend::start().await;
    let mut session = backend.session(Arc::new(RecordingPreferences::new()));

    session.navigate(Screen::Chat);

    assert_eq!(session.requested_screen(), &Screen::Chat);
    assert_eq!(session.current_screen(), Screen::Login);
    crate::assert_notice!(session.take_notices(), "Please log in to continue");
}

#[tokio::test]
async fn test_logout_keeps_stored_tokens() {
    let backend = TestBackend::start().await;
    backend.mock_alice().await;
    let mut session = backend.session(Arc::new(RecordingPreferences::new()));

    crate::assert_ok!(session.login(alice()).await);
    crate::assert_ok!(session.logout());

    assert_eq!(session.state(), &SessionState::LoggedOut);
    assert_eq!(session.current_screen(), Screen::Login);
    assert!(session.stored_tokens().is_some());
    crate::assert_err!(session.logout(), SessionError::NotLoggedIn);
}

#[tokio::test]
async fn test_home_feed_uses_bearer_token() {
    let backend = TestBackend::start().await;
    backend.mock_alice().await;
    Mock::given(method("GET"))
        .and(path("/recommendations"))
        .and(header("authorization", "Bearer AT1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"_id": "r1", "name": "Le Comptoir", "recommendation": "Try the duck", "image": null},
            {"_id": "r2", "name": "Cafe Kitsune", "recommendation": "Flat white"}
        ])))
        .expect(1)
        .mount(&backend.server)
        .await;
    let mut session = backend.session(Arc::new(RecordingPreferences::new()));

    crate::assert_err!(session.home_feed().await, SessionError::NotLoggedIn);
    crate::assert_ok!(session.login(alice()).await);
    let feed = crate::assert_ok!(session.home_feed().await);

    assert_eq!(feed.len(), 2);
    assert_eq!(feed[0].name, "Le Comptoir");
    assert_eq!(feed[1].image, None);
}

#[tokio::test]
async fn test_home_feed_failure_notice() {
    let backend = TestBackend::start().await;
    backend.mock_alice().await;
    Mock::given(method("GET"))
        .and(path("/recommendations"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&backend.server)
        .await;
    let mut session = backend.session(Arc::new(RecordingPreferences::new()));

    crate::assert_ok!(session.login(alice()).await);
    session.take_notices();

    crate::assert_err!(
        session.home_feed().await,
        SessionError::Api(ApiError::HttpError { status: 500, .. })
    );
    crate::assert_notice!(session.take_notices(), "Failed to load recommendations.");
}

#[tokio::test]
async fn test_refresh_profile_replaces_user() {
    let backend = TestBackend::start().await;
    backend.mock_alice().await;
    let mut updated = user_body("u1", "alice");
    updated["firstname"] = json!("Alicia");
    updated["__v"] = json!(1);
    Mock::given(method("GET"))
        .and(path("/auth/profile"))
        .and(header("authorization", "Bearer AT1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(updated))
        .expect(1)
        .mount(&backend.server)
        .await;
    let mut session = backend.session(Arc::new(RecordingPreferences::new()));

    crate::assert_ok!(session.login(alice()).await);
    let user = crate::assert_ok!(session.refresh_profile().await);

    assert_eq!(user.firstname, "Alicia");
    assert_eq!(session.current_user().map(|u| u.version), Some(1));
}

#[tokio::test]
async fn test_sign_up_success() {
    let backend = TestBackend::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/signup"))
        .and(body_json(json!({
            "firstname": "Bob",
            "lastname": "Durand",
            "username": "bob",
            "email": "bob@example.com",
            "password": "hunter22",
            "confirmpasSsingup": "hunter22"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(user_body("u2", "bob")))
        .expect(1)
        .mount(&backend.server)
        .await;
    let mut session = backend.session(Arc::new(RecordingPreferences::new()));
    session.navigate(Screen::Register);

    let user = crate::assert_ok!(session.sign_up(signup_form()).await);

    assert_eq!(user.username, "bob");
    assert_eq!(session.state(), &SessionState::LoggedOut);
    assert_eq!(session.current_screen(), Screen::Login);
    crate::assert_notice!(session.take_notices(), "User registered successfully!");
}

#[tokio::test]
async fn test_sign_up_conflict() {
    let backend = TestBackend::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/signup"))
        .respond_with(ResponseTemplate::new(409).set_body_string("Username taken"))
        .mount(&backend.server)
        .await;
    let mut session = backend.session(Arc::new(RecordingPreferences::new()));
    session.navigate(Screen::Register);

    crate::assert_err!(
        session.sign_up(signup_form()).await,
        SessionError::Api(ApiError::HttpError { status: 409, .. })
    );
    assert_eq!(session.current_screen(), Screen::Register);
    crate::assert_notice!(session.take_notices(), "Registration failed: 409 - Username taken");
}

#[tokio::test]
async fn test_sign_up_password_mismatch_not_sent() {
    let backend = TestBackend::start().await;
    let mut session = backend.session(Arc::new(RecordingPreferences::new()));
    let mut form = signup_form();
    form.confirm_password = "hunter23".to_string();

    crate::assert_err!(session.sign_up(form).await, SessionError::Validation(_));
    crate::assert_notice!(session.take_notices(), "Passwords do not match");

    let received = backend.server.received_requests().await.unwrap_or_default();
    assert!(received.is_empty());
}

#[tokio::test]
async fn test_forgot_password_sent() {
    let backend = TestBackend::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/forgot-password"))
        .and(body_json(json!({"email": "alice@example.com"})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&backend.server)
        .await;
    let mut session = backend.session(Arc::new(RecordingPreferences::new()));
    session.navigate(Screen::ForgotPassword);

    crate::assert_ok!(session.send_forgot_password("alice@example.com").await);

    assert_eq!(session.current_screen(), Screen::Login);
    crate::assert_notice!(session.take_notices(), "Password reset email sent.");
}

#[tokio::test]
async fn test_forgot_password_failure() {
    let backend = TestBackend::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/forgot-password"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&backend.server)
        .await;
    let mut session = backend.session(Arc::new(RecordingPreferences::new()));
    session.navigate(Screen::ForgotPassword);

    crate::assert_err!(
        session.send_forgot_password("alice@example.com").await,
        SessionError::Api(_)
    );
    assert_eq!(session.current_screen(), Screen::ForgotPassword);
    crate::assert_notice!(
        session.take_notices(),
        "Failed to send reset email. Please try again."
    );
}
