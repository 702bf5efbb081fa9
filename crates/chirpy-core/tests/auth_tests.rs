//! End-to-end token lifecycle through the facade

mod common;

use chirpy_core::error::AuthError;
use chirpy_core::{ChirpyError, ErrorKind, TokenKind, UserId, WebhookEvent};
use chrono::{Duration, Utc};
use common::{api_key, bearer, TestApp};

fn auth_error(err: ChirpyError) -> AuthError {
    match err {
        ChirpyError::Unauthorized(reason) => reason,
        other => panic!("expected unauthorized, got {other:?}"),
    }
}

#[test]
fn test_refresh_issues_fresh_access_claims() {
    let app = TestApp::new();
    let session = app.signup("walt@breakingbad.com");

    let access = app.chirpy.refresh(Some(&bearer(&session.refresh_token))).unwrap();
    assert_ne!(access, session.refresh_token);

    let caller = app
        .chirpy
        .authenticator()
        .authenticate(Some(&bearer(&access)), TokenKind::Access)
        .unwrap();
    assert_eq!(caller.claims.iss, "access");
    assert_eq!(caller.claims.exp - caller.claims.iat, 3600);
    assert_eq!(caller.user.id, session.user.id);
}

#[test]
fn test_refresh_rejects_access_token() {
    let app = TestApp::new();
    let session = app.signup("walt@breakingbad.com");

    let err = app.chirpy.refresh(Some(&bearer(&session.token))).unwrap_err();
    assert_eq!(
        auth_error(err),
        AuthError::WrongTokenKind { expected: TokenKind::Refresh }
    );
}

#[test]
fn test_revoked_token_cannot_refresh() {
    let app = TestApp::new();
    let session = app.signup("walt@breakingbad.com");
    let refresh = bearer(&session.refresh_token);

    app.chirpy.revoke(Some(&refresh)).unwrap();
    assert_eq!(
        auth_error(app.chirpy.refresh(Some(&refresh)).unwrap_err()),
        AuthError::Revoked
    );

    // A new login right after logout gets a token of its own
    let second = app.chirpy.login("walt@breakingbad.com", "password").unwrap();
    assert_ne!(second.refresh_token, session.refresh_token);
    assert!(app.chirpy.refresh(Some(&bearer(&second.refresh_token))).is_ok());
}

#[test]
fn test_revoking_one_session_keeps_another() {
    let app = TestApp::new();
    app.signup("walt@breakingbad.com");
    let laptop = app.chirpy.login("walt@breakingbad.com", "password").unwrap();
    let phone = app.chirpy.login("walt@breakingbad.com", "password").unwrap();

    app.chirpy.revoke(Some(&bearer(&laptop.refresh_token))).unwrap();
    assert!(app.chirpy.refresh(Some(&bearer(&phone.refresh_token))).is_ok());
}

#[test]
fn test_revoke_requires_refresh_token() {
    let app = TestApp::new();
    let session = app.signup("walt@breakingbad.com");

    let err = app.chirpy.revoke(Some(&bearer(&session.token))).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);
}

#[test]
fn test_expired_refresh_token() {
    let app = TestApp::new();
    let session = app.signup("walt@breakingbad.com");

    let stale = app
        .chirpy
        .issuer()
        .issue_at(TokenKind::Refresh, session.user.id, Utc::now() - Duration::days(61))
        .unwrap();
    assert_eq!(
        auth_error(app.chirpy.refresh(Some(&bearer(&stale))).unwrap_err()),
        AuthError::InvalidToken
    );
}

#[test]
fn test_malformed_headers() {
    let app = TestApp::new();
    let session = app.signup("walt@breakingbad.com");

    let cases = [
        (None, AuthError::MissingHeader),
        (Some(session.token.clone()), AuthError::MalformedHeader),
        (
            Some(format!("Token {}", session.token)),
            AuthError::UnsupportedScheme("Token".to_string()),
        ),
        (
            Some(format!("Bearer {} extra", session.token)),
            AuthError::MalformedHeader,
        ),
    ];

    for (header, want) in cases {
        let err = app
            .chirpy
            .create_chirp(header.as_deref(), "hello")
            .unwrap_err();
        assert_eq!(auth_error(err), want, "header {header:?}");
    }
}

#[test]
fn test_deleted_subject_is_rejected() {
    let app = TestApp::new();
    let token = app
        .chirpy
        .issuer()
        .issue(TokenKind::Access, UserId(404))
        .unwrap();

    let err = app
        .chirpy
        .create_chirp(Some(&bearer(&token)), "ghost")
        .unwrap_err();
    assert_eq!(auth_error(err), AuthError::UserNotFound);
}

#[test]
fn test_update_user() {
    let app = TestApp::new();
    let walt = app.signup("walt@breakingbad.com");
    app.signup("jesse@breakingbad.com");
    let header = bearer(&walt.token);

    let err = app
        .chirpy
        .update_user(Some(&header), "jesse@breakingbad.com", "new")
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::EmailTaken);

    let updated = app
        .chirpy
        .update_user(Some(&header), "heisenberg@breakingbad.com", "new")
        .unwrap();
    assert_eq!(updated.id, walt.user.id);
    assert_eq!(updated.email, "heisenberg@breakingbad.com");

    assert!(app.chirpy.login("heisenberg@breakingbad.com", "new").is_ok());
    assert_eq!(
        auth_error(app.chirpy.login("heisenberg@breakingbad.com", "password").unwrap_err()),
        AuthError::InvalidCredentials
    );
}

#[test]
fn test_delete_ownership() {
    let app = TestApp::new();
    let walt = bearer(&app.signup("walt@breakingbad.com").token);
    let jesse = bearer(&app.signup("jesse@breakingbad.com").token);

    let chirp = app.chirpy.create_chirp(Some(&walt), "I am the danger").unwrap();

    let err = app.chirpy.delete_chirp(Some(&jesse), chirp.id).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotAuthor);
    assert_eq!(app.chirpy.get_chirp(chirp.id).unwrap(), chirp);

    app.chirpy.delete_chirp(Some(&walt), chirp.id).unwrap();
    assert_eq!(
        app.chirpy.get_chirp(chirp.id).unwrap_err().kind(),
        ErrorKind::NotFound
    );
}

#[test]
fn test_list_by_author() {
    let app = TestApp::new();
    let walt = app.signup("walt@breakingbad.com");
    let jesse = app.signup("jesse@breakingbad.com");

    app.chirpy.create_chirp(Some(&bearer(&walt.token)), "one").unwrap();
    app.chirpy.create_chirp(Some(&bearer(&jesse.token)), "two").unwrap();
    app.chirpy.create_chirp(Some(&bearer(&walt.token)), "three").unwrap();

    let bodies: Vec<_> = app
        .chirpy
        .list_chirps(Some(walt.user.id))
        .unwrap()
        .into_iter()
        .map(|c| c.body)
        .collect();
    assert_eq!(bodies, ["one", "three"]);
    assert_eq!(app.chirpy.list_chirps(None).unwrap().len(), 3);
}

#[test]
fn test_webhook_upgrades_user() {
    let app = TestApp::new();
    let walt = app.signup("walt@breakingbad.com");

    app.chirpy
        .handle_webhook(Some(&api_key()), &WebhookEvent::upgraded(walt.user.id))
        .unwrap();

    let session = app.chirpy.login("walt@breakingbad.com", "password").unwrap();
    assert!(session.user.is_chirpy_red);
}

#[test]
fn test_webhook_rejects_bearer_credentials() {
    let app = TestApp::new();
    let walt = app.signup("walt@breakingbad.com");

    let err = app
        .chirpy
        .handle_webhook(
            Some(&bearer(common::TEST_API_KEY)),
            &WebhookEvent::upgraded(walt.user.id),
        )
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);
}
