//! Integration tests for session issuance, sliding renewal and
//! invalidation.

mod common;

use std::sync::atomic::Ordering;

use chrono::Duration;
use common::{FaultyRepository, acme, faulty_service, service, start};
use gatehouse_auth::AuthError;
use gatehouse_core::ErrorCode;
use gatehouse_core::models::session::SessionPlatform;
use gatehouse_core::repository::AuthRepository;
use gatehouse_db::MemoryAuthRepository;

#[tokio::test]
async fn new_session_lasts_seven_days() {
    let (svc, _) = service(MemoryAuthRepository::new());
    let user = svc.register_tenant(acme("ada@acme.test")).await.unwrap().user;

    let session = svc
        .sessions()
        .create(user.id, SessionPlatform::Mobile)
        .await
        .unwrap();

    assert_eq!(session.expires_at, start() + Duration::days(7));
    assert_eq!(session.platform, SessionPlatform::Mobile);
    assert_eq!(session.user_id, user.id);
}

#[tokio::test]
async fn sessions_get_distinct_tokens() {
    let (svc, _) = service(MemoryAuthRepository::new());
    let user = svc.register_tenant(acme("ada@acme.test")).await.unwrap().user;

    let a = svc.sessions().create(user.id, SessionPlatform::Web).await.unwrap();
    let b = svc.sessions().create(user.id, SessionPlatform::Web).await.unwrap();
    assert_ne!(a.token, b.token);
    assert_ne!(a.id, b.id);
}

#[tokio::test]
async fn fresh_session_verifies_without_renewal() {
    let (svc, clock) = service(MemoryAuthRepository::new());
    let registered = svc.register_tenant(acme("ada@acme.test")).await.unwrap();
    let session = svc
        .sessions()
        .create(registered.user.id, SessionPlatform::Web)
        .await
        .unwrap();

    clock.advance(Duration::days(3));
    let verified = svc.sessions().verify(&session.token).await.unwrap().unwrap();

    assert!(!verified.renewed);
    assert_eq!(verified.session.expires_at, session.expires_at);
    assert_eq!(verified.user, registered.user);
    assert_eq!(verified.tenant, registered.tenant);
}

#[tokio::test]
async fn repeated_verification_outside_window_leaves_expiry_alone() {
    let repo = MemoryAuthRepository::new();
    let (svc, clock) = service(repo.clone());
    let user = svc.register_tenant(acme("ada@acme.test")).await.unwrap().user;
    let session = svc.sessions().create(user.id, SessionPlatform::Web).await.unwrap();

    clock.advance(Duration::days(2));
    let first = svc.sessions().verify(&session.token).await.unwrap().unwrap();
    clock.advance(Duration::seconds(1));
    let second = svc.sessions().verify(&session.token).await.unwrap().unwrap();

    assert!(!first.renewed);
    assert!(!second.renewed);
    assert_eq!(first.session.expires_at, session.expires_at);
    assert_eq!(second.session.expires_at, session.expires_at);
    let stored = repo.get_session(&session.token).await.unwrap().unwrap();
    assert_eq!(stored.expires_at, session.expires_at);
}

#[tokio::test]
async fn session_for_unknown_user_is_refused() {
    let (svc, _) = service(MemoryAuthRepository::new());

    let err = svc
        .sessions()
        .create(uuid::Uuid::new_v4(), SessionPlatform::Web)
        .await
        .unwrap_err();

    assert!(matches!(err, AuthError::SessionCreation(_)));
    assert_eq!(err.code(), ErrorCode::SessionCreationFailed);
}

#[tokio::test]
async fn renewal_window_opens_exactly_one_day_before_expiry() {
    let (svc, clock) = service(MemoryAuthRepository::new());
    let user = svc.register_tenant(acme("ada@acme.test")).await.unwrap().user;
    let session = svc.sessions().create(user.id, SessionPlatform::Web).await.unwrap();

    let opens = session.expires_at - Duration::days(1);

    clock.set(opens - Duration::seconds(1));
    let before = svc.sessions().verify(&session.token).await.unwrap().unwrap();
    assert!(!before.renewed);
    assert_eq!(before.session.expires_at, session.expires_at);

    clock.set(opens);
    let at = svc.sessions().verify(&session.token).await.unwrap().unwrap();
    assert!(at.renewed);
    assert_eq!(at.session.expires_at, opens + Duration::days(7));
}

#[tokio::test]
async fn renewal_extends_to_full_lifetime_from_now() {
    let repo = MemoryAuthRepository::new();
    let (svc, clock) = service(repo.clone());
    let user = svc.register_tenant(acme("ada@acme.test")).await.unwrap().user;
    let session = svc.sessions().create(user.id, SessionPlatform::Web).await.unwrap();

    let now = session.expires_at - Duration::hours(12);
    clock.set(now);
    let verified = svc.sessions().verify(&session.token).await.unwrap().unwrap();

    assert!(verified.renewed);
    assert_eq!(verified.session.expires_at, now + Duration::days(7));
    let stored = repo.get_session(&session.token).await.unwrap().unwrap();
    assert_eq!(stored.expires_at, now + Duration::days(7));
}

#[tokio::test]
async fn renewal_is_idempotent_at_one_instant() {
    let (svc, clock) = service(MemoryAuthRepository::new());
    let user = svc.register_tenant(acme("ada@acme.test")).await.unwrap().user;
    let session = svc.sessions().create(user.id, SessionPlatform::Web).await.unwrap();

    clock.set(session.expires_at - Duration::hours(2));
    let first = svc.sessions().verify(&session.token).await.unwrap().unwrap();
    let second = svc.sessions().verify(&session.token).await.unwrap().unwrap();

    assert_eq!(first.session.expires_at, second.session.expires_at);
    assert!(first.renewed);
    assert!(!second.renewed);
}

#[tokio::test]
async fn session_is_valid_through_its_expiry_instant() {
    let (svc, clock) = service(MemoryAuthRepository::new());
    let user = svc.register_tenant(acme("ada@acme.test")).await.unwrap().user;
    let session = svc.sessions().create(user.id, SessionPlatform::Web).await.unwrap();

    clock.set(session.expires_at);
    let verified = svc.sessions().verify(&session.token).await.unwrap().unwrap();
    assert!(verified.renewed);
}

#[tokio::test]
async fn expired_session_does_not_verify() {
    let repo = MemoryAuthRepository::new();
    let (svc, clock) = service(repo.clone());
    let user = svc.register_tenant(acme("ada@acme.test")).await.unwrap().user;
    let session = svc.sessions().create(user.id, SessionPlatform::Web).await.unwrap();

    clock.set(session.expires_at + Duration::milliseconds(1));
    assert!(svc.sessions().verify(&session.token).await.unwrap().is_none());

    // Expiry is decided at read time; the row is left for a sweeper.
    let stored = repo.get_session(&session.token).await.unwrap().unwrap();
    assert_eq!(stored.expires_at, session.expires_at);
}

#[tokio::test]
async fn unknown_and_empty_tokens_do_not_verify() {
    let (svc, _) = service(MemoryAuthRepository::new());
    assert!(svc.sessions().verify("").await.unwrap().is_none());
    assert!(svc.sessions().verify("no-such-token").await.unwrap().is_none());
}

#[tokio::test]
async fn invalidated_session_stays_invalid() {
    let (svc, clock) = service(MemoryAuthRepository::new());
    let user = svc.register_tenant(acme("ada@acme.test")).await.unwrap().user;
    let session = svc.sessions().create(user.id, SessionPlatform::Web).await.unwrap();

    assert!(svc.sessions().invalidate(&session.token).await.unwrap());
    assert!(svc.sessions().verify(&session.token).await.unwrap().is_none());

    // Not even inside what would have been the renewal window.
    clock.set(session.expires_at - Duration::hours(1));
    assert!(svc.sessions().verify(&session.token).await.unwrap().is_none());
    assert!(!svc.sessions().invalidate(&session.token).await.unwrap());
}

#[tokio::test]
async fn session_of_deleted_user_does_not_verify() {
    let repo = MemoryAuthRepository::new();
    let (svc, _) = service(repo.clone());
    let user = svc.register_tenant(acme("ada@acme.test")).await.unwrap().user;
    let session = svc.sessions().create(user.id, SessionPlatform::Web).await.unwrap();

    assert!(repo.remove_user(user.id).await);
    assert!(svc.sessions().verify(&session.token).await.unwrap().is_none());
}

#[tokio::test]
async fn session_of_deleted_tenant_does_not_verify() {
    let repo = MemoryAuthRepository::new();
    let (svc, _) = service(repo.clone());
    let registered = svc.register_tenant(acme("ada@acme.test")).await.unwrap();
    let session = svc
        .sessions()
        .create(registered.user.id, SessionPlatform::Web)
        .await
        .unwrap();

    assert!(repo.remove_tenant(registered.tenant.id).await);
    assert!(svc.sessions().verify(&session.token).await.unwrap().is_none());
}

#[tokio::test]
async fn failed_renewal_still_authenticates() {
    let repo = FaultyRepository::default();
    let (svc, clock) = faulty_service(repo.clone());
    let user = svc.register_tenant(acme("ada@acme.test")).await.unwrap().user;
    let session = svc.sessions().create(user.id, SessionPlatform::Web).await.unwrap();

    repo.fail_extend.store(true, Ordering::SeqCst);
    clock.set(session.expires_at - Duration::hours(1));
    let verified = svc.sessions().verify(&session.token).await.unwrap().unwrap();

    assert!(!verified.renewed);
    assert_eq!(verified.session.expires_at, session.expires_at);
}

#[tokio::test]
async fn store_failure_is_a_session_creation_error() {
    let repo = FaultyRepository::default();
    let (svc, _) = faulty_service(repo.clone());
    let user = svc.register_tenant(acme("ada@acme.test")).await.unwrap().user;

    repo.fail_sessions.store(true, Ordering::SeqCst);
    let err = svc
        .sessions()
        .create(user.id, SessionPlatform::Web)
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::SessionCreation(_)));
    assert_eq!(err.code(), ErrorCode::SessionCreationFailed);
}

#[tokio::test]
async fn non_positive_lifetime_is_rejected() {
    let (svc, _) = service(MemoryAuthRepository::new());
    let user = svc.register_tenant(acme("ada@acme.test")).await.unwrap().user;

    let err = svc
        .sessions()
        .create_with_duration(user.id, SessionPlatform::Web, Duration::zero())
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::SessionCreationFailed);
}
