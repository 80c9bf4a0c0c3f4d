//! Postgres-backed session store tests against a migrated database.

use assert_matches::assert_matches;
use chrono::{Duration, Utc};
use snapfeed_api::auth::store::{
    CredentialStore, PgCredentialStore, PgSessionStore, SessionStore, DUPLICATE_SESSION,
};
use snapfeed_core::error::CoreError;
use snapfeed_db::models::user::CreateUser;
use sqlx::PgPool;

async fn create_user(pool: &PgPool) -> i64 {
    let input = CreateUser {
        email: "a@x.io".to_string(),
        username: "alice".to_string(),
        display_name: "Alice".to_string(),
        password_hash: "$argon2id$placeholder".to_string(),
    };
    PgCredentialStore::new(pool.clone())
        .create_user(input)
        .await
        .unwrap()
        .id
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn duplicate_session_token_is_a_conflict(pool: PgPool) {
    let user_id = create_user(&pool).await;
    let store = PgSessionStore::new(pool);
    let expires_at = Utc::now() + Duration::days(7);

    store.create(user_id, "token-a", expires_at).await.unwrap();
    assert_matches!(
        store.create(user_id, "token-a", expires_at).await,
        Err(CoreError::Conflict(msg)) if msg == DUPLICATE_SESSION
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn rotating_onto_a_held_token_is_a_conflict(pool: PgPool) {
    let user_id = create_user(&pool).await;
    let store = PgSessionStore::new(pool);
    let expires_at = Utc::now() + Duration::days(7);

    let first = store.create(user_id, "token-a", expires_at).await.unwrap();
    store.create(user_id, "token-b", expires_at).await.unwrap();

    assert_matches!(
        store.rotate(first.id, "token-a", "token-b", expires_at).await,
        Err(CoreError::Conflict(msg)) if msg == DUPLICATE_SESSION
    );
    // The failed swap leaves the original session in place.
    assert!(store
        .find_by_refresh_token("token-a")
        .await
        .unwrap()
        .is_some());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn rotation_swaps_the_token_once(pool: PgPool) {
    let user_id = create_user(&pool).await;
    let store = PgSessionStore::new(pool);
    let expires_at = Utc::now() + Duration::days(7);

    let session = store.create(user_id, "token-a", expires_at).await.unwrap();
    let rotated = store
        .rotate(session.id, "token-a", "token-c", expires_at)
        .await
        .unwrap()
        .expect("session still holds token-a");
    assert_eq!(rotated.id, session.id);

    assert_matches!(
        store.rotate(session.id, "token-a", "token-d", expires_at).await,
        Ok(None)
    );
    assert!(store.find_by_refresh_token("token-a").await.unwrap().is_none());
}
