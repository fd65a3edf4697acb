mod common;

use dynlink::domain::repositories::{NewApiToken, TokenRepository};
use dynlink::error::AppError;
use dynlink::infrastructure::persistence::PgTokenRepository;
use sqlx::PgPool;
use std::sync::Arc;

fn new_token(hash: &str) -> NewApiToken {
    NewApiToken {
        user_id: "user_1".to_string(),
        name: "test-token".to_string(),
        token_hash: hash.to_string(),
        first_four_chars: "abcd".to_string(),
    }
}

#[sqlx::test]
async fn test_create_token(pool: PgPool) {
    common::create_user(&pool, "user_1").await;
    let repo = PgTokenRepository::new(Arc::new(pool));

    let token = repo.create(new_token("hash123")).await.unwrap();

    assert_eq!(token.name, "test-token");
    assert_eq!(token.user_id, "user_1");
    assert_eq!(token.token_hash, "hash123");
    assert_eq!(token.first_four_chars, "abcd");
    assert!(token.last_used_at.is_none());
}

#[sqlx::test]
async fn test_duplicate_hash_is_conflict(pool: PgPool) {
    common::create_user(&pool, "user_1").await;
    let repo = PgTokenRepository::new(Arc::new(pool));

    repo.create(new_token("samehash")).await.unwrap();
    let result = repo.create(new_token("samehash")).await;

    assert!(matches!(result, Err(AppError::Conflict { .. })));
}

#[sqlx::test]
async fn test_find_by_hash(pool: PgPool) {
    common::create_user(&pool, "user_1").await;
    let repo = PgTokenRepository::new(Arc::new(pool));

    let created = repo.create(new_token("validhash")).await.unwrap();

    let found = repo.find_by_hash("validhash").await.unwrap().unwrap();
    assert_eq!(found.id, created.id);

    assert!(repo.find_by_hash("nonexistent").await.unwrap().is_none());
}

#[sqlx::test]
async fn test_update_last_used(pool: PgPool) {
    common::create_user(&pool, "user_1").await;
    let repo = PgTokenRepository::new(Arc::new(pool));

    let token = repo.create(new_token("usedhash")).await.unwrap();
    repo.update_last_used(token.id).await.unwrap();

    let token = repo.find_by_hash("usedhash").await.unwrap().unwrap();
    assert!(token.last_used_at.is_some());
}

#[sqlx::test]
async fn test_list_and_delete(pool: PgPool) {
    common::create_user(&pool, "user_1").await;
    let repo = PgTokenRepository::new(Arc::new(pool));

    let first = repo.create(new_token("hash-a")).await.unwrap();
    repo.create(new_token("hash-b")).await.unwrap();

    assert_eq!(repo.list().await.unwrap().len(), 2);

    assert!(repo.delete(first.id).await.unwrap());
    assert!(!repo.delete(first.id).await.unwrap());

    let remaining = repo.list().await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].token_hash, "hash-b");
}
