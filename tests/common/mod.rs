#![allow(dead_code)]

use async_trait::async_trait;
use axum::extract::ConnectInfo;
use dynlink::application::services::AuthService;
use dynlink::config::Config;
use dynlink::domain::entities::LinkMetadata;
use dynlink::infrastructure::metadata::{MetadataFetcher, MetadataResult, NullMetadataFetcher};
use dynlink::infrastructure::persistence::PgTokenRepository;
use dynlink::state::AppState;
use sqlx::PgPool;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower::Layer;

pub const ROOT_DOMAIN: &str = "root.com";
pub const TEST_SIGNING_SECRET: &str = "test-signing-secret";
pub const TEST_WEBHOOK_SECRET: &str = "test-webhook-secret";
pub const FREE_LINKS_LIMIT: i64 = 3;

pub const IPHONE_UA: &str =
    "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15 Mobile/15E148";
pub const ANDROID_UA: &str =
    "Mozilla/5.0 (Linux; Android 14; Pixel 8) AppleWebKit/537.36 Chrome/120.0 Mobile Safari/537.36";
pub const DESKTOP_UA: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";
pub const CRAWLER_UA: &str = "facebookexternalhit/1.1 (+http://www.facebook.com/externalhit_uatext.php)";

pub fn test_config() -> Config {
    Config {
        database_url: "postgres://localhost/test".to_string(),
        listen_addr: "127.0.0.1:0".to_string(),
        log_level: "debug".to_string(),
        log_format: "text".to_string(),
        root_domain: ROOT_DOMAIN.to_string(),
        token_signing_secret: TEST_SIGNING_SECRET.to_string(),
        webhook_secret: Some(TEST_WEBHOOK_SECRET.to_string()),
        free_links_limit: FREE_LINKS_LIMIT,
        metadata_fetch_enabled: false,
        metadata_fetch_timeout_seconds: 1,
        db_max_connections: 5,
        db_connect_timeout: 5,
        db_idle_timeout: 60,
        db_max_lifetime: 300,
    }
}

pub fn create_test_state(pool: PgPool) -> AppState {
    create_test_state_with(pool, test_config())
}

pub fn create_test_state_with(pool: PgPool, config: Config) -> AppState {
    AppState::new(
        Arc::new(pool),
        &config,
        Arc::new(NullMetadataFetcher::new()),
    )
}

pub fn create_test_state_with_fetcher(
    pool: PgPool,
    fetcher: Arc<dyn MetadataFetcher>,
) -> AppState {
    AppState::new(Arc::new(pool), &test_config(), fetcher)
}

/// Answers every fetch with the same page title.
pub struct StaticMetadataFetcher {
    pub title: String,
}

#[async_trait]
impl MetadataFetcher for StaticMetadataFetcher {
    async fn fetch(&self, _url: &str) -> MetadataResult<LinkMetadata> {
        Ok(LinkMetadata {
            title: Some(self.title.clone()),
            ..Default::default()
        })
    }
}

pub async fn create_user(pool: &PgPool, id: &str) {
    sqlx::query("INSERT INTO users (id, email) VALUES ($1, $2)")
        .bind(id)
        .bind(format!("{id}@example.com"))
        .execute(pool)
        .await
        .unwrap();
}

/// User with an active subscription for the next 30 days.
pub async fn create_pro_user(pool: &PgPool, id: &str) {
    sqlx::query(
        "INSERT INTO users (id, subscription_id, current_period_end) \
         VALUES ($1, $2, NOW() + INTERVAL '30 days')",
    )
    .bind(id)
    .bind(format!("sub_{id}"))
    .execute(pool)
    .await
    .unwrap();
}

pub async fn create_subdomain_project(pool: &PgPool, user_id: &str, label: &str) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO projects (user_id, name, subdomain) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(user_id)
    .bind(format!("Project {label}"))
    .bind(label)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn create_custom_domain_project(
    pool: &PgPool,
    user_id: &str,
    domain: &str,
    verified: bool,
) -> i64 {
    sqlx::query("INSERT INTO custom_domains (user_id, domain, verified) VALUES ($1, $2, $3)")
        .bind(user_id)
        .bind(domain)
        .bind(verified)
        .execute(pool)
        .await
        .unwrap();

    sqlx::query_scalar(
        "INSERT INTO projects (user_id, name, custom_domain) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(user_id)
    .bind(format!("Project {domain}"))
    .bind(domain)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn create_android_app(
    pool: &PgPool,
    user_id: &str,
    project_id: Option<i64>,
    package_name: &str,
) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO android_apps (user_id, project_id, package_name, sha256_cert_fingerprints, store_link) \
         VALUES ($1, $2, $3, $4, $5) RETURNING id",
    )
    .bind(user_id)
    .bind(project_id)
    .bind(package_name)
    .bind(serde_json::json!([test_fingerprint()]))
    .bind(format!(
        "https://play.google.com/store/apps/details?id={package_name}"
    ))
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn create_ios_app(
    pool: &PgPool,
    user_id: &str,
    project_id: Option<i64>,
    bundle_id: &str,
    store_link: &str,
) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO ios_apps (user_id, project_id, bundle_id, team_id, store_link) \
         VALUES ($1, $2, $3, 'ABCDE12345', $4) RETURNING id",
    )
    .bind(user_id)
    .bind(project_id)
    .bind(bundle_id)
    .bind(store_link)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn create_link(
    pool: &PgPool,
    project_id: i64,
    domain: &str,
    code: &str,
    long_url: &str,
) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO links (project_id, domain, code, long_url) VALUES ($1, $2, $3, $4) RETURNING id",
    )
    .bind(project_id)
    .bind(domain)
    .bind(code)
    .bind(long_url)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn set_android_referrer(pool: &PgPool, link_id: i64, referrer: &str) {
    sqlx::query("UPDATE links SET android_referrer = $2 WHERE id = $1")
        .bind(link_id)
        .bind(referrer)
        .execute(pool)
        .await
        .unwrap();
}

pub async fn set_metadata_title(pool: &PgPool, link_id: i64, title: &str) {
    sqlx::query("UPDATE links SET meta_title = $2 WHERE id = $1")
        .bind(link_id)
        .bind(title)
        .execute(pool)
        .await
        .unwrap();
}

/// Stores `plaintext` as an API key of `user_id`, hashed the way the server hashes it.
pub async fn create_token(pool: &PgPool, user_id: &str, plaintext: &str) -> i64 {
    let auth = AuthService::new(
        Arc::new(PgTokenRepository::new(Arc::new(pool.clone()))),
        TEST_SIGNING_SECRET.to_string(),
    );

    sqlx::query_scalar(
        "INSERT INTO api_tokens (user_id, name, token_hash, first_four_chars) \
         VALUES ($1, 'test', $2, $3) RETURNING id",
    )
    .bind(user_id)
    .bind(auth.hash_token(plaintext))
    .bind(plaintext.chars().take(4).collect::<String>())
    .fetch_one(pool)
    .await
    .unwrap()
}

/// `(clicks, app_store_redirects, play_store_redirects, general_redirects)`
pub async fn link_counters(pool: &PgPool, link_id: i64) -> (i64, i64, i64, i64) {
    sqlx::query_as(
        "SELECT clicks, app_store_redirects, play_store_redirects, general_redirects \
         FROM links WHERE id = $1",
    )
    .bind(link_id)
    .fetch_one(pool)
    .await
    .unwrap()
}

/// Polls until the detached click write lands or the deadline passes.
pub async fn wait_for_clicks(pool: &PgPool, link_id: i64, expected: i64) -> (i64, i64, i64, i64) {
    for _ in 0..50 {
        let counters = link_counters(pool, link_id).await;
        if counters.0 >= expected {
            return counters;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    link_counters(pool, link_id).await
}

/// Polls until the detached metadata backfill lands or the deadline passes.
pub async fn wait_for_metadata_title(pool: &PgPool, link_id: i64) -> Option<String> {
    for _ in 0..50 {
        let title: Option<String> = sqlx::query_scalar("SELECT meta_title FROM links WHERE id = $1")
            .bind(link_id)
            .fetch_one(pool)
            .await
            .unwrap();
        if title.is_some() {
            return title;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    None
}

pub fn test_fingerprint() -> String {
    vec!["AB"; 32].join(":")
}

#[derive(Clone)]
pub struct MockConnectInfoLayer;

impl<S> Layer<S> for MockConnectInfoLayer {
    type Service = MockConnectInfoService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MockConnectInfoService { inner }
    }
}

#[derive(Clone)]
pub struct MockConnectInfoService<S> {
    inner: S,
}

impl<S, B> tower::Service<axum::http::Request<B>> for MockConnectInfoService<S>
where
    S: tower::Service<axum::http::Request<B>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    B: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: axum::http::Request<B>) -> Self::Future {
        let addr: SocketAddr = "127.0.0.1:12345".parse().unwrap();
        req.extensions_mut().insert(ConnectInfo(addr));
        self.inner.call(req)
    }
}
