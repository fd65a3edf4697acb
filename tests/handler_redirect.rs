mod common;

use axum::{Router, routing::get};
use axum_test::TestServer;
use dynlink::api::handlers::{fallback_handler, redirect_handler};
use sqlx::PgPool;
use std::future::IntoFuture;
use std::time::Duration;

fn make_server(pool: PgPool) -> TestServer {
    let state = common::create_test_state(pool);
    let app = Router::new()
        .route("/{code}", get(redirect_handler))
        .fallback(fallback_handler)
        .with_state(state);

    TestServer::new(app).unwrap()
}

struct Fixture {
    link_id: i64,
}

/// `foo.root.com/xY12abCD` → `https://example.com/landing`, with both apps bound.
async fn seed_with_apps(pool: &PgPool) -> Fixture {
    common::create_user(pool, "user_1").await;
    let project_id = common::create_subdomain_project(pool, "user_1", "foo").await;
    common::create_android_app(pool, "user_1", Some(project_id), "com.foo.app").await;
    common::create_ios_app(
        pool,
        "user_1",
        Some(project_id),
        "com.foo.app",
        "https://apps.apple.com/app/id123456",
    )
    .await;
    let link_id = common::create_link(
        pool,
        project_id,
        "foo.root.com",
        "xY12abCD",
        "https://example.com/landing",
    )
    .await;

    Fixture { link_id }
}

#[sqlx::test]
async fn test_desktop_redirects_to_long_url(pool: PgPool) {
    let fixture = seed_with_apps(&pool).await;
    let server = make_server(pool.clone());

    let response = server
        .get("/xY12abCD")
        .add_header("Host", "foo.root.com")
        .add_header("User-Agent", common::DESKTOP_UA)
        .await;

    assert_eq!(response.status_code(), 307);
    assert_eq!(response.header("location"), "https://example.com/landing");

    let counters = common::wait_for_clicks(&pool, fixture.link_id, 1).await;
    assert_eq!(counters, (1, 0, 0, 1));
}

#[sqlx::test]
async fn test_deeper_host_routes_by_leading_label(pool: PgPool) {
    let fixture = seed_with_apps(&pool).await;
    let server = make_server(pool.clone());

    let response = server
        .get("/xY12abCD")
        .add_header("Host", "foo.staging.root.com")
        .add_header("User-Agent", common::DESKTOP_UA)
        .await;

    assert_eq!(response.status_code(), 307);
    assert_eq!(response.header("location"), "https://example.com/landing");

    let counters = common::wait_for_clicks(&pool, fixture.link_id, 1).await;
    assert_eq!(counters, (1, 0, 0, 1));
}

#[sqlx::test]
async fn test_iphone_redirects_to_app_store(pool: PgPool) {
    let fixture = seed_with_apps(&pool).await;
    let server = make_server(pool.clone());

    let response = server
        .get("/xY12abCD")
        .add_header("Host", "foo.root.com")
        .add_header("User-Agent", common::IPHONE_UA)
        .await;

    assert_eq!(response.status_code(), 307);
    assert_eq!(
        response.header("location"),
        "https://apps.apple.com/app/id123456"
    );

    let counters = common::wait_for_clicks(&pool, fixture.link_id, 1).await;
    assert_eq!(counters, (1, 1, 0, 0));
}

#[sqlx::test]
async fn test_android_redirects_to_play_store_with_referrer(pool: PgPool) {
    let fixture = seed_with_apps(&pool).await;
    common::set_android_referrer(&pool, fixture.link_id, "utm_source=mail&utm_campaign=spring").await;
    let server = make_server(pool.clone());

    let response = server
        .get("/xY12abCD")
        .add_header("Host", "foo.root.com")
        .add_header("User-Agent", common::ANDROID_UA)
        .await;

    assert_eq!(response.status_code(), 307);
    assert_eq!(
        response.header("location"),
        "https://play.google.com/store/apps/details?id=com.foo.app&referrer=utm_source%3Dmail%26utm_campaign%3Dspring"
    );

    let counters = common::wait_for_clicks(&pool, fixture.link_id, 1).await;
    assert_eq!(counters, (1, 0, 1, 0));
}

#[sqlx::test]
async fn test_android_without_app_falls_back_to_long_url(pool: PgPool) {
    common::create_user(&pool, "user_1").await;
    let project_id = common::create_subdomain_project(&pool, "user_1", "bar").await;
    let link_id =
        common::create_link(&pool, project_id, "bar.root.com", "noApp123", "https://example.com").await;
    let server = make_server(pool.clone());

    let response = server
        .get("/noApp123")
        .add_header("Host", "bar.root.com")
        .add_header("User-Agent", common::ANDROID_UA)
        .await;

    assert_eq!(response.status_code(), 307);
    assert_eq!(response.header("location"), "https://example.com");

    let counters = common::wait_for_clicks(&pool, link_id, 1).await;
    assert_eq!(counters, (1, 0, 0, 1));
}

#[sqlx::test]
async fn test_crawler_gets_preview_without_click(pool: PgPool) {
    let fixture = seed_with_apps(&pool).await;
    common::set_metadata_title(&pool, fixture.link_id, "Spring sale").await;
    let server = make_server(pool.clone());

    let response = server
        .get("/xY12abCD")
        .add_header("Host", "foo.root.com")
        .add_header("User-Agent", common::CRAWLER_UA)
        .await;

    response.assert_status_ok();
    let html = response.text();
    assert!(html.contains(r#"<meta property="og:title" content="Spring sale">"#));
    assert!(html.contains(r#"<meta property="og:url" content="https://foo.root.com/xY12abCD">"#));

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(common::link_counters(&pool, fixture.link_id).await, (0, 0, 0, 0));
}

#[sqlx::test]
async fn test_host_port_and_case_are_ignored(pool: PgPool) {
    seed_with_apps(&pool).await;
    let server = make_server(pool);

    let response = server
        .get("/xY12abCD")
        .add_header("Host", "FOO.Root.com:8080")
        .await;

    assert_eq!(response.status_code(), 307);
    assert_eq!(response.header("location"), "https://example.com/landing");
}

#[sqlx::test]
async fn test_unknown_code_is_not_found(pool: PgPool) {
    seed_with_apps(&pool).await;
    let server = make_server(pool);

    let response = server
        .get("/missing1")
        .add_header("Host", "foo.root.com")
        .await;

    response.assert_status_not_found();
    assert!(response.text().contains("<html"));
}

#[sqlx::test]
async fn test_code_on_other_project_host_is_not_found(pool: PgPool) {
    seed_with_apps(&pool).await;
    common::create_subdomain_project(&pool, "user_1", "other").await;
    let server = make_server(pool);

    let response = server
        .get("/xY12abCD")
        .add_header("Host", "other.root.com")
        .await;

    response.assert_status_not_found();
}

#[sqlx::test]
async fn test_unknown_and_missing_host_are_not_found(pool: PgPool) {
    seed_with_apps(&pool).await;
    let server = make_server(pool);

    server
        .get("/xY12abCD")
        .add_header("Host", "www.root.com")
        .await
        .assert_status_not_found();

    server
        .get("/xY12abCD")
        .add_header("Host", "root.com")
        .await
        .assert_status_not_found();

    server
        .get("/xY12abCD")
        .add_header("Host", "127.0.0.1")
        .await
        .assert_status_not_found();
}

#[sqlx::test]
async fn test_verified_custom_domain_redirects(pool: PgPool) {
    common::create_user(&pool, "user_1").await;
    let project_id =
        common::create_custom_domain_project(&pool, "user_1", "go.brand.com", true).await;
    common::create_link(&pool, project_id, "go.brand.com", "brand001", "https://brand.com/").await;
    let server = make_server(pool);

    let response = server
        .get("/brand001")
        .add_header("Host", "go.brand.com")
        .await;

    assert_eq!(response.status_code(), 307);
    assert_eq!(response.header("location"), "https://brand.com/");
}

#[sqlx::test]
async fn test_unverified_custom_domain_is_not_found(pool: PgPool) {
    common::create_user(&pool, "user_1").await;
    let project_id =
        common::create_custom_domain_project(&pool, "user_1", "go.brand.com", false).await;
    common::create_link(&pool, project_id, "go.brand.com", "brand001", "https://brand.com/").await;
    let server = make_server(pool);

    server
        .get("/brand001")
        .add_header("Host", "go.brand.com")
        .await
        .assert_status_not_found();
}

#[sqlx::test]
async fn test_nested_path_hits_fallback(pool: PgPool) {
    let server = make_server(pool);

    server
        .get("/a/b")
        .add_header("Host", "foo.root.com")
        .await
        .assert_status_not_found();
}

#[sqlx::test]
async fn test_concurrent_redirects_are_all_counted(pool: PgPool) {
    let fixture = seed_with_apps(&pool).await;
    let server = make_server(pool.clone());

    let (a, b, c) = tokio::join!(
        server
            .get("/xY12abCD")
            .add_header("Host", "foo.root.com")
            .into_future(),
        server
            .get("/xY12abCD")
            .add_header("Host", "foo.root.com")
            .into_future(),
        server
            .get("/xY12abCD")
            .add_header("Host", "foo.root.com")
            .add_header("User-Agent", common::IPHONE_UA)
            .into_future(),
    );
    assert_eq!(a.status_code(), 307);
    assert_eq!(b.status_code(), 307);
    assert_eq!(c.status_code(), 307);

    let counters = common::wait_for_clicks(&pool, fixture.link_id, 3).await;
    assert_eq!(counters, (3, 1, 0, 2));
}
