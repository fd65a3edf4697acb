mod common;

use dynlink::domain::entities::{NewProject, ProjectIdentity};
use dynlink::domain::repositories::{AppRepository, ProjectRepository};
use dynlink::domain::resolver::DomainResolver;
use dynlink::error::AppError;
use dynlink::infrastructure::persistence::{PgAppRepository, PgProjectRepository};
use sqlx::PgPool;
use std::sync::Arc;

fn new_project(user_id: &str, identity: ProjectIdentity) -> NewProject {
    NewProject {
        user_id: user_id.to_string(),
        name: "Foo".to_string(),
        description: Some("Marketing links".to_string()),
        identity,
    }
}

#[sqlx::test]
async fn test_create_and_find_owned(pool: PgPool) {
    common::create_user(&pool, "user_1").await;
    common::create_user(&pool, "user_2").await;
    let repo = PgProjectRepository::new(Arc::new(pool));

    let project = repo
        .create(new_project("user_1", ProjectIdentity::Subdomain("foo".to_string())))
        .await
        .unwrap();

    assert_eq!(project.identity, ProjectIdentity::Subdomain("foo".to_string()));
    assert_eq!(project.public_domain(common::ROOT_DOMAIN), "foo.root.com");

    let found = repo.find_owned("user_1", "foo").await.unwrap().unwrap();
    assert_eq!(found.id, project.id);

    assert!(repo.find_owned("user_2", "foo").await.unwrap().is_none());
}

#[sqlx::test]
async fn test_subdomain_is_unique(pool: PgPool) {
    common::create_user(&pool, "user_1").await;
    common::create_user(&pool, "user_2").await;
    let repo = PgProjectRepository::new(Arc::new(pool));

    repo.create(new_project("user_1", ProjectIdentity::Subdomain("taken".to_string())))
        .await
        .unwrap();
    let result = repo
        .create(new_project("user_2", ProjectIdentity::Subdomain("taken".to_string())))
        .await;

    assert!(matches!(result, Err(AppError::Conflict { .. })));
}

#[sqlx::test]
async fn test_find_with_apps(pool: PgPool) {
    common::create_user(&pool, "user_1").await;
    let project_id = common::create_subdomain_project(&pool, "user_1", "foo").await;
    common::create_ios_app(&pool, "user_1", Some(project_id), "com.foo.ios", "https://apps.apple.com/app/id1").await;
    let repo = PgProjectRepository::new(Arc::new(pool));
    let resolver = DomainResolver::new(common::ROOT_DOMAIN);

    let apps = repo
        .find_with_apps(&resolver.resolve(Some("foo.root.com")).unwrap())
        .await
        .unwrap()
        .unwrap();

    assert_eq!(apps.project.id, project_id);
    assert!(apps.android_app.is_none());
    assert_eq!(apps.ios_app.unwrap().app_id(), "ABCDE12345.com.foo.ios");

    assert!(repo
        .find_with_apps(&resolver.resolve(Some("bar.root.com")).unwrap())
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test]
async fn test_delete_removes_links_and_unbinds_apps(pool: PgPool) {
    common::create_user(&pool, "user_1").await;
    let project_id = common::create_subdomain_project(&pool, "user_1", "foo").await;
    let app_id = common::create_android_app(&pool, "user_1", Some(project_id), "com.foo.app").await;
    common::create_link(&pool, project_id, "foo.root.com", "gone0001", "https://a.com").await;
    let repo = PgProjectRepository::new(Arc::new(pool.clone()));

    assert!(!repo.delete("user_2", project_id).await.unwrap());
    assert!(repo.delete("user_1", project_id).await.unwrap());

    let links: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM links")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(links, 0);

    let bound: Option<i64> = sqlx::query_scalar("SELECT project_id FROM android_apps WHERE id = $1")
        .bind(app_id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert!(bound.is_none());

    assert!(!repo.delete("user_1", project_id).await.unwrap());
}

#[sqlx::test]
async fn test_list_by_user(pool: PgPool) {
    common::create_user(&pool, "user_1").await;
    common::create_subdomain_project(&pool, "user_1", "one").await;
    common::create_subdomain_project(&pool, "user_1", "two").await;
    let repo = PgProjectRepository::new(Arc::new(pool));

    assert_eq!(repo.list_by_user("user_1").await.unwrap().len(), 2);
    assert!(repo.list_by_user("user_2").await.unwrap().is_empty());
}

#[sqlx::test]
async fn test_bind_app_rules(pool: PgPool) {
    common::create_user(&pool, "user_1").await;
    common::create_user(&pool, "user_2").await;
    let project_id = common::create_subdomain_project(&pool, "user_1", "foo").await;
    let first = common::create_android_app(&pool, "user_1", None, "com.foo.one").await;
    let second = common::create_android_app(&pool, "user_1", None, "com.foo.two").await;
    let repo = PgAppRepository::new(Arc::new(pool));

    let bound = repo.bind_android("user_1", first, Some(project_id)).await.unwrap();
    assert_eq!(bound.project_id, Some(project_id));

    let result = repo.bind_android("user_1", second, Some(project_id)).await;
    assert!(matches!(result, Err(AppError::Conflict { .. })));

    let result = repo.bind_android("user_2", first, None).await;
    assert!(matches!(result, Err(AppError::NotFound { .. })));

    let unbound = repo.bind_android("user_1", first, None).await.unwrap();
    assert!(unbound.project_id.is_none());
}
