use std::sync::Arc;

use router_operator::error::Error;
use router_operator::router::RouterType;
use router_operator::routes::{resolve_route_defaults, Route, RouteRegistry, RouteRequest, LABEL_ROUTER_NAME};
use router_operator::store::{InMemoryStore, Labels, ResourceKind, ResourceStore};

fn route(request: RouteRequest, router: &str) -> Route {
    Route::new(resolve_route_defaults(&request, Some("env7")).unwrap(), router, RouterType::Traefik)
}

async fn registry() -> (Arc<InMemoryStore>, RouteRegistry) {
    let store = Arc::new(InMemoryStore::new());
    let registry = RouteRegistry::load(store.clone()).await.unwrap();
    (store, registry)
}

#[tokio::test]
async fn test_round_trip_through_router_listing() {
    let (_, registry) = registry().await;
    let created = registry
        .create(route(RouteRequest::job("pusher").with_root_domain("x.com"), "r1"))
        .await
        .unwrap();

    let listed = registry.list_routes_for_router("r1", RouterType::Traefik).await.unwrap();
    assert_eq!(listed.len(), 1);

    let fetched = &listed[0];
    assert_eq!(fetched, &created);
    assert_eq!(fetched.target_type(), created.target_type());
    assert_eq!(fetched.target_resource_id(), "pusher");
    assert_eq!(fetched.root_domain.as_deref(), Some("x.com"));
    assert_eq!(fetched.sub_domain, "cc-env7-pusher");
    assert_eq!(fetched.derived_name(), created.name);
}

#[tokio::test]
async fn test_create_is_idempotent() {
    let (store, registry) = registry().await;
    let first = registry.create(route(RouteRequest::instance("site1"), "r1")).await.unwrap();
    let second = registry.create(route(RouteRequest::instance("site1"), "r1")).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(store.list(ResourceKind::Route, &Labels::new()).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_same_route_under_another_router_is_rejected() {
    let (store, registry) = registry().await;
    let request = || RouteRequest::job("pusher").with_sub_domain("push").with_root_domain("x.com");
    let owned = registry.create(route(request(), "r1")).await.unwrap();

    let err = registry.create(route(request(), "r2")).await.unwrap_err();
    assert!(matches!(err, Error::AlreadyExists { ref name, .. } if name.contains("r1")));

    // 기존 소유자는 그대로 유지되고 r2에는 아무것도 기록되지 않음
    assert_eq!(registry.list_routes_for_router("r1", RouterType::Traefik).await.unwrap(), vec![owned]);
    assert!(registry.list_routes_for_router("r2", RouterType::Traefik).await.unwrap().is_empty());
    assert_eq!(store.list(ResourceKind::Route, &Labels::new()).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_reverse_lookups() {
    let (_, registry) = registry().await;
    let job = registry.create(route(RouteRequest::job("pusher"), "r1")).await.unwrap();
    let instance = registry.create(route(RouteRequest::instance("site1"), "r2")).await.unwrap();
    let external = registry
        .create(route(RouteRequest::backend_url("ext1", "https://ext.example.org"), "r1"))
        .await
        .unwrap();

    let by_job = registry.list_routes_by_job_name("pusher").await.unwrap();
    assert_eq!(by_job, vec![job.clone()]);

    let by_instance = registry.list_routes_by_instance_id("site1").await.unwrap();
    assert_eq!(by_instance, vec![instance]);

    let by_resource = registry.list_routes_by_target_resource_id("ext1").await.unwrap();
    assert_eq!(by_resource, vec![external.clone()]);

    let mut expected: Vec<String> = vec![job.name, external.name];
    expected.sort();
    let r1: Vec<String> = registry
        .list_routes_for_router("r1", RouterType::Traefik)
        .await
        .unwrap()
        .into_iter()
        .map(|route| route.name)
        .collect();
    assert_eq!(r1, expected);
}

#[tokio::test]
async fn test_empty_results() {
    let (_, registry) = registry().await;
    assert!(registry.list_routes_for_router("nothing", RouterType::Traefik).await.unwrap().is_empty());
    assert!(registry.list_routes_by_job_name("nothing").await.unwrap().is_empty());
    assert!(registry.list_routes_by_instance_id("nothing").await.unwrap().is_empty());
    assert!(registry.list_routes_by_target_resource_id("nothing").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_delete_updates_index() {
    let (store, registry) = registry().await;
    let r = registry.create(route(RouteRequest::job("pusher"), "r1")).await.unwrap();
    registry.create(route(RouteRequest::job("other"), "r1")).await.unwrap();

    registry.delete(&r.name).await.unwrap();
    assert!(registry.list_routes_by_job_name("pusher").await.unwrap().is_empty());
    assert!(registry.delete(&r.name).await.unwrap_err().is_not_found());

    let removed = registry.delete_for_router("r1", RouterType::Traefik).await.unwrap();
    assert_eq!(removed, 1);
    assert!(store.list(ResourceKind::Route, &Labels::new()).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_load_rebuilds_index_from_store() {
    let (store, registry) = registry().await;
    let created = registry.create(route(RouteRequest::instance("site1"), "r1")).await.unwrap();

    let mut selector = Labels::new();
    selector.insert(LABEL_ROUTER_NAME.to_string(), "r1".to_string());
    assert_eq!(store.list(ResourceKind::Route, &selector).await.unwrap().len(), 1);

    let reloaded = RouteRegistry::load(store.clone()).await.unwrap();
    assert_eq!(reloaded.list_routes_by_instance_id("site1").await.unwrap(), vec![created]);
}
