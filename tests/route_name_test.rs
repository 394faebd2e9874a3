use std::collections::HashSet;

use router_operator::error::Error;
use router_operator::router::RouterType;
use router_operator::routes::{derive_route_name, resolve_route_defaults, Route, RouteRequest, TargetType};

#[test]
fn test_name_is_deterministic() {
    let a = derive_route_name(TargetType::Instance, "site1", Some("example.com"), "www");
    let b = derive_route_name(TargetType::Instance, "site1", Some("example.com"), "www");
    assert_eq!(a, b);
    assert!(a.starts_with("cc"));
    assert!(a[2..].chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
}

#[test]
fn test_each_identity_field_changes_the_name() {
    let base = derive_route_name(TargetType::Job, "job1", Some("x.com"), "a");

    assert_ne!(base, derive_route_name(TargetType::Instance, "job1", Some("x.com"), "a"));
    assert_ne!(base, derive_route_name(TargetType::Job, "job2", Some("x.com"), "a"));
    assert_ne!(base, derive_route_name(TargetType::Job, "job1", Some("y.com"), "a"));
    assert_ne!(base, derive_route_name(TargetType::Job, "job1", Some("x.com"), "b"));
}

#[test]
fn test_deferred_root_domain_uses_default_marker() {
    assert_eq!(
        derive_route_name(TargetType::Job, "job1", None, "a"),
        derive_route_name(TargetType::Job, "job1", Some("default"), "a"),
    );
}

#[test]
fn test_no_collisions_over_large_sample() {
    let target_types = [TargetType::Job, TargetType::Instance, TargetType::BackendUrl];
    let roots = [None, Some("x.com"), Some("y.org")];
    let mut names = HashSet::new();
    let mut count = 0;

    for target_type in target_types {
        for root in roots {
            for i in 0..400 {
                for sub in ["", "www", "api"] {
                    names.insert(derive_route_name(target_type, &format!("res{}", i), root, sub));
                    count += 1;
                }
            }
        }
    }

    assert_eq!(count, 10_800);
    assert_eq!(names.len(), count);
}

#[test]
fn test_route_name_matches_resolved_identity() {
    let request = RouteRequest::instance("site1").with_root_domain("example.com");
    let route = Route::new(resolve_route_defaults(&request, Some("prod")).unwrap(), "r1", RouterType::Traefik);

    assert_eq!(route.sub_domain, "cc-prod-site1");
    assert_eq!(route.route_type, "instance-subdomain");
    assert_eq!(
        route.name,
        derive_route_name(TargetType::Instance, "site1", Some("example.com"), "cc-prod-site1")
    );
    assert_eq!(route.name, route.derived_name());
}

#[test]
fn test_missing_environment_id_is_configuration_error() {
    let request = RouteRequest::job("pusher");
    let err = resolve_route_defaults(&request, None).unwrap_err();
    assert!(matches!(err, Error::Configuration { .. }));

    // 서브 도메인이 명시되면 환경 ID가 필요 없음
    let request = RouteRequest::job("pusher").with_sub_domain("push");
    let resolved = resolve_route_defaults(&request, None).unwrap();
    assert_eq!(resolved.sub_domain, "push");
}

#[test]
fn test_request_from_json() {
    let request: RouteRequest = serde_json::from_str(
        r#"{"target-type": "backend-url", "target-resource-id": "ext1", "backend-url": "http://10.0.0.5:8080", "sub-domain": "ext"}"#,
    )
    .unwrap();
    let resolved = resolve_route_defaults(&request, None).unwrap();

    assert_eq!(resolved.target.target_type(), TargetType::BackendUrl);
    assert_eq!(resolved.target.resource_id(), "ext1");
    assert_eq!(resolved.root_domain, None);
}
