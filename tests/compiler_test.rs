use router_operator::compiler::{DomainGroup, RouteCompiler, StaticTargetResolver, TraefikConfig};
use router_operator::error::Error;
use router_operator::router::RouterType;
use router_operator::routes::{resolve_route_defaults, Route, RouteRequest};
use router_operator::settings::TraefikSettings;

fn job_route(job: &str, sub: &str, root: &str) -> Route {
    let request = RouteRequest::job(job).with_sub_domain(sub).with_root_domain(root);
    Route::new(resolve_route_defaults(&request, None).unwrap(), "r1", RouterType::Traefik)
}

fn resolver() -> StaticTargetResolver {
    StaticTargetResolver::new()
        .with_job("ja", "http://ja:8000")
        .with_job("jb", "http://jb:8000")
        .with_job("jc", "http://jc:8000")
}

fn sample_routes() -> Vec<Route> {
    vec![
        job_route("jc", "c", "y.com"),
        job_route("ja", "a", "x.com"),
        job_route("jb", "b", "x.com"),
    ]
}

#[test]
fn test_domain_grouping() {
    let resolver = resolver();
    let compilation = RouteCompiler::new(&resolver, "default.org").compile(&sample_routes(), Some("e@x.com"));

    assert!(compilation.is_complete());
    let tls = compilation.plan.tls.expect("TLS 활성화");
    assert_eq!(tls.email, "e@x.com");
    assert_eq!(
        tls.domains,
        vec![
            DomainGroup {
                main: "x.com".to_string(),
                sans: vec!["a.x.com".to_string(), "b.x.com".to_string()],
            },
            DomainGroup {
                main: "y.com".to_string(),
                sans: vec!["c.y.com".to_string()],
            },
        ]
    );
}

#[test]
fn test_no_tls_path() {
    let resolver = resolver();
    let compilation = RouteCompiler::new(&resolver, "default.org").compile(&sample_routes(), None);
    let config = TraefikConfig::render(&compilation.plan, &TraefikSettings::default());

    assert_eq!(config.default_entry_points, vec!["http".to_string()]);
    assert_eq!(config.entry_points.len(), 1);
    assert_eq!(config.entry_points["http"].address, ":80");
    assert!(config.acme.is_none());
    assert_eq!(config.frontends.len(), 3);
    assert!(config.frontends.values().all(|frontend| !frontend.headers.ssl_redirect));

    let document = config.to_toml().unwrap();
    assert!(!document.contains("https"));
    assert!(!document.contains("[acme"));
}

#[test]
fn test_tls_path_renders_acme_and_redirect() {
    let resolver = resolver();
    let compilation = RouteCompiler::new(&resolver, "default.org").compile(&sample_routes(), Some("e@x.com"));
    let config = TraefikConfig::render(&compilation.plan, &TraefikSettings::default());

    assert_eq!(config.default_entry_points, vec!["http".to_string(), "https".to_string()]);
    assert_eq!(config.entry_points["https"].address, ":443");
    assert!(config.entry_points["https"].tls.is_some());
    assert!(config.frontends.values().all(|frontend| frontend.headers.ssl_redirect));

    let acme = config.acme.as_ref().unwrap();
    assert_eq!(acme.storage, "/traefik-acme/acme.json");
    assert_eq!(acme.entry_point, "https");
    assert_eq!(acme.dns_challenge.provider, "cloudflare");
    assert_eq!(acme.domains.len(), 2);
}

#[test]
fn test_empty_router() {
    let resolver = StaticTargetResolver::new();
    let compilation = RouteCompiler::new(&resolver, "x.com").compile(&[], Some("e@x.com"));
    let config = TraefikConfig::render(&compilation.plan, &TraefikSettings::default());

    assert!(config.backends.is_empty());
    assert!(config.frontends.is_empty());
    assert!(config.acme.unwrap().domains.is_empty());

    let document = TraefikConfig::render(&compilation.plan, &TraefikSettings::default())
        .to_toml()
        .unwrap();
    assert_eq!(TraefikConfig::from_toml(&document).unwrap().backends.len(), 0);
}

#[test]
fn test_compile_is_order_independent_and_byte_identical() {
    let resolver = resolver();
    let compiler = RouteCompiler::new(&resolver, "default.org");
    let settings = TraefikSettings::default();

    let mut reversed = sample_routes();
    reversed.reverse();

    let first = TraefikConfig::render(&compiler.compile(&sample_routes(), Some("e@x.com")).plan, &settings)
        .to_toml()
        .unwrap();
    let second = TraefikConfig::render(&compiler.compile(&reversed, Some("e@x.com")).plan, &settings)
        .to_toml()
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(TraefikConfig::from_toml(&first).unwrap().to_toml().unwrap(), first);
}

#[test]
fn test_frontend_and_backend_per_route() {
    let resolver = resolver();
    let route = job_route("ja", "a", "x.com");
    let compilation = RouteCompiler::new(&resolver, "default.org").compile(&[route.clone()], None);
    let config = TraefikConfig::render(&compilation.plan, &TraefikSettings::default());

    let backend = &config.backends[&route.name];
    assert_eq!(backend.servers["server1"].url, "http://ja:8000");

    let frontend = &config.frontends[&route.name];
    assert_eq!(frontend.backend, route.name);
    assert!(frontend.pass_host_header);
    assert_eq!(frontend.routes["route1"].rule, "Host:a.x.com");
}

#[test]
fn test_deferred_root_uses_router_default() {
    let resolver = StaticTargetResolver::new().with_instance("site1", "http://site1:5000");
    let request = RouteRequest::instance("site1");
    let route = Route::new(resolve_route_defaults(&request, Some("env7")).unwrap(), "r1", RouterType::Traefik);

    let compilation = RouteCompiler::new(&resolver, "example.com").compile(&[route], Some("e@x.com"));
    assert_eq!(compilation.plan.routes[0].hostname, "cc-env7-site1.example.com");
    assert_eq!(compilation.plan.tls.unwrap().domains[0].main, "example.com");
}

#[test]
fn test_backend_url_route_uses_raw_url() {
    let resolver = StaticTargetResolver::new();
    let request = RouteRequest::backend_url("ext1", "http://10.0.0.5:8080").with_sub_domain("ext");
    let route = Route::new(resolve_route_defaults(&request, None).unwrap(), "r1", RouterType::Traefik);

    let compilation = RouteCompiler::new(&resolver, "x.com").compile(&[route], None);
    assert!(compilation.is_complete());
    assert_eq!(compilation.plan.routes[0].backend_url, "http://10.0.0.5:8080/");
}

#[test]
fn test_unresolvable_target_is_skipped() {
    let resolver = StaticTargetResolver::new().with_job("ja", "http://ja:8000");
    let routes = vec![job_route("ja", "a", "x.com"), job_route("missing", "m", "x.com")];

    let compilation = RouteCompiler::new(&resolver, "x.com").compile(&routes, Some("e@x.com"));

    assert_eq!(compilation.plan.routes.len(), 1);
    assert_eq!(compilation.failures.len(), 1);
    assert_eq!(compilation.failures[0].route, routes[1].name);
    assert!(matches!(compilation.failures[0].error, Error::TargetNotFound { .. }));
    // 건너뛴 라우트는 인증서 도메인에도 포함되지 않음
    assert_eq!(compilation.plan.tls.unwrap().domains[0].sans, vec!["a.x.com".to_string()]);
}

#[test]
fn test_blank_acme_email_disables_tls() {
    let resolver = resolver();
    let compilation = RouteCompiler::new(&resolver, "x.com").compile(&sample_routes(), Some("  "));
    assert!(compilation.plan.tls.is_none());
    assert!(!compilation.plan.ssl_redirect());
}
