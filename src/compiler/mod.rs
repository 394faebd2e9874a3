//! 라우트 집합을 프록시 설정으로 컴파일하는 모듈입니다.
//!
//! 컴파일은 부수 효과가 없는 순수 함수이며, 같은 라우트 집합과 ACME 설정에 대해
//! 항상 같은 결과를 만듭니다. 라우트는 이름 순으로 정렬된 뒤 처리되므로
//! 레지스트리가 돌려준 순서는 결과에 영향을 주지 않습니다.
//!
//! ```
//! use router_operator::compiler::{RouteCompiler, StaticTargetResolver};
//! use router_operator::routes::{resolve_route_defaults, Route, RouteRequest};
//! use router_operator::router::RouterType;
//!
//! let request = RouteRequest::job("pusher").with_sub_domain("push").with_root_domain("x.com");
//! let route = Route::new(resolve_route_defaults(&request, None).unwrap(), "r1", RouterType::Traefik);
//!
//! let resolver = StaticTargetResolver::new().with_job("pusher", "http://pusher:8800");
//! let compilation = RouteCompiler::new(&resolver, "example.com").compile(&[route], Some("ops@x.com"));
//!
//! assert!(compilation.failures.is_empty());
//! assert_eq!(compilation.plan.routes[0].hostname, "push.x.com");
//! assert!(compilation.plan.ssl_redirect());
//! ```

mod plan;
mod resolver;
pub mod traefik;

pub use plan::{frontend_hostname, AcmePlan, DomainAccumulator, DomainGroup, PlannedRoute, RoutingPlan};
pub use resolver::{StaticTargetResolver, TargetResolver};
pub use traefik::TraefikConfig;

use tracing::{debug, warn};

use crate::error::Error;
use crate::routes::Route;

/// 컴파일 중 건너뛴 라우트와 그 이유
#[derive(Debug)]
pub struct RouteFailure {
    pub route: String,
    pub error: Error,
}

/// 컴파일 결과: 라우팅 계획과 건너뛴 라우트 목록
#[derive(Debug)]
pub struct Compilation {
    pub plan: RoutingPlan,
    pub failures: Vec<RouteFailure>,
}

impl Compilation {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

pub struct RouteCompiler<'a> {
    resolver: &'a dyn TargetResolver,
    default_root_domain: &'a str,
}

impl<'a> RouteCompiler<'a> {
    pub fn new(resolver: &'a dyn TargetResolver, default_root_domain: &'a str) -> Self {
        Self {
            resolver,
            default_root_domain,
        }
    }

    /// 라우트 목록을 라우팅 계획으로 컴파일합니다.
    ///
    /// 타겟을 해석할 수 없는 라우트는 건너뛰고 `failures`에 모아 반환하며,
    /// 나머지 라우트는 그대로 컴파일됩니다.
    /// `acme_email`이 비어있지 않으면 TLS가 활성화되고 모든 프론트엔드에 SSL 리다이렉트가 켜집니다.
    pub fn compile(&self, routes: &[Route], acme_email: Option<&str>) -> Compilation {
        let acme_email = acme_email.map(str::trim).filter(|email| !email.is_empty());

        let mut ordered: Vec<&Route> = routes.iter().collect();
        ordered.sort_by(|a, b| a.name.cmp(&b.name));
        ordered.dedup_by(|a, b| a.name == b.name);

        let mut domains = DomainAccumulator::default();
        let mut planned = Vec::with_capacity(ordered.len());
        let mut failures = Vec::new();

        for route in ordered {
            let backend_url = match self.resolver.resolve(&route.name, &route.target) {
                Ok(url) => url,
                Err(error) => {
                    warn!(route = %route.name, target = %route.target, error = %error, "타겟 해석 실패, 라우트 건너뜀");
                    failures.push(RouteFailure {
                        route: route.name.clone(),
                        error,
                    });
                    continue;
                }
            };

            let root_domain = route
                .root_domain
                .clone()
                .unwrap_or_else(|| self.default_root_domain.to_string());
            let hostname = frontend_hostname(&root_domain, &route.sub_domain);
            domains.add(&root_domain, &route.sub_domain);

            debug!(route = %route.name, hostname = %hostname, backend = %backend_url, "라우트 컴파일");
            planned.push(PlannedRoute {
                name: route.name.clone(),
                backend_url,
                hostname,
                root_domain,
                sub_domain: route.sub_domain.clone(),
            });
        }

        let tls = acme_email.map(|email| AcmePlan {
            email: email.to_string(),
            domains: domains.into_groups(),
        });

        Compilation {
            plan: RoutingPlan {
                routes: planned,
                tls,
            },
            failures,
        }
    }
}
