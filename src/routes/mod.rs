//! 라우트의 식별, 스펙 모델과 라우트 레지스트리를 제공하는 모듈입니다.

mod name;
mod registry;
mod spec;

pub use name::{derive_route_name, DEFERRED_ROOT_DOMAIN, ROUTE_NAME_PREFIX};
pub use registry::{router_labels, IndexKey, RouteIndex, RouteRegistry, LABEL_ROUTER_NAME, LABEL_ROUTER_TYPE};
pub use spec::{resolve_route_defaults, ResolvedRoute, Route, RouteRequest, RouteTarget, TargetType};
