use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::router::RouterType;
use crate::store::{Labels, Resource, ResourceKind, ResourceStore};
use super::name::DEFERRED_ROOT_DOMAIN;
use super::{Route, RouteTarget};

pub const LABEL_ROUTER_NAME: &str = "ckan-cloud/router-name";
pub const LABEL_ROUTER_TYPE: &str = "ckan-cloud/router-type";
const LABEL_ROUTE_TYPE: &str = "ckan-cloud/route-type";
const LABEL_ROOT_DOMAIN: &str = "ckan-cloud/route-root-domain";
const LABEL_SUB_DOMAIN: &str = "ckan-cloud/route-sub-domain";
const LABEL_TARGET_TYPE: &str = "ckan-cloud/route-target-type";
const LABEL_TARGET_RESOURCE_ID: &str = "ckan-cloud/route-target-resource-id";
const LABEL_JOB_NAME: &str = "ckan-cloud/route-job-name";
const LABEL_INSTANCE_ID: &str = "ckan-cloud/route-instance-id";

/// 라우터 소속과 역방향 조회를 위한 인덱스 키
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IndexKey {
    Router { name: String, router_type: RouterType },
    JobName(String),
    InstanceId(String),
    TargetResourceId(String),
}

impl IndexKey {
    fn for_route(route: &Route) -> Vec<IndexKey> {
        let mut keys = vec![
            IndexKey::Router {
                name: route.router_name.clone(),
                router_type: route.router_type,
            },
            IndexKey::TargetResourceId(route.target_resource_id().to_string()),
        ];
        match &route.target {
            RouteTarget::Job { name } => keys.push(IndexKey::JobName(name.clone())),
            RouteTarget::Instance { id } => keys.push(IndexKey::InstanceId(id.clone())),
            RouteTarget::BackendUrl { .. } => {}
        }
        keys
    }
}

/// 인덱스 키에서 라우트 이름 집합으로의 보조 인덱스
#[derive(Debug, Default, Clone)]
pub struct RouteIndex {
    entries: BTreeMap<IndexKey, BTreeSet<String>>,
}

impl RouteIndex {
    pub fn insert(&mut self, route: &Route) {
        for key in IndexKey::for_route(route) {
            self.entries.entry(key).or_default().insert(route.name.clone());
        }
    }

    pub fn remove(&mut self, route: &Route) {
        for key in IndexKey::for_route(route) {
            if let Some(names) = self.entries.get_mut(&key) {
                names.remove(&route.name);
                if names.is_empty() {
                    self.entries.remove(&key);
                }
            }
        }
    }

    pub fn lookup(&self, key: &IndexKey) -> Vec<String> {
        self.entries
            .get(key)
            .map(|names| names.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// 라우터의 라벨 셀렉터
pub fn router_labels(router_name: &str, router_type: RouterType) -> Labels {
    let mut labels = Labels::new();
    labels.insert(LABEL_ROUTER_NAME.to_string(), router_name.to_string());
    labels.insert(LABEL_ROUTER_TYPE.to_string(), router_type.as_str().to_string());
    labels
}

fn route_labels(route: &Route) -> Labels {
    let mut labels = router_labels(&route.router_name, route.router_type);
    labels.insert(LABEL_ROUTE_TYPE.to_string(), route.route_type.clone());
    labels.insert(
        LABEL_ROOT_DOMAIN.to_string(),
        route.root_domain.clone().unwrap_or_else(|| DEFERRED_ROOT_DOMAIN.to_string()),
    );
    labels.insert(LABEL_SUB_DOMAIN.to_string(), route.sub_domain.clone());
    labels.insert(LABEL_TARGET_TYPE.to_string(), route.target_type().as_str().to_string());
    labels.insert(LABEL_TARGET_RESOURCE_ID.to_string(), route.target_resource_id().to_string());
    match &route.target {
        RouteTarget::Job { name } => {
            labels.insert(LABEL_JOB_NAME.to_string(), name.clone());
        }
        RouteTarget::Instance { id } => {
            labels.insert(LABEL_INSTANCE_ID.to_string(), id.clone());
        }
        RouteTarget::BackendUrl { .. } => {}
    }
    labels
}

fn route_from_resource(resource: &Resource) -> Result<Route> {
    serde_json::from_value(resource.spec.clone())
        .map_err(|e| Error::serialization(format!("라우트 {}", resource.name), e))
}

/// 라우트 리소스를 저장하고 명시적 보조 인덱스로 조회합니다.
pub struct RouteRegistry {
    store: Arc<dyn ResourceStore>,
    index: RwLock<RouteIndex>,
}

impl RouteRegistry {
    /// 저장소의 라우트 리소스로 인덱스를 다시 구성합니다.
    pub async fn load(store: Arc<dyn ResourceStore>) -> Result<Self> {
        let mut index = RouteIndex::default();
        let resources = store.list(ResourceKind::Route, &Labels::new()).await?;
        for resource in &resources {
            match route_from_resource(resource) {
                Ok(route) => index.insert(&route),
                Err(e) => warn!(route = %resource.name, error = %e, "라우트 리소스 파싱 실패, 인덱스에서 제외"),
            }
        }

        info!(route_count = resources.len(), index_keys = index.len(), "라우트 인덱스 구성 완료");
        Ok(Self {
            store,
            index: RwLock::new(index),
        })
    }

    /// 라우트를 저장하고 인덱스에 추가합니다.
    ///
    /// 같은 이름의 라우트가 이미 있으면 새로 만들지 않고 기존 라우트를 반환합니다.
    pub async fn create(&self, route: Route) -> Result<Route> {
        let mut index = self.index.write().await;

        match self.store.get(ResourceKind::Route, &route.name).await {
            Ok(existing) => {
                let existing = route_from_resource(&existing)?;
                // 이름에 라우터가 포함되지 않으므로 소유 라우터가 다르면 다른 선언임
                if existing.router_name != route.router_name || existing.router_type != route.router_type {
                    warn!(
                        route = %route.name,
                        owner = %existing.router_name,
                        requested = %route.router_name,
                        "다른 라우터가 이미 소유한 라우트"
                    );
                    return Err(Error::AlreadyExists {
                        kind: ResourceKind::Route.to_string(),
                        name: format!("{} (router {})", existing.name, existing.router_name),
                    });
                }
                info!(route = %existing.name, "동일한 라우트가 이미 존재함");
                index.insert(&existing);
                return Ok(existing);
            }
            Err(e) if e.is_not_found() => {}
            Err(e) => return Err(e),
        }

        let spec = serde_json::to_value(&route)
            .map_err(|e| Error::serialization(format!("라우트 {}", route.name), e))?;
        let resource = Resource::new(ResourceKind::Route, route.name.clone(), spec)
            .with_labels(route_labels(&route));

        self.store.create(resource).await?;
        index.insert(&route);

        info!(
            route = %route.name,
            router = %route.router_name,
            target = %route.target,
            sub_domain = %route.sub_domain,
            "라우트 생성"
        );
        Ok(route)
    }

    pub async fn get(&self, name: &str) -> Result<Route> {
        let resource = self.store.get(ResourceKind::Route, name).await?;
        route_from_resource(&resource)
    }

    pub async fn delete(&self, name: &str) -> Result<()> {
        let mut index = self.index.write().await;
        let route = self.get(name).await?;
        self.store.delete(ResourceKind::Route, name).await?;
        index.remove(&route);
        info!(route = %name, "라우트 삭제");
        Ok(())
    }

    /// 라우터에 속한 라우트를 모두 삭제하고 삭제한 개수를 반환합니다.
    pub async fn delete_for_router(&self, router_name: &str, router_type: RouterType) -> Result<usize> {
        let routes = self.list_routes_for_router(router_name, router_type).await?;
        for route in &routes {
            match self.delete(&route.name).await {
                Ok(()) => {}
                Err(e) if e.is_not_found() => {}
                Err(e) => return Err(e),
            }
        }
        Ok(routes.len())
    }

    pub async fn list_routes_for_router(&self, router_name: &str, router_type: RouterType) -> Result<Vec<Route>> {
        self.lookup(&IndexKey::Router {
            name: router_name.to_string(),
            router_type,
        })
        .await
    }

    pub async fn list_routes_by_job_name(&self, job_name: &str) -> Result<Vec<Route>> {
        self.lookup(&IndexKey::JobName(job_name.to_string())).await
    }

    pub async fn list_routes_by_instance_id(&self, instance_id: &str) -> Result<Vec<Route>> {
        self.lookup(&IndexKey::InstanceId(instance_id.to_string())).await
    }

    pub async fn list_routes_by_target_resource_id(&self, target_resource_id: &str) -> Result<Vec<Route>> {
        self.lookup(&IndexKey::TargetResourceId(target_resource_id.to_string())).await
    }

    async fn lookup(&self, key: &IndexKey) -> Result<Vec<Route>> {
        let names = self.index.read().await.lookup(key);
        let mut routes = Vec::with_capacity(names.len());

        for name in names {
            match self.get(&name).await {
                Ok(route) => routes.push(route),
                Err(e) if e.is_not_found() => {
                    warn!(route = %name, key = ?key, "인덱스에 있지만 저장소에 없는 라우트");
                }
                Err(e) => return Err(e),
            }
        }

        debug!(key = ?key, count = routes.len(), "라우트 조회");
        Ok(routes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::{resolve_route_defaults, RouteRequest};

    fn route(request: RouteRequest, router: &str) -> Route {
        Route::new(resolve_route_defaults(&request, Some("env7")).unwrap(), router, RouterType::Traefik)
    }

    #[test]
    fn test_index_insert_and_remove() {
        let mut index = RouteIndex::default();
        let r = route(RouteRequest::job("pusher"), "r1");
        index.insert(&r);

        assert_eq!(index.lookup(&IndexKey::JobName("pusher".to_string())), vec![r.name.clone()]);
        assert_eq!(index.lookup(&IndexKey::TargetResourceId("pusher".to_string())), vec![r.name.clone()]);
        assert!(index.lookup(&IndexKey::InstanceId("pusher".to_string())).is_empty());

        index.remove(&r);
        assert!(index.is_empty());
    }

    #[test]
    fn test_route_labels() {
        let r = route(RouteRequest::instance("site1"), "r1");
        let labels = route_labels(&r);
        assert_eq!(labels[LABEL_ROUTER_NAME], "r1");
        assert_eq!(labels[LABEL_ROUTER_TYPE], "traefik");
        assert_eq!(labels[LABEL_ROUTE_TYPE], "instance-subdomain");
        assert_eq!(labels[LABEL_ROOT_DOMAIN], "default");
        assert_eq!(labels[LABEL_SUB_DOMAIN], "cc-env7-site1");
        assert_eq!(labels[LABEL_INSTANCE_ID], "site1");
        assert!(!labels.contains_key(LABEL_JOB_NAME));
    }
}
