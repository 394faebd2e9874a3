use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::compiler::StaticTargetResolver;
use crate::error::{Error, Result};
use crate::routes::{resolve_route_defaults, router_labels, Route, RouteRegistry, RouteRequest};
use crate::settings::Settings;
use crate::store::{Labels, Resource, ResourceKind, ResourceStore, SecretStore};
use super::annotations::{json_annotate, DEFAULT_ROOT_DOMAIN};
use super::backend::{ProxyBackend, UpdateOutcome};
use super::deployment::FileDeployment;
use super::traefik::TraefikBackend;
use super::{Aspect, ListMode, Router, RouterDetail, RouterListEntry, RouterSpec, RouterType};

/// 라우터 타입별 백엔드 구현
pub struct Backends {
    pub traefik: Arc<dyn ProxyBackend>,
}

impl Backends {
    fn for_type(&self, router_type: RouterType) -> &dyn ProxyBackend {
        match router_type {
            RouterType::Traefik => self.traefik.as_ref(),
        }
    }
}

/// 라우터 리소스의 생명주기를 관리하고 라우트 조작을 제공합니다.
pub struct RouterManager {
    store: Arc<dyn ResourceStore>,
    registry: RouteRegistry,
    backends: Backends,
    environment_id: Option<String>,
}

fn router_from_resource(resource: &Resource) -> Result<Router> {
    // 타입을 먼저 확인해 알 수 없는 타입은 파싱 에러가 아닌 UnsupportedType으로 보고
    if let Some(raw_type) = resource.spec.get("type").and_then(|value| value.as_str()) {
        raw_type.parse::<RouterType>()?;
    }

    let spec: RouterSpec = serde_json::from_value(resource.spec.clone())
        .map_err(|e| Error::serialization(format!("라우터 {}", resource.name), e))?;

    Ok(Router {
        name: resource.name.clone(),
        spec,
        annotations: resource.annotations.clone(),
    })
}

fn is_valid_router_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= 63
        && name.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        && !name.starts_with('-')
        && !name.ends_with('-')
}

impl RouterManager {
    pub fn new(
        store: Arc<dyn ResourceStore>,
        registry: RouteRegistry,
        backends: Backends,
        environment_id: Option<String>,
    ) -> Self {
        Self {
            store,
            registry,
            backends,
            environment_id,
        }
    }

    /// 설정으로부터 파일 배포와 정적 타겟 해석기를 쓰는 매니저를 구성합니다.
    pub async fn with_defaults(
        settings: &Settings,
        store: Arc<dyn ResourceStore>,
        secrets: Arc<dyn SecretStore>,
    ) -> Result<Self> {
        let registry = RouteRegistry::load(store.clone()).await?;
        let traefik = TraefikBackend::new(
            settings.traefik.clone(),
            secrets,
            Arc::new(StaticTargetResolver::from(&settings.targets)),
            Arc::new(FileDeployment::new(settings.traefik.config_dir.clone())),
        );

        Ok(Self::new(
            store,
            registry,
            Backends {
                traefik: Arc::new(traefik),
            },
            settings.router.environment_id.clone(),
        ))
    }

    pub fn registry(&self) -> &RouteRegistry {
        &self.registry
    }

    async fn load_router(&self, name: &str) -> Result<Router> {
        let resource = self.store.get(ResourceKind::Router, name).await?;
        router_from_resource(&resource)
    }

    /// 라우터를 생성합니다.
    ///
    /// 백엔드 준비에 실패하면 저장한 라우터 리소스를 다시 삭제하고 에러를 반환합니다.
    pub async fn create(&self, name: &str, spec: RouterSpec) -> Result<Router> {
        if !is_valid_router_name(name) {
            return Err(Error::invalid_spec(
                format!("router {}", name),
                "name",
                name,
                "소문자, 숫자, '-'로 이루어진 63자 이하의 이름이어야 함",
            ));
        }
        if spec.default_root_domain.trim().is_empty() {
            return Err(Error::invalid_spec(
                format!("router {}", name),
                "default-root-domain",
                &spec.default_root_domain,
                "비어 있을 수 없음",
            ));
        }

        match self.store.get(ResourceKind::Router, name).await {
            Ok(_) => {
                return Err(Error::AlreadyExists {
                    kind: ResourceKind::Router.to_string(),
                    name: name.to_string(),
                })
            }
            Err(e) if e.is_not_found() => {}
            Err(e) => return Err(e),
        }

        let router_type = spec.router_type;
        let mut router = Router {
            name: name.to_string(),
            spec,
            annotations: Default::default(),
        };
        json_annotate(&mut router.annotations, DEFAULT_ROOT_DOMAIN, &router.spec.default_root_domain)?;

        let stored_spec = serde_json::to_value(&router.spec)
            .map_err(|e| Error::serialization(format!("라우터 {}", name), e))?;
        let mut resource = Resource::new(ResourceKind::Router, name, stored_spec)
            .with_labels(router_labels(name, router_type));
        resource.annotations = router.annotations.clone();
        self.store.create(resource).await?;

        match self.backends.for_type(router_type).create(router).await {
            Ok(router) => {
                info!(router = %name, router_type = %router_type, "라우터 생성");
                Ok(router)
            }
            Err(e) => {
                error!(router = %name, error = %e, "백엔드 준비 실패, 라우터 리소스 롤백");
                if let Err(rollback) = self.store.delete(ResourceKind::Router, name).await {
                    warn!(router = %name, error = %rollback, "라우터 리소스 롤백 실패");
                }
                Err(e)
            }
        }
    }

    /// 라우터의 현재 라우트로 프록시 설정을 다시 생성해 적용합니다.
    pub async fn update(&self, name: &str, wait_ready: bool) -> Result<UpdateOutcome> {
        let router = self.load_router(name).await?;
        let routes = self
            .registry
            .list_routes_for_router(name, router.spec.router_type)
            .await?;
        debug!(router = %name, routes = routes.len(), wait_ready, "라우터 업데이트 시작");

        self.backends
            .for_type(router.spec.router_type)
            .update(name, wait_ready, &router.spec, &router.annotations, &routes)
            .await
    }

    pub async fn get(&self, name: &str) -> Result<RouterDetail> {
        let router = self.load_router(name).await?;
        self.detail(router).await
    }

    async fn detail(&self, router: Router) -> Result<RouterDetail> {
        let router_type = router.spec.router_type;
        let routes = self
            .registry
            .list_routes_for_router(&router.name, router_type)
            .await?
            .iter()
            .map(|route| {
                serde_json::to_value(route).map_err(|e| Error::serialization(format!("라우트 {}", route.name), e))
            })
            .collect::<Result<Vec<_>>>()?;

        let deployment = self
            .backends
            .for_type(router_type)
            .get(&router.name, Aspect::Deployment)
            .await?;
        let ready = deployment
            .get("ready")
            .and_then(|value| value.as_bool())
            .unwrap_or(false);

        Ok(RouterDetail {
            name: router.name,
            annotations: router.annotations,
            routes,
            router_type,
            deployment,
            ready,
        })
    }

    /// 라우터와 소속 라우트, 백엔드 리소스를 삭제합니다.
    ///
    /// 타입이 주어지면 라우터 리소스를 읽지 않으므로 리소스가 이미 사라진 경우에도 정리할 수 있습니다.
    pub async fn delete(&self, name: &str, router_type: Option<RouterType>) -> Result<()> {
        let router_type = match router_type {
            Some(router_type) => router_type,
            None => self.load_router(name).await?.spec.router_type,
        };

        self.backends.for_type(router_type).delete(name).await?;
        let removed_routes = self.registry.delete_for_router(name, router_type).await?;

        match self.store.delete(ResourceKind::Router, name).await {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {
                debug!(router = %name, "라우터 리소스가 이미 없음");
            }
            Err(e) => return Err(e),
        }

        info!(router = %name, router_type = %router_type, removed_routes, "라우터 삭제");
        Ok(())
    }

    pub async fn list(&self, mode: ListMode) -> Result<Vec<RouterListEntry>> {
        let resources = self.store.list(ResourceKind::Router, &Labels::new()).await?;
        let mut entries = Vec::with_capacity(resources.len());

        for resource in &resources {
            let router = match router_from_resource(resource) {
                Ok(router) => router,
                Err(e) => {
                    warn!(router = %resource.name, error = %e, "라우터 리소스 파싱 실패, 목록에서 제외");
                    continue;
                }
            };
            let entry = match mode {
                ListMode::Values => RouterListEntry::Values {
                    name: router.name,
                    router_type: router.spec.router_type,
                },
                ListMode::Summary => {
                    let detail = self.detail(router).await?;
                    RouterListEntry::Summary {
                        name: detail.name,
                        router_type: detail.router_type,
                        ready: detail.ready,
                    }
                }
                ListMode::Full => RouterListEntry::Full(self.detail(router).await?),
            };
            entries.push(entry);
        }

        Ok(entries)
    }

    /// 라우터에 서브도메인 라우트를 추가합니다. 프록시에 반영하려면 `update`가 필요합니다.
    pub async fn create_subdomain_route(&self, router_name: &str, request: &RouteRequest) -> Result<Route> {
        let router = self.load_router(router_name).await?;
        let resolved = resolve_route_defaults(request, self.environment_id.as_deref())?;
        let route = Route::new(resolved, router_name, router.spec.router_type);
        self.registry.create(route).await
    }

    pub async fn delete_route(&self, name: &str) -> Result<()> {
        self.registry.delete(name).await
    }

    pub async fn routes_for_job(&self, job_name: &str) -> Result<Vec<Route>> {
        self.registry.list_routes_by_job_name(job_name).await
    }

    pub async fn routes_for_instance(&self, instance_id: &str) -> Result<Vec<Route>> {
        self.registry.list_routes_by_instance_id(instance_id).await
    }

    pub async fn routes_for_target_resource(&self, target_resource_id: &str) -> Result<Vec<Route>> {
        self.registry.list_routes_by_target_resource_id(target_resource_id).await
    }
}
