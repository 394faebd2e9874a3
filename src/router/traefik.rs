use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, instrument, warn};

use crate::compiler::{RouteCompiler, TargetResolver, TraefikConfig};
use crate::error::{Error, Result};
use crate::routes::Route;
use crate::settings::TraefikSettings;
use crate::store::{Annotations, SecretData, SecretStore};
use super::annotations::{get_json_annotation, DEFAULT_ROOT_DOMAIN};
use super::backend::{ProxyBackend, UpdateOutcome};
use super::deployment::ProxyDeployment;
use super::readiness::{wait_until_ready, ReadinessPolicy, ReadinessProbe};
use super::{Aspect, Router, RouterSpec};

const SECRET_EMAIL: &str = "email";
const SECRET_API_KEY: &str = "api-key";

pub fn credentials_secret_name(router: &str) -> String {
    format!("{}-cloudflare", router)
}

/// Traefik 파일 프로바이더 설정을 생성해 적용하는 백엔드
pub struct TraefikBackend {
    settings: TraefikSettings,
    secrets: Arc<dyn SecretStore>,
    resolver: Arc<dyn TargetResolver>,
    deployment: Arc<dyn ProxyDeployment>,
}

struct DeploymentProbe<'a> {
    deployment: &'a dyn ProxyDeployment,
    router: &'a str,
}

#[async_trait]
impl ReadinessProbe for DeploymentProbe<'_> {
    async fn is_ready(&self) -> Result<bool> {
        Ok(self.deployment.status(self.router).await?.ready)
    }
}

impl TraefikBackend {
    pub fn new(
        settings: TraefikSettings,
        secrets: Arc<dyn SecretStore>,
        resolver: Arc<dyn TargetResolver>,
        deployment: Arc<dyn ProxyDeployment>,
    ) -> Self {
        Self {
            settings,
            secrets,
            resolver,
            deployment,
        }
    }

    /// 시크릿에 저장된 ACME 이메일. 자격 증명이 없으면 TLS 없이 컴파일됩니다.
    async fn acme_email(&self, name: &str) -> Result<Option<String>> {
        let secret = self.secrets.get(&credentials_secret_name(name)).await?;
        Ok(secret
            .and_then(|data| data.get(SECRET_EMAIL).cloned())
            .filter(|email| !email.is_empty()))
    }
}

#[async_trait]
impl ProxyBackend for TraefikBackend {
    #[instrument(skip(self, router), fields(router = %router.name), level = "debug", err)]
    async fn create(&self, mut router: Router) -> Result<Router> {
        // 자격 증명은 라우터 스펙이 아닌 시크릿으로만 보관
        let stored_secret = match router.spec.credentials.take() {
            Some(credentials) => {
                let mut data = SecretData::new();
                data.insert(SECRET_EMAIL.to_string(), credentials.email);
                data.insert(SECRET_API_KEY.to_string(), credentials.api_key);
                self.secrets.put(&credentials_secret_name(&router.name), data).await?;
                info!(router = %router.name, "DNS 자격 증명을 시크릿으로 저장");
                true
            }
            None => false,
        };

        if let Err(e) = self.deployment.provision(&router.name).await {
            // 이번 호출에서 기록한 시크릿만 되돌림
            if stored_secret {
                if let Err(rollback) = self.secrets.delete(&credentials_secret_name(&router.name)).await {
                    warn!(router = %router.name, error = %rollback, "DNS 자격 증명 시크릿 롤백 실패");
                }
            }
            return Err(e);
        }

        Ok(router)
    }

    #[instrument(skip(self, spec, annotations, routes), level = "debug", err)]
    async fn update(
        &self,
        name: &str,
        wait_ready: bool,
        spec: &RouterSpec,
        annotations: &Annotations,
        routes: &[Route],
    ) -> Result<UpdateOutcome> {
        let default_root_domain: String = get_json_annotation(annotations, DEFAULT_ROOT_DOMAIN)?
            .unwrap_or_else(|| spec.default_root_domain.clone());
        if default_root_domain.is_empty() {
            return Err(Error::invalid_spec(
                format!("router {}", name),
                "default-root-domain",
                "",
                "기본 루트 도메인이 없음",
            ));
        }

        let acme_email = self.acme_email(name).await?;
        let compilation = RouteCompiler::new(self.resolver.as_ref(), &default_root_domain)
            .compile(routes, acme_email.as_deref());

        let document = TraefikConfig::render(&compilation.plan, &self.settings).to_toml()?;
        self.deployment.apply(name, &document).await?;

        if wait_ready {
            let probe = DeploymentProbe {
                deployment: self.deployment.as_ref(),
                router: name,
            };
            wait_until_ready(name, &probe, &ReadinessPolicy::from(&self.settings)).await?;
        }

        info!(
            router = %name,
            routes = compilation.plan.routes.len(),
            skipped = compilation.failures.len(),
            tls = compilation.plan.ssl_redirect(),
            "Traefik 설정 업데이트 완료"
        );

        Ok(UpdateOutcome {
            document,
            routes_applied: compilation.plan.routes.len(),
            skipped: compilation.failures,
        })
    }

    async fn get(&self, name: &str, aspect: Aspect) -> Result<serde_json::Value> {
        match aspect {
            Aspect::Deployment => {
                let status = self.deployment.status(name).await?;
                serde_json::to_value(status).map_err(|e| Error::serialization("배포 상태", e))
            }
            Aspect::Config => match self.deployment.current(name).await? {
                Some(document) => TraefikConfig::from_toml(&document)?.to_json(),
                None => Ok(serde_json::Value::Null),
            },
        }
    }

    async fn delete(&self, name: &str) -> Result<()> {
        self.deployment.teardown(name).await?;
        self.secrets.delete(&credentials_secret_name(name)).await?;
        info!(router = %name, "Traefik 라우터 리소스 정리");
        Ok(())
    }
}
