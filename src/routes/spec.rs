use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::error::{Error, Result};
use crate::router::RouterType;
use super::name::{derive_route_name, DEFERRED_ROOT_DOMAIN};

/// 라우트가 가리키는 타겟의 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TargetType {
    /// 이름으로 식별되는 외부 처리 잡
    Job,
    /// ID로 식별되는 호스팅 애플리케이션 인스턴스
    Instance,
    /// 임의의 백엔드 URL
    BackendUrl,
}

impl TargetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetType::Job => "job",
            TargetType::Instance => "instance",
            TargetType::BackendUrl => "backend-url",
        }
    }
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TargetType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "job" => Ok(TargetType::Job),
            "instance" => Ok(TargetType::Instance),
            "backend-url" => Ok(TargetType::BackendUrl),
            other => Err(Error::UnsupportedType {
                kind: "route target".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

/// 타겟 종류별 필수 필드를 담은 라우트 타겟
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "target-type", rename_all = "kebab-case")]
pub enum RouteTarget {
    Job {
        #[serde(rename = "job-name")]
        name: String,
    },
    Instance {
        #[serde(rename = "instance-id")]
        id: String,
    },
    BackendUrl {
        #[serde(rename = "target-resource-id")]
        resource_id: String,
        #[serde(rename = "backend-url")]
        url: Url,
    },
}

impl RouteTarget {
    pub fn target_type(&self) -> TargetType {
        match self {
            RouteTarget::Job { .. } => TargetType::Job,
            RouteTarget::Instance { .. } => TargetType::Instance,
            RouteTarget::BackendUrl { .. } => TargetType::BackendUrl,
        }
    }

    pub fn resource_id(&self) -> &str {
        match self {
            RouteTarget::Job { name } => name,
            RouteTarget::Instance { id } => id,
            RouteTarget::BackendUrl { resource_id, .. } => resource_id,
        }
    }
}

impl fmt::Display for RouteTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.target_type(), self.resource_id())
    }
}

/// 라우트 생성 요청 (가공 전 스펙)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RouteRequest {
    pub target_type: TargetType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_resource_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_domain: Option<String>,
}

impl RouteRequest {
    pub fn job(name: impl Into<String>) -> Self {
        Self::empty(TargetType::Job).with_field(|r| r.job_name = Some(name.into()))
    }

    pub fn instance(id: impl Into<String>) -> Self {
        Self::empty(TargetType::Instance).with_field(|r| r.instance_id = Some(id.into()))
    }

    pub fn backend_url(resource_id: impl Into<String>, url: impl Into<String>) -> Self {
        Self::empty(TargetType::BackendUrl).with_field(|r| {
            r.target_resource_id = Some(resource_id.into());
            r.backend_url = Some(url.into());
        })
    }

    pub fn empty(target_type: TargetType) -> Self {
        Self {
            target_type,
            job_name: None,
            instance_id: None,
            target_resource_id: None,
            backend_url: None,
            root_domain: None,
            sub_domain: None,
        }
    }

    pub fn with_root_domain(mut self, root_domain: impl Into<String>) -> Self {
        self.root_domain = Some(root_domain.into());
        self
    }

    pub fn with_sub_domain(mut self, sub_domain: impl Into<String>) -> Self {
        self.sub_domain = Some(sub_domain.into());
        self
    }

    fn with_field(mut self, f: impl FnOnce(&mut Self)) -> Self {
        f(&mut self);
        self
    }

    /// 타겟 종류에 맞는 필수 필드를 읽어 `RouteTarget`을 만듭니다.
    pub fn target(&self) -> Result<RouteTarget> {
        match self.target_type {
            TargetType::Job => Ok(RouteTarget::Job {
                name: required("job-name", &self.job_name)?,
            }),
            TargetType::Instance => Ok(RouteTarget::Instance {
                id: required("instance-id", &self.instance_id)?,
            }),
            TargetType::BackendUrl => {
                let raw = required("backend-url", &self.backend_url)?;
                let url = Url::parse(&raw)
                    .map_err(|e| Error::invalid_spec("route", "backend-url", &raw, e.to_string()))?;
                if !matches!(url.scheme(), "http" | "https") {
                    return Err(Error::invalid_spec("route", "backend-url", raw, "http(s) URL이어야 함"));
                }
                Ok(RouteTarget::BackendUrl {
                    resource_id: required("target-resource-id", &self.target_resource_id)?,
                    url,
                })
            }
        }
    }
}

fn required(field: &str, value: &Option<String>) -> Result<String> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(Error::invalid_spec(
            "route",
            field,
            value.clone().unwrap_or_default(),
            "타겟 타입에 필요한 필드가 없음",
        )),
    }
}

/// 생성 시점의 기본값 해석이 끝난 라우트 스펙
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRoute {
    pub target: RouteTarget,
    /// `None`이면 라우터 업데이트 시점에 기본 루트 도메인으로 결정됨
    pub root_domain: Option<String>,
    pub sub_domain: String,
}

fn is_unset(value: &Option<String>) -> bool {
    match value.as_deref().map(str::trim) {
        None | Some("") => true,
        Some(v) => v == DEFERRED_ROOT_DOMAIN,
    }
}

fn domain_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(?i)[a-z0-9]([a-z0-9-]{0,61}[a-z0-9])?(\.[a-z0-9]([a-z0-9-]{0,61}[a-z0-9])?)*$")
            .expect("도메인 정규식은 항상 유효함")
    })
}

fn validate_domain(field: &str, value: &str) -> Result<()> {
    if value.len() > 253 || !domain_pattern().is_match(value) {
        return Err(Error::invalid_spec("route", field, value, "유효한 DNS 이름이 아님"));
    }
    Ok(())
}

/// 라우트 요청의 기본값을 해석합니다.
///
/// * 서브 도메인이 비었거나 `default`면 `cc-{environment_id}-{target_resource_id}`를 합성하며,
///   이때 환경 ID가 없으면 `Error::Configuration`을 반환합니다.
/// * 루트 도메인이 비었거나 `default`면 `None`으로 남겨 컴파일 시점에 결정합니다.
pub fn resolve_route_defaults(request: &RouteRequest, environment_id: Option<&str>) -> Result<ResolvedRoute> {
    let target = request.target()?;

    let sub_domain = if is_unset(&request.sub_domain) {
        let env_id = environment_id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| Error::Configuration {
                setting: "ROUTERS_ENV_ID".to_string(),
                reason: format!("라우트 {}의 기본 서브 도메인 합성에 환경 ID가 필요함", target),
            })?;
        let sub_domain = format!("cc-{}-{}", env_id, target.resource_id());
        debug!(sub_domain = %sub_domain, "기본 서브 도메인 사용");
        sub_domain
    } else {
        let sub_domain = request.sub_domain.as_deref().unwrap_or_default().trim().to_string();
        validate_domain("sub-domain", &sub_domain)?;
        sub_domain
    };

    let root_domain = if is_unset(&request.root_domain) {
        debug!("루트 도메인은 라우터 업데이트 시점에 결정됨");
        None
    } else {
        let root_domain = request.root_domain.as_deref().unwrap_or_default().trim().to_string();
        validate_domain("root-domain", &root_domain)?;
        Some(root_domain)
    };

    Ok(ResolvedRoute {
        target,
        root_domain,
        sub_domain,
    })
}

/// 저장소에 보관되는 라우트
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Route {
    pub name: String,
    #[serde(rename = "type")]
    pub route_type: String,
    #[serde(flatten)]
    pub target: RouteTarget,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_domain: Option<String>,
    pub sub_domain: String,
    pub router_name: String,
    pub router_type: RouterType,
}

impl Route {
    pub fn new(resolved: ResolvedRoute, router_name: impl Into<String>, router_type: RouterType) -> Self {
        let target_type = resolved.target.target_type();
        let name = derive_route_name(
            target_type,
            resolved.target.resource_id(),
            resolved.root_domain.as_deref(),
            &resolved.sub_domain,
        );

        Self {
            name,
            route_type: format!("{}-subdomain", target_type),
            target: resolved.target,
            root_domain: resolved.root_domain,
            sub_domain: resolved.sub_domain,
            router_name: router_name.into(),
            router_type,
        }
    }

    pub fn target_type(&self) -> TargetType {
        self.target.target_type()
    }

    pub fn target_resource_id(&self) -> &str {
        self.target.resource_id()
    }

    /// 저장된 필드로 이름을 다시 계산합니다.
    pub fn derived_name(&self) -> String {
        derive_route_name(
            self.target_type(),
            self.target_resource_id(),
            self.root_domain.as_deref(),
            &self.sub_domain,
        )
    }
}
