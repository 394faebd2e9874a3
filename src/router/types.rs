use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::store::Annotations;

/// 프록시 백엔드 구현을 선택하는 라우터 타입
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouterType {
    #[default]
    Traefik,
}

impl RouterType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RouterType::Traefik => "traefik",
        }
    }
}

impl fmt::Display for RouterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RouterType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "traefik" => Ok(RouterType::Traefik),
            other => Err(Error::UnsupportedType {
                kind: "router".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

/// ACME DNS 챌린지용 자격 증명. 라우터 스펙에는 저장되지 않습니다.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct DnsCredentials {
    pub email: String,
    #[serde(rename = "api-key")]
    pub api_key: String,
}

impl fmt::Debug for DnsCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DnsCredentials")
            .field("email", &self.email)
            .field("api_key", &"***")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RouterSpec {
    #[serde(rename = "type", default)]
    pub router_type: RouterType,
    pub default_root_domain: String,
    #[serde(default, rename = "cloudflare", skip_serializing)]
    pub credentials: Option<DnsCredentials>,
}

impl RouterSpec {
    /// Traefik 라우터 스펙을 만듭니다. 이메일과 API 키가 모두 있을 때만 자격 증명이 설정됩니다.
    pub fn traefik(
        default_root_domain: impl Into<String>,
        cloudflare_email: Option<&str>,
        cloudflare_api_key: Option<&str>,
    ) -> Self {
        let credentials = match (cloudflare_email, cloudflare_api_key) {
            (Some(email), Some(api_key)) if !email.is_empty() && !api_key.is_empty() => Some(DnsCredentials {
                email: email.to_string(),
                api_key: api_key.to_string(),
            }),
            _ => None,
        };

        Self {
            router_type: RouterType::Traefik,
            default_root_domain: default_root_domain.into(),
            credentials,
        }
    }
}

/// 라우터 리소스
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Router {
    pub name: String,
    pub spec: RouterSpec,
    pub annotations: Annotations,
}

/// 백엔드에 요청할 상태의 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aspect {
    /// 배포 상태 (`ready` 포함)
    Deployment,
    /// 현재 적용된 설정 문서
    Config,
}

/// `get`이 반환하는 읽기 전용 상세 정보
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouterDetail {
    pub name: String,
    pub annotations: Annotations,
    pub routes: Vec<serde_json::Value>,
    #[serde(rename = "type")]
    pub router_type: RouterType,
    pub deployment: serde_json::Value,
    pub ready: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListMode {
    /// 이름과 타입만 (백엔드 조회 없음)
    Values,
    /// 이름, 타입, 준비 상태
    #[default]
    Summary,
    /// 전체 상세 정보
    Full,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RouterListEntry {
    Values {
        name: String,
        #[serde(rename = "type")]
        router_type: RouterType,
    },
    Summary {
        name: String,
        #[serde(rename = "type")]
        router_type: RouterType,
        ready: bool,
    },
    Full(RouterDetail),
}

impl RouterListEntry {
    pub fn name(&self) -> &str {
        match self {
            RouterListEntry::Values { name, .. } | RouterListEntry::Summary { name, .. } => name,
            RouterListEntry::Full(detail) => &detail.name,
        }
    }
}
