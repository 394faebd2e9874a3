//! Traefik 1.x 파일 프로바이더 설정 방언으로 라우팅 계획을 렌더링합니다.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::settings::TraefikSettings;
use super::RoutingPlan;

const HTTP_ENTRY_POINT: &str = "http";
const HTTPS_ENTRY_POINT: &str = "https";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraefikConfig {
    pub debug: bool,
    pub default_entry_points: Vec<String>,
    pub entry_points: BTreeMap<String, EntryPoint>,
    pub ping: Ping,
    pub access_log: Empty,
    pub file: Empty,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acme: Option<Acme>,
    pub backends: BTreeMap<String, Backend>,
    pub frontends: BTreeMap<String, Frontend>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Empty {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryPoint {
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tls: Option<Empty>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ping {
    pub entry_point: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Acme {
    pub email: String,
    pub storage: String,
    pub entry_point: String,
    pub dns_challenge: DnsChallenge,
    pub domains: Vec<AcmeDomain>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsChallenge {
    pub provider: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcmeDomain {
    pub main: String,
    pub sans: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Backend {
    pub servers: BTreeMap<String, Server>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Server {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Frontend {
    pub backend: String,
    pub pass_host_header: bool,
    pub headers: FrontendHeaders,
    pub routes: BTreeMap<String, FrontendRoute>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrontendHeaders {
    #[serde(rename = "SSLRedirect")]
    pub ssl_redirect: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrontendRoute {
    pub rule: String,
}

impl TraefikConfig {
    /// HTTP 엔트리포인트 하나만 가진 기본 설정
    fn base(settings: &TraefikSettings) -> Self {
        let mut entry_points = BTreeMap::new();
        entry_points.insert(
            HTTP_ENTRY_POINT.to_string(),
            EntryPoint {
                address: format!(":{}", settings.http_port),
                tls: None,
            },
        );

        Self {
            debug: false,
            default_entry_points: vec![HTTP_ENTRY_POINT.to_string()],
            entry_points,
            ping: Ping {
                entry_point: HTTP_ENTRY_POINT.to_string(),
            },
            access_log: Empty::default(),
            file: Empty::default(),
            acme: None,
            backends: BTreeMap::new(),
            frontends: BTreeMap::new(),
        }
    }

    pub fn render(plan: &RoutingPlan, settings: &TraefikSettings) -> Self {
        let mut config = Self::base(settings);
        let ssl_redirect = plan.ssl_redirect();

        for route in &plan.routes {
            let mut servers = BTreeMap::new();
            servers.insert(
                "server1".to_string(),
                Server {
                    url: route.backend_url.clone(),
                },
            );
            config.backends.insert(route.name.clone(), Backend { servers });

            let mut routes = BTreeMap::new();
            routes.insert(
                "route1".to_string(),
                FrontendRoute {
                    rule: format!("Host:{}", route.hostname),
                },
            );
            config.frontends.insert(
                route.name.clone(),
                Frontend {
                    backend: route.name.clone(),
                    pass_host_header: true,
                    headers: FrontendHeaders { ssl_redirect },
                    routes,
                },
            );
        }

        if let Some(tls) = &plan.tls {
            config.default_entry_points.push(HTTPS_ENTRY_POINT.to_string());
            config.entry_points.insert(
                HTTPS_ENTRY_POINT.to_string(),
                EntryPoint {
                    address: format!(":{}", settings.https_port),
                    tls: Some(Empty::default()),
                },
            );
            config.acme = Some(Acme {
                email: tls.email.clone(),
                storage: settings.acme_storage.clone(),
                entry_point: HTTPS_ENTRY_POINT.to_string(),
                dns_challenge: DnsChallenge {
                    provider: settings.dns_provider.clone(),
                },
                domains: tls
                    .domains
                    .iter()
                    .map(|group| AcmeDomain {
                        main: group.main.clone(),
                        sans: group.sans.clone(),
                    })
                    .collect(),
            });
        }

        config
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| Error::serialization("Traefik 설정 TOML 렌더링", e))
    }

    pub fn from_toml(document: &str) -> Result<Self> {
        toml::from_str(document).map_err(|e| Error::serialization("Traefik 설정 TOML 파싱", e))
    }

    pub fn to_json(&self) -> Result<serde_json::Value> {
        serde_json::to_value(self).map_err(|e| Error::serialization("Traefik 설정 JSON 렌더링", e))
    }
}
