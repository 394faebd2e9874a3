use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

/// 프록시 방언과 무관한 라우팅 계획
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct RoutingPlan {
    /// 라우트 이름 순으로 정렬된 라우트
    pub routes: Vec<PlannedRoute>,
    /// TLS가 활성화된 경우에만 존재
    pub tls: Option<AcmePlan>,
}

impl RoutingPlan {
    pub fn ssl_redirect(&self) -> bool {
        self.tls.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedRoute {
    pub name: String,
    pub backend_url: String,
    pub hostname: String,
    pub root_domain: String,
    pub sub_domain: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AcmePlan {
    pub email: String,
    pub domains: Vec<DomainGroup>,
}

/// 하나의 인증서 요청으로 묶이는 루트 도메인과 그 서브 도메인
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DomainGroup {
    pub main: String,
    pub sans: Vec<String>,
}

/// 루트 도메인별 서브 도메인 누적기
#[derive(Debug, Clone, Default)]
pub struct DomainAccumulator {
    domains: BTreeMap<String, BTreeSet<String>>,
}

impl DomainAccumulator {
    pub fn add(&mut self, root_domain: &str, sub_domain: &str) {
        let subs = self.domains.entry(root_domain.to_string()).or_default();
        // 빈 서브 도메인은 main 자체이므로 SAN에 넣지 않음
        if !sub_domain.is_empty() {
            subs.insert(sub_domain.to_string());
        }
    }

    pub fn into_groups(self) -> Vec<DomainGroup> {
        self.domains
            .into_iter()
            .map(|(root, subs)| DomainGroup {
                sans: subs.iter().map(|sub| format!("{}.{}", sub, root)).collect(),
                main: root,
            })
            .collect()
    }
}

pub fn frontend_hostname(root_domain: &str, sub_domain: &str) -> String {
    if sub_domain.is_empty() {
        root_domain.to_string()
    } else {
        format!("{}.{}", sub_domain, root_domain)
    }
}
