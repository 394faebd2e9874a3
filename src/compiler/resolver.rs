use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::routes::RouteTarget;
use crate::settings::TargetSettings;

/// 잡 이름이나 인스턴스 ID를 접근 가능한 백엔드 URL로 해석합니다.
pub trait TargetResolver: Send + Sync {
    fn resolve(&self, route_name: &str, target: &RouteTarget) -> Result<String>;
}

/// 설정에 적힌 표로 타겟을 해석하는 리졸버
#[derive(Debug, Clone, Default)]
pub struct StaticTargetResolver {
    jobs: BTreeMap<String, String>,
    instances: BTreeMap<String, String>,
}

impl StaticTargetResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_job(mut self, name: impl Into<String>, url: impl Into<String>) -> Self {
        self.jobs.insert(name.into(), url.into());
        self
    }

    pub fn with_instance(mut self, id: impl Into<String>, url: impl Into<String>) -> Self {
        self.instances.insert(id.into(), url.into());
        self
    }
}

impl From<&TargetSettings> for StaticTargetResolver {
    fn from(settings: &TargetSettings) -> Self {
        Self {
            jobs: settings.jobs.clone(),
            instances: settings.instances.clone(),
        }
    }
}

impl TargetResolver for StaticTargetResolver {
    fn resolve(&self, route_name: &str, target: &RouteTarget) -> Result<String> {
        let found = match target {
            RouteTarget::BackendUrl { url, .. } => return Ok(url.to_string()),
            RouteTarget::Job { name } => self.jobs.get(name),
            RouteTarget::Instance { id } => self.instances.get(id),
        };

        found.cloned().ok_or_else(|| Error::TargetNotFound {
            route: route_name.to_string(),
            target: target.to_string(),
        })
    }
}
