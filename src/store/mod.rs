//! 라우터/라우트 리소스를 보관하는 저장소 인터페이스입니다.

mod memory;
mod secrets;

pub use memory::InMemoryStore;
pub use secrets::{InMemorySecretStore, SecretData, SecretStore};

use std::collections::BTreeMap;
use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub type Labels = BTreeMap<String, String>;
pub type Annotations = BTreeMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    Router,
    Route,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Router => "CkanCloudRouter",
            ResourceKind::Route => "CkanCloudRoute",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 종류, 이름, 라벨, 어노테이션과 임의의 스펙 문서를 가진 리소스
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub kind: ResourceKind,
    pub name: String,
    #[serde(default)]
    pub labels: Labels,
    #[serde(default)]
    pub annotations: Annotations,
    pub spec: serde_json::Value,
}

impl Resource {
    pub fn new(kind: ResourceKind, name: impl Into<String>, spec: serde_json::Value) -> Self {
        Self {
            kind,
            name: name.into(),
            labels: Labels::new(),
            annotations: Annotations::new(),
            spec,
        }
    }

    pub fn with_labels(mut self, labels: Labels) -> Self {
        self.labels = labels;
        self
    }

    /// 모든 셀렉터 라벨이 일치하는지 확인합니다.
    pub fn matches(&self, selector: &Labels) -> bool {
        selector.iter().all(|(k, v)| self.labels.get(k) == Some(v))
    }
}

#[async_trait]
pub trait ResourceStore: Send + Sync {
    async fn get(&self, kind: ResourceKind, name: &str) -> Result<Resource>;

    /// 셀렉터의 모든 라벨과 일치하는 리소스를 반환합니다. 빈 셀렉터는 전체를 의미합니다.
    async fn list(&self, kind: ResourceKind, selector: &Labels) -> Result<Vec<Resource>>;

    async fn create(&self, resource: Resource) -> Result<()>;

    async fn delete(&self, kind: ResourceKind, name: &str) -> Result<()>;
}
