use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::{Error, Result};

pub type SecretData = BTreeMap<String, String>;

/// 이름으로 참조되는 불투명한 키-값 시크릿 저장소
#[async_trait]
pub trait SecretStore: Send + Sync {
    async fn put(&self, name: &str, data: SecretData) -> Result<()>;

    async fn get(&self, name: &str) -> Result<Option<SecretData>>;

    /// 없는 시크릿 삭제는 에러가 아닙니다.
    async fn delete(&self, name: &str) -> Result<()>;
}

#[derive(Default)]
pub struct InMemorySecretStore {
    secrets: RwLock<BTreeMap<String, SecretData>>,
}

impl InMemorySecretStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SecretStore for InMemorySecretStore {
    async fn put(&self, name: &str, data: SecretData) -> Result<()> {
        if name.is_empty() {
            return Err(Error::invalid_spec("secret", "name", name, "시크릿 이름은 비어있을 수 없음"));
        }
        self.secrets.write().await.insert(name.to_string(), data);
        Ok(())
    }

    async fn get(&self, name: &str) -> Result<Option<SecretData>> {
        Ok(self.secrets.read().await.get(name).cloned())
    }

    async fn delete(&self, name: &str) -> Result<()> {
        self.secrets.write().await.remove(name);
        Ok(())
    }
}
