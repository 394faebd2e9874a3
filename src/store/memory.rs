use std::collections::BTreeMap;
use std::path::Path;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::error::{Error, Result};
use super::{Labels, Resource, ResourceKind, ResourceStore};

/// 프로세스 내부 리소스 저장소입니다.
///
/// 목록 조회는 삽입 순서를 따르며, JSON 스냅샷으로 저장하고 다시 읽을 수 있습니다.
#[derive(Default)]
pub struct InMemoryStore {
    resources: RwLock<BTreeMap<ResourceKind, Vec<Resource>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 스냅샷 파일에서 저장소를 복원합니다. 파일이 없으면 빈 저장소를 반환합니다.
    pub async fn load_snapshot<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %path.display(), "스냅샷 파일 없음, 빈 저장소로 시작");
                return Ok(Self::new());
            }
            Err(e) => {
                return Err(Error::Io {
                    path: path.display().to_string(),
                    source: e,
                })
            }
        };

        let items: Vec<Resource> = serde_json::from_str(&content)
            .map_err(|e| Error::serialization(format!("스냅샷 {}", path.display()), e))?;

        let mut resources: BTreeMap<ResourceKind, Vec<Resource>> = BTreeMap::new();
        for item in items {
            resources.entry(item.kind).or_default().push(item);
        }

        info!(path = %path.display(), "스냅샷 로드 완료");
        Ok(Self {
            resources: RwLock::new(resources),
        })
    }

    /// 현재 상태를 스냅샷 파일로 저장합니다. 임시 파일에 쓴 뒤 교체합니다.
    pub async fn save_snapshot<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let items: Vec<Resource> = {
            let resources = self.resources.read().await;
            resources.values().flatten().cloned().collect()
        };

        let content = serde_json::to_string_pretty(&items)
            .map_err(|e| Error::serialization("스냅샷 저장", e))?;

        let tmp_path = path.with_extension("tmp");
        let io_err = |e: std::io::Error| Error::Io {
            path: path.display().to_string(),
            source: e,
        };
        tokio::fs::write(&tmp_path, content).await.map_err(io_err)?;
        tokio::fs::rename(&tmp_path, path).await.map_err(io_err)?;

        debug!(path = %path.display(), count = items.len(), "스냅샷 저장 완료");
        Ok(())
    }
}

#[async_trait]
impl ResourceStore for InMemoryStore {
    async fn get(&self, kind: ResourceKind, name: &str) -> Result<Resource> {
        let resources = self.resources.read().await;
        resources
            .get(&kind)
            .and_then(|items| items.iter().find(|r| r.name == name))
            .cloned()
            .ok_or_else(|| Error::not_found(kind.as_str(), name))
    }

    async fn list(&self, kind: ResourceKind, selector: &Labels) -> Result<Vec<Resource>> {
        let resources = self.resources.read().await;
        Ok(resources
            .get(&kind)
            .map(|items| items.iter().filter(|r| r.matches(selector)).cloned().collect())
            .unwrap_or_default())
    }

    async fn create(&self, resource: Resource) -> Result<()> {
        let mut resources = self.resources.write().await;
        let items = resources.entry(resource.kind).or_default();
        if items.iter().any(|r| r.name == resource.name) {
            return Err(Error::AlreadyExists {
                kind: resource.kind.as_str().to_string(),
                name: resource.name,
            });
        }

        debug!(kind = %resource.kind, name = %resource.name, "리소스 생성");
        items.push(resource);
        Ok(())
    }

    async fn delete(&self, kind: ResourceKind, name: &str) -> Result<()> {
        let mut resources = self.resources.write().await;
        let items = resources.entry(kind).or_default();
        let before = items.len();
        items.retain(|r| r.name != name);

        if items.len() == before {
            return Err(Error::not_found(kind.as_str(), name));
        }

        debug!(kind = %kind, name = %name, "리소스 삭제");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    fn labelled(name: &str, router: &str) -> Resource {
        let mut labels = Labels::new();
        labels.insert("ckan-cloud/router-name".to_string(), router.to_string());
        Resource::new(ResourceKind::Route, name, json!({"name": name})).with_labels(labels)
    }

    #[tokio::test]
    async fn test_list_by_selector_keeps_insertion_order() {
        let store = InMemoryStore::new();
        store.create(labelled("b", "r1")).await.unwrap();
        store.create(labelled("a", "r1")).await.unwrap();
        store.create(labelled("c", "r2")).await.unwrap();

        let mut selector = Labels::new();
        selector.insert("ckan-cloud/router-name".to_string(), "r1".to_string());
        let names: Vec<_> = store
            .list(ResourceKind::Route, &selector)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[tokio::test]
    async fn test_duplicate_create_and_missing_delete() {
        let store = InMemoryStore::new();
        store.create(labelled("a", "r1")).await.unwrap();

        assert!(matches!(
            store.create(labelled("a", "r1")).await,
            Err(Error::AlreadyExists { .. })
        ));
        assert!(store.delete(ResourceKind::Route, "zzz").await.unwrap_err().is_not_found());
        assert!(store.get(ResourceKind::Router, "a").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_snapshot_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");

        let store = InMemoryStore::new();
        store.create(labelled("a", "r1")).await.unwrap();
        store
            .create(Resource::new(ResourceKind::Router, "r1", json!({"type": "traefik"})))
            .await
            .unwrap();
        store.save_snapshot(&path).await.unwrap();

        let restored = InMemoryStore::load_snapshot(&path).await.unwrap();
        assert_eq!(
            restored.get(ResourceKind::Route, "a").await.unwrap(),
            store.get(ResourceKind::Route, "a").await.unwrap()
        );
        assert!(restored.get(ResourceKind::Router, "r1").await.is_ok());
    }

    #[tokio::test]
    async fn test_missing_snapshot_is_empty_store() {
        let dir = tempdir().unwrap();
        let store = InMemoryStore::load_snapshot(dir.path().join("absent.json")).await.unwrap();
        assert!(store.list(ResourceKind::Route, &Labels::new()).await.unwrap().is_empty());
    }
}
