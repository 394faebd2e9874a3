use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Serialize;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing::{debug, info};

use crate::error::{Error, Result};

/// 프록시 배포 상태
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeploymentStatus {
    pub ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applied_at: Option<String>,
}

impl DeploymentStatus {
    pub fn not_ready() -> Self {
        Self {
            ready: false,
            config_path: None,
            applied_at: None,
        }
    }
}

/// 컴파일된 설정을 실제 프록시 인스턴스에 적용하는 협력자
#[async_trait]
pub trait ProxyDeployment: Send + Sync {
    /// 라우터의 프록시 인스턴스를 준비합니다.
    async fn provision(&self, router: &str) -> Result<()>;

    /// 설정 문서 전체를 원자적으로 적용합니다.
    async fn apply(&self, router: &str, document: &str) -> Result<()>;

    async fn status(&self, router: &str) -> Result<DeploymentStatus>;

    /// 현재 적용된 설정 문서. 적용된 적이 없으면 `None`.
    async fn current(&self, router: &str) -> Result<Option<String>>;

    /// 없는 배포의 정리는 에러가 아닙니다.
    async fn teardown(&self, router: &str) -> Result<()>;
}

/// 라우터별 설정 파일을 디렉토리에 기록하는 배포
///
/// Traefik 파일 프로바이더가 `{config_dir}/{router}.toml`을 감시한다고 가정하며,
/// 적용된 파일이 존재하면 준비된 것으로 봅니다.
pub struct FileDeployment {
    config_dir: PathBuf,
}

impl FileDeployment {
    pub fn new(config_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
        }
    }

    pub fn config_path(&self, router: &str) -> PathBuf {
        self.config_dir.join(format!("{}.toml", router))
    }

    fn io_error(path: &Path, source: std::io::Error) -> Error {
        Error::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

#[async_trait]
impl ProxyDeployment for FileDeployment {
    async fn provision(&self, router: &str) -> Result<()> {
        tokio::fs::create_dir_all(&self.config_dir)
            .await
            .map_err(|e| Self::io_error(&self.config_dir, e))?;
        info!(router = %router, dir = %self.config_dir.display(), "프록시 설정 디렉토리 준비");
        Ok(())
    }

    async fn apply(&self, router: &str, document: &str) -> Result<()> {
        let path = self.config_path(router);
        let tmp_path = path.with_extension("toml.tmp");

        // 임시 파일에 쓴 뒤 rename 하므로 프록시는 완성된 문서만 보게 됨
        tokio::fs::create_dir_all(&self.config_dir)
            .await
            .map_err(|e| Self::io_error(&self.config_dir, e))?;
        tokio::fs::write(&tmp_path, document)
            .await
            .map_err(|e| Self::io_error(&tmp_path, e))?;
        tokio::fs::rename(&tmp_path, &path)
            .await
            .map_err(|e| Self::io_error(&path, e))?;

        info!(router = %router, path = %path.display(), bytes = document.len(), "프록시 설정 적용");
        Ok(())
    }

    async fn status(&self, router: &str) -> Result<DeploymentStatus> {
        let path = self.config_path(router);
        let metadata = match tokio::fs::metadata(&path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(router = %router, "적용된 설정 없음");
                return Ok(DeploymentStatus::not_ready());
            }
            Err(e) => return Err(Self::io_error(&path, e)),
        };

        let applied_at = metadata
            .modified()
            .ok()
            .and_then(|modified| OffsetDateTime::from(modified).format(&Rfc3339).ok());

        Ok(DeploymentStatus {
            ready: metadata.is_file(),
            config_path: Some(path.display().to_string()),
            applied_at,
        })
    }

    async fn current(&self, router: &str) -> Result<Option<String>> {
        let path = self.config_path(router);
        match tokio::fs::read_to_string(&path).await {
            Ok(document) => Ok(Some(document)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Self::io_error(&path, e)),
        }
    }

    async fn teardown(&self, router: &str) -> Result<()> {
        let path = self.config_path(router);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                info!(router = %router, path = %path.display(), "프록시 설정 제거");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Self::io_error(&path, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_apply_status_teardown() {
        let dir = tempdir().unwrap();
        let deployment = FileDeployment::new(dir.path().join("routers"));

        deployment.provision("r1").await.unwrap();
        assert!(!deployment.status("r1").await.unwrap().ready);
        assert!(deployment.current("r1").await.unwrap().is_none());

        deployment.apply("r1", "debug = false\n").await.unwrap();
        let status = deployment.status("r1").await.unwrap();
        assert!(status.ready);
        assert!(status.applied_at.is_some());
        assert_eq!(deployment.current("r1").await.unwrap().as_deref(), Some("debug = false\n"));

        deployment.teardown("r1").await.unwrap();
        assert!(!deployment.status("r1").await.unwrap().ready);
        deployment.teardown("r1").await.unwrap();
    }
}
