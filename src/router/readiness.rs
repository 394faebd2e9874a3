use async_trait::async_trait;
use tokio::time::{sleep, timeout, Duration};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::settings::TraefikSettings;

/// 준비 상태 대기 정책
#[derive(Debug, Clone)]
pub struct ReadinessPolicy {
    /// 전체 대기 제한 시간
    pub timeout: Duration,
    /// 확인 간격
    pub interval: Duration,
}

impl From<&TraefikSettings> for ReadinessPolicy {
    fn from(settings: &TraefikSettings) -> Self {
        Self {
            timeout: settings.ready_timeout(),
            interval: settings.ready_poll_interval(),
        }
    }
}

/// 준비 여부를 확인할 수 있는 대상
#[async_trait]
pub trait ReadinessProbe: Send + Sync {
    async fn is_ready(&self) -> Result<bool>;
}

/// 대상이 준비될 때까지 주기적으로 확인합니다.
///
/// 제한 시간 안에 준비되지 않으면 `Error::NotReady`를 반환합니다.
/// 재시도 가능한 확인 에러는 경고만 남기고 계속 대기합니다.
pub async fn wait_until_ready<P: ReadinessProbe + ?Sized>(
    router: &str,
    probe: &P,
    policy: &ReadinessPolicy,
) -> Result<()> {
    let poll = async {
        let mut attempts = 0u32;
        loop {
            attempts += 1;
            match probe.is_ready().await {
                Ok(true) => {
                    debug!(router = %router, attempts, "준비 완료");
                    return Ok(());
                }
                Ok(false) => {}
                Err(e) if e.is_retryable() => {
                    warn!(router = %router, error = %e, attempt = attempts, "준비 상태 확인 실패, 재시도 예정");
                }
                Err(e) => return Err(e),
            }
            sleep(policy.interval).await;
        }
    };

    match timeout(policy.timeout, poll).await {
        Ok(result) => result,
        Err(_) => Err(Error::NotReady {
            router: router.to_string(),
            waited: policy.timeout,
        }),
    }
}
