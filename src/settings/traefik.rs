use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use super::{parse_env_var, SettingsError};

/// Traefik 백엔드 설정
#[derive(Clone, Debug, Deserialize)]
pub struct TraefikSettings {
    /// 컴파일된 설정 파일이 기록되는 디렉토리
    #[serde(default = "default_config_dir")]
    pub config_dir: PathBuf,

    /// HTTP 엔트리포인트 포트 (기본값: 80)
    #[serde(default = "default_http_port")]
    pub http_port: u16,

    /// HTTPS 엔트리포인트 포트 (기본값: 443)
    #[serde(default = "default_https_port")]
    pub https_port: u16,

    /// ACME 인증서 저장 경로
    #[serde(default = "default_acme_storage")]
    pub acme_storage: String,

    /// DNS 챌린지 프로바이더
    #[serde(default = "default_dns_provider")]
    pub dns_provider: String,

    /// 준비 상태 대기 제한 시간 (초)
    #[serde(default = "default_ready_timeout")]
    pub ready_timeout_secs: u64,

    /// 준비 상태 확인 간격 (밀리초)
    #[serde(default = "default_ready_poll_interval")]
    pub ready_poll_interval_ms: u64,
}

fn default_config_dir() -> PathBuf { PathBuf::from("/etc/traefik/routers") }
fn default_http_port() -> u16 { 80 }
fn default_https_port() -> u16 { 443 }
fn default_acme_storage() -> String { "/traefik-acme/acme.json".to_string() }
fn default_dns_provider() -> String { "cloudflare".to_string() }
fn default_ready_timeout() -> u64 { 60 }
fn default_ready_poll_interval() -> u64 { 500 }

impl TraefikSettings {
    const MIN_PORT: u16 = 1;

    pub fn from_env() -> Result<Self, SettingsError> {
        let settings = Self {
            config_dir: parse_env_var("PROXY_TRAEFIK_CONFIG_DIR", default_config_dir)?,
            http_port: parse_env_var("PROXY_HTTP_PORT", default_http_port)?,
            https_port: parse_env_var("PROXY_HTTPS_PORT", default_https_port)?,
            acme_storage: parse_env_var("PROXY_ACME_STORAGE", default_acme_storage)?,
            dns_provider: parse_env_var("PROXY_DNS_PROVIDER", default_dns_provider)?,
            ready_timeout_secs: parse_env_var("PROXY_READY_TIMEOUT", default_ready_timeout)?,
            ready_poll_interval_ms: parse_env_var("PROXY_READY_POLL_INTERVAL", default_ready_poll_interval)?,
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.http_port < Self::MIN_PORT || self.https_port < Self::MIN_PORT {
            return Err(SettingsError::EnvVarInvalid {
                var_name: "PROXY_HTTP_PORT/PROXY_HTTPS_PORT".to_string(),
                value: format!("{}/{}", self.http_port, self.https_port),
                reason: "포트는 0이 될 수 없습니다".to_string(),
            });
        }

        if self.http_port == self.https_port {
            return Err(SettingsError::EnvVarInvalid {
                var_name: "PROXY_HTTP_PORT/PROXY_HTTPS_PORT".to_string(),
                value: format!("{}/{}", self.http_port, self.https_port),
                reason: "HTTP와 HTTPS 포트는 달라야 합니다".to_string(),
            });
        }

        if self.ready_poll_interval_ms == 0 {
            return Err(SettingsError::InvalidConfig {
                setting: "traefik.ready_poll_interval_ms".to_string(),
                reason: "확인 간격은 0보다 커야 합니다".to_string(),
            });
        }

        Ok(())
    }

    pub fn ready_timeout(&self) -> Duration {
        Duration::from_secs(self.ready_timeout_secs)
    }

    pub fn ready_poll_interval(&self) -> Duration {
        Duration::from_millis(self.ready_poll_interval_ms)
    }
}

impl Default for TraefikSettings {
    fn default() -> Self {
        Self {
            config_dir: default_config_dir(),
            http_port: default_http_port(),
            https_port: default_https_port(),
            acme_storage: default_acme_storage(),
            dns_provider: default_dns_provider(),
            ready_timeout_secs: default_ready_timeout(),
            ready_poll_interval_ms: default_ready_poll_interval(),
        }
    }
}
