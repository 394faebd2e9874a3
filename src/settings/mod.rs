use std::collections::BTreeMap;
use std::{env, path::Path};
use serde::Deserialize;
use tracing::debug;

mod error;
pub mod logging;
mod router;
mod traefik;

pub use error::SettingsError;
pub use logging::{LogFormat, LogOutput, LogSettings};
pub use router::{parse_env_var, RouterSettings};
pub use traefik::TraefikSettings;

pub type Result<T> = std::result::Result<T, SettingsError>;

/// 정적 타겟 리졸버에 쓰이는 잡/인스턴스 URL 표
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TargetSettings {
    #[serde(default)]
    pub jobs: BTreeMap<String, String>,

    #[serde(default)]
    pub instances: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    // 로깅 설정
    #[serde(default)]
    pub logging: LogSettings,

    #[serde(default)]
    pub router: RouterSettings,

    #[serde(default)]
    pub traefik: TraefikSettings,

    #[serde(default)]
    pub targets: TargetSettings,
}

impl Settings {
    pub async fn load() -> Result<Self> {
        if let Ok(config_path) = env::var("PROXY_CONFIG_FILE") {
            Self::from_toml_file(&config_path).await
        } else {
            Self::from_env().await
        }
    }

    pub async fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = tokio::fs::read_to_string(&path).await.map_err(|e| SettingsError::FileError {
            path: path.as_ref().to_string_lossy().to_string(),
            error: e,
        })?;

        let settings: Self = toml::from_str(&content)?;
        settings.validate()?;
        debug!(path = %path.as_ref().display(), "TOML 설정 로드 완료");

        Ok(settings)
    }

    pub async fn from_env() -> Result<Self> {
        let settings = Self {
            logging: LogSettings::from_env()?,
            router: RouterSettings::from_env()?,
            traefik: TraefikSettings::from_env()?,
            targets: TargetSettings::default(),
        };

        settings.validate()?;
        Ok(settings)
    }

    /// 설정 유효성 검증
    pub fn validate(&self) -> Result<()> {
        self.router.validate()?;
        self.traefik.validate()?;

        for (kind, table) in [("jobs", &self.targets.jobs), ("instances", &self.targets.instances)] {
            for (id, target_url) in table {
                url::Url::parse(target_url).map_err(|e| SettingsError::InvalidConfig {
                    setting: format!("targets.{}.{}", kind, id),
                    reason: e.to_string(),
                })?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_from_toml() {
        let toml_content = r#"
            [logging]
            format = "json"
            level = "debug"

            [router]
            environment_id = "env7"

            [traefik]
            config_dir = "/tmp/traefik"
            ready_timeout_secs = 5

            [targets.jobs]
            pusher = "http://pusher.jobs.svc:8800"

            [targets.instances]
            site1 = "http://site1.instances.svc:5000"
        "#;

        let settings: Settings = toml::from_str(toml_content).unwrap();
        assert_eq!(settings.logging.format, LogFormat::Json);
        assert_eq!(settings.router.environment_id.as_deref(), Some("env7"));
        assert_eq!(settings.traefik.http_port, 80);
        assert_eq!(settings.traefik.ready_timeout_secs, 5);
        assert_eq!(settings.targets.jobs.len(), 1);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_invalid_target_url_rejected() {
        let mut settings = Settings::default();
        settings.targets.jobs.insert("broken".to_string(), "not a url".to_string());

        let err = settings.validate().unwrap_err();
        assert_eq!(err.setting_name(), "targets.jobs.broken");
    }
}
