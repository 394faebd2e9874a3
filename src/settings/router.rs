use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use super::SettingsError;

/// 라우터/라우트 관리에 필요한 프로세스 전역 설정
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RouterSettings {
    /// 기본 서브 도메인(`cc-{env}-{target}`) 합성에 쓰이는 환경 ID
    #[serde(default)]
    pub environment_id: Option<String>,

    /// 리소스 저장소 스냅샷 파일
    #[serde(default)]
    pub state_file: Option<PathBuf>,
}

pub fn parse_env_var<T: std::str::FromStr, F: FnOnce() -> T>(name: &str, default: F) -> Result<T, SettingsError>
where
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(val) => val.parse().map_err(|e: T::Err| SettingsError::EnvVarInvalid {
            var_name: name.to_string(),
            value: val,
            reason: e.to_string(),
        }),
        Err(env::VarError::NotPresent) => Ok(default()),
        Err(e) => Err(SettingsError::EnvVarInvalid {
            var_name: name.to_string(),
            value: "".to_string(),
            reason: e.to_string(),
        }),
    }
}

impl RouterSettings {
    pub fn from_env() -> Result<Self, SettingsError> {
        let settings = Self {
            environment_id: env::var("ROUTERS_ENV_ID").ok(),
            state_file: env::var("PROXY_STATE_FILE").ok().map(PathBuf::from),
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if let Some(env_id) = &self.environment_id {
            // 환경 ID는 서브 도메인 라벨의 일부가 됨
            if env_id.is_empty() || !env_id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
                return Err(SettingsError::EnvVarInvalid {
                    var_name: "ROUTERS_ENV_ID".to_string(),
                    value: env_id.clone(),
                    reason: "환경 ID는 영숫자와 '-'만 포함할 수 있습니다".to_string(),
                });
            }
        }
        Ok(())
    }
}
