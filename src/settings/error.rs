#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("환경 변수 {var_name} 값 {value} 오류: {reason}")]
    EnvVarInvalid {
        var_name: String,
        value: String,
        reason: String,
    },

    #[error("설정 파일 {path} 오류: {error}")]
    FileError {
        path: String,
        #[source]
        error: std::io::Error,
    },

    #[error("설정 파싱 오류: {source}")]
    ParseError {
        #[from]
        source: toml::de::Error,
    },

    #[error("잘못된 설정 {setting}: {reason}")]
    InvalidConfig {
        setting: String,
        reason: String,
    },
}

impl SettingsError {
    /// 에러가 가리키는 설정 항목 이름
    pub fn setting_name(&self) -> &str {
        match self {
            Self::EnvVarInvalid { var_name, .. } => var_name,
            Self::FileError { path, .. } => path,
            Self::ParseError { .. } => "toml",
            Self::InvalidConfig { setting, .. } => setting,
        }
    }
}
