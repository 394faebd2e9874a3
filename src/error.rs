use std::time::Duration;

use crate::settings::SettingsError;

pub type Result<T> = std::result::Result<T, Error>;

/// 라우터/라우트 관리 중 발생하는 에러입니다.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// 잘못되었거나 불완전한 Router/Route 스펙
    #[error("잘못된 스펙 {resource}: 필드 '{field}' 값 '{value}' ({reason})")]
    InvalidSpec {
        resource: String,
        field: String,
        value: String,
        reason: String,
    },

    /// 지원하지 않는 라우터/타겟 타입
    #[error("지원하지 않는 {kind} 타입: {value}")]
    UnsupportedType {
        kind: String,
        value: String,
    },

    /// 프로세스 설정 누락
    #[error("설정 오류 ({setting}): {reason}")]
    Configuration {
        setting: String,
        reason: String,
    },

    /// 라우트 타겟을 찾을 수 없음
    #[error("라우트 {route}의 타겟 {target}을(를) 찾을 수 없음")]
    TargetNotFound {
        route: String,
        target: String,
    },

    /// 백엔드가 제한 시간 내에 준비되지 않음
    #[error("라우터 {router}가 {waited:?} 안에 준비되지 않음")]
    NotReady {
        router: String,
        waited: Duration,
    },

    /// 리소스를 찾을 수 없음
    #[error("{kind} {name}을(를) 찾을 수 없음")]
    NotFound {
        kind: String,
        name: String,
    },

    /// 이미 존재하는 리소스
    #[error("{kind} {name}이(가) 이미 존재함")]
    AlreadyExists {
        kind: String,
        name: String,
    },

    /// 리소스 저장소 오류
    #[error("저장소 오류 ({context}): {reason}")]
    Store {
        context: String,
        reason: String,
    },

    #[error("파일 {path} 오류: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("직렬화 오류 ({context}): {reason}")]
    Serialization {
        context: String,
        reason: String,
    },
}

impl Error {
    pub fn invalid_spec(
        resource: impl Into<String>,
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Error::InvalidSpec {
            resource: resource.into(),
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    pub fn not_found(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Error::NotFound {
            kind: kind.into(),
            name: name.into(),
        }
    }

    pub fn serialization(context: impl Into<String>, error: impl std::fmt::Display) -> Self {
        Error::Serialization {
            context: context.into(),
            reason: error.to_string(),
        }
    }

    /// 같은 입력으로 다시 시도했을 때 성공할 수 있는 에러인지 여부
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::TargetNotFound { .. }
                | Error::NotReady { .. }
                | Error::Store { .. }
                | Error::Io { .. }
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }
}

impl From<SettingsError> for Error {
    fn from(err: SettingsError) -> Self {
        Error::Configuration {
            setting: err.setting_name().to_string(),
            reason: err.to_string(),
        }
    }
}
