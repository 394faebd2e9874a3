use serde::{de::DeserializeOwned, Serialize};

use crate::error::{Error, Result};
use crate::store::Annotations;

pub const DEFAULT_ROOT_DOMAIN: &str = "default-root-domain";

/// 값을 JSON으로 인코딩해 어노테이션에 기록합니다.
pub fn json_annotate<T: Serialize>(annotations: &mut Annotations, key: &str, value: &T) -> Result<()> {
    let encoded = serde_json::to_string(value)
        .map_err(|e| Error::serialization(format!("어노테이션 {}", key), e))?;
    annotations.insert(key.to_string(), encoded);
    Ok(())
}

pub fn get_json_annotation<T: DeserializeOwned>(annotations: &Annotations, key: &str) -> Result<Option<T>> {
    annotations
        .get(key)
        .map(|raw| serde_json::from_str(raw).map_err(|e| Error::serialization(format!("어노테이션 {}", key), e)))
        .transpose()
}
