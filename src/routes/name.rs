use sha3::{Digest, Sha3_224};

use super::TargetType;

/// 모든 라우트 이름의 고정 접두사
pub const ROUTE_NAME_PREFIX: &str = "cc";

/// 컴파일 시점으로 미뤄진 루트 도메인이 이름 계산에 쓰이는 값
pub const DEFERRED_ROOT_DOMAIN: &str = "default";

/// 라우트 식별 튜플로부터 결정적인 라우트 이름을 계산합니다.
///
/// `"{target_type} {target_resource_id} {root_domain} {sub_domain}"`의
/// SHA3-224 다이제스트를 16진수로 인코딩해 접두사 뒤에 붙입니다.
/// 루트 도메인이 없으면 `default`를 사용하므로 기본값 해석 전후로 이름이 같습니다.
///
/// ```
/// use router_operator::routes::{derive_route_name, TargetType};
///
/// let a = derive_route_name(TargetType::Job, "job1", Some("x.com"), "a");
/// let b = derive_route_name(TargetType::Job, "job1", Some("x.com"), "a");
/// assert_eq!(a, b);
/// assert!(a.starts_with("cc"));
/// assert_eq!(a.len(), 2 + 56);
/// ```
pub fn derive_route_name(
    target_type: TargetType,
    target_resource_id: &str,
    root_domain: Option<&str>,
    sub_domain: &str,
) -> String {
    let identity = format!(
        "{} {} {} {}",
        target_type.as_str(),
        target_resource_id,
        root_domain.unwrap_or(DEFERRED_ROOT_DOMAIN),
        sub_domain
    );
    let digest = Sha3_224::digest(identity.as_bytes());
    format!("{}{}", ROUTE_NAME_PREFIX, hex::encode(digest))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_digest() {
        assert_eq!(
            derive_route_name(TargetType::Job, "job1", Some("x.com"), "a"),
            "cc06a013e7e0358745cdb85fd320183cbb7200de88558246ef6d9b9a06"
        );
    }

    #[test]
    fn test_deferred_root_domain_uses_default_literal() {
        assert_eq!(
            derive_route_name(TargetType::Instance, "site1", None, "cc-env7-site1"),
            derive_route_name(TargetType::Instance, "site1", Some("default"), "cc-env7-site1"),
        );
    }
}
