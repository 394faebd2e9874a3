use async_trait::async_trait;

use crate::compiler::RouteFailure;
use crate::error::Result;
use crate::routes::Route;
use crate::store::Annotations;
use super::{Aspect, Router, RouterSpec};

/// 라우터 업데이트 결과
#[derive(Debug)]
pub struct UpdateOutcome {
    /// 적용된 설정 문서
    pub document: String,
    /// 설정에 포함된 라우트 수
    pub routes_applied: usize,
    /// 타겟을 해석하지 못해 제외된 라우트
    pub skipped: Vec<RouteFailure>,
}

/// 라우터 타입별 프록시 백엔드가 제공하는 기능
#[async_trait]
pub trait ProxyBackend: Send + Sync {
    /// 백엔드 리소스를 준비하고, 저장 가능한 형태의 라우터를 반환합니다.
    async fn create(&self, router: Router) -> Result<Router>;

    /// 라우트 집합을 컴파일해 원자적으로 적용합니다.
    async fn update(
        &self,
        name: &str,
        wait_ready: bool,
        spec: &RouterSpec,
        annotations: &Annotations,
        routes: &[Route],
    ) -> Result<UpdateOutcome>;

    async fn get(&self, name: &str, aspect: Aspect) -> Result<serde_json::Value>;

    async fn delete(&self, name: &str) -> Result<()>;
}
