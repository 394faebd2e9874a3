//! CKAN Cloud 라우터 오퍼레이터는 라우터와 라우트 리소스를 관리하고
//! 라우트 집합을 Traefik 1.x 파일 프로바이더 설정으로 컴파일합니다.
//!
//! # 주요 기능
//!
//! - 결정적인 라우트 이름 생성과 기본값 해석
//! - 라벨 기반 라우트 레지스트리와 역방향 조회
//! - 백엔드 URL 해석, 도메인 그룹핑, ACME 설정을 포함한 설정 컴파일
//! - 라우터 생성, 업데이트, 삭제와 준비 상태 대기
//!
//! # 예제
//!
//! ```
//! use router_operator::routes::{derive_route_name, TargetType};
//!
//! let name = derive_route_name(TargetType::Job, "pusher", Some("x.com"), "push");
//! assert!(name.starts_with("cc"));
//! assert_eq!(name, derive_route_name(TargetType::Job, "pusher", Some("x.com"), "push"));
//! ```
//!
//! # 라우터 수명 주기
//!
//! ```no_run
//! use std::sync::Arc;
//! use router_operator::router::{RouterManager, RouterSpec};
//! use router_operator::routes::RouteRequest;
//! use router_operator::settings::Settings;
//! use router_operator::store::{InMemorySecretStore, InMemoryStore};
//!
//! # async fn run() -> router_operator::error::Result<()> {
//! let settings = Settings::load().await?;
//! let manager = RouterManager::with_defaults(
//!     &settings,
//!     Arc::new(InMemoryStore::new()),
//!     Arc::new(InMemorySecretStore::new()),
//! )
//! .await?;
//!
//! manager.create("prod", RouterSpec::traefik("example.com", None, None)).await?;
//! manager.create_subdomain_route("prod", &RouteRequest::job("pusher").with_sub_domain("push")).await?;
//! manager.update("prod", true).await?;
//! # Ok(())
//! # }
//! ```

pub mod compiler;
pub mod error;
pub mod logging;
pub mod router;
pub mod routes;
pub mod settings;
pub mod store;
