//! 라우터 리소스의 생명주기와 라우터 타입별 프록시 백엔드를 제공하는 모듈입니다.

mod annotations;
mod backend;
mod deployment;
mod manager;
mod readiness;
mod traefik;
mod types;

pub use annotations::{get_json_annotation, json_annotate, DEFAULT_ROOT_DOMAIN};
pub use backend::{ProxyBackend, UpdateOutcome};
pub use deployment::{DeploymentStatus, FileDeployment, ProxyDeployment};
pub use manager::{Backends, RouterManager};
pub use readiness::{wait_until_ready, ReadinessPolicy, ReadinessProbe};
pub use traefik::{credentials_secret_name, TraefikBackend};
pub use types::{Aspect, DnsCredentials, ListMode, Router, RouterDetail, RouterListEntry, RouterSpec, RouterType};
