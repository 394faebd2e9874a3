use std::process;
use std::sync::Arc;

use tracing::{error, info, warn};

use router_operator::error::Result;
use router_operator::logging::init_logging;
use router_operator::router::{credentials_secret_name, ListMode, RouterManager};
use router_operator::settings::{parse_env_var, Settings};
use router_operator::store::{InMemorySecretStore, InMemoryStore, SecretData, SecretStore};

/// 환경 변수로 전달된 DNS 자격 증명을 라우터 시크릿으로 등록
async fn seed_credentials(secrets: &InMemorySecretStore, routers: &[String]) -> Result<()> {
    let email: String = parse_env_var("PROXY_ACME_EMAIL", String::new)?;
    let api_key: String = parse_env_var("PROXY_DNS_API_KEY", String::new)?;
    if email.is_empty() || api_key.is_empty() {
        return Ok(());
    }

    for router in routers {
        let mut data = SecretData::new();
        data.insert("email".to_string(), email.clone());
        data.insert("api-key".to_string(), api_key.clone());
        secrets.put(&credentials_secret_name(router), data).await?;
    }
    Ok(())
}

async fn run(settings: Settings) -> Result<()> {
    let wait_ready: bool = parse_env_var("PROXY_WAIT_READY", || false)?;

    let store = match &settings.router.state_file {
        Some(path) => InMemoryStore::load_snapshot(path).await?,
        None => {
            warn!("PROXY_STATE_FILE이 설정되지 않아 빈 저장소로 시작합니다");
            InMemoryStore::new()
        }
    };
    let store = Arc::new(store);
    let secrets = Arc::new(InMemorySecretStore::new());
    let manager = RouterManager::with_defaults(&settings, store.clone(), secrets.clone()).await?;

    // 이름이 없으면 저장소의 모든 라우터를 동기화
    let router_name: String = parse_env_var("PROXY_ROUTER_NAME", String::new)?;
    let routers: Vec<String> = if router_name.is_empty() {
        manager
            .list(ListMode::Values)
            .await?
            .iter()
            .map(|entry| entry.name().to_string())
            .collect()
    } else {
        vec![router_name]
    };
    seed_credentials(&secrets, &routers).await?;

    for router in &routers {
        let outcome = manager.update(router, wait_ready).await?;
        info!(
            router = %router,
            routes = outcome.routes_applied,
            skipped = outcome.skipped.len(),
            "라우터 동기화 완료"
        );
    }

    if let Some(path) = &settings.router.state_file {
        store.save_snapshot(path).await?;
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    let settings = match Settings::load().await {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("설정 로드 실패: {}", e);
            process::exit(1);
        }
    };

    let _guard = init_logging(&settings.logging);
    info!(
        environment_id = ?settings.router.environment_id,
        config_dir = %settings.traefik.config_dir.display(),
        "라우터 오퍼레이터 시작"
    );

    if let Err(e) = run(settings).await {
        error!(error = %e, retryable = e.is_retryable(), "라우터 동기화 실패");
        process::exit(1);
    }
}
