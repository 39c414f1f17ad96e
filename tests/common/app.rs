use std::sync::Arc;

use axum::Router;
use tempfile::TempDir;
use tokio::sync::broadcast;

use review_backend::config::Config;
use review_backend::routes::build_router;
use review_backend::scheduler::ReviewScheduler;
use review_backend::state::AppState;
use review_backend::store::Store;

pub struct TestApp {
    pub app: Router,
    pub state: AppState,
    pub store: Arc<Store>,
    pub config: Config,
    _temp_dir: TempDir,
}

// Config is built directly; set_var would race between parallel tests.
fn test_config(sled_path: String) -> Config {
    Config {
        host: std::net::IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
        port: 3000,
        log_level: "info".to_string(),
        enable_file_logs: false,
        log_dir: "./logs".to_string(),
        sled_path,
        jwt_secret: format!("integration-test-jwt-secret-{}", uuid::Uuid::new_v4()),
        jwt_expires_in_hours: 1,
        cors_origin: "http://localhost:3000".to_string(),
        body_limit_bytes: 16 * 1024,
    }
}

pub async fn spawn_test_app() -> TestApp {
    spawn_test_app_with_scheduler(ReviewScheduler::new).await
}

/// Test app whose scheduler is built by `make_scheduler` over the app's store.
pub async fn spawn_test_app_with_scheduler<F>(make_scheduler: F) -> TestApp
where
    F: FnOnce(Arc<Store>) -> ReviewScheduler,
{
    let temp_dir = tempfile::tempdir().expect("tempdir");
    let sled_path = temp_dir.path().join("review-test.sled");
    let config = test_config(sled_path.to_string_lossy().to_string());

    let store = Arc::new(Store::open(&config.sled_path).expect("open store"));
    store.run_migrations().expect("run migrations");

    let (shutdown_tx, _) = broadcast::channel::<()>(8);
    let scheduler = make_scheduler(store.clone());
    let state = AppState::with_scheduler(store.clone(), scheduler, &config, shutdown_tx);
    let app = build_router(state.clone());

    TestApp {
        app,
        state,
        store,
        config,
        _temp_dir: temp_dir,
    }
}
