/*
 * Responsibility
 * - Config 読み込み → 依存生成 (Identity client / SessionGate) → Router 組み立て
 * - Middleware の適用 (session gate, request-id / trace / timeout)
 * - axum::serve() で起動
 */
use std::{panic, process, sync::Arc};

use anyhow::Result;
use axum::{Router, routing::get};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api::{self, handlers::health::health};
use crate::config::Config;
use crate::gate::SessionGate;
use crate::middleware;
use crate::services::identity::{HttpIdentityService, IdentityService};
use crate::state::AppState;

fn init_tracing() {
    // RUST_LOG があればそちらを優先
    // Ex:
    // RUST_LOG=info,session_gate=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        // stderr は起動方法によって見えないことがあるので tracing にも出す
        tracing::error!(?info, "panic");

        // development では即落として気づけるようにする
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env()?;
    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting session gate in {:?} mode on {} (identity: {}, base: {:?})",
        config.app_env,
        config.addr,
        config.identity_api_url,
        config.base_path,
    );

    let state = build_state(&config)?;
    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_state(config: &Config) -> Result<AppState> {
    let identity: Arc<dyn IdentityService> = Arc::new(HttpIdentityService::new(
        config.identity_api_url.clone(),
        config.identity_timeout,
    )?);

    let gate = Arc::new(SessionGate::new(identity.clone(), config.gate_config()));

    Ok(AppState::new(gate, identity))
}

fn build_router(state: AppState, config: &Config) -> Router {
    async fn not_found() -> axum::http::StatusCode {
        axum::http::StatusCode::NOT_FOUND
    }

    // fallback も gate の内側に入れる (未知のパスも未認証なら login へ)
    let gated = api::routes(state.gate.config()).fallback(not_found);
    let gated = middleware::session::apply(gated, state.clone());

    let router = Router::new()
        .route("/health", get(health))
        .merge(gated)
        .with_state(state);

    middleware::http::apply(router, config)
}
