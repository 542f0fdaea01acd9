use axum::body::Body;
use axum::http::{self, HeaderValue, Method};
use dotenvy::dotenv;
use env_logger::{Builder, Env};
use log::LevelFilter;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use mafia_server::{
    app, models::config::GameConfig, services::cleanup::spawn_cleanup_job, state::AppState,
    utils::config::CONFIG,
};

// ログ設定
fn init_logger() {
    Builder::from_env(Env::default().default_filter_or("info"))
        .filter_module("tower_http", LevelFilter::Debug)
        .filter_module("axum", LevelFilter::Info)
        .format_timestamp(Some(env_logger::TimestampPrecision::Millis))
        .format_target(true)
        .init();
}

fn cors_layer() -> CorsLayer {
    let origins: Vec<HeaderValue> = CONFIG
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                log::warn!("Ignoring invalid origin {}: {}", origin, e);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([http::header::CONTENT_TYPE, http::HeaderName::from_static("x-user-id")])
        .allow_credentials(true)
}

#[tokio::main]
async fn main() {
    // 環境変数をロード
    if let Err(e) = dotenv() {
        eprintln!("Warning: .envファイルの読み込みに失敗しました: {}", e);
    }

    init_logger();

    let config = GameConfig::from_env();
    let cleanup_interval = config.cleanup_interval();
    let state = AppState::new(config);
    spawn_cleanup_job(state.games.clone(), cleanup_interval);

    // ルーティングの設定
    let app = app::create_app(state).layer(
        ServiceBuilder::new()
            .layer(
                TraceLayer::new_for_http() // HTTPトレースログを有効化
                    .make_span_with(|request: &http::Request<Body>| {
                        tracing::info_span!(
                            "HTTP request",
                            method = %request.method(),
                            uri = %request.uri(),
                        )
                    }),
            )
            .layer(cors_layer()),
    );

    // サーバーの起動
    let addr = CONFIG.server_addr;
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            log::error!("{} にバインドできませんでした: {}", addr, e);
            std::process::exit(1);
        }
    };

    log::info!("サーバーを起動しました: http://{}", addr);
    if let Err(e) = axum::serve(listener, app).await {
        log::error!("サーバーが異常終了しました: {}", e);
    }
}
