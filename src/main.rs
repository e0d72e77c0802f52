use std::{
    fs::File,
    io::BufReader,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    sync::Arc,
    time::Duration,
};

use address_vision_og::{
    avatar::{AvatarSource, EnsDataAvatars},
    config::Config,
    eth::{ChainClient, EthClient},
    handlers::build_router,
    AppState,
};
use axum::{
    Router,
    extract::ConnectInfo,
    http::{Method, Request, StatusCode, header},
};
use tokio::{net::TcpListener, signal};
use tower::ServiceBuilder;
use tower_http::{
    cors::{self, CorsLayer},
    normalize_path::NormalizePathLayer,
    timeout::TimeoutLayer,
    trace::{DefaultOnResponse, MakeSpan, TraceLayer},
    ServiceBuilderExt,
};
use tracing::{Level, Span};
use tracing_subscriber::{
    filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
};

#[tokio::main]
async fn main() {
    let env_filter = EnvFilter::builder()
        // Default to info level
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_filter(env_filter))
        .init();

    let config_path = std::env::var("CONFIG").unwrap_or_else(|_| "config.yml".to_string());
    let config: Arc<Config> = {
        let file =
            BufReader::new(File::open(&config_path).expect("Failed to open config file"));
        Arc::new(serde_yaml::from_reader(file).expect("Failed to parse config file"))
    };

    // Both clients live for the whole process and are shared across requests.
    let chain: Arc<dyn ChainClient> =
        Arc::new(EthClient::new(&config.eth).expect("Failed to create RPC client"));
    let avatars: Arc<dyn AvatarSource> =
        Arc::new(EnsDataAvatars::new(&config.avatar).expect("Failed to create avatar client"));
    let state = AppState { config: config.clone(), chain, avatars };

    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, config.server.port));
    let listener = TcpListener::bind(addr).await.expect("bind error");
    tracing::info!("Listening on {}", addr);
    let router = app(state).into_make_service_with_connect_info::<SocketAddr>();
    if let Err(e) = axum::serve(listener, router).with_graceful_shutdown(shutdown_signal()).await
    {
        tracing::error!("{e}");
    }
    tracing::info!("Shut down gracefully");
}

fn app(state: AppState) -> Router {
    let middleware = ServiceBuilder::new()
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(RequestSpan)
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(30),
        ))
        .layer(NormalizePathLayer::trim_trailing_slash())
        .layer(CorsLayer::new().allow_methods([Method::GET]).allow_origin(cors::Any))
        .compression();
    build_router().with_state(state).layer(middleware)
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler");
        tokio::select! {
            _ = signal::ctrl_c() => {}
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        signal::ctrl_c().await.expect("Failed to install signal handler");
    }
}

#[derive(Debug, Clone)]
struct RequestSpan;

impl<B> MakeSpan<B> for RequestSpan {
    fn make_span(&mut self, request: &Request<B>) -> Span {
        let ip = request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip())
            .unwrap_or(IpAddr::from([0, 0, 0, 0]));
        let user_agent = request
            .headers()
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("[unknown]");
        tracing::span!(
            Level::INFO,
            "request",
            method = %request.method(),
            uri = %request.uri(),
            ip = %ip,
            user_agent = %user_agent,
        )
    }
}
