use std::sync::Arc;

use address_vision_og::{
    avatar::{AvatarImage, AvatarSource},
    config::Config,
    error::AppError,
    eth::ChainClient,
    handlers::build_router,
    og, AppState,
};
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use ethers::types::{Address, U256};
use image::ImageFormat;
use tower::ServiceExt;

const VITALIK: &str = "0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045";

#[derive(Default)]
struct StubChain {
    forward: Option<Address>,
    reverse: Option<String>,
    balance: Option<U256>,
}

#[async_trait]
impl ChainClient for StubChain {
    async fn resolve_name(&self, _name: &str) -> Result<Option<Address>, AppError> {
        Ok(self.forward)
    }

    async fn lookup_address(&self, _address: Address) -> Result<Option<String>, AppError> {
        Ok(self.reverse.clone())
    }

    async fn get_balance(&self, _address: Address) -> Result<U256, AppError> {
        match self.balance {
            Some(wei) => Ok(wei),
            None => Err(AppError::Upstream(anyhow::anyhow!("rpc unavailable"))),
        }
    }
}

/// Avatar service that always misses, forcing the blockies fallback.
struct NoAvatars;

#[async_trait]
impl AvatarSource for NoAvatars {
    async fn fetch(&self, _name: &str) -> Result<Option<AvatarImage>, AppError> {
        Ok(None)
    }
}

fn test_config() -> Config {
    serde_yaml::from_str(
        "server:\n  port: 0\neth:\n  rpc_url: \"http://localhost:8545\"\n",
    )
    .unwrap()
}

fn app(chain: StubChain) -> axum::Router {
    let state = AppState {
        config: Arc::new(test_config()),
        chain: Arc::new(chain),
        avatars: Arc::new(NoAvatars),
    };
    build_router().with_state(state)
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_missing_parameter() {
    let response = app(StubChain::default())
        .oneshot(Request::get("/og.png").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_string(response).await, "Missing 'addyOrEns' query parameter");
}

#[tokio::test]
async fn test_invalid_token() {
    let response = app(StubChain::default())
        .oneshot(Request::get("/og.png?addyOrEns=notanaddress").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_string(response).await, "Invalid address or ENS");
}

#[tokio::test]
async fn test_unresolvable_name() {
    let response = app(StubChain::default())
        .oneshot(Request::get("/og.png?addyOrEns=ghost.eth").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_string(response).await, "ENS name not found");
}

#[tokio::test]
async fn test_name_renders_png() {
    let chain = StubChain {
        forward: Some(VITALIK.parse().unwrap()),
        balance: Some(U256::exp10(18)),
        ..Default::default()
    };
    let response = app(chain)
        .oneshot(Request::get("/og.png?addyOrEns=vitalik.eth").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");
    assert_eq!(response.headers()[header::CACHE_CONTROL], "public, max-age=86400");
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let image = image::load_from_memory_with_format(&bytes, ImageFormat::Png).unwrap();
    assert_eq!((image.width(), image.height()), (og::WIDTH, og::HEIGHT));
}

#[tokio::test]
async fn test_address_with_failing_balance_still_renders() {
    // No reverse name and no balance: the card falls back to the cropped
    // address and a zero balance instead of erroring.
    let response = app(StubChain::default())
        .oneshot(
            Request::get(format!("/og.png?addyOrEns={VITALIK}"))
                .header(header::ACCEPT, "image/svg+xml")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/svg+xml");
    let svg = body_string(response).await;
    assert!(svg.contains("0xd8dA...6045"));
    assert!(svg.contains("Balance: 0.0000 ETH"));
}

#[tokio::test]
async fn test_svg_contains_blockies_fallback() {
    let chain = StubChain {
        forward: Some(VITALIK.parse().unwrap()),
        balance: Some(U256::zero()),
        ..Default::default()
    };
    let response = app(chain)
        .oneshot(
            Request::get("/og.png?addyOrEns=vitalik.eth")
                .header(header::ACCEPT, "image/svg+xml")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let svg = body_string(response).await;
    // The avatar service missed, so the inline identicon must be present
    // rather than a remote image reference.
    assert!(!svg.contains("data:image/png"));
    assert!(svg.contains("clip-path=\"url(#avatar-clip)\""));
    assert!(svg.contains("vitalik.eth"));
}
