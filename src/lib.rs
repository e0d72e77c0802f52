pub mod avatar;
pub mod blockies;
pub mod config;
pub mod error;
pub mod eth;
pub mod handlers;
pub mod identity;
pub mod og;
pub mod qr;
pub mod svg;

use std::sync::Arc;

use axum::extract::FromRef;

use crate::{avatar::AvatarSource, config::Config, eth::ChainClient};

/// Shared per-process state. The RPC and avatar clients are constructed once
/// at startup and reused for every request.
#[derive(Clone, FromRef)]
pub struct AppState {
    pub config: Arc<Config>,
    pub chain: Arc<dyn ChainClient>,
    pub avatars: Arc<dyn AvatarSource>,
}
