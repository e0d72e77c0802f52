use serde::{Deserialize, Serialize};
use url::Url;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub server: ServerConfig,
    pub eth: EthConfig,
    #[serde(default)]
    pub avatar: AvatarConfig,
    #[serde(default)]
    pub image: ImageConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EthConfig {
    /// Mainnet JSON-RPC endpoint used for balance and ENS lookups.
    pub rpc_url: Url,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AvatarConfig {
    /// ENS avatar service. The name is appended as a path segment.
    #[serde(default = "default_avatar_base")]
    pub base_url: Url,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ImageConfig {
    #[serde(default = "default_cache_max_age")]
    pub cache_max_age: u32,
}

impl Default for AvatarConfig {
    fn default() -> Self {
        Self { base_url: default_avatar_base(), timeout_secs: default_timeout_secs() }
    }
}

impl Default for ImageConfig {
    fn default() -> Self { Self { cache_max_age: default_cache_max_age() } }
}

fn default_timeout_secs() -> u64 { 10 }

fn default_avatar_base() -> Url {
    Url::parse("https://ensdata.net/media/avatar").expect("static URL")
}

fn default_cache_max_age() -> u32 { 86400 }
