use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use ethers::{
    providers::{Http, Middleware, Provider, ProviderError},
    types::{Address, U256},
    utils::{format_ether, to_checksum},
};

use crate::{config::EthConfig, error::AppError};

/// The three chain operations the OG endpoint consumes. A trait so that
/// handler tests can substitute a stub for the live provider.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Forward ENS resolution. `Ok(None)` means the name does not resolve.
    async fn resolve_name(&self, name: &str) -> Result<Option<Address>, AppError>;
    /// Reverse ENS resolution. A missing name is not an error.
    async fn lookup_address(&self, address: Address) -> Result<Option<String>, AppError>;
    /// Balance in wei.
    async fn get_balance(&self, address: Address) -> Result<U256, AppError>;
}

pub struct EthClient {
    provider: Provider<Http>,
}

impl EthClient {
    pub fn new(config: &EthConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to create RPC HTTP client")?;
        let transport = Http::new_with_client(config.rpc_url.clone(), client);
        Ok(Self { provider: Provider::new(transport) })
    }
}

#[async_trait]
impl ChainClient for EthClient {
    async fn resolve_name(&self, name: &str) -> Result<Option<Address>, AppError> {
        match self.provider.resolve_name(name).await {
            Ok(address) if address == Address::zero() => Ok(None),
            Ok(address) => Ok(Some(address)),
            // The provider reports an unregistered name (or one with no
            // resolver) as an ENS error, not as an empty result.
            Err(ProviderError::EnsError(_)) | Err(ProviderError::EnsNotOwned(_)) => Ok(None),
            Err(err) => Err(AppError::Upstream(err.into())),
        }
    }

    async fn lookup_address(&self, address: Address) -> Result<Option<String>, AppError> {
        match self.provider.lookup_address(address).await {
            Ok(name) => Ok(Some(name)),
            Err(ProviderError::EnsError(_)) | Err(ProviderError::EnsNotOwned(_)) => Ok(None),
            Err(err) => Err(AppError::Upstream(err.into())),
        }
    }

    async fn get_balance(&self, address: Address) -> Result<U256, AppError> {
        self.provider
            .get_balance(address, None)
            .await
            .map_err(|err| AppError::Upstream(err.into()))
    }
}

/// Whole-ether balance text, truncated to four decimals. An unavailable
/// balance renders as zero rather than failing the request.
pub fn format_balance(wei: Option<U256>) -> String {
    let Some(wei) = wei else {
        return "0.0000".to_string();
    };
    let ether = format_ether(wei);
    match ether.split_once('.') {
        Some((whole, frac)) => {
            let frac = &frac[..frac.len().min(4)];
            format!("{whole}.{frac:0<4}")
        }
        None => format!("{ether}.0000"),
    }
}

/// First 6 + last 4 characters of the checksummed address, e.g. `0xd8dA...6045`.
pub fn crop_address(address: Address) -> String {
    let full = to_checksum(&address, None);
    format!("{}...{}", &full[..6], &full[full.len() - 4..])
}

#[cfg(test)]
mod tests {
    use ethers::utils::parse_ether;

    use super::*;

    #[test]
    fn test_format_balance() {
        let cases: &[(Option<&str>, &str)] = &[
            (None, "0.0000"),
            (Some("0"), "0.0000"),
            (Some("1"), "1.0000"),
            (Some("1.5"), "1.5000"),
            (Some("1234.56789"), "1234.5678"),
            (Some("0.00001"), "0.0000"),
        ];
        for &(ether, expected) in cases {
            let wei = ether.map(|v| parse_ether(v).unwrap());
            assert_eq!(format_balance(wei), expected, "input {ether:?}");
        }
    }

    #[test]
    fn test_crop_address() {
        let address: Address =
            "0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045".parse().unwrap();
        assert_eq!(crop_address(address), "0xd8dA...6045");
    }
}
