use std::sync::LazyLock;

use ethers::types::{Address, U256};
use regex::Regex;

use crate::{
    error::AppError,
    eth::{ChainClient, crop_address},
};

/// User input is clipped before classification; anything longer is junk.
const MAX_TOKEN_LEN: usize = 100;

static ADDRESS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^0x[0-9a-fA-F]{40}$").unwrap());
static NAME_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\.(eth|xyz)$").unwrap());

/// Classified form of the `addyOrEns` query parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Address(Address),
    Name(String),
    Invalid,
}

pub fn classify(raw: &str) -> Token {
    let token = clip(raw);
    if ADDRESS_RE.is_match(token) {
        return match token.parse() {
            Ok(address) => Token::Address(address),
            Err(_) => Token::Invalid,
        };
    }
    let lower = token.to_lowercase();
    if NAME_RE.is_match(&lower) {
        return Token::Name(lower);
    }
    Token::Invalid
}

fn clip(raw: &str) -> &str {
    match raw.char_indices().nth(MAX_TOKEN_LEN) {
        Some((idx, _)) => &raw[..idx],
        None => raw,
    }
}

/// Resolved form of a token, plus the best-effort balance.
#[derive(Debug, Clone)]
pub struct Identity {
    pub address: Address,
    /// Display-quality name: the input when it was an ENS name, or the
    /// reverse-resolved name for an address input.
    pub name: Option<String>,
    pub balance: Option<U256>,
}

impl Identity {
    /// Fallback order is total and deterministic: name, else cropped address.
    pub fn display_name(&self) -> String {
        self.name.clone().unwrap_or_else(|| crop_address(self.address))
    }
}

/// Resolve a classified token to an identity.
///
/// The name path forward-resolves and treats a miss (or a failed lookup) as
/// 404. The address path only attempts the reverse lookup; its failure, like
/// a balance fetch failure, degrades rather than failing the request.
pub async fn resolve(client: &dyn ChainClient, token: Token) -> Result<Identity, AppError> {
    match token {
        Token::Address(address) => {
            let name = match client.lookup_address(address).await {
                Ok(name) => name,
                Err(err) => {
                    tracing::warn!("Reverse lookup failed for {address:?}: {err:?}");
                    None
                }
            };
            let balance = fetch_balance(client, address).await;
            Ok(Identity { address, name, balance })
        }
        Token::Name(name) => {
            let address = match client.resolve_name(&name).await {
                Ok(address) => address,
                Err(err) => {
                    tracing::warn!("Resolution failed for {name}: {err:?}");
                    None
                }
            };
            let Some(address) = address else {
                return Err(AppError::NotFound("ENS name not found"));
            };
            let balance = fetch_balance(client, address).await;
            Ok(Identity { address, name: Some(name), balance })
        }
        Token::Invalid => Err(AppError::BadRequest("Invalid address or ENS")),
    }
}

async fn fetch_balance(client: &dyn ChainClient, address: Address) -> Option<U256> {
    match client.get_balance(address).await {
        Ok(wei) => Some(wei),
        Err(err) => {
            tracing::warn!("Balance fetch failed for {address:?}: {err:?}");
            None
        }
    }
}
