// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token registry: fiat and crypto token descriptors across chains.
//!
//! ## Registration Order
//!
//! Lookups that can match more than one token (a symbol without a chain id)
//! return the first match in registration order. The built-in catalogue
//! registers, in order:
//!
//! | Id | Kind | Contract |
//! |----|------|----------|
//! | `USDC:8453` | crypto | Circle USDC on Base |
//! | `USDT:8453` | crypto | not configured |
//! | `USDC:84532` | crypto | Circle test USDC on Base Sepolia |
//! | `USDT:84532` | crypto | not configured |
//! | `NGN:fiat` | fiat | - |
//! | `KES:fiat` | fiat | - |
//!
//! Fiat tokens are nominally attached to the reference chain (Base); that
//! association never implies on-chain settlement.

use std::collections::HashSet;
use std::str::FromStr;

use alloy::primitives::{address, Address};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::chains::{BASE, BASE_SEPOLIA};

/// Sentinel carried by fiat tokens in place of a contract address and decimals.
pub const FIAT_SENTINEL: &str = "fiat";

/// Chain fiat tokens are nominally registered on.
pub const FIAT_REFERENCE_CHAIN_ID: u64 = BASE.chain_id;

/// Discriminant of [`TokenDescriptor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Crypto,
    Fiat,
}

impl FromStr for TokenKind {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "crypto" => Ok(TokenKind::Crypto),
            "fiat" => Ok(TokenKind::Fiat),
            other => Err(RegistryError::UnknownKind(other.to_string())),
        }
    }
}

/// ERC-20 style token living on a specific chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CryptoToken {
    pub id: String,
    pub symbol: String,
    pub display_name: String,
    pub logo_ref: String,
    pub chain_id: u64,
    /// `None` until the token is deployed/configured on this chain.
    pub contract_address: Option<Address>,
    pub decimals: u8,
    /// Identifier used by external price feeds (e.g. CoinGecko).
    pub external_price_id: Option<String>,
}

impl CryptoToken {
    pub fn new(
        symbol: &str,
        display_name: &str,
        logo_ref: &str,
        chain_id: u64,
        contract_address: Option<Address>,
        decimals: u8,
    ) -> Self {
        Self {
            id: format!("{symbol}:{chain_id}"),
            symbol: symbol.to_string(),
            display_name: display_name.to_string(),
            logo_ref: logo_ref.to_string(),
            chain_id,
            contract_address,
            decimals,
            external_price_id: None,
        }
    }

    pub fn with_price_id(mut self, price_id: &str) -> Self {
        self.external_price_id = Some(price_id.to_string());
        self
    }
}

/// Off-chain currency held in the fiat ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FiatToken {
    pub id: String,
    pub symbol: String,
    pub display_name: String,
    pub logo_ref: String,
    pub chain_id: u64,
    /// ISO 3166-1 alpha-2 country code.
    pub country_code: String,
    /// Fixed rate against USD, as a decimal string. Never used in arithmetic here.
    pub static_exchange_rate: Option<String>,
}

impl FiatToken {
    pub fn new(symbol: &str, display_name: &str, logo_ref: &str, country_code: &str) -> Self {
        Self {
            id: format!("{symbol}:{FIAT_SENTINEL}"),
            symbol: symbol.to_string(),
            display_name: display_name.to_string(),
            logo_ref: logo_ref.to_string(),
            chain_id: FIAT_REFERENCE_CHAIN_ID,
            country_code: country_code.to_string(),
            static_exchange_rate: None,
        }
    }
}

/// A registry entry: either an on-chain token or a ledger currency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenDescriptor {
    Crypto(CryptoToken),
    Fiat(FiatToken),
}

impl TokenDescriptor {
    pub fn id(&self) -> &str {
        match self {
            TokenDescriptor::Crypto(token) => &token.id,
            TokenDescriptor::Fiat(token) => &token.id,
        }
    }

    pub fn symbol(&self) -> &str {
        match self {
            TokenDescriptor::Crypto(token) => &token.symbol,
            TokenDescriptor::Fiat(token) => &token.symbol,
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            TokenDescriptor::Crypto(token) => &token.display_name,
            TokenDescriptor::Fiat(token) => &token.display_name,
        }
    }

    pub fn logo_ref(&self) -> &str {
        match self {
            TokenDescriptor::Crypto(token) => &token.logo_ref,
            TokenDescriptor::Fiat(token) => &token.logo_ref,
        }
    }

    pub fn chain_id(&self) -> u64 {
        match self {
            TokenDescriptor::Crypto(token) => token.chain_id,
            TokenDescriptor::Fiat(token) => token.chain_id,
        }
    }

    pub fn kind(&self) -> TokenKind {
        match self {
            TokenDescriptor::Crypto(_) => TokenKind::Crypto,
            TokenDescriptor::Fiat(_) => TokenKind::Fiat,
        }
    }

    pub fn as_crypto(&self) -> Option<&CryptoToken> {
        match self {
            TokenDescriptor::Crypto(token) => Some(token),
            TokenDescriptor::Fiat(_) => None,
        }
    }
}

/// Errors raised while building or querying the registry.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Duplicate token id: {0}")]
    DuplicateId(String),

    #[error("Duplicate crypto token {symbol} on chain {chain_id}")]
    DuplicateSymbolOnChain { symbol: String, chain_id: u64 },

    #[error("Unknown token type: {0}")]
    UnknownKind(String),
}

/// Immutable catalogue of token descriptors.
#[derive(Debug, Clone)]
pub struct TokenRegistry {
    tokens: Vec<TokenDescriptor>,
}

impl TokenRegistry {
    /// Build a registry, rejecting duplicate ids and duplicate crypto
    /// `(symbol, chain_id)` pairs.
    pub fn new(tokens: Vec<TokenDescriptor>) -> Result<Self, RegistryError> {
        let mut ids = HashSet::new();
        let mut crypto_keys = HashSet::new();

        for token in &tokens {
            if !ids.insert(token.id().to_string()) {
                return Err(RegistryError::DuplicateId(token.id().to_string()));
            }
            match token {
                TokenDescriptor::Crypto(crypto) => {
                    if !crypto_keys.insert((crypto.symbol.clone(), crypto.chain_id)) {
                        return Err(RegistryError::DuplicateSymbolOnChain {
                            symbol: crypto.symbol.clone(),
                            chain_id: crypto.chain_id,
                        });
                    }
                }
                TokenDescriptor::Fiat(_) => {}
            }
        }

        Ok(Self { tokens })
    }

    /// The catalogue shipped with the service.
    pub fn builtin() -> Self {
        Self {
            tokens: builtin_tokens(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &TokenDescriptor> {
        self.tokens.iter()
    }

    pub fn lookup_by_id(&self, id: &str) -> Option<&TokenDescriptor> {
        self.tokens.iter().find(|token| token.id() == id)
    }

    /// Find a token by symbol. Without a chain id the first registered
    /// match wins.
    pub fn lookup_by_symbol(&self, symbol: &str, chain_id: Option<u64>) -> Option<&TokenDescriptor> {
        self.tokens.iter().find(|token| {
            token.symbol() == symbol && chain_id.map_or(true, |id| token.chain_id() == id)
        })
    }

    /// Find a crypto token by contract address on a chain.
    ///
    /// Addresses are compared as bytes, so the textual case of the input
    /// is irrelevant. Fiat tokens never match.
    pub fn lookup_by_contract_address(&self, address: &str, chain_id: u64) -> Option<&CryptoToken> {
        let wanted = Address::from_str(address.trim()).ok()?;
        self.tokens.iter().find_map(|token| match token {
            TokenDescriptor::Crypto(crypto)
                if crypto.chain_id == chain_id && crypto.contract_address == Some(wanted) =>
            {
                Some(crypto)
            }
            TokenDescriptor::Crypto(_) | TokenDescriptor::Fiat(_) => None,
        })
    }

    pub fn list_by_type(&self, kind: TokenKind) -> Vec<&TokenDescriptor> {
        self.tokens.iter().filter(|token| token.kind() == kind).collect()
    }

    /// Crypto token registered for `symbol` on `chain_id`.
    pub fn crypto_on_chain(&self, symbol: &str, chain_id: u64) -> Option<&CryptoToken> {
        self.lookup_by_symbol(symbol, Some(chain_id))
            .and_then(TokenDescriptor::as_crypto)
    }

    /// Distinct crypto symbols in first-registration order.
    pub fn crypto_symbols(&self) -> Vec<&str> {
        self.distinct_symbols(TokenKind::Crypto)
    }

    /// Distinct fiat symbols in first-registration order.
    pub fn fiat_symbols(&self) -> Vec<&str> {
        self.distinct_symbols(TokenKind::Fiat)
    }

    /// Display decimals of the first registered crypto token with `symbol`.
    pub fn decimals_for(&self, symbol: &str) -> Option<u8> {
        self.tokens.iter().find_map(|token| match token {
            TokenDescriptor::Crypto(crypto) if crypto.symbol == symbol => Some(crypto.decimals),
            TokenDescriptor::Crypto(_) | TokenDescriptor::Fiat(_) => None,
        })
    }

    fn distinct_symbols(&self, kind: TokenKind) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.tokens
            .iter()
            .filter(|token| token.kind() == kind)
            .map(TokenDescriptor::symbol)
            .filter(|symbol| seen.insert(*symbol))
            .collect()
    }
}

impl Default for TokenRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Circle USDC on Base mainnet.
const BASE_USDC: Address = address!("833589fcd6edb6e08f4c7c32d4f71b54bda02913");

/// Circle test USDC on Base Sepolia.
const BASE_SEPOLIA_USDC: Address = address!("036cbd53842c5426634e7929541ec2318f3dcf7e");

fn builtin_tokens() -> Vec<TokenDescriptor> {
    vec![
        TokenDescriptor::Crypto(
            CryptoToken::new("USDC", "USD Coin", "/tokens/usdc.png", BASE.chain_id, Some(BASE_USDC), 6)
                .with_price_id("usd-coin"),
        ),
        TokenDescriptor::Crypto(
            CryptoToken::new("USDT", "Tether USD", "/tokens/usdt.png", BASE.chain_id, None, 6)
                .with_price_id("tether"),
        ),
        TokenDescriptor::Crypto(
            CryptoToken::new(
                "USDC",
                "USD Coin",
                "/tokens/usdc.png",
                BASE_SEPOLIA.chain_id,
                Some(BASE_SEPOLIA_USDC),
                6,
            )
            .with_price_id("usd-coin"),
        ),
        TokenDescriptor::Crypto(
            CryptoToken::new("USDT", "Tether USD", "/tokens/usdt.png", BASE_SEPOLIA.chain_id, None, 6)
                .with_price_id("tether"),
        ),
        TokenDescriptor::Fiat(FiatToken::new("NGN", "Nigerian Naira", "/tokens/nigerian.svg", "NG")),
        TokenDescriptor::Fiat(FiatToken::new("KES", "Kenyan Shilling", "/tokens/kenya.svg", "KE")),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalogue_passes_validation() {
        let registry = TokenRegistry::new(builtin_tokens());
        assert!(registry.is_ok());
    }

    #[test]
    fn ids_follow_symbol_and_chain_format() {
        let registry = TokenRegistry::builtin();
        assert!(registry.lookup_by_id("USDC:8453").is_some());
        assert!(registry.lookup_by_id("NGN:fiat").is_some());
        assert!(registry.lookup_by_id("NGN:8453").is_none());
    }

    #[test]
    fn symbol_lookup_without_chain_returns_first_registered() {
        let registry = TokenRegistry::builtin();
        let token = registry.lookup_by_symbol("USDC", None).unwrap();
        assert_eq!(token.chain_id(), 8453);

        let sepolia = registry.lookup_by_symbol("USDC", Some(84532)).unwrap();
        assert_eq!(sepolia.id(), "USDC:84532");

        assert!(registry.lookup_by_symbol("USDC", Some(1)).is_none());
    }

    #[test]
    fn contract_lookup_ignores_case() {
        let registry = TokenRegistry::builtin();
        let upper = registry
            .lookup_by_contract_address("0x833589FCD6EDB6E08F4C7C32D4F71B54BDA02913", 8453)
            .unwrap();
        let lower = registry
            .lookup_by_contract_address("0x833589fcd6edb6e08f4c7c32d4f71b54bda02913", 8453)
            .unwrap();
        assert_eq!(upper.id, "USDC:8453");
        assert_eq!(upper, lower);
    }

    #[test]
    fn contract_lookup_never_matches_fiat_or_other_chain() {
        let registry = TokenRegistry::builtin();
        assert!(registry.lookup_by_contract_address("fiat", 8453).is_none());
        assert!(registry
            .lookup_by_contract_address("0x833589fcd6edb6e08f4c7c32d4f71b54bda02913", 84532)
            .is_none());
    }

    #[test]
    fn list_by_type_keeps_registration_order() {
        let registry = TokenRegistry::builtin();
        let fiat: Vec<&str> = registry
            .list_by_type(TokenKind::Fiat)
            .into_iter()
            .map(TokenDescriptor::symbol)
            .collect();
        assert_eq!(fiat, vec!["NGN", "KES"]);

        let crypto: Vec<&str> = registry
            .list_by_type(TokenKind::Crypto)
            .into_iter()
            .map(TokenDescriptor::id)
            .collect();
        assert_eq!(crypto, vec!["USDC:8453", "USDT:8453", "USDC:84532", "USDT:84532"]);
    }

    #[test]
    fn distinct_symbols_and_decimals() {
        let registry = TokenRegistry::builtin();
        assert_eq!(registry.crypto_symbols(), vec!["USDC", "USDT"]);
        assert_eq!(registry.fiat_symbols(), vec!["NGN", "KES"]);
        assert_eq!(registry.decimals_for("USDC"), Some(6));
        assert_eq!(registry.decimals_for("NGN"), None);
    }

    #[test]
    fn duplicate_symbol_on_chain_is_rejected() {
        let result = TokenRegistry::new(vec![
            TokenDescriptor::Crypto(CryptoToken::new("USDC", "USD Coin", "", 8453, None, 6)),
            TokenDescriptor::Crypto(CryptoToken {
                id: "USDC-bridged:8453".to_string(),
                ..CryptoToken::new("USDC", "Bridged USDC", "", 8453, None, 6)
            }),
        ]);
        assert_eq!(
            result.unwrap_err(),
            RegistryError::DuplicateSymbolOnChain {
                symbol: "USDC".to_string(),
                chain_id: 8453
            }
        );
    }

    #[test]
    fn duplicate_id_is_rejected() {
        let result = TokenRegistry::new(vec![
            TokenDescriptor::Fiat(FiatToken::new("NGN", "Nigerian Naira", "", "NG")),
            TokenDescriptor::Fiat(FiatToken::new("NGN", "Naira", "", "NG")),
        ]);
        assert_eq!(result.unwrap_err(), RegistryError::DuplicateId("NGN:fiat".to_string()));
    }

    #[test]
    fn token_kind_parses_case_insensitively() {
        assert_eq!("Crypto".parse::<TokenKind>().unwrap(), TokenKind::Crypto);
        assert_eq!("fiat".parse::<TokenKind>().unwrap(), TokenKind::Fiat);
        assert!("nft".parse::<TokenKind>().is_err());
    }
}
