// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Chain registry: supported EVM chains and their RPC metadata.

use std::collections::HashSet;

use alloy::primitives::{address, Address};

use super::prefer_override;

/// Multicall3 deployment address (identical on every chain that has it).
pub const MULTICALL3_ADDRESS: Address = address!("ca11bde05977b3631167028862be2a173976ca11");

/// EVM chain configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainDescriptor {
    /// Chain ID
    pub chain_id: u64,
    /// Network name for display
    pub name: &'static str,
    /// Public RPC endpoint used when no override is configured
    pub default_rpc_endpoint: &'static str,
    /// Native gas currency symbol
    pub native_currency_symbol: &'static str,
    /// Block explorer URL
    pub block_explorer_url: &'static str,
    /// Multicall3 contract used for batched reads (`None` disables batching)
    pub multicall_address: Option<Address>,
}

/// Base mainnet configuration.
pub const BASE: ChainDescriptor = ChainDescriptor {
    chain_id: 8453,
    name: "Base",
    default_rpc_endpoint: "https://mainnet.base.org",
    native_currency_symbol: "ETH",
    block_explorer_url: "https://basescan.org",
    multicall_address: Some(MULTICALL3_ADDRESS),
};

/// Base Sepolia testnet configuration.
pub const BASE_SEPOLIA: ChainDescriptor = ChainDescriptor {
    chain_id: 84532,
    name: "Base Sepolia",
    default_rpc_endpoint: "https://sepolia.base.org",
    native_currency_symbol: "ETH",
    block_explorer_url: "https://sepolia.basescan.org",
    multicall_address: Some(MULTICALL3_ADDRESS),
};

/// Every chain this build knows how to talk to.
pub const KNOWN_CHAINS: [ChainDescriptor; 2] = [BASE, BASE_SEPOLIA];

/// Chain ids served when the deployment does not say otherwise.
pub const DEFAULT_SUPPORTED_CHAIN_IDS: [u64; 1] = [BASE.chain_id];

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ChainError {
    #[error("Unknown chain id: {0}")]
    UnknownChain(u64),

    #[error("Chain {0} is registered twice")]
    DuplicateChain(u64),

    #[error("No supported chains configured")]
    EmptySupportedSet,

    #[error("No RPC endpoint available for chain {0}")]
    NoRpcEndpoint(u64),
}

/// Immutable catalogue of chains plus the deployment's supported subset.
#[derive(Debug, Clone)]
pub struct ChainRegistry {
    catalogue: Vec<ChainDescriptor>,
    supported: Vec<u64>,
}

impl ChainRegistry {
    /// Build a registry. Every supported id must exist in the catalogue.
    pub fn new(catalogue: Vec<ChainDescriptor>, supported: Vec<u64>) -> Result<Self, ChainError> {
        let mut seen = HashSet::new();
        for chain in &catalogue {
            if !seen.insert(chain.chain_id) {
                return Err(ChainError::DuplicateChain(chain.chain_id));
            }
        }

        if supported.is_empty() {
            return Err(ChainError::EmptySupportedSet);
        }
        if let Some(unknown) = supported.iter().find(|id| !seen.contains(*id)) {
            return Err(ChainError::UnknownChain(*unknown));
        }

        let mut unique = HashSet::new();
        let supported = supported.into_iter().filter(|id| unique.insert(*id)).collect();

        Ok(Self { catalogue, supported })
    }

    /// Built-in catalogue restricted to `supported`.
    pub fn with_supported(supported: &[u64]) -> Result<Self, ChainError> {
        Self::new(KNOWN_CHAINS.to_vec(), supported.to_vec())
    }

    /// Built-in catalogue serving the default chain set.
    pub fn builtin() -> Self {
        Self {
            catalogue: KNOWN_CHAINS.to_vec(),
            supported: DEFAULT_SUPPORTED_CHAIN_IDS.to_vec(),
        }
    }

    pub fn list_supported_chain_ids(&self) -> &[u64] {
        &self.supported
    }

    /// Supported chains in deployment order.
    pub fn supported_chains(&self) -> impl Iterator<Item = &ChainDescriptor> {
        self.supported.iter().filter_map(|id| self.resolve(*id))
    }

    pub fn resolve(&self, chain_id: u64) -> Option<&ChainDescriptor> {
        self.catalogue.iter().find(|chain| chain.chain_id == chain_id)
    }

    /// RPC endpoint for a chain: `override_url` if non-empty, else the
    /// registry default. Unknown chains have no default.
    pub fn rpc_endpoint_for(
        &self,
        chain_id: u64,
        override_url: Option<&str>,
    ) -> Result<String, ChainError> {
        let default = self.resolve(chain_id).map(|chain| chain.default_rpc_endpoint);
        prefer_override(override_url, default)
            .map(str::to_string)
            .ok_or(ChainError::NoRpcEndpoint(chain_id))
    }
}

impl Default for ChainRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_serves_base_only() {
        let registry = ChainRegistry::builtin();
        assert_eq!(registry.list_supported_chain_ids(), &[8453]);
        assert_eq!(registry.resolve(8453).unwrap().name, "Base");
        // Known but not served
        assert!(registry.resolve(84532).is_some());
        assert!(registry.resolve(1).is_none());
    }

    #[test]
    fn supported_set_keeps_order_and_drops_repeats() {
        let registry = ChainRegistry::with_supported(&[84532, 8453, 84532]).unwrap();
        assert_eq!(registry.list_supported_chain_ids(), &[84532, 8453]);
        let names: Vec<&str> = registry.supported_chains().map(|c| c.name).collect();
        assert_eq!(names, vec!["Base Sepolia", "Base"]);
    }

    #[test]
    fn unknown_supported_chain_is_rejected() {
        assert_eq!(
            ChainRegistry::with_supported(&[8453, 10]).unwrap_err(),
            ChainError::UnknownChain(10)
        );
        assert_eq!(
            ChainRegistry::with_supported(&[]).unwrap_err(),
            ChainError::EmptySupportedSet
        );
    }

    #[test]
    fn duplicate_catalogue_entry_is_rejected() {
        assert_eq!(
            ChainRegistry::new(vec![BASE, BASE], vec![8453]).unwrap_err(),
            ChainError::DuplicateChain(8453)
        );
    }

    #[test]
    fn rpc_endpoint_prefers_override() {
        let registry = ChainRegistry::builtin();
        assert_eq!(
            registry.rpc_endpoint_for(8453, Some("https://rpc.example")).unwrap(),
            "https://rpc.example"
        );
        assert_eq!(
            registry.rpc_endpoint_for(8453, Some("")).unwrap(),
            "https://mainnet.base.org"
        );
        assert_eq!(registry.rpc_endpoint_for(8453, None).unwrap(), "https://mainnet.base.org");
    }

    #[test]
    fn rpc_endpoint_for_unknown_chain_needs_override() {
        let registry = ChainRegistry::builtin();
        assert_eq!(
            registry.rpc_endpoint_for(999, None).unwrap_err(),
            ChainError::NoRpcEndpoint(999)
        );
        assert_eq!(
            registry.rpc_endpoint_for(999, Some("https://rpc.example")).unwrap(),
            "https://rpc.example"
        );
    }
}
