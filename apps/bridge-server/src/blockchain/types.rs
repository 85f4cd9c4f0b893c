// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Balance read request and result types.

use alloy::primitives::{Address, U256};

/// Where a batch of reads is sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainTarget {
    /// Chain ID
    pub chain_id: u64,
    /// Resolved RPC endpoint (override or registry default)
    pub rpc_endpoint: String,
    /// Multicall3 contract, when the chain supports batching
    pub multicall_address: Option<Address>,
}

/// One `balanceOf` read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenRead {
    /// Token symbol (e.g., "USDC")
    pub symbol: String,
    /// ERC-20 contract address
    pub contract: Address,
}

/// Result of a single read, positionally matching its [`TokenRead`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// Balance in the token's smallest unit.
    Balance(U256),
    /// The call reverted, returned garbage, or its transport failed.
    Failed(String),
}

/// Chain-level read failures. Individual token failures are reported as
/// [`ReadOutcome::Failed`] instead.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ReaderError {
    #[error("Invalid RPC URL: {0}")]
    InvalidRpcUrl(String),

    #[error("RPC endpoint unreachable: {0}")]
    Unreachable(String),

    #[error("RPC call timed out after {0} ms")]
    Timeout(u64),
}
