// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Blockchain integration module for EVM chains.
//!
//! This module provides functionality for:
//! - Encoding and decoding ERC-20 `balanceOf` and Multicall3 calls
//! - Reading token balances for one owner across a batch of contracts

pub mod erc20;
pub mod reader;
pub mod types;

pub use reader::{BalanceReader, RpcBalanceReader, DEFAULT_RPC_TIMEOUT};
pub use types::*;
