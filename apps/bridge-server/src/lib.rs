// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! 0xMove Bridge Server - Fiat/Stablecoin Balance Service
//!
//! Backend of a fiat/stablecoin bridge: wallet owner onboarding, health
//! probes, and a balance endpoint that merges ERC-20 balances read across
//! EVM chains with fiat balances held in the embedded ledger.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `balances` - Balance aggregation across chains and the fiat ledger
//! - `blockchain` - ERC-20 balance reads over JSON-RPC (Multicall3 batching)
//! - `registry` - Token and chain catalogues
//! - `storage` - User ledger (redb)

pub mod api;
pub mod balances;
pub mod blockchain;
pub mod config;
pub mod error;
pub mod models;
pub mod registry;
pub mod state;
pub mod storage;

#[cfg(test)]
pub(crate) mod test_support;
