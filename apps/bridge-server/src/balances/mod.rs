// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Balance Aggregation
//!
//! Merges on-chain token balances across chains with ledger-held fiat
//! balances into one [`BalanceSnapshot`]. Snapshots are rebuilt from live
//! state on every call.

pub mod aggregator;
pub mod snapshot;

pub use aggregator::{BalanceAggregator, Overrides, DEFAULT_LEDGER_TIMEOUT};
pub use snapshot::{AggregateError, BalanceQuery, BalanceSnapshot, BalanceSource, ChainBalance};
