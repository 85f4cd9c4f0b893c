// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Query and result types of the balance aggregator.

use std::collections::BTreeMap;

use alloy::primitives::U256;
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use utoipa::ToSchema;

use crate::models::{AddressError, OwnerAddress};

/// Errors surfaced to callers of the aggregator.
///
/// Unreachable chains and ledger faults degrade into zero balances instead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AggregateError {
    #[error("invalid owner address: {0}")]
    InvalidInput(#[from] AddressError),
}

/// One balance lookup request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceQuery {
    pub owner: OwnerAddress,
    /// Chains to query verbatim. Empty means every supported chain.
    pub requested_chain_ids: Vec<u64>,
}

impl BalanceQuery {
    /// Validate the raw owner address. Nothing else is checked here.
    pub fn parse(raw_address: &str, requested_chain_ids: Vec<u64>) -> Result<Self, AggregateError> {
        Ok(Self {
            owner: OwnerAddress::parse(raw_address)?,
            requested_chain_ids,
        })
    }
}

/// Where a reported balance came from.
///
/// Never serialized. A `"0"` on the wire is either a confirmed zero or one
/// of the failure variants; logs tell them apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BalanceSource {
    /// Value read from the chain.
    Confirmed,
    /// This token's read failed; siblings on the chain were unaffected.
    ReadFailed(String),
    /// The whole chain could not be reached.
    ChainUnreachable(String),
}

/// Balance of one token on one chain, in base units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChainBalance {
    pub chain_id: u64,
    #[serde(serialize_with = "serialize_decimal")]
    #[schema(value_type = String, example = "1000000")]
    pub balance: U256,
    #[serde(skip)]
    pub source: BalanceSource,
}

impl ChainBalance {
    pub fn confirmed(chain_id: u64, balance: U256) -> Self {
        Self {
            chain_id,
            balance,
            source: BalanceSource::Confirmed,
        }
    }

    /// A zero standing in for a value that could not be determined.
    pub fn degraded(chain_id: u64, source: BalanceSource) -> Self {
        Self {
            chain_id,
            balance: U256::ZERO,
            source,
        }
    }
}

fn serialize_decimal<S: Serializer>(value: &U256, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

/// Point-in-time merge of fiat and on-chain balances for one owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct BalanceSnapshot {
    /// Lowercase owner address.
    #[serde(rename = "address")]
    #[schema(value_type = String)]
    pub owner_address: OwnerAddress,
    /// Chains queried, in query order.
    #[serde(rename = "queriedChains")]
    pub queried_chain_ids: Vec<u64>,
    /// Currency symbol → balance in minor units.
    #[serde(rename = "fiat")]
    pub fiat_balances: BTreeMap<String, String>,
    /// Token symbol → one entry per chain that has the token configured.
    #[serde(rename = "crypto")]
    pub crypto_balances: BTreeMap<String, Vec<ChainBalance>>,
    /// Token symbol → display decimals.
    #[serde(rename = "tokenDecimals")]
    pub token_decimals: BTreeMap<String, u8>,
    #[serde(rename = "updatedAt")]
    pub generated_at: DateTime<Utc>,
}
