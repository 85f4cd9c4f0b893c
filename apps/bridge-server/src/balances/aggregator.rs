// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Balance aggregator.
//!
//! Produces one [`BalanceSnapshot`] per query by fanning out one read per
//! target chain plus one fiat ledger read, joining all of them, and merging
//! the results.
//!
//! ## Degradation
//!
//! | Failure | Result |
//! |---------|--------|
//! | Malformed owner address | `AggregateError::InvalidInput`, no I/O |
//! | Chain has no configured contracts | chain skipped, no entries |
//! | One token read fails | `"0"` for that token only |
//! | Chain unreachable or has no RPC endpoint | `"0"` for every token planned on it |
//! | Ledger error or timeout | `"0"` for every fiat currency |

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::Address;
use chrono::Utc;
use futures::future::join_all;

use super::snapshot::{AggregateError, BalanceQuery, BalanceSnapshot, BalanceSource, ChainBalance};
use crate::blockchain::{BalanceReader, ChainTarget, ReadOutcome, TokenRead};
use crate::models::OwnerAddress;
use crate::registry::{ChainError, ChainRegistry, TokenRegistry};
use crate::storage::FiatLedger;

/// Default bound on the fiat ledger read.
pub const DEFAULT_LEDGER_TIMEOUT: Duration = Duration::from_millis(800);

/// Deployment-supplied values that take precedence over registry defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    /// RPC endpoint used for every chain.
    pub rpc_url: Option<String>,
    /// Token symbol → contract address, applied on every queried chain.
    pub contracts: BTreeMap<String, Address>,
}

/// Reads planned for one chain.
#[derive(Debug)]
struct ChainPlan {
    chain_id: u64,
    target: Result<ChainTarget, ChainError>,
    tokens: Vec<TokenRead>,
}

/// Merges on-chain and ledger balances into snapshots.
#[derive(Clone)]
pub struct BalanceAggregator {
    tokens: Arc<TokenRegistry>,
    chains: Arc<ChainRegistry>,
    reader: Arc<dyn BalanceReader>,
    ledger: Arc<dyn FiatLedger>,
    overrides: Overrides,
    ledger_timeout: Duration,
}

impl BalanceAggregator {
    pub fn new(
        tokens: Arc<TokenRegistry>,
        chains: Arc<ChainRegistry>,
        reader: Arc<dyn BalanceReader>,
        ledger: Arc<dyn FiatLedger>,
    ) -> Self {
        Self {
            tokens,
            chains,
            reader,
            ledger,
            overrides: Overrides::default(),
            ledger_timeout: DEFAULT_LEDGER_TIMEOUT,
        }
    }

    pub fn with_overrides(mut self, overrides: Overrides) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn with_ledger_timeout(mut self, timeout: Duration) -> Self {
        self.ledger_timeout = timeout;
        self
    }

    /// Validate `raw_address` and build its snapshot.
    ///
    /// An empty `requested_chain_ids` queries every supported chain.
    pub async fn aggregate(
        &self,
        raw_address: &str,
        requested_chain_ids: &[u64],
    ) -> Result<BalanceSnapshot, AggregateError> {
        let query = BalanceQuery::parse(raw_address, requested_chain_ids.to_vec())?;
        Ok(self.snapshot(&query).await)
    }

    /// Build the snapshot of an already validated query. Never fails.
    pub async fn snapshot(&self, query: &BalanceQuery) -> BalanceSnapshot {
        let queried_chain_ids = if query.requested_chain_ids.is_empty() {
            self.chains.list_supported_chain_ids().to_vec()
        } else {
            query.requested_chain_ids.clone()
        };

        let owner = query.owner.to_address();
        let plans: Vec<ChainPlan> = queried_chain_ids
            .iter()
            .filter_map(|chain_id| self.plan_chain(*chain_id))
            .collect();

        let chain_reads = join_all(plans.iter().map(|plan| self.read_chain(plan, owner)));
        let (fiat_balances, per_chain) = tokio::join!(self.read_fiat(&query.owner), chain_reads);

        let mut crypto_balances: BTreeMap<String, Vec<ChainBalance>> = self
            .tokens
            .crypto_symbols()
            .into_iter()
            .map(|symbol| (symbol.to_string(), Vec::new()))
            .collect();
        for (symbol, balance) in per_chain.into_iter().flatten() {
            crypto_balances.entry(symbol).or_default().push(balance);
        }

        let token_decimals = self
            .tokens
            .crypto_symbols()
            .into_iter()
            .filter_map(|symbol| {
                self.tokens
                    .decimals_for(symbol)
                    .map(|decimals| (symbol.to_string(), decimals))
            })
            .collect();

        tracing::debug!(
            address = %query.owner,
            chains = queried_chain_ids.len(),
            planned_chains = plans.len(),
            "Balance snapshot built"
        );

        BalanceSnapshot {
            owner_address: query.owner.clone(),
            queried_chain_ids,
            fiat_balances,
            crypto_balances,
            token_decimals,
            generated_at: Utc::now(),
        }
    }

    /// Contracts to read on `chain_id`, or `None` when nothing is configured.
    ///
    /// Walks crypto symbols in registration order. A contract override for a
    /// symbol wins over the registry and applies even on chains the registry
    /// does not list the symbol for.
    fn plan_chain(&self, chain_id: u64) -> Option<ChainPlan> {
        let tokens: Vec<TokenRead> = self
            .tokens
            .crypto_symbols()
            .into_iter()
            .filter_map(|symbol| {
                let configured = self
                    .tokens
                    .crypto_on_chain(symbol, chain_id)
                    .and_then(|token| token.contract_address);
                let contract = self.overrides.contracts.get(symbol).copied().or(configured)?;
                Some(TokenRead {
                    symbol: symbol.to_string(),
                    contract,
                })
            })
            .collect();

        if tokens.is_empty() {
            tracing::debug!(chain_id, "No token contracts configured, skipping chain");
            return None;
        }

        let target = self
            .chains
            .rpc_endpoint_for(chain_id, self.overrides.rpc_url.as_deref())
            .map(|rpc_endpoint| ChainTarget {
                chain_id,
                rpc_endpoint,
                multicall_address: self
                    .chains
                    .resolve(chain_id)
                    .and_then(|chain| chain.multicall_address),
            });

        Some(ChainPlan {
            chain_id,
            target,
            tokens,
        })
    }

    /// Execute one chain plan. Always yields one entry per planned token.
    async fn read_chain(&self, plan: &ChainPlan, owner: Address) -> Vec<(String, ChainBalance)> {
        let target = match &plan.target {
            Ok(target) => target,
            Err(e) => {
                tracing::warn!(chain_id = plan.chain_id, error = %e, "Chain has no RPC endpoint");
                return self.degrade_chain(plan, e.to_string());
            }
        };

        let outcomes = match self.reader.read_balances(target, owner, &plan.tokens).await {
            Ok(outcomes) => outcomes,
            Err(e) => {
                tracing::warn!(chain_id = plan.chain_id, error = %e, "Chain unreachable");
                return self.degrade_chain(plan, e.to_string());
            }
        };

        let mut outcomes = outcomes.into_iter();
        plan.tokens
            .iter()
            .map(|token| {
                let balance = match outcomes.next() {
                    Some(ReadOutcome::Balance(value)) => ChainBalance::confirmed(plan.chain_id, value),
                    Some(ReadOutcome::Failed(reason)) => {
                        tracing::warn!(
                            chain_id = plan.chain_id,
                            symbol = %token.symbol,
                            error = %reason,
                            "Token balance read failed"
                        );
                        ChainBalance::degraded(plan.chain_id, BalanceSource::ReadFailed(reason))
                    }
                    None => {
                        tracing::warn!(
                            chain_id = plan.chain_id,
                            symbol = %token.symbol,
                            "Reader returned no result for token"
                        );
                        ChainBalance::degraded(
                            plan.chain_id,
                            BalanceSource::ReadFailed("missing result".to_string()),
                        )
                    }
                };
                (token.symbol.clone(), balance)
            })
            .collect()
    }

    fn degrade_chain(&self, plan: &ChainPlan, reason: String) -> Vec<(String, ChainBalance)> {
        plan.tokens
            .iter()
            .map(|token| {
                (
                    token.symbol.clone(),
                    ChainBalance::degraded(
                        plan.chain_id,
                        BalanceSource::ChainUnreachable(reason.clone()),
                    ),
                )
            })
            .collect()
    }

    /// Fiat balances as minor-unit strings; every registry currency defaults to `"0"`.
    async fn read_fiat(&self, owner: &OwnerAddress) -> BTreeMap<String, String> {
        let mut fiat: BTreeMap<String, String> = self
            .tokens
            .fiat_symbols()
            .into_iter()
            .map(|symbol| (symbol.to_string(), "0".to_string()))
            .collect();

        match tokio::time::timeout(self.ledger_timeout, self.ledger.fiat_balances(owner)).await {
            Ok(Ok(Some(balances))) => {
                for (currency, minor_units) in balances {
                    fiat.insert(currency, minor_units.to_string());
                }
            }
            Ok(Ok(None)) => {
                tracing::debug!(address = %owner, "No ledger record, fiat balances default to zero");
            }
            Ok(Err(e)) => {
                tracing::warn!(address = %owner, error = %e, "Fiat ledger read failed");
            }
            Err(_) => {
                tracing::warn!(
                    address = %owner,
                    timeout_ms = self.ledger_timeout.as_millis() as u64,
                    "Fiat ledger read timed out"
                );
            }
        }

        fiat
    }
}
