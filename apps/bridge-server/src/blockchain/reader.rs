// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Contract balance reader.
//!
//! Reads `balanceOf(owner)` for a batch of ERC-20 contracts on one chain.
//!
//! ## Strategy
//!
//! 1. **Batched**: when the chain has a Multicall3 deployment, all reads go
//!    out as a single `aggregate3` call with `allowFailure = true`.
//! 2. **Individual**: when batching is unavailable, or the batch itself
//!    reverts or cannot be decoded, each token is read with its own
//!    `eth_call`, concurrently.
//!
//! Either way a failing token never aborts its siblings. Only a transport
//! fault (endpoint unreachable, HTTP error, timeout) is reported as a
//! chain-level [`ReaderError`].

use std::time::Duration;

use alloy::{
    primitives::{Address, Bytes, U256},
    providers::{Provider, ProviderBuilder},
    rpc::types::TransactionRequest,
    transports::{RpcError, TransportError},
};
use async_trait::async_trait;
use futures::future::join_all;

use super::erc20::{aggregate_balances_calldata, balance_of_calldata, decode_aggregate, decode_balance};
use super::types::{ChainTarget, ReadOutcome, ReaderError, TokenRead};

/// Default bound on a single RPC call.
pub const DEFAULT_RPC_TIMEOUT: Duration = Duration::from_secs(5);

/// Source of on-chain token balances.
#[async_trait]
pub trait BalanceReader: Send + Sync {
    /// Read `balanceOf(owner)` for every token, in input order.
    ///
    /// An empty `tokens` slice returns an empty result without any I/O.
    async fn read_balances(
        &self,
        target: &ChainTarget,
        owner: Address,
        tokens: &[TokenRead],
    ) -> Result<Vec<ReadOutcome>, ReaderError>;
}

/// Failure of one `eth_call`.
#[derive(Debug, thiserror::Error)]
enum CallError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("call timed out")]
    Timeout,

    #[error("execution error: {0}")]
    Execution(String),
}

impl CallError {
    fn is_transport(&self) -> bool {
        matches!(self, CallError::Transport(_) | CallError::Timeout)
    }
}

impl From<TransportError> for CallError {
    fn from(e: TransportError) -> Self {
        match e {
            RpcError::Transport(kind) => CallError::Transport(kind.to_string()),
            other => CallError::Execution(other.to_string()),
        }
    }
}

/// [`BalanceReader`] over JSON-RPC `eth_call`.
#[derive(Debug, Clone)]
pub struct RpcBalanceReader {
    timeout: Duration,
}

impl RpcBalanceReader {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    fn timeout_error(&self) -> ReaderError {
        ReaderError::Timeout(self.timeout.as_millis() as u64)
    }

    async fn eth_call<P: Provider>(
        &self,
        provider: &P,
        to: Address,
        input: Bytes,
    ) -> Result<Bytes, CallError> {
        let tx = TransactionRequest::default().to(to).input(input.into());
        match tokio::time::timeout(self.timeout, provider.call(tx)).await {
            Ok(Ok(output)) => Ok(output),
            Ok(Err(e)) => Err(e.into()),
            Err(_) => Err(CallError::Timeout),
        }
    }

    /// One `aggregate3` round-trip for the whole batch.
    async fn read_batched<P: Provider>(
        &self,
        provider: &P,
        multicall: Address,
        owner: Address,
        tokens: &[TokenRead],
    ) -> Result<Vec<ReadOutcome>, CallError> {
        let contracts: Vec<Address> = tokens.iter().map(|token| token.contract).collect();
        let output = self
            .eth_call(provider, multicall, aggregate_balances_calldata(owner, &contracts))
            .await?;

        let results = decode_aggregate(&output).map_err(CallError::Execution)?;
        if results.len() != tokens.len() {
            return Err(CallError::Execution(format!(
                "multicall returned {} results for {} calls",
                results.len(),
                tokens.len()
            )));
        }

        Ok(results
            .into_iter()
            .map(|result| {
                if !result.success {
                    return ReadOutcome::Failed("balanceOf reverted".to_string());
                }
                match decode_balance(&result.returnData) {
                    Ok(balance) => ReadOutcome::Balance(balance),
                    Err(e) => ReadOutcome::Failed(format!("undecodable balanceOf result: {e}")),
                }
            })
            .collect())
    }

    /// One `eth_call` per token, run concurrently.
    async fn read_individually<P: Provider>(
        &self,
        provider: &P,
        owner: Address,
        tokens: &[TokenRead],
    ) -> Vec<Result<U256, CallError>> {
        let call_data = balance_of_calldata(owner);
        let calls = tokens.iter().map(|token| {
            let call_data = call_data.clone();
            async move {
                let output = self.eth_call(provider, token.contract, call_data).await?;
                decode_balance(&output).map_err(CallError::Execution)
            }
        });
        join_all(calls).await
    }
}

impl Default for RpcBalanceReader {
    fn default() -> Self {
        Self::new(DEFAULT_RPC_TIMEOUT)
    }
}

#[async_trait]
impl BalanceReader for RpcBalanceReader {
    async fn read_balances(
        &self,
        target: &ChainTarget,
        owner: Address,
        tokens: &[TokenRead],
    ) -> Result<Vec<ReadOutcome>, ReaderError> {
        if tokens.is_empty() {
            return Ok(Vec::new());
        }

        let url: url::Url = target
            .rpc_endpoint
            .parse()
            .map_err(|e: url::ParseError| ReaderError::InvalidRpcUrl(e.to_string()))?;
        let provider = ProviderBuilder::new().connect_http(url);

        if let Some(multicall) = target.multicall_address {
            match self.read_batched(&provider, multicall, owner, tokens).await {
                Ok(outcomes) => return Ok(outcomes),
                Err(CallError::Timeout) => return Err(self.timeout_error()),
                Err(CallError::Transport(reason)) => return Err(ReaderError::Unreachable(reason)),
                Err(CallError::Execution(reason)) => {
                    tracing::debug!(
                        chain_id = target.chain_id,
                        error = %reason,
                        "Multicall batch failed, falling back to individual reads"
                    );
                }
            }
        }

        let results = self.read_individually(&provider, owner, tokens).await;

        if results.iter().all(|result| matches!(result, Err(e) if e.is_transport())) {
            let reason = results
                .into_iter()
                .find_map(Result::err)
                .map(|e| e.to_string())
                .unwrap_or_default();
            return Err(ReaderError::Unreachable(reason));
        }

        Ok(results
            .into_iter()
            .map(|result| match result {
                Ok(balance) => ReadOutcome::Balance(balance),
                Err(e) => ReadOutcome::Failed(e.to_string()),
            })
            .collect())
    }
}
