// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-process fakes for the chain reader and the fiat ledger, plus a
//! ready-made [`AppState`] over a temporary ledger.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use alloy::primitives::{Address, U256};
use async_trait::async_trait;

use crate::balances::BalanceAggregator;
use crate::blockchain::{BalanceReader, ChainTarget, ReadOutcome, ReaderError, TokenRead};
use crate::config::LEDGER_FILE;
use crate::models::OwnerAddress;
use crate::registry::{ChainRegistry, TokenRegistry};
use crate::state::AppState;
use crate::storage::{FiatBalances, FiatLedger, LedgerError, LedgerResult, UserLedger};

/// Handler state backed by a scripted reader and a temporary redb ledger.
pub struct TestApp {
    pub state: AppState,
    pub reader: Arc<ScriptedReader>,
    _dir: tempfile::TempDir,
}

impl TestApp {
    pub fn new(reader: ScriptedReader) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let ledger = UserLedger::open(&dir.path().join(LEDGER_FILE)).unwrap();
        let tokens = Arc::new(TokenRegistry::builtin());
        let chains = Arc::new(ChainRegistry::builtin());
        let reader = Arc::new(reader);

        let aggregator = BalanceAggregator::new(
            tokens.clone(),
            chains.clone(),
            reader.clone(),
            Arc::new(ledger.clone()),
        );
        let state = AppState::new(aggregator, ledger, tokens, chains, "test");

        Self {
            state,
            reader,
            _dir: dir,
        }
    }
}

/// Behaviour of one chain in a [`ScriptedReader`].
#[derive(Debug, Clone)]
enum ChainScript {
    Outcomes(HashMap<Address, ReadOutcome>),
    Unreachable,
}

/// One recorded `read_balances` invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadCall {
    pub chain_id: u64,
    pub rpc_endpoint: String,
    pub symbols: Vec<String>,
}

/// [`BalanceReader`] answering from a per-chain script.
///
/// Contracts without a scripted outcome read as zero.
#[derive(Debug, Default)]
pub struct ScriptedReader {
    scripts: HashMap<u64, ChainScript>,
    calls: Mutex<Vec<ReadCall>>,
}

impl ScriptedReader {
    pub fn new() -> Self {
        Self::default()
    }

    fn outcomes(&mut self, chain_id: u64) -> &mut HashMap<Address, ReadOutcome> {
        let script = self
            .scripts
            .entry(chain_id)
            .or_insert_with(|| ChainScript::Outcomes(HashMap::new()));
        if let ChainScript::Unreachable = script {
            *script = ChainScript::Outcomes(HashMap::new());
        }
        match script {
            ChainScript::Outcomes(outcomes) => outcomes,
            ChainScript::Unreachable => unreachable!(),
        }
    }

    pub fn balance(mut self, chain_id: u64, contract: Address, value: u64) -> Self {
        self.outcomes(chain_id)
            .insert(contract, ReadOutcome::Balance(U256::from(value)));
        self
    }

    pub fn failing(mut self, chain_id: u64, contract: Address, reason: &str) -> Self {
        self.outcomes(chain_id)
            .insert(contract, ReadOutcome::Failed(reason.to_string()));
        self
    }

    pub fn unreachable(mut self, chain_id: u64) -> Self {
        self.scripts.insert(chain_id, ChainScript::Unreachable);
        self
    }

    pub fn calls(&self) -> Vec<ReadCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl BalanceReader for ScriptedReader {
    async fn read_balances(
        &self,
        target: &ChainTarget,
        _owner: Address,
        tokens: &[TokenRead],
    ) -> Result<Vec<ReadOutcome>, ReaderError> {
        self.calls.lock().unwrap().push(ReadCall {
            chain_id: target.chain_id,
            rpc_endpoint: target.rpc_endpoint.clone(),
            symbols: tokens.iter().map(|token| token.symbol.clone()).collect(),
        });

        match self.scripts.get(&target.chain_id) {
            Some(ChainScript::Unreachable) => {
                Err(ReaderError::Unreachable("connection refused".to_string()))
            }
            Some(ChainScript::Outcomes(outcomes)) => Ok(tokens
                .iter()
                .map(|token| {
                    outcomes
                        .get(&token.contract)
                        .cloned()
                        .unwrap_or(ReadOutcome::Balance(U256::ZERO))
                })
                .collect()),
            None => Ok(vec![ReadOutcome::Balance(U256::ZERO); tokens.len()]),
        }
    }
}

/// [`FiatLedger`] over a map, with optional failure and latency.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    balances: HashMap<OwnerAddress, FiatBalances>,
    failing: bool,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, address: &str, ngn: i64, kes: i64) -> Self {
        let address = OwnerAddress::parse(address).unwrap();
        self.balances.insert(
            address,
            FiatBalances::from([("NGN".to_string(), ngn), ("KES".to_string(), kes)]),
        );
        self
    }

    pub fn failing(mut self) -> Self {
        self.failing = true;
        self
    }

    pub fn slow(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FiatLedger for MemoryLedger {
    async fn fiat_balances(&self, address: &OwnerAddress) -> LedgerResult<Option<FiatBalances>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing {
            return Err(offline());
        }
        Ok(self.balances.get(address).cloned())
    }

    async fn ping(&self) -> LedgerResult<()> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing {
            return Err(offline());
        }
        Ok(())
    }
}

fn offline() -> LedgerError {
    LedgerError::RedbStorage(redb::StorageError::Io(std::io::Error::other("ledger offline")))
}
