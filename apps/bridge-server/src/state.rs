// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;
use std::time::Instant;

use crate::balances::BalanceAggregator;
use crate::registry::{ChainRegistry, TokenRegistry};
use crate::storage::{FiatLedger, UserLedger};

/// Shared handler state. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub aggregator: BalanceAggregator,
    /// Writable ledger used by onboarding.
    pub ledger: UserLedger,
    /// Read view probed by readiness.
    pub fiat_ledger: Arc<dyn FiatLedger>,
    pub tokens: Arc<TokenRegistry>,
    pub chains: Arc<ChainRegistry>,
    pub started_at: Instant,
    pub app_env: String,
}

impl AppState {
    pub fn new(
        aggregator: BalanceAggregator,
        ledger: UserLedger,
        tokens: Arc<TokenRegistry>,
        chains: Arc<ChainRegistry>,
        app_env: impl Into<String>,
    ) -> Self {
        let fiat_ledger: Arc<dyn FiatLedger> = Arc::new(ledger.clone());
        Self {
            aggregator,
            ledger,
            fiat_ledger,
            tokens,
            chains,
            started_at: Instant::now(),
            app_env: app_env.into(),
        }
    }

    /// Swap the ledger probed by readiness.
    pub fn with_fiat_ledger(mut self, fiat_ledger: Arc<dyn FiatLedger>) -> Self {
        self.fiat_ledger = fiat_ledger;
        self
    }
}
