// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Storage Module
//!
//! Persistent state of the bridge: the user ledger holding onboarded owners
//! and their fiat balances. Backed by a single redb file under `DATA_DIR`.
//!
//! ```text
//! $DATA_DIR/
//!   ledger.redb
//! ```

pub mod ledger;

pub use ledger::{
    FiatBalances, FiatLedger, LedgerError, LedgerResult, NewUser, OnboardOutcome, StoredUser,
    UserLedger, USER_ID_PREFIX,
};
