// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User ledger backed by redb (pure Rust, ACID).
//!
//! Holds onboarded users and their fiat balances in minor units (kobo,
//! cents). The balance aggregator only ever reads from it.
//!
//! ## Table Layout
//!
//! - `users`: lowercase address → serialized StoredUser (JSON bytes)
//! - `user_emails`: email → lowercase address
//! - `usernames`: username → lowercase address

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::OwnerAddress;

// =============================================================================
// Table Definitions
// =============================================================================

/// Primary table: address → serialized StoredUser (JSON bytes).
const USERS: TableDefinition<&str, &[u8]> = TableDefinition::new("users");

/// Unique index: email → address.
const USER_EMAILS: TableDefinition<&str, &str> = TableDefinition::new("user_emails");

/// Unique index: username → address.
const USERNAMES: TableDefinition<&str, &str> = TableDefinition::new("usernames");

/// Prefix of generated user ids.
pub const USER_ID_PREFIX: &str = "0xMove_";

/// Fiat currencies held per user, in minor units.
pub type FiatBalances = BTreeMap<String, i64>;

// =============================================================================
// Error Type
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("redb error: {0}")]
    Redb(#[from] redb::Error),

    #[error("redb database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("ledger task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("username already taken: {0}")]
    UsernameTaken(String),

    #[error("unknown fiat currency: {0}")]
    UnknownCurrency(String),

    #[error("not found: {0}")]
    NotFound(String),
}

pub type LedgerResult<T> = Result<T, LedgerError>;

// =============================================================================
// Records
// =============================================================================

/// Onboarded user with fiat balances in minor units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoredUser {
    /// `0xMove_` followed by 32 hex characters.
    pub id: String,
    /// Lowercase EVM address.
    #[schema(value_type = String)]
    pub address: OwnerAddress,
    pub email: String,
    pub username: String,
    /// KYC flag (defaults to `true`).
    pub kyc: bool,
    /// Naira balance in kobo.
    pub ngn_balance: i64,
    /// Shilling balance in cents.
    pub kes_balance: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StoredUser {
    /// Fiat balances keyed by currency symbol.
    pub fn fiat_balances(&self) -> FiatBalances {
        BTreeMap::from([
            ("NGN".to_string(), self.ngn_balance),
            ("KES".to_string(), self.kes_balance),
        ])
    }
}

/// Validated input for [`UserLedger::onboard`].
#[derive(Debug, Clone)]
pub struct NewUser {
    pub address: OwnerAddress,
    pub email: String,
    pub username: String,
}

/// Result of an onboarding attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OnboardOutcome {
    Created(StoredUser),
    /// A user with this address (or email) already exists.
    Existing(StoredUser),
}

// =============================================================================
// FiatLedger
// =============================================================================

/// Read access to ledger-held fiat balances.
#[async_trait]
pub trait FiatLedger: Send + Sync {
    /// Fiat balances of `address`, or `None` when the owner has no record.
    async fn fiat_balances(&self, address: &OwnerAddress) -> LedgerResult<Option<FiatBalances>>;

    /// Cheap availability check for readiness probes.
    async fn ping(&self) -> LedgerResult<()>;
}

// =============================================================================
// UserLedger
// =============================================================================

/// Embedded ACID user ledger. Cheap to clone.
#[derive(Clone)]
pub struct UserLedger {
    db: Arc<Database>,
}

impl UserLedger {
    /// Open (or create) the ledger at the given path.
    pub fn open(path: &Path) -> LedgerResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let db = Database::create(path)?;

        // Pre-create all tables so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(USERS)?;
            let _ = write_txn.open_table(USER_EMAILS)?;
            let _ = write_txn.open_table(USERNAMES)?;
        }
        write_txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Insert a new user, or return the existing one.
    ///
    /// An existing address wins over an existing email. A username held by
    /// a different user is an error.
    pub fn onboard(&self, new_user: NewUser) -> LedgerResult<OnboardOutcome> {
        let write_txn = self.db.begin_write()?;
        let outcome = {
            let mut users = write_txn.open_table(USERS)?;
            let mut emails = write_txn.open_table(USER_EMAILS)?;
            let mut usernames = write_txn.open_table(USERNAMES)?;

            let address = new_user.address.as_str();

            let existing_by_address = match users.get(address)? {
                Some(value) => Some(serde_json::from_slice::<StoredUser>(value.value())?),
                None => None,
            };
            let email_owner = emails.get(new_user.email.as_str())?.map(|v| v.value().to_string());

            if let Some(user) = existing_by_address {
                OnboardOutcome::Existing(user)
            } else if let Some(owner) = email_owner {
                let user = match users.get(owner.as_str())? {
                    Some(value) => serde_json::from_slice::<StoredUser>(value.value())?,
                    None => return Err(LedgerError::NotFound(format!("User {owner}"))),
                };
                OnboardOutcome::Existing(user)
            } else if usernames.get(new_user.username.as_str())?.is_some() {
                return Err(LedgerError::UsernameTaken(new_user.username));
            } else {
                let now = Utc::now();
                let user = StoredUser {
                    id: format!("{USER_ID_PREFIX}{}", uuid::Uuid::new_v4().simple()),
                    address: new_user.address.clone(),
                    email: new_user.email.clone(),
                    username: new_user.username.clone(),
                    kyc: true,
                    ngn_balance: 0,
                    kes_balance: 0,
                    created_at: now,
                    updated_at: now,
                };
                let json = serde_json::to_vec(&user)?;
                users.insert(address, json.as_slice())?;
                emails.insert(user.email.as_str(), address)?;
                usernames.insert(user.username.as_str(), address)?;
                OnboardOutcome::Created(user)
            }
        };

        match outcome {
            OnboardOutcome::Created(_) => write_txn.commit()?,
            OnboardOutcome::Existing(_) => write_txn.abort()?,
        }
        Ok(outcome)
    }

    /// Look up a user by address.
    pub fn get_by_address(&self, address: &OwnerAddress) -> LedgerResult<Option<StoredUser>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(USERS)?;
        match table.get(address.as_str())? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Look up a user by email.
    pub fn get_by_email(&self, email: &str) -> LedgerResult<Option<StoredUser>> {
        let read_txn = self.db.begin_read()?;
        let emails = read_txn.open_table(USER_EMAILS)?;
        let Some(owner) = emails.get(email)?.map(|v| v.value().to_string()) else {
            return Ok(None);
        };
        let users = read_txn.open_table(USERS)?;
        match users.get(owner.as_str())? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Overwrite one fiat balance (minor units) of an existing user.
    pub fn set_fiat_balance(
        &self,
        address: &OwnerAddress,
        currency: &str,
        minor_units: i64,
    ) -> LedgerResult<StoredUser> {
        let write_txn = self.db.begin_write()?;
        let user = {
            let mut users = write_txn.open_table(USERS)?;

            let existing_bytes = {
                let existing = users
                    .get(address.as_str())?
                    .ok_or_else(|| LedgerError::NotFound(format!("User {address}")))?;
                existing.value().to_vec()
            };

            let mut user: StoredUser = serde_json::from_slice(&existing_bytes)?;
            match currency {
                "NGN" => user.ngn_balance = minor_units,
                "KES" => user.kes_balance = minor_units,
                other => return Err(LedgerError::UnknownCurrency(other.to_string())),
            }
            user.updated_at = Utc::now();

            let json = serde_json::to_vec(&user)?;
            users.insert(address.as_str(), json.as_slice())?;
            user
        };
        write_txn.commit()?;
        Ok(user)
    }

    /// Open a read transaction on the users table.
    pub fn check(&self) -> LedgerResult<()> {
        let read_txn = self.db.begin_read()?;
        let _ = read_txn.open_table(USERS)?;
        Ok(())
    }
}

#[async_trait]
impl FiatLedger for UserLedger {
    async fn fiat_balances(&self, address: &OwnerAddress) -> LedgerResult<Option<FiatBalances>> {
        let ledger = self.clone();
        let address = address.clone();
        let user = tokio::task::spawn_blocking(move || ledger.get_by_address(&address)).await??;
        Ok(user.map(|user| user.fiat_balances()))
    }

    async fn ping(&self) -> LedgerResult<()> {
        let ledger = self.clone();
        tokio::task::spawn_blocking(move || ledger.check()).await?
    }
}

// =============================================================================
// Tests
// =============================================================================
