// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response structures shared by the REST handlers, plus the
//! validated [`OwnerAddress`] type used everywhere an EVM account is taken
//! from user input.
//!
//! ## Owner Address
//!
//! Format: `0x` followed by exactly 40 hexadecimal characters (20 bytes).
//! The prefix must be lowercase `0x`; the hex digits may use any case and
//! are normalized to lowercase, so `0xAbCd...` and `0xabcd...` are the same
//! owner for storage and lookups.

use std::str::FromStr;

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::storage::StoredUser;

// =============================================================================
// Owner Address
// =============================================================================

/// Reasons a string is not a well-formed EVM address.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressError {
    #[error("address must start with 0x")]
    MissingPrefix,

    #[error("address must have 40 hex characters, got {0}")]
    InvalidLength(usize),

    #[error("address contains non-hex characters")]
    NonHex,
}

/// Validated, lowercase-normalized EVM account address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OwnerAddress(String);

impl OwnerAddress {
    /// Validate `raw` and normalize it to lowercase.
    pub fn parse(raw: &str) -> Result<Self, AddressError> {
        let hex = raw.strip_prefix("0x").ok_or(AddressError::MissingPrefix)?;
        if hex.len() != 40 {
            return Err(AddressError::InvalidLength(hex.len()));
        }
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(AddressError::NonHex);
        }
        Ok(Self(format!("0x{}", hex.to_ascii_lowercase())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The address as 20 raw bytes.
    pub fn to_address(&self) -> Address {
        // Validated in `parse`, so decoding cannot fail.
        Address::from_str(&self.0).unwrap_or_default()
    }
}

impl std::fmt::Display for OwnerAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for OwnerAddress {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for OwnerAddress {
    type Error = AddressError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<OwnerAddress> for String {
    fn from(value: OwnerAddress) -> Self {
        value.0
    }
}

// =============================================================================
// Onboarding Models
// =============================================================================

/// Request to onboard a wallet owner.
///
/// Fields are optional at the wire level so that missing values produce a
/// validation message instead of a deserialization failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct OnboardingRequest {
    /// EVM address (`0x` + 40 hex characters).
    pub address: Option<String>,
    /// Contact email.
    pub email: Option<String>,
    /// Public username (at least 2 characters).
    pub username: Option<String>,
}

/// Response for a created or already-existing user.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OnboardingResponse {
    /// The stored user record.
    pub user: StoredUser,
    /// Present (and `true`) when the user had already onboarded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub existed: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIXED: &str = "0xAbCdEf0123456789aBcDeF0123456789AbCdEf01";

    #[test]
    fn parse_normalizes_to_lowercase() {
        let addr = OwnerAddress::parse(MIXED).unwrap();
        assert_eq!(addr.as_str(), "0xabcdef0123456789abcdef0123456789abcdef01");
        assert_eq!(addr, OwnerAddress::parse(&MIXED.to_lowercase()).unwrap());
        let upper = format!("0x{}", MIXED[2..].to_uppercase());
        assert_eq!(addr, OwnerAddress::parse(&upper).unwrap());
    }

    #[test]
    fn parse_rejects_malformed_input() {
        assert_eq!(
            OwnerAddress::parse("abcdef0123456789abcdef0123456789abcdef01"),
            Err(AddressError::MissingPrefix)
        );
        assert_eq!(
            OwnerAddress::parse("0XABCDEF0123456789ABCDEF0123456789ABCDEF01"),
            Err(AddressError::MissingPrefix)
        );
        assert_eq!(OwnerAddress::parse("0x1234"), Err(AddressError::InvalidLength(4)));
        assert_eq!(
            OwnerAddress::parse("0xzzcdef0123456789abcdef0123456789abcdef01"),
            Err(AddressError::NonHex)
        );
        assert!(OwnerAddress::parse("").is_err());
    }

    #[test]
    fn to_address_round_trips_bytes() {
        let addr = OwnerAddress::parse(MIXED).unwrap();
        assert_eq!(format!("{:#x}", addr.to_address()), addr.as_str());
    }

    #[test]
    fn deserialize_validates() {
        let ok: Result<OwnerAddress, _> = serde_json::from_str(&format!("\"{MIXED}\""));
        assert!(ok.is_ok());
        let bad: Result<OwnerAddress, _> = serde_json::from_str("\"0x12\"");
        assert!(bad.is_err());
    }
}
