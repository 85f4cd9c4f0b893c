// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Static token and chain catalogues.
//!
//! Both registries are built once at startup and shared behind `Arc`
//! without locking. Nothing in this module performs I/O.

pub mod chains;
pub mod tokens;

pub use chains::{ChainDescriptor, ChainError, ChainRegistry, BASE, BASE_SEPOLIA, KNOWN_CHAINS};
pub use tokens::{
    CryptoToken, FiatToken, RegistryError, TokenDescriptor, TokenKind, TokenRegistry,
    FIAT_SENTINEL,
};

/// Two-source resolution: a non-empty override wins, then the default.
///
/// Values are trimmed; a blank string counts as absent on either side.
pub fn prefer_override<'a>(
    override_value: Option<&'a str>,
    default: Option<&'a str>,
) -> Option<&'a str> {
    let non_blank = |value: &'a str| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    };
    override_value
        .and_then(non_blank)
        .or_else(|| default.and_then(non_blank))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_takes_precedence() {
        assert_eq!(
            prefer_override(Some("https://override"), Some("https://default")),
            Some("https://override")
        );
    }

    #[test]
    fn blank_override_falls_back_to_default() {
        assert_eq!(
            prefer_override(Some("   "), Some("https://default")),
            Some("https://default")
        );
        assert_eq!(prefer_override(None, Some(" https://default ")), Some("https://default"));
    }

    #[test]
    fn neither_source_yields_none() {
        assert_eq!(prefer_override(None, None), None);
        assert_eq!(prefer_override(Some(""), Some("")), None);
    }
}
