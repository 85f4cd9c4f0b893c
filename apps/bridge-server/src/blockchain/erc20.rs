// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! ERC-20 and Multicall3 ABI bindings used for balance reads.

use alloy::{
    primitives::{Address, Bytes, U256},
    sol,
    sol_types::SolCall,
};

// Only the read side of the ERC-20 interface is needed here.
sol! {
    interface IERC20 {
        function balanceOf(address account) external view returns (uint256);
    }
}

sol! {
    /// Multicall3 `aggregate3`, batching calls that may fail individually.
    interface IMulticall3 {
        struct Call3 {
            address target;
            bool allowFailure;
            bytes callData;
        }

        struct Result {
            bool success;
            bytes returnData;
        }

        function aggregate3(Call3[] calldata calls)
            external payable returns (Result[] memory returnData);
    }
}

/// Calldata for `balanceOf(owner)`.
pub fn balance_of_calldata(owner: Address) -> Bytes {
    IERC20::balanceOfCall { account: owner }.abi_encode().into()
}

/// Decode a `balanceOf` return value.
pub fn decode_balance(data: &[u8]) -> Result<U256, String> {
    IERC20::balanceOfCall::abi_decode_returns(data).map_err(|e| e.to_string())
}

/// Calldata for one `aggregate3` batch of `balanceOf(owner)` calls, one per
/// token contract, each allowed to fail on its own.
pub fn aggregate_balances_calldata(owner: Address, contracts: &[Address]) -> Bytes {
    let call_data = balance_of_calldata(owner);
    let calls = contracts
        .iter()
        .map(|contract| IMulticall3::Call3 {
            target: *contract,
            allowFailure: true,
            callData: call_data.clone(),
        })
        .collect();
    IMulticall3::aggregate3Call { calls }.abi_encode().into()
}

/// Decode an `aggregate3` response into per-call `(success, returnData)`.
pub fn decode_aggregate(data: &[u8]) -> Result<Vec<IMulticall3::Result>, String> {
    IMulticall3::aggregate3Call::abi_decode_returns(data).map_err(|e| e.to_string())
}
