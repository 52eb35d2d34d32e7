//! ERC20 token contract bindings.

use alloy_primitives::hex;
use alloy_sol_types::{sol, SolCall};

sol! {
    /// Read-only view of the standard ERC20 token interface
    interface IERC20 {
        /// Get token balance of an account
        function balanceOf(address account) external view returns (uint256);

        /// Get token symbol
        function symbol() external view returns (string memory);

        /// Get token decimals
        function decimals() external view returns (uint8);
    }
}

/// `balanceOf(address)`
pub const BALANCE_OF: [u8; 4] = IERC20::balanceOfCall::SELECTOR;

/// `decimals()`
pub const DECIMALS: [u8; 4] = IERC20::decimalsCall::SELECTOR;

/// `symbol()`
pub const SYMBOL: [u8; 4] = IERC20::symbolCall::SELECTOR;

/// Render a selector as `0x`-prefixed lowercase hex, ready to prefix call input.
pub fn selector_hex(selector: [u8; 4]) -> String {
    hex::encode_prefixed(selector)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selectors_match_known_values() {
        assert_eq!(selector_hex(BALANCE_OF), "0x70a08231");
        assert_eq!(selector_hex(DECIMALS), "0x313ce567");
        assert_eq!(selector_hex(SYMBOL), "0x95d89b41");
    }
}
