//! ERC20 token contract bindings.

use alloy_sol_types::sol;

sol! {
    /// Optional metadata extension of the ERC20 token interface.
    #[sol(rpc)]
    interface IERC20Metadata {
        /// Get token name
        function name() external view returns (string memory);

        /// Get token symbol
        function symbol() external view returns (string memory);

        /// Get token decimals
        function decimals() external view returns (uint8);
    }
}
