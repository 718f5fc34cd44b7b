//! Contract interfaces for the lending pool and the liquidator agent.
//!
//! The agent contract wraps the pool's liquidation entry point with an
//! Aave flash loan and a swap through the `Swapper` helper, so a single
//! transaction borrows, liquidates, swaps and repays.

use alloy::primitives::{Address, Bytes, U256};
use alloy::sol;
use alloy::sol_types::SolCall;

// Aave V2 LendingPool (subset used by the agent loop)
sol! {
    /// Lending pool interface
    #[sol(rpc)]
    interface ILendingPool {
        function getReservesList() external view returns (address[] memory);
    }
}

// Deployed liquidator agent
sol! {
    /// Liquidator agent contract interface
    #[sol(rpc)]
    interface ILiquidatorAgent {
        function isUserReadyForLiquidation(address user) external view returns (bool);

        function getUserDebtForReserves(
            address user,
            address[] calldata reserves
        ) external view returns (uint256 debtAmount, address debtReserve);

        function findUserCollateralIndex(
            address user,
            uint256 hardLimit
        ) external view returns (uint256);

        function liquidateUserWithFlashLoan(
            address user,
            address collateralAsset,
            address debtAsset,
            uint256 amount
        ) external;
    }
}

/// Encode `liquidateUserWithFlashLoan` calldata.
pub fn encode_liquidation(
    user: Address,
    collateral: Address,
    debt: Address,
    amount: U256,
) -> Bytes {
    let call = ILiquidatorAgent::liquidateUserWithFlashLoanCall {
        user,
        collateralAsset: collateral,
        debtAsset: debt,
        amount,
    };

    Bytes::from(call.abi_encode())
}
