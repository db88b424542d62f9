//! Contract interfaces generated via alloy's sol! macro.
//!
//! TRON contracts share the EVM ABI; addresses are passed as their 20-byte account id.

use alloy::sol;

sol! {
    // TRC-20 subset used for balances and allowances
    interface ITRC20 {
        function balanceOf(address owner) external view returns (uint256);
        function approve(address spender, uint256 value) external returns (bool);
    }

    // WTRX wraps the attached call value 1:1
    interface IWrappedTrx {
        function deposit() external payable;
    }

    // Token contract that accumulates TRX and releases it to its manager
    interface ITokenTreasury {
        function withdrawLiquidity(uint256 amount) external;
    }

    interface INonfungiblePositionManager {
        function increaseLiquidity(IncreaseLiquidityParams calldata params)
            external
            payable
            returns (uint128 liquidity, uint256 amount0, uint256 amount1);
    }

    struct IncreaseLiquidityParams {
        uint256 tokenId;
        uint256 amount0Desired;
        uint256 amount1Desired;
        uint256 amount0Min;
        uint256 amount1Min;
        uint256 deadline;
    }
}
