//! Bindings for the parts of the Balancer V2 vault that joins and exits go
//! through.

alloy::sol! {
    #[allow(missing_docs)]
    #[sol(all_derives)]
    interface IVault {
        struct JoinPoolRequest {
            address[] assets;
            uint256[] maxAmountsIn;
            bytes userData;
            bool fromInternalBalance;
        }

        struct ExitPoolRequest {
            address[] assets;
            uint256[] minAmountsOut;
            bytes userData;
            bool toInternalBalance;
        }

        function joinPool(
            bytes32 poolId,
            address sender,
            address recipient,
            JoinPoolRequest memory request
        ) external payable;

        function exitPool(
            bytes32 poolId,
            address sender,
            address payable recipient,
            ExitPoolRequest memory request
        ) external;
    }
}
