//! Contract call definitions used by the governance commands.
//!
//! Only the functions we encode or read are declared; encoding is pure and deterministic.

use alloy_primitives::B256;
use alloy_sol_types::sol;

use crate::hash::keccak256_bytes;

sol! {
    interface ISafe {
        function nonce() external view returns (uint256);
    }

    interface IMultiSend {
        function multiSend(bytes transactions) external payable;
    }

    interface IEVault {
        function setInterestRateModel(address newModel) external;
        function setLTV(address collateral, uint16 borrowLTV, uint16 liquidationLTV, uint32 rampDuration) external;
        function oracle() external view returns (address);
        function unitOfAccount() external view returns (address);
    }

    interface IERC4626 {
        function asset() external view returns (address);
    }

    interface IEulerRouter {
        function govSetConfig(address base, address quote, address oracle) external;
        function govSetResolvedVault(address vault, bool set) external;
    }

    interface IPegStabilityModule {
        function setFees(uint256 toUnderlyingFeeBPS, uint256 toSynthFeeBPS) external;
    }

    interface ISynth {
        function setDsrVault(address dsrVault) external;
        function grantRole(bytes32 role, address account) external;
    }
}

/// `keccak256("KEEPER_ROLE")`, the access-control role for synth keepers.
pub fn keeper_role() -> B256 {
    keccak256_bytes(b"KEEPER_ROLE")
}
