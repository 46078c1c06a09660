//! `TablelandTables` registry deployments, by chain id.

use ethers::types::H160;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeploymentError {
    #[error("no Tableland deployment known for chain id {0}")]
    UnknownChainId(u64),
}

/// One registry deployment: which chain, and where the contract lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deployment {
    pub chain_id: u64,
    pub chain_name: &'static str,
    pub address: H160,
}

/// Addresses from the `@tableland/evm` deployment manifest.
const DEPLOYMENTS: &[Deployment] = &[
    Deployment {
        chain_id: 1,
        chain_name: "mainnet",
        address: H160([
            0x01, 0x29, 0x69, 0xf7, 0xe3, 0x43, 0x9a, 0x9b, 0x04, 0x02, 0x5b, 0x5a, 0x04, 0x9e,
            0xb9, 0xba, 0xd8, 0x2a, 0x8c, 0x12,
        ]),
    },
    Deployment {
        chain_id: 10,
        chain_name: "optimism",
        address: H160([
            0xfa, 0xd4, 0x4b, 0xf5, 0xb8, 0x43, 0xde, 0x94, 0x3a, 0x09, 0xd4, 0xf3, 0xe8, 0x49,
            0x49, 0xa1, 0x1d, 0x3a, 0xa3, 0xe6,
        ]),
    },
    Deployment {
        chain_id: 137,
        chain_name: "matic",
        address: H160([
            0x5c, 0x4e, 0x6a, 0x9e, 0x5c, 0x1e, 0x1b, 0xf4, 0x45, 0xa0, 0x62, 0x00, 0x6f, 0xaf,
            0x19, 0xea, 0x6c, 0x49, 0xaf, 0xea,
        ]),
    },
    Deployment {
        chain_id: 42161,
        chain_name: "arbitrum",
        address: H160([
            0x9a, 0xbd, 0x75, 0xe8, 0x64, 0x08, 0x71, 0xa5, 0xa2, 0x0d, 0x3b, 0x4e, 0xe6, 0x33,
            0x0a, 0x04, 0xc9, 0x62, 0xaf, 0xfd,
        ]),
    },
    Deployment {
        chain_id: 5,
        chain_name: "goerli",
        address: H160([
            0xda, 0x8e, 0xa2, 0x2d, 0x09, 0x23, 0x07, 0x87, 0x4f, 0x30, 0xa1, 0xf2, 0x77, 0xd1,
            0x38, 0x8d, 0xca, 0x0b, 0xa9, 0x7a,
        ]),
    },
    Deployment {
        chain_id: 420,
        chain_name: "optimism-goerli",
        address: H160([
            0xc7, 0x2e, 0x8a, 0x7b, 0xe0, 0x4f, 0x24, 0x69, 0xf8, 0xc2, 0xdb, 0x3f, 0x1b, 0xdf,
            0x69, 0xa7, 0xd5, 0x16, 0xab, 0xba,
        ]),
    },
    Deployment {
        chain_id: 421613,
        chain_name: "arbitrum-goerli",
        address: H160([
            0x03, 0x3f, 0x69, 0xe8, 0xd1, 0x19, 0x20, 0x50, 0x89, 0xab, 0x15, 0xd3, 0x40, 0xf5,
            0xb7, 0x97, 0x73, 0x2f, 0x64, 0x6b,
        ]),
    },
    Deployment {
        chain_id: 80001,
        chain_name: "maticmum",
        address: H160([
            0x4b, 0x48, 0x84, 0x1d, 0x4b, 0x32, 0xc4, 0x65, 0x0e, 0x4a, 0xbc, 0x11, 0x7a, 0x03,
            0xfe, 0x8b, 0x51, 0xf3, 0x8f, 0x68,
        ]),
    },
    Deployment {
        chain_id: 31337,
        chain_name: "local-tableland",
        address: H160([
            0xe7, 0xf1, 0x72, 0x5e, 0x77, 0x34, 0xce, 0x28, 0x8f, 0x83, 0x67, 0xe1, 0xbb, 0x14,
            0x3e, 0x90, 0xbb, 0x3f, 0x05, 0x12,
        ]),
    },
];

/// Looks up the deployment for the chain id reported by the provider.
pub fn deployment_for_chain(chain_id: u64) -> Result<&'static Deployment, DeploymentError> {
    DEPLOYMENTS
        .iter()
        .find(|deployment| deployment.chain_id == chain_id)
        .ok_or(DeploymentError::UnknownChainId(chain_id))
}
