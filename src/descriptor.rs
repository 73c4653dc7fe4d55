use crate::Error;

use std::collections::BTreeMap;
use std::str::FromStr;

use alloy::json_abi::JsonAbi;
use alloy::primitives::{Address, Bytes, ChainId};
use serde::{Deserialize, Serialize};

/// Per-network deployment registry, keyed by chain id.
pub type Networks = BTreeMap<ChainId, DeploymentRecord>;

/// Where an interface is deployed on one network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentRecord {
    pub address: Address,
}

impl From<Address> for DeploymentRecord {
    fn from(address: Address) -> Self {
        Self { address }
    }
}

/// Static description of a remote contract: its ABI, optional deployable
/// code and the addresses it is deployed at.
///
/// Parsed from build artifacts of the shape
/// `{ "abi": [...], "bytecode": "0x...", "networks": { "4": { "address": "0x..." } } }`.
/// Unknown artifact fields are ignored and every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InterfaceDescriptor {
    #[serde(default)]
    pub abi: Option<JsonAbi>,
    #[serde(default)]
    pub bytecode: Option<Bytes>,
    #[serde(default)]
    pub networks: Networks,
}

impl InterfaceDescriptor {
    pub fn from_json(artifact: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(artifact)?)
    }

    pub fn from_abi(abi: JsonAbi) -> Self {
        Self {
            abi: Some(abi),
            ..Self::default()
        }
    }

    pub fn with_bytecode(mut self, bytecode: impl Into<Bytes>) -> Self {
        self.bytecode = Some(bytecode.into());
        self
    }

    pub fn with_network(mut self, chain_id: ChainId, address: Address) -> Self {
        self.networks.insert(chain_id, DeploymentRecord { address });
        self
    }
}

impl FromStr for InterfaceDescriptor {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_json(s)
    }
}
