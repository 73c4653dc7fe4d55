use crate::binding::{Binding, BindingType};
use crate::connection::Connection;
use crate::descriptor::DeploymentRecord;
use crate::Error;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use alloy::primitives::{Address, ChainId};
use tracing::debug;

/// Chain id of the local development network.
pub const TEST_CHAIN_ID: ChainId = 31337;

/// Networks that can be referred to by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamedNetwork {
    Mainnet,
    Morden,
    Ropsten,
    Rinkeby,
    Goerli,
    Kovan,
}

impl NamedNetwork {
    pub const ALL: [NamedNetwork; 6] = [
        Self::Mainnet,
        Self::Morden,
        Self::Ropsten,
        Self::Rinkeby,
        Self::Goerli,
        Self::Kovan,
    ];

    pub const fn chain_id(self) -> ChainId {
        match self {
            Self::Mainnet => 1,
            Self::Morden => 2,
            Self::Ropsten => 3,
            Self::Rinkeby => 4,
            Self::Goerli => 5,
            Self::Kovan => 42,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Mainnet => "mainnet",
            Self::Morden => "morden",
            Self::Ropsten => "ropsten",
            Self::Rinkeby => "rinkeby",
            Self::Goerli => "goerli",
            Self::Kovan => "kovan",
        }
    }

    pub fn from_chain_id(chain_id: ChainId) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|network| network.chain_id() == chain_id)
    }
}

impl fmt::Display for NamedNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for NamedNetwork {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|network| network.name() == s)
            .ok_or(())
    }
}

/// Maps a network name or numeric id to a chain id.
///
/// Decimal and `0x` hex ids pass through and known names map to their
/// chain. Any other name is taken to mean the local test network. Input
/// that looks numeric but is not a valid chain id, like `-5` or an id
/// past `u64::MAX`, fails with [`Error::InvalidChainId`].
pub fn to_chain_id(network: &str) -> Result<ChainId, Error> {
    if let Ok(named) = network.parse::<NamedNetwork>() {
        return Ok(named.chain_id());
    }
    if !network.is_empty() && !looks_numeric(network) {
        return Ok(TEST_CHAIN_ID);
    }

    let parsed = match network
        .strip_prefix("0x")
        .or_else(|| network.strip_prefix("0X"))
    {
        Some(hex) => ChainId::from_str_radix(hex, 16),
        None => network.parse::<ChainId>(),
    };
    parsed.map_err(|_| Error::InvalidChainId(network.to_string()))
}

fn looks_numeric(network: &str) -> bool {
    let unsigned = network.strip_prefix(['+', '-']).unwrap_or(network);
    if let Some(hex) = unsigned
        .strip_prefix("0x")
        .or_else(|| unsigned.strip_prefix("0X"))
    {
        return !hex.is_empty() && hex.chars().all(|c| c.is_ascii_hexdigit());
    }
    unsigned.chars().any(|c| c.is_ascii_digit())
        && unsigned.chars().all(|c| c.is_ascii_digit() || c == '.')
}

impl BindingType {
    /// Binds the deployment registered for `network`.
    ///
    /// Without a `connection` one is picked by the type's
    /// [`resolver`](BindingType::resolver).
    pub fn get(
        &self,
        network: &str,
        connection: Option<Arc<dyn Connection>>,
    ) -> Result<Binding, Error> {
        let chain_id = to_chain_id(network)?;
        let DeploymentRecord { address } = self
            .networks()
            .get(&chain_id)
            .copied()
            .ok_or_else(|| Error::UnknownNetwork {
                network: network.to_string(),
                chain_id,
            })?;

        let connection = match connection {
            Some(connection) => connection,
            None => self.resolver().resolve(chain_id)?,
        };
        debug!(binding = %self.name(), network, chain_id, %address, "resolved deployment");
        Ok(self.instantiate(address, connection))
    }

    /// Binds the deployment on whichever chain `connection` reports.
    pub async fn lookup(&self, connection: Arc<dyn Connection>) -> Result<Binding, Error> {
        let chain_id = connection.chain_id().await?;
        self.get(&chain_id.to_string(), Some(connection))
    }

    /// Registers `address` as this type's deployment on [`TEST_CHAIN_ID`].
    pub fn set_local(&self, address: Address) {
        self.update_networks(|networks| {
            networks.insert(TEST_CHAIN_ID, DeploymentRecord { address });
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_networks_map_to_chain_ids() {
        assert_eq!(to_chain_id("mainnet").unwrap(), 1);
        assert_eq!(to_chain_id("morden").unwrap(), 2);
        assert_eq!(to_chain_id("ropsten").unwrap(), 3);
        assert_eq!(to_chain_id("rinkeby").unwrap(), 4);
        assert_eq!(to_chain_id("goerli").unwrap(), 5);
        assert_eq!(to_chain_id("kovan").unwrap(), 42);
    }

    #[test]
    fn numeric_ids_pass_through() {
        assert_eq!(to_chain_id("4").unwrap(), 4);
        assert_eq!(to_chain_id("04").unwrap(), 4);
        assert_eq!(to_chain_id("+4").unwrap(), 4);
        assert_eq!(to_chain_id("0x4").unwrap(), 4);
        assert_eq!(to_chain_id("0x7A69").unwrap(), TEST_CHAIN_ID);
        assert_eq!(to_chain_id("31337").unwrap(), TEST_CHAIN_ID);
    }

    #[test]
    fn unknown_names_fall_back_to_the_test_chain() {
        assert_eq!(to_chain_id("bogus").unwrap(), TEST_CHAIN_ID);
        assert_eq!(to_chain_id("Mainnet").unwrap(), TEST_CHAIN_ID);
        assert_eq!(to_chain_id("0xzz").unwrap(), TEST_CHAIN_ID);
    }

    #[test]
    fn numeric_input_never_falls_back_to_the_test_chain() {
        for network in ["-5", "-0", "99999999999999999999999", "4.5", "", "-0x4", "0x1ffffffffffffffff"] {
            let err = to_chain_id(network).unwrap_err();
            assert!(
                matches!(&err, Error::InvalidChainId(input) if input == network),
                "{network:?} gave {err:?}"
            );
        }
    }

    #[test]
    fn chain_ids_round_trip_through_names() {
        for network in NamedNetwork::ALL {
            assert_eq!(NamedNetwork::from_chain_id(network.chain_id()), Some(network));
            assert_eq!(network.to_string().parse::<NamedNetwork>(), Ok(network));
        }
        assert_eq!(NamedNetwork::from_chain_id(TEST_CHAIN_ID), None);
    }
}
