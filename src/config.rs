use crate::connection::{AlloyConnection, Connection, ConnectionResolver};
use crate::network::NamedNetwork;
use crate::Error;

use std::collections::BTreeMap;
use std::sync::Arc;

use alloy::primitives::ChainId;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

pub const DEFAULT_LOCAL_RPC: &str = "http://localhost:8545";

/// Environment variable holding the hosted-endpoint credential.
pub const INFURA_PROJECT_ID_ENV: &str = "INFURA_PROJECT_ID";

const INFURA_NETWORKS: [NamedNetwork; 3] = [
    NamedNetwork::Mainnet,
    NamedNetwork::Kovan,
    NamedNetwork::Rinkeby,
];

/// Endpoints used when a binding is resolved without an explicit connection.
///
/// Chains listed in `hosted` go to that endpoint, everything else to `local`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointConfig {
    #[serde(default = "default_local")]
    pub local: Url,
    #[serde(default)]
    pub hosted: BTreeMap<ChainId, Url>,
}

fn default_local() -> Url {
    Url::parse(DEFAULT_LOCAL_RPC).expect("default local endpoint is a valid url")
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            local: default_local(),
            hosted: BTreeMap::new(),
        }
    }
}

impl EndpointConfig {
    /// Hosted Infura endpoints for mainnet, kovan and rinkeby.
    pub fn infura(project_id: &str) -> Result<Self, Error> {
        let mut config = Self::default();
        for network in INFURA_NETWORKS {
            let url = Url::parse(&format!(
                "https://{}.infura.io/v3/{project_id}",
                network.name()
            ))?;
            config.hosted.insert(network.chain_id(), url);
        }
        Ok(config)
    }

    /// Uses Infura when `INFURA_PROJECT_ID` is set, the local node otherwise.
    pub fn from_env() -> Result<Self, Error> {
        match std::env::var(INFURA_PROJECT_ID_ENV) {
            Ok(project_id) if !project_id.is_empty() => Self::infura(&project_id),
            _ => Ok(Self::default()),
        }
    }

    pub fn with_local(mut self, local: Url) -> Self {
        self.local = local;
        self
    }

    pub fn with_hosted(mut self, chain_id: ChainId, url: Url) -> Self {
        self.hosted.insert(chain_id, url);
        self
    }

    pub fn endpoint(&self, chain_id: ChainId) -> &Url {
        self.hosted.get(&chain_id).unwrap_or(&self.local)
    }
}

impl ConnectionResolver for EndpointConfig {
    fn resolve(&self, chain_id: ChainId) -> Result<Arc<dyn Connection>, Error> {
        let url = self.endpoint(chain_id);
        debug!(chain_id, endpoint = %url.host_str().unwrap_or_default(), "resolved default connection");
        Ok(Arc::new(AlloyConnection::http(url.clone())))
    }
}
