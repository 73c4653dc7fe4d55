use crate::{Error, Invocation};

use std::fmt::Debug;
use std::sync::Arc;

use alloy::dyn_abi::{DynSolValue, FunctionExt, JsonAbiExt};
use alloy::json_abi::{Function, StateMutability};
use alloy::network::{EthereumWallet, TransactionBuilder};
use alloy::primitives::{Address, Bytes, ChainId, U256};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::types::{TransactionReceipt, TransactionRequest};
use alloy::signers::local::PrivateKeySigner;
use async_trait::async_trait;
use tracing::{debug, info};
use url::Url;

/// What a connection is able to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionKind {
    /// Read-only queries.
    Provider,
    /// Can also send transactions.
    Signer,
}

/// The transport a binding talks through.
///
/// Implementations own JSON-RPC, signing and ABI encoding. Failures are
/// returned as-is; bindings never wrap or retry them.
#[async_trait]
pub trait Connection: Debug + Send + Sync {
    fn kind(&self) -> ConnectionKind;

    fn can_send_transactions(&self) -> bool {
        self.kind() == ConnectionKind::Signer
    }

    /// Chain id reported by the live network.
    async fn chain_id(&self) -> Result<ChainId, Error>;

    /// Calls `function` on `to`, attaching `value` wei when given.
    async fn invoke(
        &self,
        to: Address,
        function: &Function,
        args: &[DynSolValue],
        value: Option<U256>,
    ) -> Result<Invocation, Error>;

    /// Sends `code` as a contract creation and waits for the deployed address.
    async fn deploy(&self, code: Bytes) -> Result<Address, Error>;
}

/// Picks a connection for a chain when the caller did not supply one.
pub trait ConnectionResolver: Debug + Send + Sync {
    fn resolve(&self, chain_id: ChainId) -> Result<Arc<dyn Connection>, Error>;
}

/// [`Connection`] backed by an alloy provider.
#[derive(Debug, Clone)]
pub struct AlloyConnection {
    provider: DynProvider,
    kind: ConnectionKind,
    from: Option<Address>,
}

impl AlloyConnection {
    pub fn new(provider: DynProvider, kind: ConnectionKind, from: Option<Address>) -> Self {
        Self {
            provider,
            kind,
            from,
        }
    }

    /// Read-only connection to an HTTP endpoint.
    pub fn http(url: Url) -> Self {
        let provider = ProviderBuilder::new().connect_http(url).erased();
        Self::new(provider, ConnectionKind::Provider, None)
    }

    /// Signs locally with `signer`.
    pub fn with_signer(url: Url, signer: PrivateKeySigner) -> Self {
        let from = signer.address();
        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::from(signer))
            .connect_http(url)
            .erased();
        Self::new(provider, ConnectionKind::Signer, Some(from))
    }

    /// Sends transactions from an account the node itself unlocks.
    pub fn unlocked(url: Url, from: Address) -> Self {
        let provider = ProviderBuilder::new().connect_http(url).erased();
        Self::new(provider, ConnectionKind::Signer, Some(from))
    }

    pub fn provider(&self) -> &DynProvider {
        &self.provider
    }

    pub fn from_address(&self) -> Option<Address> {
        self.from
    }

    fn request(&self) -> TransactionRequest {
        let request = TransactionRequest::default();
        match self.from {
            Some(from) => request.with_from(from),
            None => request,
        }
    }
}

#[async_trait]
impl Connection for AlloyConnection {
    fn kind(&self) -> ConnectionKind {
        self.kind
    }

    async fn chain_id(&self) -> Result<ChainId, Error> {
        Ok(self.provider.get_chain_id().await?)
    }

    async fn invoke(
        &self,
        to: Address,
        function: &Function,
        args: &[DynSolValue],
        value: Option<U256>,
    ) -> Result<Invocation, Error> {
        let input = function.abi_encode_input(args)?;
        let mut request = self.request().with_to(to).with_input(input);
        if let Some(value) = value {
            request = request.with_value(value);
        }

        match function.state_mutability {
            StateMutability::Pure | StateMutability::View => {
                let output = self.provider.call(request).await?;
                Ok(Invocation::Returned(function.abi_decode_output(&output)?))
            }
            StateMutability::NonPayable | StateMutability::Payable => {
                let pending = self.provider.send_transaction(request).await?;
                debug!(tx = %pending.tx_hash(), function = %function.name, "transaction submitted");
                Ok(Invocation::Submitted(*pending.tx_hash()))
            }
        }
    }

    async fn deploy(&self, code: Bytes) -> Result<Address, Error> {
        if !self.can_send_transactions() {
            return Err(Error::NotASigner);
        }

        let request = self.request().with_deploy_code(code);
        let receipt = self
            .provider
            .send_transaction(request)
            .await?
            .get_receipt()
            .await?;

        let address = deployed_address(&receipt)?;
        info!(%address, tx = %receipt.transaction_hash, "contract deployed");
        Ok(address)
    }
}

fn deployed_address(receipt: &TransactionReceipt) -> Result<Address, Error> {
    receipt
        .contract_address
        .ok_or(Error::MissingContractAddress(receipt.transaction_hash))
}
