use alloy::primitives::{ChainId, TxHash};
use alloy::providers::PendingTransactionError;
use alloy::transports::TransportError;

/// Errors raised while generating binding types or talking to a connection.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No deployment is registered for the requested network.
    #[error("no network exists for {network} ({chain_id})")]
    UnknownNetwork { network: String, chain_id: ChainId },
    #[error("{0:?} is not a valid chain id")]
    InvalidChainId(String),
    /// Two operations in one descriptor share a name.
    #[error("interface declares operation `{name}` more than once")]
    GenerationConflict { name: String },
    #[error("operation `{0}` is not part of the interface")]
    UnknownOperation(String),
    #[error("operation `{0}` is not payable")]
    NotPayable(String),
    #[error("binding type has no deployable code")]
    MissingBytecode,
    #[error("interface has no constructor but {0} constructor arguments were given")]
    UnexpectedArguments(usize),
    #[error("connection cannot send transactions")]
    NotASigner,
    #[error("deployment {0} did not produce a contract address")]
    MissingContractAddress(TxHash),
    #[error("invalid interface descriptor: {0}")]
    Descriptor(#[from] serde_json::Error),
    #[error("invalid endpoint url: {0}")]
    Endpoint(#[from] url::ParseError),

    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    PendingTransaction(#[from] PendingTransactionError),
    #[error(transparent)]
    Abi(#[from] alloy::dyn_abi::Error),
}
