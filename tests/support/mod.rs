use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use evm_binding_base::alloy::dyn_abi::JsonAbiExt;
use evm_binding_base::alloy::json_abi::Function;
use evm_binding_base::alloy::primitives::{Address, B256, Bytes, ChainId, U256, address};
use evm_binding_base::alloy::transports::TransportErrorKind;
use evm_binding_base::{Connection, ConnectionKind, ConnectionResolver, DynSolValue, Error, Invocation};
use parking_lot::Mutex;
use tracing_subscriber::filter::LevelFilter;

/// Account every mock transaction is sent from.
pub const SIGNER: Address = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");

#[derive(Debug, Default)]
struct ChainState {
    balances: HashMap<(Address, Address), U256>,
    deployments: Vec<Bytes>,
    calls: Vec<String>,
    nonce: u64,
}

/// In-process stand-in for a node serving the `contracts/Token.json` interface.
#[derive(Debug)]
pub struct MockChain {
    chain_id: ChainId,
    kind: ConnectionKind,
    failure: Option<String>,
    state: Mutex<ChainState>,
}

impl MockChain {
    fn build(chain_id: ChainId, kind: ConnectionKind, failure: Option<String>) -> Arc<Self> {
        Arc::new(Self {
            chain_id,
            kind,
            failure,
            state: Mutex::new(ChainState::default()),
        })
    }

    pub fn provider(chain_id: ChainId) -> Arc<Self> {
        Self::build(chain_id, ConnectionKind::Provider, None)
    }

    pub fn signer(chain_id: ChainId) -> Arc<Self> {
        Self::build(chain_id, ConnectionKind::Signer, None)
    }

    /// Every call fails at the transport with `message`.
    pub fn failing(chain_id: ChainId, message: &str) -> Arc<Self> {
        Self::build(chain_id, ConnectionKind::Signer, Some(message.to_string()))
    }

    pub fn connection(self: &Arc<Self>) -> Arc<dyn Connection> {
        self.clone()
    }

    pub fn set_balance(&self, contract: Address, owner: Address, amount: u64) {
        self.state
            .lock()
            .balances
            .insert((contract, owner), U256::from(amount));
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().calls.clone()
    }

    pub fn deployments(&self) -> Vec<Bytes> {
        self.state.lock().deployments.clone()
    }

    /// Address the next deployment will land at.
    pub fn next_contract_address(&self) -> Address {
        SIGNER.create(self.state.lock().nonce)
    }
}

#[async_trait]
impl Connection for MockChain {
    fn kind(&self) -> ConnectionKind {
        self.kind
    }

    async fn chain_id(&self) -> Result<ChainId, Error> {
        if let Some(message) = &self.failure {
            return Err(TransportErrorKind::custom_str(message).into());
        }
        Ok(self.chain_id)
    }

    async fn invoke(
        &self,
        to: Address,
        function: &Function,
        args: &[DynSolValue],
        value: Option<U256>,
    ) -> Result<Invocation, Error> {
        if let Some(message) = &self.failure {
            return Err(TransportErrorKind::custom_str(message).into());
        }
        function.abi_encode_input(args)?;

        let mut state = self.state.lock();
        state.calls.push(function.name.clone());

        let invocation = match function.name.as_str() {
            "balanceOf" => {
                let owner = args[0].as_address().unwrap_or_default();
                let balance = state
                    .balances
                    .get(&(to, owner))
                    .copied()
                    .unwrap_or_default();
                Invocation::Returned(vec![DynSolValue::Uint(balance, 256)])
            }
            "totalSupply" => {
                let supply = state
                    .balances
                    .iter()
                    .filter(|((contract, _), _)| *contract == to)
                    .map(|(_, balance)| *balance)
                    .fold(U256::ZERO, |total, balance| total + balance);
                Invocation::Returned(vec![DynSolValue::Uint(supply, 256)])
            }
            "getReserves" => Invocation::Returned(vec![
                DynSolValue::Uint(U256::from(1_000), 112),
                DynSolValue::Uint(U256::from(2_000), 112),
                DynSolValue::Uint(U256::from(1_700_000_000), 32),
            ]),
            "transfer" => {
                let recipient = args[0].as_address().unwrap_or_default();
                let (amount, _) = args[1].as_uint().unwrap_or_default();
                let sender_balance = state.balances.entry((to, SIGNER)).or_default();
                if *sender_balance < amount {
                    return Err(TransportErrorKind::custom_str("execution reverted: insufficient balance").into());
                }
                *sender_balance -= amount;
                *state.balances.entry((to, recipient)).or_default() += amount;

                state.nonce += 1;
                Invocation::Submitted(B256::with_last_byte(state.nonce as u8))
            }
            "deposit" => {
                *state.balances.entry((to, SIGNER)).or_default() += value.unwrap_or_default();

                state.nonce += 1;
                Invocation::Submitted(B256::with_last_byte(state.nonce as u8))
            }
            other => {
                return Err(TransportErrorKind::custom_str(&format!(
                    "execution reverted: no handler for {other}"
                ))
                .into());
            }
        };
        Ok(invocation)
    }

    async fn deploy(&self, code: Bytes) -> Result<Address, Error> {
        if let Some(message) = &self.failure {
            return Err(TransportErrorKind::custom_str(message).into());
        }
        if self.kind != ConnectionKind::Signer {
            return Err(Error::NotASigner);
        }

        let mut state = self.state.lock();
        let address = SIGNER.create(state.nonce);
        state.nonce += 1;
        state.deployments.push(code);
        Ok(address)
    }
}

/// Resolver that always hands out the same connection.
#[derive(Debug)]
pub struct FixedResolver(pub Arc<dyn Connection>);

impl ConnectionResolver for FixedResolver {
    fn resolve(&self, _chain_id: ChainId) -> Result<Arc<dyn Connection>, Error> {
        Ok(self.0.clone())
    }
}

pub fn setup_log() {
    use tracing_subscriber::util::SubscriberInitExt;

    let _ = tracing_subscriber::fmt::SubscriberBuilder::default()
        .without_time()
        .with_span_events(tracing_subscriber::fmt::format::FmtSpan::NONE)
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .with_test_writer()
        .finish()
        .try_init();
}
