//! Contract bindings whose remote operations are ordinary overridable methods.
//!
//! An interface artifact (ABI, optional bytecode, per-chain addresses) is
//! turned into a [`BindingType`]: a shared, process-wide description that
//! instances and subtypes read from. Static Rust types are declared on top
//! of it with [`binding!`], which gives every remote operation a default
//! trait method. A subtype overrides an operation inside its `extends`
//! declaration and can still call the parent's version from the override;
//! operations it leaves alone run the nearest ancestor's version.
//!
//! ```ignore
//! use evm_binding_base::{binding, BindingClass, DynSolValue, Error, Output};
//!
//! binding! {
//!     pub struct Token: TokenOperations {
//!         balance_of => "balanceOf",
//!     } = include_str!("../contracts/Token.json");
//! }
//!
//! binding! {
//!     pub struct BonusToken extends Token: TokenOperations {
//!         async fn balance_of(&self, args: Vec<DynSolValue>) -> Result<Output, Error> {
//!             let base = self.parent().balance_of(args).await?;
//!             Ok(base)
//!         }
//!     }
//! }
//!
//! let token = BonusToken::get("rinkeby", None)?;
//! ```
//!
//! Transport, signing and ABI encoding stay behind the [`Connection`] trait;
//! [`AlloyConnection`] implements it with an alloy provider.

mod binding;
pub use binding::*;
mod bindings;
pub mod config;
pub use config::EndpointConfig;
mod connection;
pub use connection::*;
mod descriptor;
pub use descriptor::*;
mod error;
pub use error::Error;
mod factory;
pub use factory::Factory;
pub mod network;
pub use network::{NamedNetwork, TEST_CHAIN_ID, to_chain_id};
mod operation;
pub use operation::*;

pub use alloy;
pub use alloy::dyn_abi::DynSolValue;
pub use alloy::primitives::{Address, ChainId};

#[doc(hidden)]
pub mod __private {
    pub use async_trait::async_trait;
    pub use once_cell::sync::OnceCell;
}
