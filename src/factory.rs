use crate::binding::{Binding, BindingType};
use crate::connection::Connection;
use crate::Error;

use std::fmt;
use std::sync::Arc;

use alloy::dyn_abi::{DynSolValue, JsonAbiExt};
use alloy::primitives::Bytes;
use tracing::info;

/// Deploys new contracts of one [`BindingType`] and hands them back bound as `T`.
pub struct Factory<T> {
    ty: BindingType,
    connection: Arc<dyn Connection>,
    construct: fn(Binding) -> T,
}

impl<T> Factory<T> {
    /// Fails with [`Error::NotASigner`] unless `connection` can send transactions.
    pub fn new(
        ty: BindingType,
        connection: Arc<dyn Connection>,
        construct: fn(Binding) -> T,
    ) -> Result<Self, Error> {
        if !connection.can_send_transactions() {
            return Err(Error::NotASigner);
        }
        Ok(Self {
            ty,
            connection,
            construct,
        })
    }

    pub fn binding_type(&self) -> &BindingType {
        &self.ty
    }

    pub fn connection(&self) -> &Arc<dyn Connection> {
        &self.connection
    }

    /// Creation code: the type's bytecode followed by the encoded constructor arguments.
    pub fn deploy_code(&self, args: &[DynSolValue]) -> Result<Bytes, Error> {
        let bytecode = self.ty.bytecode();
        if bytecode.is_empty() {
            return Err(Error::MissingBytecode);
        }

        let interface = self.ty.interface();
        let encoded_args = match interface.constructor() {
            Some(constructor) => constructor.abi_encode_input(args)?,
            None if args.is_empty() => Vec::new(),
            None => return Err(Error::UnexpectedArguments(args.len())),
        };

        let mut code = bytecode.to_vec();
        code.extend_from_slice(&encoded_args);
        Ok(code.into())
    }

    /// Deploys a new contract and binds it through the factory's connection.
    pub async fn deploy(&self, args: Vec<DynSolValue>) -> Result<T, Error> {
        let code = self.deploy_code(&args)?;
        let address = self.connection.deploy(code).await?;
        info!(binding = %self.ty.name(), %address, "deployed");
        Ok((self.construct)(
            self.ty.instantiate(address, self.connection.clone()),
        ))
    }
}

impl<T> fmt::Debug for Factory<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Factory")
            .field("ty", &self.ty)
            .field("connection", &self.connection)
            .finish_non_exhaustive()
    }
}
