use crate::config::EndpointConfig;
use crate::connection::{Connection, ConnectionResolver};
use crate::descriptor::{InterfaceDescriptor, Networks};
use crate::factory::Factory;
use crate::operation::{OperationTable, Output};
use crate::Error;

use std::fmt;
use std::sync::Arc;

use alloy::dyn_abi::DynSolValue;
use alloy::json_abi::JsonAbi;
use alloy::primitives::{Address, Bytes, U256};
use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::{debug, warn};

/// Configuration a binding type owns. Unset fields fall through to the parent type.
#[derive(Default)]
struct TypeLayer {
    interface: Option<Arc<JsonAbi>>,
    bytecode: Option<Bytes>,
    networks: Option<Networks>,
    operations: Option<OperationTable>,
    resolver: Option<Arc<dyn ConnectionResolver>>,
}

struct TypeInner {
    name: String,
    parent: Option<BindingType>,
    layer: RwLock<TypeLayer>,
}

/// A generated binding type.
///
/// Holds the interface, deployable code, networks registry and operation
/// table shared by every instance of the type. A type made with
/// [`BindingType::derive`] reads through to its parent until it sets a
/// value of its own, so writes on a subtype reach its own instances and
/// further-derived types but never the parent or sibling subtypes.
///
/// Type-level state is process-wide configuration: set it up before the
/// type is in active use. Writes are serialized by a lock.
#[derive(Clone)]
pub struct BindingType {
    inner: Arc<TypeInner>,
}

impl BindingType {
    /// Generates a binding type from `descriptor`.
    ///
    /// A descriptor without operations only logs a warning. Duplicate
    /// operation names fail with [`Error::GenerationConflict`].
    pub fn new(name: impl Into<String>, descriptor: InterfaceDescriptor) -> Result<Self, Error> {
        let name = name.into();
        let InterfaceDescriptor {
            abi,
            bytecode,
            networks,
        } = descriptor;

        let has_abi = abi.is_some();
        let abi = abi.unwrap_or_default();
        let operations = OperationTable::synthesize(&abi)?;
        if operations.is_empty() {
            warn!(binding = %name, has_abi, "binding type generated without operations");
        }
        debug!(binding = %name, operations = operations.len(), networks = networks.len(), "generated binding type");

        Ok(Self {
            inner: Arc::new(TypeInner {
                name,
                parent: None,
                layer: RwLock::new(TypeLayer {
                    interface: Some(Arc::new(abi)),
                    bytecode: Some(bytecode.unwrap_or_default()),
                    networks: Some(networks),
                    operations: Some(operations),
                    resolver: None,
                }),
            }),
        })
    }

    pub fn from_json(name: impl Into<String>, artifact: &str) -> Result<Self, Error> {
        Self::new(name, InterfaceDescriptor::from_json(artifact)?)
    }

    /// Creates a subtype whose configuration defaults to this type's.
    pub fn derive(&self, name: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(TypeInner {
                name: name.into(),
                parent: Some(self.clone()),
                layer: RwLock::new(TypeLayer::default()),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn parent(&self) -> Option<&BindingType> {
        self.inner.parent.as_ref()
    }

    /// Whether `self` is `ancestor` or was derived from it.
    pub fn is_derived_from(&self, ancestor: &BindingType) -> bool {
        let mut current = Some(self);
        while let Some(ty) = current {
            if Arc::ptr_eq(&ty.inner, &ancestor.inner) {
                return true;
            }
            current = ty.parent();
        }
        false
    }

    fn inherited<T>(&self, select: impl Fn(&TypeLayer) -> Option<T>) -> Option<T> {
        let mut current = Some(self);
        while let Some(ty) = current {
            if let Some(value) = select(&*ty.inner.layer.read()) {
                return Some(value);
            }
            current = ty.parent();
        }
        None
    }

    fn update(&self, apply: impl FnOnce(&mut TypeLayer)) {
        apply(&mut *self.inner.layer.write());
    }

    /// The decoded ABI handle.
    pub fn interface(&self) -> Arc<JsonAbi> {
        self.inherited(|layer| layer.interface.clone())
            .unwrap_or_default()
    }

    pub fn set_interface(&self, interface: JsonAbi) {
        self.update(|layer| layer.interface = Some(Arc::new(interface)));
    }

    pub fn bytecode(&self) -> Bytes {
        self.inherited(|layer| layer.bytecode.clone())
            .unwrap_or_default()
    }

    pub fn set_bytecode(&self, bytecode: impl Into<Bytes>) {
        let bytecode = bytecode.into();
        self.update(|layer| layer.bytecode = Some(bytecode));
    }

    pub fn networks(&self) -> Networks {
        self.inherited(|layer| layer.networks.clone())
            .unwrap_or_default()
    }

    pub fn set_networks(&self, networks: Networks) {
        self.update(|layer| layer.networks = Some(networks));
    }

    /// Copies the inherited registry into this type's layer and edits the copy.
    pub(crate) fn update_networks(&self, edit: impl FnOnce(&mut Networks)) {
        let mut layer = self.inner.layer.write();
        let mut networks = match layer.networks.take() {
            Some(own) => own,
            None => self
                .parent()
                .map(BindingType::networks)
                .unwrap_or_default(),
        };
        edit(&mut networks);
        layer.networks = Some(networks);
    }

    pub fn operations(&self) -> OperationTable {
        self.inherited(|layer| layer.operations.clone())
            .unwrap_or_default()
    }

    pub fn set_operations(&self, operations: OperationTable) {
        self.update(|layer| layer.operations = Some(operations));
    }

    /// The policy that picks a connection when `get` is called without one.
    pub fn resolver(&self) -> Arc<dyn ConnectionResolver> {
        self.inherited(|layer| layer.resolver.clone())
            .unwrap_or_else(|| Arc::new(EndpointConfig::default()) as Arc<dyn ConnectionResolver>)
    }

    pub fn set_resolver(&self, resolver: Arc<dyn ConnectionResolver>) {
        self.update(|layer| layer.resolver = Some(resolver));
    }

    /// Binds an instance of this type at `address`.
    pub fn instantiate(&self, address: Address, connection: Arc<dyn Connection>) -> Binding {
        self.instantiate_with(address, connection, None)
    }

    /// Like [`instantiate`](Self::instantiate), with `reconnect` taking the
    /// place of `connection` when given.
    pub fn instantiate_with(
        &self,
        address: Address,
        connection: Arc<dyn Connection>,
        reconnect: Option<Arc<dyn Connection>>,
    ) -> Binding {
        Binding {
            ty: self.clone(),
            address,
            connection: reconnect.unwrap_or(connection),
        }
    }

    /// A deployer producing plain [`Binding`]s of this type.
    pub fn factory(&self, connection: Arc<dyn Connection>) -> Result<Factory<Binding>, Error> {
        Factory::new(self.clone(), connection, |binding| binding)
    }
}

impl fmt::Debug for BindingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindingType")
            .field("name", &self.name())
            .field("parent", &self.parent().map(BindingType::name))
            .finish_non_exhaustive()
    }
}

/// One contract bound at an address through a connection.
#[derive(Debug, Clone)]
pub struct Binding {
    ty: BindingType,
    address: Address,
    connection: Arc<dyn Connection>,
}

impl Binding {
    pub fn binding_type(&self) -> &BindingType {
        &self.ty
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn connection(&self) -> &Arc<dyn Connection> {
        &self.connection
    }

    pub fn interface(&self) -> Arc<JsonAbi> {
        self.ty.interface()
    }

    pub fn operations(&self) -> OperationTable {
        self.ty.operations()
    }

    /// Calls the named operation, collapsing a single return value to a scalar.
    ///
    /// Errors from the connection are returned unchanged.
    pub async fn invoke(&self, name: &str, args: Vec<DynSolValue>) -> Result<Output, Error> {
        self.dispatch(name, args, None).await
    }

    /// Calls a payable operation, sending `value` wei along with it.
    pub async fn invoke_with_value(
        &self,
        name: &str,
        args: Vec<DynSolValue>,
        value: U256,
    ) -> Result<Output, Error> {
        self.dispatch(name, args, Some(value)).await
    }

    async fn dispatch(
        &self,
        name: &str,
        args: Vec<DynSolValue>,
        value: Option<U256>,
    ) -> Result<Output, Error> {
        let operations = self.ty.operations();
        let operation = operations
            .get(name)
            .ok_or_else(|| Error::UnknownOperation(name.to_string()))?;
        if value.is_some() && !operation.is_payable() {
            return Err(Error::NotPayable(name.to_string()));
        }

        debug!(binding = %self.ty.name(), address = %self.address, operation = name, "invoking");
        let invocation = self
            .connection
            .invoke(self.address, operation.function(), &args, value)
            .await?;
        Ok(invocation.into())
    }

    /// Same connection, different address.
    pub fn attach(&self, address: Address) -> Binding {
        self.ty.instantiate(address, self.connection.clone())
    }

    /// Same address, different connection.
    pub fn connect(&self, connection: Arc<dyn Connection>) -> Binding {
        self.ty
            .instantiate_with(self.address, self.connection.clone(), Some(connection))
    }
}

/// A static Rust type wrapping a [`Binding`] of one [`BindingType`].
///
/// Usually implemented through [`binding!`](crate::binding). Every
/// constructor here returns `Self`, so a subtype resolved through `get`,
/// `lookup` or a [`Factory`] comes back as that subtype.
#[async_trait]
pub trait BindingClass: Sized + Send + Sync {
    /// The shared type-level configuration.
    fn binding_type() -> Result<BindingType, Error>;

    fn from_binding(binding: Binding) -> Self;

    fn binding(&self) -> &Binding;

    fn address(&self) -> Address {
        self.binding().address()
    }

    fn new(address: Address, connection: Arc<dyn Connection>) -> Result<Self, Error> {
        Ok(Self::from_binding(
            Self::binding_type()?.instantiate(address, connection),
        ))
    }

    /// Resolves the deployment registered for `network`.
    fn get(network: &str, connection: Option<Arc<dyn Connection>>) -> Result<Self, Error> {
        Ok(Self::from_binding(
            Self::binding_type()?.get(network, connection)?,
        ))
    }

    /// Resolves the deployment on the chain `connection` is attached to.
    async fn lookup(connection: Arc<dyn Connection>) -> Result<Self, Error> {
        let ty = Self::binding_type()?;
        Ok(Self::from_binding(ty.lookup(connection).await?))
    }

    /// Registers the deployment used on the local test chain.
    fn set_local(address: Address) -> Result<(), Error> {
        Self::binding_type()?.set_local(address);
        Ok(())
    }

    fn factory(connection: Arc<dyn Connection>) -> Result<Factory<Self>, Error> {
        Factory::new(Self::binding_type()?, connection, Self::from_binding)
    }

    fn attach(&self, address: Address) -> Self {
        Self::from_binding(self.binding().attach(address))
    }

    fn connect(&self, connection: Arc<dyn Connection>) -> Self {
        Self::from_binding(self.binding().connect(connection))
    }
}
