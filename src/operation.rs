use crate::Error;

use std::collections::BTreeMap;
use std::sync::Arc;

use alloy::dyn_abi::DynSolValue;
use alloy::json_abi::{Function, JsonAbi, StateMutability};
use alloy::primitives::{TxHash, U256};

/// Name and type shape of one remote operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationSignature {
    pub name: String,
    pub parameter_types: Vec<String>,
    pub return_types: Vec<String>,
}

impl From<&Function> for OperationSignature {
    fn from(function: &Function) -> Self {
        Self {
            name: function.name.clone(),
            parameter_types: function
                .inputs
                .iter()
                .map(|param| param.selector_type().into_owned())
                .collect(),
            return_types: function
                .outputs
                .iter()
                .map(|param| param.selector_type().into_owned())
                .collect(),
        }
    }
}

/// A remote operation together with the ABI entry used to encode calls to it.
#[derive(Debug, Clone)]
pub struct Operation {
    signature: OperationSignature,
    function: Function,
}

impl Operation {
    pub fn new(function: Function) -> Self {
        Self {
            signature: OperationSignature::from(&function),
            function,
        }
    }

    pub fn name(&self) -> &str {
        &self.signature.name
    }

    pub fn signature(&self) -> &OperationSignature {
        &self.signature
    }

    pub fn function(&self) -> &Function {
        &self.function
    }

    /// Whether the operation can be served by a plain `eth_call`.
    pub fn is_read_only(&self) -> bool {
        matches!(
            self.function.state_mutability,
            StateMutability::Pure | StateMutability::View
        )
    }

    pub fn is_payable(&self) -> bool {
        self.function.state_mutability == StateMutability::Payable
    }
}

/// Name-indexed table of every operation a binding type exposes.
///
/// Cloning is cheap: instances and subtypes share the same table.
#[derive(Debug, Clone, Default)]
pub struct OperationTable {
    operations: Arc<BTreeMap<String, Operation>>,
}

impl OperationTable {
    /// Synthesizes one operation per ABI function.
    ///
    /// Operation names must be unique, so overloaded functions are rejected
    /// with [`Error::GenerationConflict`].
    pub fn synthesize(abi: &JsonAbi) -> Result<Self, Error> {
        let mut operations = BTreeMap::new();
        for function in abi.functions() {
            let operation = Operation::new(function.clone());
            if operations
                .insert(function.name.clone(), operation)
                .is_some()
            {
                return Err(Error::GenerationConflict {
                    name: function.name.clone(),
                });
            }
        }

        Ok(Self {
            operations: Arc::new(operations),
        })
    }

    pub fn get(&self, name: &str) -> Option<&Operation> {
        self.operations.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.operations.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.operations.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Operation> {
        self.operations.values()
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Fails with [`Error::UnknownOperation`] on the first name missing from the table.
    pub fn require<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> Result<(), Error> {
        match names.into_iter().find(|name| !self.contains(name)) {
            Some(missing) => Err(Error::UnknownOperation(missing.to_string())),
            None => Ok(()),
        }
    }
}

/// What a connection hands back for one remote operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Invocation {
    /// Decoded return values of a read-only call.
    Returned(Vec<DynSolValue>),
    /// Hash of the transaction submitted for a state-changing call.
    Submitted(TxHash),
}

/// Result of a synthesized operation after scalar-collapse.
#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    Value(DynSolValue),
    Values(Vec<DynSolValue>),
    Submitted(TxHash),
}

impl Output {
    pub fn as_value(&self) -> Option<&DynSolValue> {
        match self {
            Self::Value(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_uint(&self) -> Option<U256> {
        self.as_value()
            .and_then(DynSolValue::as_uint)
            .map(|(value, _)| value)
    }

    pub fn tx_hash(&self) -> Option<TxHash> {
        match self {
            Self::Submitted(hash) => Some(*hash),
            _ => None,
        }
    }

    /// Undoes the collapse, returning the values as the remote call produced them.
    ///
    /// `None` for a submitted transaction, which has a hash but no return values.
    pub fn into_values(self) -> Option<Vec<DynSolValue>> {
        match self {
            Self::Value(value) => Some(vec![value]),
            Self::Values(values) => Some(values),
            Self::Submitted(_) => None,
        }
    }
}

impl From<Invocation> for Output {
    fn from(invocation: Invocation) -> Self {
        match invocation {
            Invocation::Returned(values) => collapse(values),
            Invocation::Submitted(hash) => Self::Submitted(hash),
        }
    }
}

/// Unwraps a one-element result to its lone value. Any other length passes through.
pub fn collapse(mut values: Vec<DynSolValue>) -> Output {
    match values.len() {
        1 => Output::Value(values.remove(0)),
        _ => Output::Values(values),
    }
}
