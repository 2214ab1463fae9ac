/*!
# Batched Read Types

Plain data describing one batched contract read and its per-call outcomes.
*/

use serde::{Deserialize, Serialize};
use std::fmt;

/// EVM chain identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChainId(pub u64);

impl ChainId {
    pub const BSC: ChainId = ChainId(56);
    pub const BSC_TESTNET: ChainId = ChainId(97);
}

impl Default for ChainId {
    fn default() -> Self {
        Self::BSC
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Contract ABI descriptor handed through to the executor untouched
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Abi(pub serde_json::Value);

impl Abi {
    pub fn new(value: serde_json::Value) -> Self {
        Self(value)
    }
}

/// A single contract read: method name, contract address and stringified params
///
/// Integer params are base-10 strings so 256-bit values never pass through floats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Call {
    pub name: String,
    pub address: String,
    pub params: Vec<String>,
}

impl Call {
    pub fn new(name: impl Into<String>, address: impl Into<String>, params: Vec<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            params,
        }
    }
}

/// Options for one batch execution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallOptions {
    /// When false, failed calls yield `None` instead of failing the batch
    pub require_success: bool,
}

impl Default for CallOptions {
    fn default() -> Self {
        Self {
            require_success: true,
        }
    }
}

/// A decoded return value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallValue {
    Bool(bool),
    /// Unsigned integer rendered in base 10
    Uint(String),
    Address(String),
    Text(String),
}

impl CallValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            CallValue::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_uint(&self) -> Option<&str> {
        match self {
            CallValue::Uint(value) => Some(value),
            _ => None,
        }
    }
}

/// Decoded outputs of one successful call, in ABI output order
pub type CallOutput = Vec<CallValue>;

/// Per-call outcomes in request order; `None` marks a failed call
pub type BatchResult = Vec<Option<CallOutput>>;
