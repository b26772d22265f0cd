//! IR Value Representations
//!
//! Defines values that can be used as operands in IR instructions, and
//! typed integer constants.

use looplow_common::{CompilerError, TempId};
use serde::{Deserialize, Serialize};
use std::fmt;
use crate::IrType;

/// IR Value - represents operands in IR instructions
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Value {
    /// Temporary produced by an instruction
    Temp(TempId),

    /// Constant integer, typed by the instruction using it
    Constant(i64),
}

impl Value {
    pub fn as_temp(&self) -> Option<TempId> {
        match self {
            Value::Temp(id) => Some(*id),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Temp(id) => write!(f, "%{id}"),
            Value::Constant(val) => write!(f, "{val}"),
        }
    }
}

/// An immutable integer literal together with its type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IntConstant {
    pub value: i64,
    pub ty: IrType,
}

impl IntConstant {
    /// Create a constant, rejecting non-integer types and values that do
    /// not fit the width.
    pub fn new(value: i64, ty: IrType) -> Result<Self, CompilerError> {
        if !ty.is_integer() {
            return Err(CompilerError::invalid_type(format!("constant of non-integer type {ty}")));
        }
        if !ty.fits(value) {
            return Err(CompilerError::InvalidConstant { value, ty: ty.to_string() });
        }
        Ok(Self { value, ty })
    }

    pub fn as_value(&self) -> Value {
        Value::Constant(self.value)
    }
}

impl From<&IntConstant> for Value {
    fn from(constant: &IntConstant) -> Self {
        constant.as_value()
    }
}

impl fmt::Display for IntConstant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.ty, self.value)
    }
}
