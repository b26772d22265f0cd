//! IR Type System
//!
//! Defines the type system for the IR: fixed-width integers and pointers to
//! stack slots.

use looplow_common::CompilerError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// IR Type system
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IrType {
    /// Void type
    Void,

    /// Integer types with bit width
    I1,   // Boolean, result of comparisons
    I8,
    I16,
    I32,
    I64,

    /// Pointer type, produced by alloca
    Ptr(Box<IrType>),
}

impl IrType {
    /// Integer type of the given bit width
    pub fn int(width: u32) -> Result<Self, CompilerError> {
        match width {
            1 => Ok(IrType::I1),
            8 => Ok(IrType::I8),
            16 => Ok(IrType::I16),
            32 => Ok(IrType::I32),
            64 => Ok(IrType::I64),
            _ => Err(CompilerError::invalid_type(format!("unsupported integer width {width}"))),
        }
    }

    /// Pointer to this type
    pub fn ptr_to(&self) -> IrType {
        IrType::Ptr(Box::new(self.clone()))
    }

    /// Bit width of integer types
    pub fn bit_width(&self) -> Option<u32> {
        match self {
            IrType::I1 => Some(1),
            IrType::I8 => Some(8),
            IrType::I16 => Some(16),
            IrType::I32 => Some(32),
            IrType::I64 => Some(64),
            _ => None,
        }
    }

    /// Check if this is an integer type
    pub fn is_integer(&self) -> bool {
        self.bit_width().is_some()
    }

    /// Whether `value` is representable in this integer type.
    ///
    /// Both the signed and the unsigned reading of the bit pattern are
    /// accepted, so `255` and `-1` both fit in `i8`.
    pub fn fits(&self, value: i64) -> bool {
        match self.bit_width() {
            Some(64) => true,
            Some(1) => value == 0 || value == 1,
            Some(width) => {
                let min = -(1i64 << (width - 1));
                let max = (1i64 << width) - 1;
                (min..=max).contains(&value)
            }
            None => false,
        }
    }
}

impl fmt::Display for IrType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IrType::Void => write!(f, "void"),
            IrType::I1 => write!(f, "i1"),
            IrType::I8 => write!(f, "i8"),
            IrType::I16 => write!(f, "i16"),
            IrType::I32 => write!(f, "i32"),
            IrType::I64 => write!(f, "i64"),
            IrType::Ptr(target) => write!(f, "{target}*"),
        }
    }
}
