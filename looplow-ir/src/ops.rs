//! IR Operations
//!
//! Defines the arithmetic operation and the integer comparison predicate
//! available in the IR.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Binary arithmetic operations in IR
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IrBinaryOp {
    Add,
}

impl IrBinaryOp {
    /// Apply the operation with two's complement wrap-around in an i64
    pub fn apply(self, lhs: i64, rhs: i64) -> i64 {
        match self {
            IrBinaryOp::Add => lhs.wrapping_add(rhs),
        }
    }
}

impl fmt::Display for IrBinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op_str = match self {
            IrBinaryOp::Add => "add",
        };
        write!(f, "{op_str}")
    }
}

/// Integer comparison predicates (result is i1)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IntPredicate {
    /// Signed less-than
    Slt,
}

impl IntPredicate {
    /// Evaluate the predicate on two values held sign-extended in an i64
    pub fn evaluate(self, lhs: i64, rhs: i64) -> bool {
        match self {
            IntPredicate::Slt => lhs < rhs,
        }
    }
}

impl fmt::Display for IntPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pred_str = match self {
            IntPredicate::Slt => "slt",
        };
        write!(f, "{pred_str}")
    }
}
