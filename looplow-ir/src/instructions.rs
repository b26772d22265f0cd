//! IR Instructions
//!
//! Defines all instruction types available in the IR.

use looplow_common::{LabelId, TempId};
use serde::{Deserialize, Serialize};
use std::fmt;
use crate::{IntPredicate, IrBinaryOp, IrType, Value};

/// Successor arm of a conditional branch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BranchArm {
    /// Taken when the condition is non-zero
    True,
    /// Taken when the condition is zero
    False,
}

/// IR Instruction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Instruction {
    /// Binary operation: result = op lhs, rhs
    Binary {
        result: TempId,
        op: IrBinaryOp,
        lhs: Value,
        rhs: Value,
        result_type: IrType,
    },

    /// Integer comparison: result = icmp pred lhs, rhs (result is i1)
    ICmp {
        result: TempId,
        pred: IntPredicate,
        lhs: Value,
        rhs: Value,
        operand_type: IrType,
    },

    /// Allocate a stack slot: result = alloca type
    Alloca {
        result: TempId,
        alloc_type: IrType,
    },

    /// Load from memory: result = load ptr
    Load {
        result: TempId,
        ptr: Value,
        result_type: IrType,
    },

    /// Store to memory: store value, ptr
    Store {
        value: Value,
        ptr: Value,
        value_type: IrType,
    },

    /// Return: ret value or ret void
    Return {
        value: Option<Value>,
        ty: IrType,
    },

    /// Unconditional branch: br label
    Branch(LabelId),

    /// Conditional branch: br condition, true_label, false_label
    BranchCond {
        condition: Value,
        true_label: LabelId,
        false_label: LabelId,
    },

    /// Comment (for debugging)
    Comment(String),
}

impl Instruction {
    pub fn is_terminator(&self) -> bool {
        matches!(
            self,
            Instruction::Return { .. } | Instruction::Branch(_) | Instruction::BranchCond { .. }
        )
    }

    /// Blocks this instruction may transfer control to, in arm order
    pub fn successors(&self) -> Vec<LabelId> {
        match self {
            Instruction::Branch(target) => vec![*target],
            Instruction::BranchCond { true_label, false_label, .. } => vec![*true_label, *false_label],
            _ => Vec::new(),
        }
    }

    /// Target of one arm of a conditional branch
    pub fn arm_target(&self, arm: BranchArm) -> Option<LabelId> {
        match (self, arm) {
            (Instruction::BranchCond { true_label, .. }, BranchArm::True) => Some(*true_label),
            (Instruction::BranchCond { false_label, .. }, BranchArm::False) => Some(*false_label),
            _ => None,
        }
    }

    /// Short mnemonic, used to compare the shape of two blocks
    pub fn opcode(&self) -> &'static str {
        match self {
            Instruction::Binary { op: IrBinaryOp::Add, .. } => "add",
            Instruction::ICmp { .. } => "icmp",
            Instruction::Alloca { .. } => "alloca",
            Instruction::Load { .. } => "load",
            Instruction::Store { .. } => "store",
            Instruction::Return { .. } => "ret",
            Instruction::Branch(_) => "br",
            Instruction::BranchCond { .. } => "condbr",
            Instruction::Comment(_) => "comment",
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Binary { result, op, lhs, rhs, result_type } => {
                write!(f, "%{result} = {op} {result_type} {lhs}, {rhs}")
            }
            Instruction::ICmp { result, pred, lhs, rhs, operand_type } => {
                write!(f, "%{result} = icmp {pred} {operand_type} {lhs}, {rhs}")
            }
            Instruction::Alloca { result, alloc_type } => {
                write!(f, "%{result} = alloca {alloc_type}")
            }
            Instruction::Load { result, ptr, result_type } => {
                write!(f, "%{result} = load {result_type}, {} {ptr}", result_type.ptr_to())
            }
            Instruction::Store { value, ptr, value_type } => {
                write!(f, "store {value_type} {value}, {} {ptr}", value_type.ptr_to())
            }
            Instruction::Return { value: Some(value), ty } => write!(f, "ret {ty} {value}"),
            Instruction::Return { value: None, .. } => write!(f, "ret void"),
            Instruction::Branch(label) => write!(f, "br label %L{label}"),
            Instruction::BranchCond { condition, true_label, false_label } => {
                write!(f, "br i1 {condition}, label %L{true_label}, label %L{false_label}")
            }
            Instruction::Comment(text) => write!(f, "; {text}"),
        }
    }
}
