//! Basic Block Management
//!
//! Defines basic blocks - sequences of instructions with single entry/exit points.

use looplow_common::LabelId;
use serde::{Deserialize, Serialize};
use std::fmt;
use crate::Instruction;

/// Basic Block - a sequence of instructions ending in one terminator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasicBlock {
    pub id: LabelId,
    /// Cosmetic only; identity is `id`
    #[serde(default)]
    pub name: String,
    pub instructions: Vec<Instruction>,
}

impl BasicBlock {
    pub fn new(id: LabelId) -> Self {
        Self {
            id,
            name: String::new(),
            instructions: Vec::new(),
        }
    }

    pub fn with_name(id: LabelId, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::new(id)
        }
    }

    pub fn add_instruction(&mut self, instr: Instruction) {
        self.instructions.push(instr);
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn has_terminator(&self) -> bool {
        self.instructions.last().is_some_and(Instruction::is_terminator)
    }

    /// The final instruction, if it is a terminator
    pub fn terminator(&self) -> Option<&Instruction> {
        self.instructions.last().filter(|instr| instr.is_terminator())
    }

    /// Successor blocks as given by the terminator
    pub fn successors(&self) -> Vec<LabelId> {
        self.terminator().map(Instruction::successors).unwrap_or_default()
    }
}

impl fmt::Display for BasicBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}:", self.id)?;
        if !self.name.is_empty() {
            write!(f, "  ; {}", self.name)?;
        }
        writeln!(f)?;
        for instr in &self.instructions {
            writeln!(f, "  {instr}")?;
        }
        Ok(())
    }
}
