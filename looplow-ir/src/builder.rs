//! IR Builder
//!
//! Appends instructions to one basic block, minting result temporaries
//! from the owning function.

use looplow_common::{LabelId, TempId};
use crate::{BasicBlock, Instruction, IntPredicate, IrBinaryOp, IrType, Value};

/// Builder for the instructions of a single block
pub struct IrBuilder<'a> {
    next_temp_id: &'a mut TempId,
    block: &'a mut BasicBlock,
}

impl<'a> IrBuilder<'a> {
    pub(crate) fn new(next_temp_id: &'a mut TempId, block: &'a mut BasicBlock) -> Self {
        Self { next_temp_id, block }
    }

    fn new_temp(&mut self) -> TempId {
        let temp = *self.next_temp_id;
        *self.next_temp_id += 1;
        temp
    }

    /// Allocate a stack slot; the returned value points to it
    pub fn alloca(&mut self, alloc_type: IrType) -> Value {
        let result = self.new_temp();
        self.block.add_instruction(Instruction::Alloca { result, alloc_type });
        Value::Temp(result)
    }

    pub fn store(&mut self, value: Value, ptr: Value, value_type: IrType) {
        self.block.add_instruction(Instruction::Store { value, ptr, value_type });
    }

    pub fn load(&mut self, ptr: Value, result_type: IrType) -> Value {
        let result = self.new_temp();
        self.block.add_instruction(Instruction::Load { result, ptr, result_type });
        Value::Temp(result)
    }

    fn binary(&mut self, op: IrBinaryOp, lhs: Value, rhs: Value, result_type: IrType) -> Value {
        let result = self.new_temp();
        self.block.add_instruction(Instruction::Binary { result, op, lhs, rhs, result_type });
        Value::Temp(result)
    }

    pub fn add(&mut self, lhs: Value, rhs: Value, result_type: IrType) -> Value {
        self.binary(IrBinaryOp::Add, lhs, rhs, result_type)
    }

    fn icmp(&mut self, pred: IntPredicate, lhs: Value, rhs: Value, operand_type: IrType) -> Value {
        let result = self.new_temp();
        self.block.add_instruction(Instruction::ICmp { result, pred, lhs, rhs, operand_type });
        Value::Temp(result)
    }

    /// Signed less-than comparison producing an i1
    pub fn icmp_slt(&mut self, lhs: Value, rhs: Value, operand_type: IrType) -> Value {
        self.icmp(IntPredicate::Slt, lhs, rhs, operand_type)
    }

    pub fn comment(&mut self, text: impl Into<String>) {
        self.block.add_instruction(Instruction::Comment(text.into()));
    }

    pub fn br(&mut self, target: LabelId) {
        self.block.add_instruction(Instruction::Branch(target));
    }

    pub fn cond_br(&mut self, condition: Value, true_label: LabelId, false_label: LabelId) {
        self.block.add_instruction(Instruction::BranchCond { condition, true_label, false_label });
    }

    pub fn ret(&mut self, value: Value, ty: IrType) {
        self.block.add_instruction(Instruction::Return { value: Some(value), ty });
    }

    pub fn ret_void(&mut self) {
        self.block.add_instruction(Instruction::Return { value: None, ty: IrType::Void });
    }

    pub fn has_terminator(&self) -> bool {
        self.block.has_terminator()
    }
}
