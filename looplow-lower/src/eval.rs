//! CFG interpreter
//!
//! Walks a function's blocks from the entry, executing instructions until a
//! return. Stack slots are keyed by the temporary their alloca defined.
//! Used to observe runtime behavior of lowered loops, such as trip counts.

use log::trace;
use looplow_common::{CompilerError, LabelId, TempId};
use looplow_ir::{Function, Instruction, IrType, Value};
use std::collections::{BTreeMap, HashMap};

/// Outcome of running a function to its return
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Execution {
    pub return_value: Option<i64>,
    /// Number of times each block was entered
    pub visits: BTreeMap<LabelId, usize>,
    /// Instructions executed
    pub steps: usize,
}

impl Execution {
    pub fn visits(&self, block: LabelId) -> usize {
        self.visits.get(&block).copied().unwrap_or(0)
    }
}

struct Machine<'f> {
    function: &'f Function,
    temps: HashMap<TempId, i64>,
    slots: HashMap<TempId, Option<i64>>,
}

impl<'f> Machine<'f> {
    fn error(&self, message: impl Into<String>) -> CompilerError {
        CompilerError::Execution {
            function: self.function.name.clone(),
            message: message.into(),
        }
    }

    fn value(&self, value: &Value) -> Result<i64, CompilerError> {
        match value {
            Value::Constant(v) => Ok(*v),
            Value::Temp(id) => self
                .temps
                .get(id)
                .copied()
                .ok_or_else(|| self.error(format!("use of undefined temporary %{id}"))),
        }
    }

    fn slot(&self, ptr: &Value) -> Result<TempId, CompilerError> {
        match ptr.as_temp() {
            Some(id) if self.slots.contains_key(&id) => Ok(id),
            _ => Err(self.error(format!("{ptr} is not a stack slot"))),
        }
    }
}

/// Truncate to the type's width, keeping the signed reading
fn wrap(value: i64, ty: &IrType) -> i64 {
    match ty.bit_width() {
        Some(1) => value & 1,
        Some(width) if width < 64 => {
            let shift = 64 - width;
            (value << shift) >> shift
        }
        _ => value,
    }
}

/// Run `function` from its entry block. Fails on malformed IR or when more
/// than `step_limit` instructions execute.
pub fn execute(function: &Function, step_limit: usize) -> Result<Execution, CompilerError> {
    let mut machine = Machine {
        function,
        temps: HashMap::new(),
        slots: HashMap::new(),
    };
    let mut visits = BTreeMap::new();
    let mut steps = 0;

    let mut current = function
        .entry_block()
        .ok_or_else(|| machine.error("function has no entry block"))?;

    loop {
        *visits.entry(current.id).or_insert(0) += 1;
        trace!("exec L{}", current.id);

        let mut next = None;
        for instr in &current.instructions {
            steps += 1;
            if steps > step_limit {
                return Err(machine.error(format!("step limit of {step_limit} exceeded")));
            }

            match instr {
                Instruction::Alloca { result, .. } => {
                    machine.slots.insert(*result, None);
                    machine.temps.insert(*result, *result as i64);
                }
                Instruction::Store { value, ptr, value_type } => {
                    let v = wrap(machine.value(value)?, value_type);
                    let slot = machine.slot(ptr)?;
                    machine.slots.insert(slot, Some(v));
                }
                Instruction::Load { result, ptr, .. } => {
                    let slot = machine.slot(ptr)?;
                    let v = machine.slots[&slot]
                        .ok_or_else(|| machine.error(format!("load of uninitialized slot %{slot}")))?;
                    machine.temps.insert(*result, v);
                }
                Instruction::Binary { result, op, lhs, rhs, result_type } => {
                    let v = op.apply(machine.value(lhs)?, machine.value(rhs)?);
                    machine.temps.insert(*result, wrap(v, result_type));
                }
                Instruction::ICmp { result, pred, lhs, rhs, operand_type } => {
                    // Constants may carry the unsigned reading of the bit pattern
                    let a = wrap(machine.value(lhs)?, operand_type);
                    let b = wrap(machine.value(rhs)?, operand_type);
                    let holds = pred.evaluate(a, b);
                    machine.temps.insert(*result, i64::from(holds));
                }
                Instruction::Return { value, .. } => {
                    let return_value = value.as_ref().map(|v| machine.value(v)).transpose()?;
                    return Ok(Execution { return_value, visits, steps });
                }
                Instruction::Branch(target) => {
                    next = Some(*target);
                    break;
                }
                Instruction::BranchCond { condition, true_label, false_label } => {
                    next = Some(if machine.value(condition)? != 0 { *true_label } else { *false_label });
                    break;
                }
                Instruction::Comment(_) => {}
            }
        }

        let target = next.ok_or_else(|| machine.error(format!("fell off the end of L{}", current.id)))?;
        current = function
            .get_block(target)
            .ok_or_else(|| machine.error(format!("branch to missing block L{target}")))?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap() {
        assert_eq!(wrap(128, &IrType::I8), -128);
        assert_eq!(wrap(-1, &IrType::I16), -1);
        assert_eq!(wrap(1 << 40, &IrType::I32), 0);
        assert_eq!(wrap(3, &IrType::I1), 1);
        assert_eq!(wrap(i64::MAX, &IrType::I64), i64::MAX);
    }

    #[test]
    fn test_straight_line() {
        let mut function = Function::new("main", IrType::I32);
        let mut entry = function.new_block();
        let mut builder = function.build(&mut entry);
        let slot = builder.alloca(IrType::I32);
        builder.store(Value::Constant(40), slot.clone(), IrType::I32);
        let loaded = builder.load(slot, IrType::I32);
        let sum = builder.add(loaded, Value::Constant(2), IrType::I32);
        builder.ret(sum, IrType::I32);
        let id = entry.id;
        function.append_block(entry);

        let run = execute(&function, 100).unwrap();
        assert_eq!(run.return_value, Some(42));
        assert_eq!(run.visits(id), 1);
        assert_eq!(run.steps, 5);
    }

    #[test]
    fn test_uninitialized_load_fails() {
        let mut function = Function::new("main", IrType::I32);
        let mut entry = function.new_block();
        let mut builder = function.build(&mut entry);
        let slot = builder.alloca(IrType::I32);
        let loaded = builder.load(slot, IrType::I32);
        builder.ret(loaded, IrType::I32);
        function.append_block(entry);

        assert!(matches!(execute(&function, 100), Err(CompilerError::Execution { .. })));
    }

    #[test]
    fn test_step_limit() {
        let mut function = Function::new("spin", IrType::Void);
        let mut entry = function.new_block();
        let id = entry.id;
        function.build(&mut entry).br(id);
        function.append_block(entry);

        let err = execute(&function, 10).unwrap_err();
        assert!(err.to_string().contains("step limit"));
    }

    #[test]
    fn test_compare_reads_operands_at_their_width() {
        let mut function = Function::new("main", IrType::I1);
        let mut entry = function.new_block();
        let mut builder = function.build(&mut entry);
        // 255 is -1 as an i8
        let flag = builder.icmp_slt(Value::Constant(0), Value::Constant(255), IrType::I8);
        builder.ret(flag, IrType::I1);
        function.append_block(entry);

        let run = execute(&function, 10).unwrap();
        assert_eq!(run.return_value, Some(0));
    }

    #[test]
    fn test_no_entry_block() {
        let function = Function::new("empty", IrType::Void);
        assert!(execute(&function, 10).is_err());
    }
}
