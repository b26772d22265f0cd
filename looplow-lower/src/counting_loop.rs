//! Counting loop lowering
//!
//! Lowers `for (index = start; index < end; index += step)` into three
//! blocks appended to the function, with the caller's exit block as the
//! only way out:
//!
//! ```text
//! alloc:     start = alloca; index = alloca; store init, start; store init, index; br compare
//! compare:   i = load index; c = icmp slt i, end; br c, increment, exit
//! increment: <body>; n = add i, step; store n, index; br compare
//! ```
//!
//! The loop counter lives in a stack slot, so no phi nodes are needed at
//! the compare block.

use log::{debug, trace};
use looplow_common::{CompilerError, LabelId};
use looplow_ir::{BranchArm, Function, IntConstant, IrBuilder, IrType, Value};

/// Names the two successors of the compare block by meaning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoopArm {
    /// Run another iteration
    Continue,
    /// Leave the loop
    Exit,
}

impl LoopArm {
    /// Arm taken when `index < end` holds
    pub const ON_TRUE: LoopArm = LoopArm::Continue;
    /// Arm taken when `index < end` fails
    pub const ON_FALSE: LoopArm = LoopArm::Exit;

    /// Branch arm carrying this loop arm
    pub fn branch_arm(self) -> BranchArm {
        if self == Self::ON_TRUE {
            BranchArm::True
        } else {
            BranchArm::False
        }
    }
}

/// How the alloc block initializes the two stack slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StartSlotInit {
    /// Literal 0 into both slots, ignoring `start`
    #[default]
    Zero,
    /// `start` into both slots
    StartValue,
}

/// Emits the straight-line body of a loop into the increment block,
/// ahead of the counter update.
pub trait LoopBody {
    fn emit(&mut self, builder: &mut IrBuilder<'_>, index: &Value);
}

/// Body emitting no instructions
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyBody;

impl LoopBody for EmptyBody {
    fn emit(&mut self, _builder: &mut IrBuilder<'_>, _index: &Value) {}
}

/// Adapts a closure into a loop body, see [`body_fn`]
pub struct BodyFn<F>(F);

pub fn body_fn<F>(f: F) -> BodyFn<F>
where
    F: FnMut(&mut IrBuilder<'_>, &Value),
{
    BodyFn(f)
}

impl<F> LoopBody for BodyFn<F>
where
    F: FnMut(&mut IrBuilder<'_>, &Value),
{
    fn emit(&mut self, builder: &mut IrBuilder<'_>, index: &Value) {
        (self.0)(builder, index)
    }
}

/// Bounds and policies of a counting loop. Both bounds share one integer
/// type.
#[derive(Debug, Clone, PartialEq)]
pub struct CountingLoop {
    start: IntConstant,
    end: IntConstant,
    step: i64,
    start_init: StartSlotInit,
}

impl CountingLoop {
    pub fn new(start: IntConstant, end: IntConstant) -> Result<Self, CompilerError> {
        if start.ty != end.ty {
            return Err(CompilerError::invalid_type(format!(
                "loop bounds disagree on type: start is {}, end is {}",
                start.ty, end.ty
            )));
        }
        Ok(Self::with_bounds(start, end))
    }

    fn with_bounds(start: IntConstant, end: IntConstant) -> Self {
        Self {
            start,
            end,
            step: 1,
            start_init: StartSlotInit::default(),
        }
    }

    pub fn start(&self) -> &IntConstant {
        &self.start
    }

    pub fn end(&self) -> &IntConstant {
        &self.end
    }

    pub fn step(&self) -> i64 {
        self.step
    }

    pub fn start_init(&self) -> StartSlotInit {
        self.start_init
    }

    pub fn with_step(mut self, step: i64) -> Self {
        self.step = step;
        self
    }

    pub fn with_start_init(mut self, start_init: StartSlotInit) -> Self {
        self.start_init = start_init;
        self
    }

    /// Integer type of both slots and of the comparison
    pub fn width(&self) -> &IrType {
        &self.end.ty
    }

    fn initial_value(&self) -> Value {
        match self.start_init {
            StartSlotInit::Zero => Value::Constant(0),
            StartSlotInit::StartValue => self.start.as_value(),
        }
    }
}

/// Handles produced by one lowering
#[derive(Debug, Clone, PartialEq)]
pub struct LoweredLoop {
    pub alloc: LabelId,
    pub compare: LabelId,
    pub increment: LabelId,
    pub exit: LabelId,
    pub start_slot: Value,
    pub index_slot: Value,
}

impl LoweredLoop {
    /// The blocks created by the lowering, in append order
    pub fn blocks(&self) -> [LabelId; 3] {
        [self.alloc, self.compare, self.increment]
    }

    /// Where `arm` of the compare block actually branches in `function`
    pub fn arm_target(&self, function: &Function, arm: LoopArm) -> Option<LabelId> {
        function
            .get_block(self.compare)?
            .terminator()?
            .arm_target(arm.branch_arm())
    }

    fn intended_target(&self, arm: LoopArm) -> LabelId {
        match arm {
            LoopArm::Continue => self.increment,
            LoopArm::Exit => self.exit,
        }
    }
}

/// Lower `start..end` with the reference policies: step 1, both slots
/// initialized to literal 0, empty body. `start` is never stored under this
/// policy, so its type is not checked against `end`.
pub fn lower_counting_loop(
    function: &mut Function,
    exit: LabelId,
    start: &IntConstant,
    end: &IntConstant,
) -> LoweredLoop {
    let counting = CountingLoop::with_bounds(start.clone(), end.clone());
    lower_counting_loop_with(function, exit, &counting, &mut EmptyBody)
}

/// Lower a counting loop into `function`, leaving `exit` as the single
/// successor once the loop terminates. `exit` is neither created nor
/// appended here.
pub fn lower_counting_loop_with(
    function: &mut Function,
    exit: LabelId,
    counting: &CountingLoop,
    body: &mut dyn LoopBody,
) -> LoweredLoop {
    let ty = counting.width().clone();
    debug!(
        "Lowering counting loop in '{}': {} to {} step {} ({:?}), exit L{exit}",
        function.name, counting.start.value, counting.end.value, counting.step, counting.start_init
    );

    let mut alloc_block = function.new_named_block("loop.alloc");
    let mut compare_block = function.new_named_block("loop.cmp");
    let mut increment_block = function.new_named_block("loop.inc");

    let init = counting.initial_value();
    let mut builder = function.build(&mut alloc_block);
    let start_slot = builder.alloca(ty.clone());
    let index_slot = builder.alloca(ty.clone());
    builder.store(init.clone(), start_slot.clone(), ty.clone());
    builder.store(init, index_slot.clone(), ty.clone());
    builder.br(compare_block.id);

    let lowered = LoweredLoop {
        alloc: alloc_block.id,
        compare: compare_block.id,
        increment: increment_block.id,
        exit,
        start_slot,
        index_slot,
    };
    trace!("  L{}: slots {} (start), {} (index)", lowered.alloc, lowered.start_slot, lowered.index_slot);

    let mut builder = function.build(&mut compare_block);
    let index = builder.load(lowered.index_slot.clone(), ty.clone());
    let keep_going = builder.icmp_slt(index.clone(), counting.end.as_value(), ty.clone());
    builder.cond_br(
        keep_going,
        lowered.intended_target(LoopArm::ON_TRUE),
        lowered.intended_target(LoopArm::ON_FALSE),
    );
    trace!("  L{}: {} < {} ? L{} : L{}", lowered.compare, index, counting.end.value, lowered.increment, exit);

    let mut builder = function.build(&mut increment_block);
    body.emit(&mut builder, &index);
    let next = builder.add(index, Value::Constant(counting.step), ty.clone());
    builder.store(next, lowered.index_slot.clone(), ty);
    builder.br(lowered.compare);
    trace!("  L{}: {} instructions", lowered.increment, increment_block.instructions.len());

    function.append_block(alloc_block);
    function.append_block(compare_block);
    function.append_block(increment_block);

    lowered
}

#[cfg(test)]
mod tests {
    use super::*;
    use looplow_ir::Instruction;

    fn i32_const(value: i64) -> IntConstant {
        IntConstant::new(value, IrType::I32).unwrap()
    }

    #[test]
    fn test_arm_convention() {
        assert_eq!(LoopArm::ON_TRUE.branch_arm(), BranchArm::True);
        assert_eq!(LoopArm::ON_FALSE.branch_arm(), BranchArm::False);
        assert_eq!(LoopArm::Continue.branch_arm(), BranchArm::True);
        assert_eq!(LoopArm::Exit.branch_arm(), BranchArm::False);
    }

    #[test]
    fn test_appends_three_blocks_in_order() {
        let mut function = Function::new("main", IrType::I32);
        let exit = function.new_block();

        let lowered = lower_counting_loop(&mut function, exit.id, &i32_const(0), &i32_const(10));

        let ids: Vec<LabelId> = function.blocks.iter().map(|b| b.id).collect();
        assert_eq!(ids, lowered.blocks().to_vec());
        assert_eq!(lowered.exit, exit.id);
        assert!(function.blocks.iter().all(|b| b.has_terminator()));
    }

    #[test]
    fn test_arms_target_increment_and_exit() {
        let mut function = Function::new("main", IrType::I32);
        let exit = function.new_block();
        let lowered = lower_counting_loop(&mut function, exit.id, &i32_const(0), &i32_const(10));

        assert_eq!(lowered.arm_target(&function, LoopArm::Continue), Some(lowered.increment));
        assert_eq!(lowered.arm_target(&function, LoopArm::Exit), Some(exit.id));
    }

    #[test]
    fn test_zero_policy_ignores_start() {
        let mut function = Function::new("main", IrType::I32);
        let exit = function.new_block();
        let lowered = lower_counting_loop(&mut function, exit.id, &i32_const(5), &i32_const(10));

        let alloc = function.get_block(lowered.alloc).unwrap();
        let stored: Vec<&Value> = alloc
            .instructions
            .iter()
            .filter_map(|i| match i {
                Instruction::Store { value, .. } => Some(value),
                _ => None,
            })
            .collect();
        assert_eq!(stored, vec![&Value::Constant(0), &Value::Constant(0)]);
    }

    #[test]
    fn test_start_value_policy() {
        let mut function = Function::new("main", IrType::I32);
        let exit = function.new_block();
        let counting = CountingLoop::new(i32_const(5), i32_const(10))
            .unwrap()
            .with_start_init(StartSlotInit::StartValue);
        let lowered = lower_counting_loop_with(&mut function, exit.id, &counting, &mut EmptyBody);

        let alloc = function.get_block(lowered.alloc).unwrap();
        assert!(alloc.instructions.contains(&Instruction::Store {
            value: Value::Constant(5),
            ptr: lowered.start_slot.clone(),
            value_type: IrType::I32,
        }));
        assert!(alloc.instructions.contains(&Instruction::Store {
            value: Value::Constant(5),
            ptr: lowered.index_slot.clone(),
            value_type: IrType::I32,
        }));
    }

    #[test]
    fn test_body_runs_before_increment() {
        let mut function = Function::new("main", IrType::I32);
        let exit = function.new_block();
        let counting = CountingLoop::new(i32_const(0), i32_const(3)).unwrap().with_step(2);
        let mut body = body_fn(|builder, index| {
            builder.comment(format!("body sees {index}"));
        });
        let lowered = lower_counting_loop_with(&mut function, exit.id, &counting, &mut body);

        let inc = function.get_block(lowered.increment).unwrap();
        let opcodes: Vec<&str> = inc.instructions.iter().map(Instruction::opcode).collect();
        assert_eq!(opcodes, vec!["comment", "add", "store", "br"]);
        assert!(matches!(
            inc.instructions[1],
            Instruction::Binary { rhs: Value::Constant(2), .. }
        ));
    }

    #[test]
    fn test_bounds_must_share_a_type() {
        let wide = IntConstant::new(5_000_000_000, IrType::I64).unwrap();
        let err = CountingLoop::new(wide, i32_const(10)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid type: loop bounds disagree on type: start is i64, end is i32"
        );

        let counting = CountingLoop::new(i32_const(1), i32_const(10)).unwrap().with_step(3);
        assert_eq!(counting.start().value, 1);
        assert_eq!(counting.end().value, 10);
        assert_eq!(counting.step(), 3);
        assert_eq!(counting.start_init(), StartSlotInit::Zero);
        assert_eq!(counting.width(), &IrType::I32);
    }

    #[test]
    fn test_width_follows_end() {
        let mut function = Function::new("main", IrType::I16);
        let exit = function.new_block();
        let start = IntConstant::new(0, IrType::I16).unwrap();
        let end = IntConstant::new(4, IrType::I16).unwrap();
        let lowered = lower_counting_loop(&mut function, exit.id, &start, &end);

        let compare = function.get_block(lowered.compare).unwrap();
        assert_eq!(compare.instructions[1].to_string(), "%3 = icmp slt i16 %2, 4");
    }
}
