//! Structured loop lowering
//! 
//! Lowers bounded counting loops into explicit basic blocks and checks the
//! resulting control-flow graph:
//! - `counting_loop`: builds the alloc / compare / increment blocks
//! - `check`: CFG well-formedness checker
//! - `eval`: small CFG interpreter used to observe loop trip counts

pub mod counting_loop;
pub mod check;
pub mod eval;

pub use counting_loop::{
    body_fn, lower_counting_loop, lower_counting_loop_with, BodyFn, CountingLoop, EmptyBody, LoopArm, LoopBody,
    LoweredLoop, StartSlotInit,
};
pub use check::{check_function, check_module, CheckReport, Violation};
pub use eval::{execute, Execution};
