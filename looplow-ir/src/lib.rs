//! Basic Block Intermediate Representation
//! 
//! A small LLVM-like IR: integer types, stack slots, loads and stores,
//! comparisons and branches. It has no loop construct; loops are expressed
//! as explicit blocks and edges.
//! 
//! ## Architecture
//! 
//! The crate is structured as follows:
//! - `types` - Type system (IrType)
//! - `values` - Value representations and typed constants
//! - `ops` - Arithmetic operations and comparison predicates
//! - `instructions` - IR instructions
//! - `blocks` - Basic block management
//! - `function` - Function definitions and block/temp minting
//! - `module` - Module, textual and JSON rendering
//! - `builder` - Instruction construction on a block

// Public exports - clean API surface
pub use self::types::IrType;
pub use self::values::{IntConstant, Value};
pub use self::ops::{IrBinaryOp, IntPredicate};
pub use self::instructions::{BranchArm, Instruction};
pub use self::blocks::BasicBlock;
pub use self::function::Function;
pub use self::module::Module;
pub use self::builder::IrBuilder;

// Internal modules
mod types;
mod values;
mod ops;
mod instructions;
mod blocks;
mod function;
mod module;
mod builder;
