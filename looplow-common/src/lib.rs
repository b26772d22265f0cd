//! Loop lowering - Common Types and Utilities
//! 
//! Shared identifiers and the error type used by the IR, the lowering
//! passes and the driver.

pub mod error;
pub mod types;

pub use error::CompilerError;
pub use types::*;
