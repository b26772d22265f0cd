//! Common identifier types shared across the IR and the lowering passes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

/// Global counter handing out function tokens
static FUNCTION_TOKEN_COUNTER: AtomicU32 = AtomicU32::new(0);

/// Identifies the function that minted a block handle
pub type FunctionToken = u32;

/// Draw a token no other function in this process holds
pub fn next_function_token() -> FunctionToken {
    FUNCTION_TOKEN_COUNTER.fetch_add(1, Ordering::Relaxed)
}

/// Basic block handle: the minting function's token plus an index local to
/// that function. Handles from different functions never compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LabelId {
    pub owner: FunctionToken,
    pub index: u32,
}

impl LabelId {
    pub fn new(owner: FunctionToken, index: u32) -> Self {
        Self { owner, index }
    }
}

/// Renders the local index only, as in `L3`
impl fmt::Display for LabelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index)
    }
}

/// Temporary (SSA value) identifier, unique within a function
pub type TempId = u32;
