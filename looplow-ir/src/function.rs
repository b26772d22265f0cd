//! Function Definitions
//!
//! A function owns its basic blocks and mints the handles for blocks and
//! temporaries. A minted block stays detached until it is appended.

use looplow_common::{next_function_token, FunctionToken, LabelId, TempId};
use serde::{Deserialize, Serialize};
use std::fmt;
use crate::{BasicBlock, IrBuilder, IrType};

/// Function in IR
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Function {
    pub name: String,
    pub return_type: IrType,
    pub blocks: Vec<BasicBlock>,
    /// Stamped into every block handle this function mints
    token: FunctionToken,
    next_temp_id: TempId,
    next_label_id: u32,
    /// Minted blocks that were removed on purpose
    pruned: Vec<LabelId>,
}

impl Function {
    pub fn new(name: impl Into<String>, return_type: IrType) -> Self {
        Self {
            name: name.into(),
            return_type,
            blocks: Vec::new(),
            token: next_function_token(),
            next_temp_id: 0,
            next_label_id: 0,
            pruned: Vec::new(),
        }
    }

    pub fn token(&self) -> FunctionToken {
        self.token
    }

    /// Whether `id` was minted by this function
    pub fn owns(&self, id: LabelId) -> bool {
        id.owner == self.token && id.index < self.next_label_id
    }

    pub fn new_temp(&mut self) -> TempId {
        let temp = self.next_temp_id;
        self.next_temp_id += 1;
        temp
    }

    /// Mint a fresh, detached block
    pub fn new_block(&mut self) -> BasicBlock {
        self.new_named_block("")
    }

    pub fn new_named_block(&mut self, name: &str) -> BasicBlock {
        let label = LabelId::new(self.token, self.next_label_id);
        self.next_label_id += 1;
        BasicBlock::with_name(label, name)
    }

    /// Append a block. Appending the same handle twice is not rejected here;
    /// the CFG checker reports it.
    pub fn append_block(&mut self, block: BasicBlock) {
        self.blocks.push(block);
    }

    /// Remove every appended copy of `id` and record it as pruned.
    /// Pruning a detached block only records it.
    pub fn prune_block(&mut self, id: LabelId) -> Vec<BasicBlock> {
        let (removed, kept): (Vec<BasicBlock>, Vec<BasicBlock>) = std::mem::take(&mut self.blocks)
            .into_iter()
            .partition(|b| b.id == id);
        self.blocks = kept;
        if !self.pruned.contains(&id) {
            self.pruned.push(id);
        }
        removed
    }

    pub fn is_pruned(&self, id: LabelId) -> bool {
        self.pruned.contains(&id)
    }

    /// Every block handle this function has handed out
    pub fn minted_labels(&self) -> impl Iterator<Item = LabelId> + '_ {
        (0..self.next_label_id).map(|index| LabelId::new(self.token, index))
    }

    pub fn contains_block(&self, id: LabelId) -> bool {
        self.blocks.iter().any(|b| b.id == id)
    }

    pub fn get_block(&self, id: LabelId) -> Option<&BasicBlock> {
        self.blocks.iter().find(|b| b.id == id)
    }

    pub fn entry_block(&self) -> Option<&BasicBlock> {
        self.blocks.first()
    }

    /// Builder appending to a detached block
    pub fn build<'a>(&'a mut self, block: &'a mut BasicBlock) -> IrBuilder<'a> {
        IrBuilder::new(&mut self.next_temp_id, block)
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "define {} @{}() {{", self.return_type, self.name)?;
        for (i, block) in self.blocks.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{block}")?;
        }
        write!(f, "}}")
    }
}
