//! CFG well-formedness checker
//!
//! Verifies a finished function without mutating it. Every problem is
//! reported as a [`Violation`] so callers and tests can assert on them.
//!
//! Checks:
//! 1. Every block ends with a terminator, and no terminator appears earlier.
//! 2. Every branch target is a block minted by and appended to the same
//!    function.
//! 3. No block handle is appended twice, and no appended block was minted
//!    by another function.
//! 4. No block is both unreachable from the entry and unreferenced.
//! 5. Every block handle the function minted was appended or pruned.

use log::debug;
use looplow_common::{CompilerError, LabelId};
use looplow_ir::{Function, Module};
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::fmt;

/// A single well-formedness violation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// Block has no terminator as its last instruction
    MissingTerminator { block: LabelId },
    /// Terminator found before the end of the block
    MisplacedTerminator { block: LabelId, index: usize },
    /// Branch to a block the function does not own
    DanglingBranch { from: LabelId, target: LabelId },
    /// Same block handle appended more than once
    DuplicateBlock { block: LabelId },
    /// Appended block minted by another function
    ForeignBlock { block: LabelId },
    /// Block minted by the function but never appended nor pruned
    UnappendedBlock { block: LabelId },
    /// Block neither reachable from the entry nor referenced by any branch
    UnreachableBlock { block: LabelId },
    /// Two functions of a module share a name
    DuplicateFunction { name: String },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::MissingTerminator { block } => {
                write!(f, "block L{block} has no terminator")
            }
            Violation::MisplacedTerminator { block, index } => {
                write!(f, "block L{block} has a terminator at position {index} that is not last")
            }
            Violation::DanglingBranch { from, target } => {
                write!(f, "block L{from} branches to L{target}, which is not in the function")
            }
            Violation::DuplicateBlock { block } => {
                write!(f, "block L{block} is appended more than once")
            }
            Violation::ForeignBlock { block } => {
                write!(f, "block L{block} was minted by another function")
            }
            Violation::UnappendedBlock { block } => {
                write!(f, "block L{block} was created but never appended")
            }
            Violation::UnreachableBlock { block } => {
                write!(f, "block L{block} is unreachable and never referenced")
            }
            Violation::DuplicateFunction { name } => {
                write!(f, "function '{name}' is defined more than once")
            }
        }
    }
}

/// Result of checking one function
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckReport {
    pub function: String,
    violations: Vec<Violation>,
}

impl CheckReport {
    pub fn is_ok(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    pub fn into_result(self) -> Result<(), CompilerError> {
        if self.is_ok() {
            Ok(())
        } else {
            Err(CompilerError::verification(self.function, self.violations.len()))
        }
    }
}

impl fmt::Display for CheckReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_ok() {
            return write!(f, "@{}: ok", self.function);
        }
        write!(f, "@{}: {} violation(s)", self.function, self.violations.len())?;
        for violation in &self.violations {
            write!(f, "\n  {violation}")?;
        }
        Ok(())
    }
}

/// Check the CFG of a single function
pub fn check_function(function: &Function) -> CheckReport {
    let mut violations = Vec::new();

    // Ownership and duplicates
    let mut counts: BTreeMap<LabelId, usize> = BTreeMap::new();
    for block in &function.blocks {
        let count = counts.entry(block.id).or_insert(0);
        *count += 1;
        match *count {
            1 if !function.owns(block.id) => violations.push(Violation::ForeignBlock { block: block.id }),
            2 => violations.push(Violation::DuplicateBlock { block: block.id }),
            _ => {}
        }
    }

    // Per-block structure, first occurrence of each handle only
    let mut seen = BTreeSet::new();
    let mut referenced = BTreeSet::new();
    for block in &function.blocks {
        if !seen.insert(block.id) {
            continue;
        }
        let last = block.instructions.len().saturating_sub(1);
        for (index, instr) in block.instructions.iter().enumerate() {
            if !instr.is_terminator() {
                continue;
            }
            if index != last {
                violations.push(Violation::MisplacedTerminator { block: block.id, index });
            }
            for target in instr.successors() {
                referenced.insert(target);
                if !function.owns(target) || !counts.contains_key(&target) {
                    violations.push(Violation::DanglingBranch { from: block.id, target });
                }
            }
        }
        if !block.has_terminator() {
            violations.push(Violation::MissingTerminator { block: block.id });
        }
    }

    // Reachability from the entry block
    let mut reachable = BTreeSet::new();
    if let Some(entry) = function.entry_block() {
        let mut worklist = VecDeque::from([entry.id]);
        while let Some(id) = worklist.pop_front() {
            if !reachable.insert(id) {
                continue;
            }
            if let Some(block) = function.get_block(id) {
                worklist.extend(block.successors());
            }
        }
    }
    for &id in counts.keys() {
        if !reachable.contains(&id) && !referenced.contains(&id) {
            violations.push(Violation::UnreachableBlock { block: id });
        }
    }

    for id in function.minted_labels() {
        if !counts.contains_key(&id) && !function.is_pruned(id) {
            violations.push(Violation::UnappendedBlock { block: id });
        }
    }

    debug!(
        "Checked '{}': {} block(s), {} violation(s)",
        function.name,
        function.blocks.len(),
        violations.len()
    );

    CheckReport {
        function: function.name.clone(),
        violations,
    }
}

/// Check every function of a module; only failing reports are returned
pub fn check_module(module: &Module) -> Vec<CheckReport> {
    let mut reports = Vec::new();
    let mut names = BTreeSet::new();
    for function in &module.functions {
        let mut report = check_function(function);
        if !names.insert(function.name.as_str()) {
            report.violations.push(Violation::DuplicateFunction { name: function.name.clone() });
        }
        if !report.is_ok() {
            reports.push(report);
        }
    }
    reports
}
