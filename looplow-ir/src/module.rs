//! Module Definition
//!
//! Defines the top-level module structure and its rendered forms.

use looplow_common::CompilerError;
use serde::{Deserialize, Serialize};
use std::fmt;
use crate::Function;

/// IR Module - represents a complete compilation unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Module {
    pub name: String,
    pub functions: Vec<Function>,
}

impl Module {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            functions: Vec::new(),
        }
    }

    pub fn add_function(&mut self, function: Function) {
        self.functions.push(function);
    }

    pub fn get_function(&self, name: &str) -> Option<&Function> {
        self.functions.iter().find(|f| f.name == name)
    }

    pub fn to_json(&self) -> Result<String, CompilerError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| CompilerError::Serialization { message: e.to_string() })
    }

    pub fn from_json(text: &str) -> Result<Self, CompilerError> {
        serde_json::from_str(text)
            .map_err(|e| CompilerError::Serialization { message: e.to_string() })
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "; ModuleID = '{}'", self.name)?;
        for function in &self.functions {
            writeln!(f)?;
            writeln!(f, "{function}")?;
        }
        Ok(())
    }
}
