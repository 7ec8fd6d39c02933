// Copyright (C) 2022 Yehowshua Immanuel
// This program is distributed under both the GPLV3 license
// and the YEHOWSHUA license, both of which can be found at
// the root of the folder containing the sources for this program.
use chrono::prelude::*;
use serde::{Deserialize, Serialize};

use super::signal::Variable;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version(pub String);

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Timescale {
    Fs,
    Ps,
    Ns,
    Us,
    Ms,
    S,
    Unit,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub date: Option<DateTime<Utc>>,
    pub version: Option<Version>,
    pub timescale: (Option<u32>, Timescale),
}

impl Default for Metadata {
    fn default() -> Self {
        Metadata {
            date: None,
            version: None,
            timescale: (None, Timescale::Unit),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScopeIdx(pub usize);

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VarIdx(pub usize);

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScopeKind {
    Module,
    Task,
    Function,
    Begin,
    Fork,
    Generate,
    Struct,
    Union,
    Class,
    Interface,
    Package,
    Program,
    VhdlArchitecture,
    VhdlProcedure,
    VhdlFunction,
    VhdlRecord,
    VhdlProcess,
    VhdlBlock,
    VhdlForGenerate,
    VhdlIfGenerate,
    VhdlGenerate,
    VhdlPackage,
}

impl ScopeKind {
    pub const KEYWORDS: [&'static str; 22] = [
        "module",
        "task",
        "function",
        "begin",
        "fork",
        "generate",
        "struct",
        "union",
        "class",
        "interface",
        "package",
        "program",
        "vhdl_architecture",
        "vhdl_procedure",
        "vhdl_function",
        "vhdl_record",
        "vhdl_process",
        "vhdl_block",
        "vhdl_for_generate",
        "vhdl_if_generate",
        "vhdl_generate",
        "vhdl_package",
    ];

    pub fn from_keyword(word: &str) -> Option<ScopeKind> {
        let kind = match word {
            "module" => ScopeKind::Module,
            "task" => ScopeKind::Task,
            "function" => ScopeKind::Function,
            "begin" => ScopeKind::Begin,
            "fork" => ScopeKind::Fork,
            "generate" => ScopeKind::Generate,
            "struct" => ScopeKind::Struct,
            "union" => ScopeKind::Union,
            "class" => ScopeKind::Class,
            "interface" => ScopeKind::Interface,
            "package" => ScopeKind::Package,
            "program" => ScopeKind::Program,
            "vhdl_architecture" => ScopeKind::VhdlArchitecture,
            "vhdl_procedure" => ScopeKind::VhdlProcedure,
            "vhdl_function" => ScopeKind::VhdlFunction,
            "vhdl_record" => ScopeKind::VhdlRecord,
            "vhdl_process" => ScopeKind::VhdlProcess,
            "vhdl_block" => ScopeKind::VhdlBlock,
            "vhdl_for_generate" => ScopeKind::VhdlForGenerate,
            "vhdl_if_generate" => ScopeKind::VhdlIfGenerate,
            "vhdl_generate" => ScopeKind::VhdlGenerate,
            "vhdl_package" => ScopeKind::VhdlPackage,
            _ => return None,
        };
        Some(kind)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scope {
    pub name: String,
    pub kind: ScopeKind,
    pub parent_idx: Option<ScopeIdx>,
    pub child_variables: Vec<VarIdx>,
    pub child_scopes: Vec<ScopeIdx>,
}

/// Everything the header of a dump declares. Built once by
/// `parse_header` and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    pub metadata: Metadata,
    pub scopes: Vec<Scope>,
    pub root_scopes: Vec<ScopeIdx>,
    /// in declaration order
    pub variables: Vec<Variable>,
}

impl Schema {
    pub fn variable(&self, idx: VarIdx) -> Option<&Variable> {
        let VarIdx(idx) = idx;
        self.variables.get(idx)
    }

    pub fn scope(&self, idx: ScopeIdx) -> Option<&Scope> {
        let ScopeIdx(idx) = idx;
        self.scopes.get(idx)
    }

    /// First declaration carrying `id`. Later declarations with the same id
    /// are aliases of it.
    pub fn variable_by_id(&self, id: &str) -> Option<&Variable> {
        self.variables.iter().find(|var| var.id == id)
    }

    /// Lookup by dotted hierarchical name, e.g. `tb.dut.clk`.
    pub fn variable_by_path(&self, path: &str) -> Option<&Variable> {
        self.variables.iter().find(|var| var.path() == path)
    }

    /// All declarations named `name`, whatever their scope.
    pub fn variables_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Variable> {
        self.variables.iter().filter(move |var| var.name == name)
    }

    fn scope_tree_lines(&self, root_scope_idx: ScopeIdx, depth: usize, lines: &mut Vec<String>) {
        let Some(root_scope) = self.scope(root_scope_idx) else {
            return;
        };
        let indent = " ".repeat(depth * 4);
        let root_scope_name = &root_scope.name;
        lines.push(format!("{indent}scope: {root_scope_name}"));

        for var_idx in &root_scope.child_variables {
            if let Some(var) = self.variable(*var_idx) {
                let (name, width) = (&var.name, var.width);
                lines.push(format!("{indent} - var: {name} ({width})"));
            }
        }

        for scope_idx in &root_scope.child_scopes {
            self.scope_tree_lines(*scope_idx, depth + 1, lines);
        }
    }

    /// Indented listing of the scope tree, one line per scope or variable.
    pub fn scope_tree(&self) -> Vec<String> {
        let mut lines = vec![];
        for scope_root in &self.root_scopes {
            self.scope_tree_lines(*scope_root, 0, &mut lines);
        }
        lines
    }
}
