// Copyright (C) 2022 Yehowshua Immanuel
// This program is distributed under both the GPLV3 license
// and the YEHOWSHUA license, both of which can be found at
// the root of the folder containing the sources for this program.

/// part of the vcd parser that handles parsing the signal tree and
/// building the resulting schema
use std::collections::{HashMap, HashSet};

use super::super::lexer::Declaration;
use super::super::reader::Cursor;
use super::super::signal::{BitOrder, VarRange, VarType, Variable};
use super::super::types::{Metadata, Schema, Scope, ScopeIdx, ScopeKind, VarIdx};
use super::combinator_atoms::{tag, take_until};
use super::types::ParseResult;
use crate::error::WaveError;

pub(super) struct SchemaBuilder {
    pub(super) metadata: Metadata,
    scopes: Vec<Scope>,
    root_scopes: Vec<ScopeIdx>,
    variables: Vec<Variable>,
    // one entry per open `$scope`, `None` for a nameless one
    scope_stack: Vec<Option<ScopeIdx>>,
    path: Vec<String>,
    ids_per_scope: HashSet<(Option<ScopeIdx>, String)>,
    width_of_id: HashMap<String, u32>,
    // declarations without a source id, named once every source id is known
    unnamed: Vec<VarIdx>,
}

impl SchemaBuilder {
    pub(super) fn new() -> SchemaBuilder {
        SchemaBuilder {
            metadata: Metadata::default(),
            scopes: vec![],
            root_scopes: vec![],
            variables: vec![],
            scope_stack: vec![],
            path: vec![],
            ids_per_scope: HashSet::new(),
            width_of_id: HashMap::new(),
            unnamed: vec![],
        }
    }

    /// innermost named scope
    fn current_scope(&self) -> Option<ScopeIdx> {
        self.scope_stack.iter().rev().flatten().next().copied()
    }

    // $scope module reg_mag_i $end
    pub(super) fn open_scope(
        &mut self,
        keyword: &str,
        name: Option<String>,
        cursor: Cursor,
    ) -> Result<(), WaveError> {
        let kind = ScopeKind::from_keyword(keyword).ok_or_else(|| WaveError::Parse {
            cursor,
            message: format!(
                "found keyword `{keyword}` but expected one of {:?}",
                ScopeKind::KEYWORDS
            ),
        })?;

        // In some cases there are VCD files which have scopes without names.
        // We make such a scope completely transparent. I.e.
        // $scope module a $end
        //   $scope module $end
        //     $scope module b $end
        // will create `a.b`
        let Some(name) = name else {
            self.scope_stack.push(None);
            return Ok(());
        };

        let curr_scope_idx = ScopeIdx(self.scopes.len());

        // register this scope as a child of the current parent scope
        // if there is a parent scope, or else we register this scope as
        // root scope
        let parent_idx = self.current_scope();
        match parent_idx {
            Some(ScopeIdx(parent_idx)) => self.scopes[parent_idx].child_scopes.push(curr_scope_idx),
            None => self.root_scopes.push(curr_scope_idx),
        }

        self.scopes.push(Scope {
            name: name.clone(),
            kind,
            parent_idx,
            child_variables: vec![],
            child_scopes: vec![],
        });
        self.scope_stack.push(Some(curr_scope_idx));
        self.path.push(name);
        Ok(())
    }

    pub(super) fn close_scope(&mut self, cursor: Cursor) -> Result<(), WaveError> {
        match self.scope_stack.pop() {
            Some(Some(_)) => {
                self.path.pop();
                Ok(())
            }
            Some(None) => Ok(()),
            None => Err(WaveError::Parse {
                cursor,
                message: "found `$upscope` without a matching `$scope`".to_string(),
            }),
        }
    }

    // $var parameter 3 a IDLE $end
    pub(super) fn declare(&mut self, decl: Declaration, cursor: Cursor) -> Result<(), WaveError> {
        let Declaration {
            var_type,
            width,
            id,
            reference,
        } = decl;

        let var_type = VarType::from_keyword(&var_type).ok_or_else(|| WaveError::Parse {
            cursor,
            message: format!(
                "found keyword `{var_type}` but expected one of {:?}",
                VarType::KEYWORDS
            ),
        })?;

        //                ^ - width
        let width = match width.parse::<u32>() {
            Ok(width) if width > 0 => width,
            _ => {
                return Err(WaveError::Parse {
                    cursor,
                    message: format!("`{width}` is not a valid variable width"),
                })
            }
        };

        //                    ^^^^ - reference (can extend until $end)
        let (name, range) = split_reference(&reference.join(" "));

        let var_idx = VarIdx(self.variables.len());
        let scope_idx = self.current_scope();

        //                  ^ - id
        let Some(id) = id else {
            self.unnamed.push(var_idx);
            self.push_variable(scope_idx, Variable {
                id: String::new(),
                name,
                scope: self.path.clone(),
                width,
                var_type,
                range,
                bit_order: BitOrder::from_range(range),
            });
            return Ok(());
        };

        if !self.ids_per_scope.insert((scope_idx, id.clone())) {
            return Err(WaveError::Parse {
                cursor,
                message: format!(
                    "id `{id}` is declared twice in scope `{}`",
                    self.path.join(".")
                ),
            });
        }

        // Is the current variable an alias to a variable already
        // encountered? If so, both must agree on their width.
        match self.width_of_id.get(&id) {
            Some(&alias_width) if alias_width != width => {
                return Err(WaveError::Parse {
                    cursor,
                    message: format!(
                        "`{name}` aliases id `{id}` with width {width}, \
                         but `{id}` was declared with width {alias_width}"
                    ),
                })
            }
            Some(_) => {}
            None => {
                self.width_of_id.insert(id.clone(), width);
            }
        }

        self.push_variable(scope_idx, Variable {
            id,
            name,
            scope: self.path.clone(),
            width,
            var_type,
            range,
            bit_order: BitOrder::from_range(range),
        });
        Ok(())
    }

    fn push_variable(&mut self, scope_idx: Option<ScopeIdx>, variable: Variable) {
        let var_idx = VarIdx(self.variables.len());
        if let Some(ScopeIdx(scope_idx)) = scope_idx {
            self.scopes[scope_idx].child_variables.push(var_idx);
        }
        self.variables.push(variable);
    }

    /// Sequential ids `0`, `1`, ... skipping every id the source declared.
    fn assign_generated_ids(&mut self) {
        let mut next_generated_id = 0usize;
        for VarIdx(var_idx) in std::mem::take(&mut self.unnamed) {
            let id = loop {
                let candidate = next_generated_id.to_string();
                next_generated_id += 1;
                if !self.width_of_id.contains_key(&candidate) {
                    break candidate;
                }
            };
            self.width_of_id.insert(id.clone(), self.variables[var_idx].width);
            self.variables[var_idx].id = id;
        }
    }

    pub(super) fn finish(mut self) -> Schema {
        self.assign_generated_ids();
        if !self.scope_stack.is_empty() {
            tracing::warn!(
                open_scopes = self.scope_stack.len(),
                "header ended with unclosed scopes"
            );
        }
        Schema {
            metadata: self.metadata,
            scopes: self.scopes,
            root_scopes: self.root_scopes,
            variables: self.variables,
        }
    }
}

/// Splits `data [7:0]`, `data[7:0]` or `mem[3]` into a name and a range. A
/// bracket suffix that does not parse as a range stays part of the name.
pub(super) fn split_reference(reference: &str) -> (String, Option<VarRange>) {
    if let Some(pos) = reference.rfind('[') {
        let name = reference[..pos].trim_end();
        if !name.is_empty() {
            if let Some(range) = parse_range(&reference[pos..]) {
                return (name.to_string(), Some(range));
            }
        }
    }
    (reference.to_string(), None)
}

fn parse_range(text: &str) -> Option<VarRange> {
    let ParseResult { residual, .. } = tag(text, "[");
    let ParseResult { matched, residual } = take_until(residual, b']');
    // nothing may follow the closing bracket
    if residual != "]" {
        return None;
    }

    let ParseResult {
        matched: left,
        residual: right,
    } = take_until(matched, b':');
    let left = left.trim().parse::<i64>().ok()?;
    if right.is_empty() {
        return Some(VarRange::Bit(left));
    }
    let right = right[1..].trim().parse::<i64>().ok()?;
    Some(VarRange::Range(left, right))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn references() {
        assert_eq!(
            split_reference("data [7:0]"),
            ("data".to_string(), Some(VarRange::Range(7, 0)))
        );
        assert_eq!(
            split_reference("data[0:31]"),
            ("data".to_string(), Some(VarRange::Range(0, 31)))
        );
        assert_eq!(
            split_reference("mem[3] [ 7 : 0 ]"),
            ("mem[3]".to_string(), Some(VarRange::Range(7, 0)))
        );
        assert_eq!(
            split_reference("bit[3]"),
            ("bit".to_string(), Some(VarRange::Bit(3)))
        );
        assert_eq!(
            split_reference("offset[-1:0]"),
            ("offset".to_string(), Some(VarRange::Range(-1, 0)))
        );
        assert_eq!(split_reference("clk"), ("clk".to_string(), None));
        assert_eq!(split_reference("a[b]"), ("a[b]".to_string(), None));
        assert_eq!(split_reference("[3:0]"), ("[3:0]".to_string(), None));
    }
}
