// Copyright (C) 2022 Yehowshua Immanuel
// This program is distributed under both the GPLV3 license
// and the YEHOWSHUA license, both of which can be found at
// the root of the folder containing the sources for this program.
use std::collections::{HashMap, HashSet};
use std::ops::Range;

use serde::{Deserialize, Serialize};

use super::types::Schema;
use crate::error::WaveError;

/// The cells reserved for one variable id in the state buffer.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub offset: usize,
    pub width: u32,
}

impl Slot {
    pub fn range(&self) -> Range<usize> {
        self.offset..self.offset + self.width as usize
    }
}

/// Maps every declared id to its slot, or to `None` when the id was left
/// out by a restriction. Tracked slots are laid out back to back in
/// declaration order and together cover `0..len()`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OffsetTable {
    slots: HashMap<String, Option<Slot>>,
    // tracked ids by ascending offset
    tracked: Vec<String>,
    len: usize,
}

impl OffsetTable {
    /// Assigns offsets to the variables whose `name` is in `restriction`,
    /// or to every variable when the restriction is absent or empty.
    ///
    /// Names that match no variable are ignored, unless `strict` is set in
    /// which case they are reported as `WaveError::UnknownVariables`.
    pub fn allocate(
        schema: &Schema,
        restriction: Option<&[&str]>,
        strict: bool,
    ) -> Result<OffsetTable, WaveError> {
        let retained: Option<HashSet<&str>> = match restriction {
            Some(names) if !names.is_empty() => Some(names.iter().copied().collect()),
            _ => None,
        };

        if let Some(retained) = &retained {
            let mut unknown: Vec<String> = retained
                .iter()
                .filter(|name| schema.variables_named(name).next().is_none())
                .map(|name| name.to_string())
                .collect();
            if !unknown.is_empty() {
                unknown.sort();
                if strict {
                    return Err(WaveError::UnknownVariables(unknown));
                }
                tracing::debug!(?unknown, "ignoring restriction names without a variable");
            }
        }

        let mut table = OffsetTable::default();
        for var in &schema.variables {
            let keep = match &retained {
                Some(retained) => retained.contains(var.name.as_str()),
                None => true,
            };

            // aliases share the slot of the first retained declaration
            match table.slots.get(&var.id).copied() {
                Some(Some(_)) => continue,
                Some(None) | None if !keep => {
                    table.slots.entry(var.id.clone()).or_insert(None);
                    continue;
                }
                _ => {}
            }

            let slot = Slot {
                offset: table.len,
                width: var.width,
            };
            table.len += var.width as usize;
            table.slots.insert(var.id.clone(), Some(slot));
            table.tracked.push(var.id.clone());
        }

        Ok(table)
    }

    pub fn slot(&self, id: &str) -> Option<Slot> {
        self.slots.get(id).copied().flatten()
    }

    pub fn offset(&self, id: &str) -> Option<usize> {
        self.slot(id).map(|slot| slot.offset)
    }

    /// `true` for every id the header declared, tracked or not.
    pub fn is_declared(&self, id: &str) -> bool {
        self.slots.contains_key(id)
    }

    /// Length of the state buffer, i.e. the sum of the tracked widths.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn num_tracked(&self) -> usize {
        self.tracked.len()
    }

    /// Tracked ids with their slots, by ascending offset.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Slot)> + '_ {
        self.tracked
            .iter()
            .filter_map(|id| self.slot(id).map(|slot| (id.as_str(), slot)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vcd::{parse_header, Lexer};

    const HEADER: &str = "\
$scope module top $end
$var wire 1 ! clk $end
$var wire 8 \" data [7:0] $end
$var wire 4 # nibble [3:0] $end
$scope module sub $end
$var wire 1 ! clk $end
$var wire 3 $ data [2:0] $end
$upscope $end
$upscope $end
$enddefinitions $end
";

    fn schema() -> Schema {
        parse_header(&mut Lexer::new(HEADER.as_bytes())).unwrap()
    }

    fn assert_packed(table: &OffsetTable) {
        let mut next = 0;
        for (_, slot) in table.iter() {
            assert_eq!(slot.offset, next);
            next += slot.width as usize;
        }
        assert_eq!(next, table.len());
    }

    #[test]
    fn everything_is_tracked_without_restriction() {
        let schema = schema();
        for restriction in [None, Some(&[][..])] {
            let table = OffsetTable::allocate(&schema, restriction, false).unwrap();
            // the aliased clk only takes one slot
            assert_eq!(table.len(), 1 + 8 + 4 + 3);
            assert_eq!(table.num_tracked(), 4);
            assert_eq!(table.offset("!"), Some(0));
            assert_eq!(table.offset("\""), Some(1));
            assert_eq!(table.offset("#"), Some(9));
            assert_eq!(table.offset("$"), Some(13));
            assert_packed(&table);
        }
    }

    #[test]
    fn restriction_keeps_declaration_order() {
        let schema = schema();
        let table = OffsetTable::allocate(&schema, Some(&["nibble", "clk"]), false).unwrap();
        let ids: Vec<&str> = table.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, ["!", "#"]);
        assert_eq!(table.slot("#"), Some(Slot { offset: 1, width: 4 }));
        assert_eq!(table.slot("\""), None);
        assert!(table.is_declared("\""));
        assert!(!table.is_declared("%"));
        assert_packed(&table);
    }

    #[test]
    fn restriction_matches_names_in_every_scope() {
        let schema = schema();
        let table = OffsetTable::allocate(&schema, Some(&["data"]), false).unwrap();
        assert_eq!(table.len(), 11);
        assert_eq!(table.offset("$"), Some(8));
    }

    #[test]
    fn unknown_names_are_ignored() {
        let schema = schema();
        let table = OffsetTable::allocate(&schema, Some(&["nope"]), false).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.num_tracked(), 0);

        let table = OffsetTable::allocate(&schema, Some(&["nope", "clk"]), false).unwrap();
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn unknown_names_fail_in_strict_mode() {
        let schema = schema();
        match OffsetTable::allocate(&schema, Some(&["zz", "clk", "aa"]), true) {
            Err(WaveError::UnknownVariables(names)) => assert_eq!(names, ["aa", "zz"]),
            other => panic!("expected unknown variables, got {other:?}"),
        }
        assert!(OffsetTable::allocate(&schema, Some(&["clk"]), true).is_ok());
    }

    #[test]
    fn names_are_case_sensitive() {
        let schema = schema();
        let table = OffsetTable::allocate(&schema, Some(&["CLK"]), false).unwrap();
        assert!(table.is_empty());
    }
}
