// Copyright (C) 2022 Yehowshua Immanuel
// This program is distributed under both the GPLV3 license
// and the YEHOWSHUA license, both of which can be found at
// the root of the folder containing the sources for this program.
use std::ops::Range;

use super::signal::LogicValue;

/// One cell per tracked bit. Allocated once, reset to all `U`, then only
/// ever overwritten in place.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StateBuffer {
    cells: Vec<LogicValue>,
}

impl StateBuffer {
    pub(crate) fn new(len: usize) -> StateBuffer {
        StateBuffer {
            cells: vec![LogicValue::U; len],
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn as_slice(&self) -> &[LogicValue] {
        &self.cells
    }

    /// The buffer as signed bytes, using the `LogicValue` discriminants.
    pub fn as_raw(&self) -> &[i8] {
        // SAFETY: LogicValue is repr(i8), so it has the size and alignment
        // of an i8 and every variant is a valid i8.
        unsafe { std::slice::from_raw_parts(self.cells.as_ptr().cast::<i8>(), self.cells.len()) }
    }

    pub fn get(&self, range: Range<usize>) -> Option<&[LogicValue]> {
        self.cells.get(range)
    }

    /// Renders a slice as VCD value characters, e.g. `01XZ`.
    pub fn render(&self, range: Range<usize>) -> Option<String> {
        self.get(range)
            .map(|cells| cells.iter().map(|cell| cell.as_char()).collect())
    }

    pub(crate) fn cells_mut(&mut self) -> &mut [LogicValue] {
        &mut self.cells
    }
}

/// Old values of every cell written since the last cycle boundary, so a
/// cycle that fails half way can be undone.
#[derive(Debug, Default)]
pub(crate) struct UndoJournal {
    entries: Vec<(usize, LogicValue)>,
}

impl UndoJournal {
    pub(crate) fn record(&mut self, idx: usize, old: LogicValue) {
        self.entries.push((idx, old));
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    pub(crate) fn rollback(&mut self, buffer: &mut StateBuffer) {
        let cells = buffer.cells_mut();
        for (idx, old) in self.entries.drain(..).rev() {
            cells[idx] = old;
        }
    }
}
