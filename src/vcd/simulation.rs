// Copyright (C) 2022 Yehowshua Immanuel
// This program is distributed under both the GPLV3 license
// and the YEHOWSHUA license, both of which can be found at
// the root of the folder containing the sources for this program.

//! Forward-only replay of the body of a dump.
//!
//! A [`Simulation`] owns the lexer, the schema and the state buffer. Each
//! call to [`Simulation::advance`] applies every value change up to the
//! next timestamp that closes a batch and hands out a [`Cycle`], a view of
//! the buffer that lives until the following call.
use std::fs::File;
use std::io::Read;
use std::path::Path;

use num::BigUint;

use super::header_info::HeaderInfo;
use super::lexer::{Lexer, Token};
use super::offsets::OffsetTable;
use super::parse::{events::apply_bits, parse_header};
use super::reader::Cursor;
use super::signal::{LogicValue, Variable};
use super::state::{StateBuffer, UndoJournal};
use super::types::Schema;
use super::utilities::decode_variable;
use crate::error::{DecodeError, WaveError};
use crate::options::SimOptions;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SimState {
    Created,
    HeaderLoaded,
    StateAllocated,
    Running,
    Exhausted,
}

pub struct Simulation<R> {
    lexer: Lexer<R>,
    options: SimOptions,
    sim_state: SimState,
    schema: Option<Schema>,
    offsets: OffsetTable,
    buffer: StateBuffer,
    journal: UndoJournal,
    // timestamp in effect for the batch being read, `None` before the first
    time: Option<i64>,
    // index of the last cycle handed out
    cycle: Option<i64>,
}

impl Simulation<File> {
    /// Opens a dump on disk. Nothing is read until `load_header`.
    pub fn open(path: impl AsRef<Path>) -> Result<Simulation<File>, WaveError> {
        Simulation::open_with_options(path, SimOptions::default())
    }

    pub fn open_with_options(
        path: impl AsRef<Path>,
        options: SimOptions,
    ) -> Result<Simulation<File>, WaveError> {
        let file = File::open(path)?;
        Ok(Simulation::with_options(file, options))
    }
}

impl<R: Read> Simulation<R> {
    pub fn new(inner: R) -> Simulation<R> {
        Simulation::with_options(inner, SimOptions::default())
    }

    pub fn with_options(inner: R, options: SimOptions) -> Simulation<R> {
        Simulation {
            lexer: Lexer::with_capacity(options.read_capacity, inner),
            options,
            sim_state: SimState::Created,
            schema: None,
            offsets: OffsetTable::default(),
            buffer: StateBuffer::default(),
            journal: UndoJournal::default(),
            time: None,
            cycle: None,
        }
    }

    fn expect_state(&self, operation: &'static str, allowed: &[SimState]) -> Result<(), WaveError> {
        if allowed.contains(&self.sim_state) {
            Ok(())
        } else {
            Err(WaveError::InvalidState {
                operation,
                state: self.sim_state,
            })
        }
    }

    /// Parses the header. Only valid once, right after creation.
    pub fn load_header(&mut self) -> Result<&Schema, WaveError> {
        self.expect_state("load_header", &[SimState::Created])?;
        let schema = parse_header(&mut self.lexer)?;
        tracing::debug!(
            variables = schema.variables.len(),
            scopes = schema.scopes.len(),
            "loaded header"
        );
        self.sim_state = SimState::HeaderLoaded;
        Ok(self.schema.insert(schema))
    }

    /// Lays out the state buffer, tracking only the variables named in
    /// `restriction` when one is given. May be repeated until the first
    /// call to `advance`; each call starts over from an all-`U` buffer.
    pub fn allocate_state(&mut self, restriction: Option<&[&str]>) -> Result<&StateBuffer, WaveError> {
        self.expect_state(
            "allocate_state",
            &[SimState::HeaderLoaded, SimState::StateAllocated],
        )?;
        let Some(schema) = &self.schema else {
            return Err(WaveError::InvalidState {
                operation: "allocate_state",
                state: self.sim_state,
            });
        };

        let offsets =
            OffsetTable::allocate(schema, restriction, self.options.strict_restriction)?;
        tracing::debug!(
            tracked = offsets.num_tracked(),
            cells = offsets.len(),
            "allocated state buffer"
        );
        self.buffer = StateBuffer::new(offsets.len());
        self.offsets = offsets;
        self.sim_state = SimState::StateAllocated;
        Ok(&self.buffer)
    }

    /// Applies the next batch of value changes.
    ///
    /// Returns `Ok(None)` once the input is exhausted, and keeps doing so.
    /// When an error interrupts a batch the buffer is restored to the end
    /// of the previous cycle.
    pub fn advance(&mut self) -> Result<Option<Cycle<'_>>, WaveError> {
        self.expect_state(
            "advance",
            &[SimState::StateAllocated, SimState::Running, SimState::Exhausted],
        )?;
        if self.sim_state == SimState::Exhausted {
            return Ok(None);
        }
        self.sim_state = SimState::Running;

        // timestamps consumed before the error stay in effect, only the
        // cells are restored
        self.journal.clear();
        let index = match self.step() {
            Ok(index) => index,
            Err(e) => {
                self.journal.rollback(&mut self.buffer);
                return Err(e);
            }
        };

        let Some(index) = index else {
            tracing::trace!("end of input");
            self.sim_state = SimState::Exhausted;
            return Ok(None);
        };
        tracing::trace!(cycle = index, "cycle boundary");
        self.cycle = Some(index);

        match &self.schema {
            Some(schema) => Ok(Some(Cycle {
                index,
                state: &self.buffer,
                offsets: &self.offsets,
                schema,
            })),
            None => Err(WaveError::InvalidState {
                operation: "advance",
                state: self.sim_state,
            }),
        }
    }

    /// Reads tokens until a batch is complete and returns its index, or
    /// `None` when the input ended without any pending change.
    fn step(&mut self) -> Result<Option<i64>, WaveError> {
        let mut num_changes = 0usize;

        loop {
            let (token, cursor) = self.lexer.next_token()?;
            match token {
                Token::Timestamp(time) => {
                    let time = i64::try_from(time).map_err(|_| WaveError::Parse {
                        cursor,
                        message: format!("timestamp #{time} is too large for a cycle index"),
                    })?;
                    if let Some(current) = self.time {
                        if time < current {
                            return Err(WaveError::Parse {
                                cursor,
                                message: format!(
                                    "timestamp #{time} goes back in time from #{current}"
                                ),
                            });
                        }
                        if time == current {
                            continue;
                        }
                    }
                    let index = self.cycle_index();
                    self.time = Some(time);
                    if num_changes > 0 {
                        return Ok(Some(index));
                    }
                }
                Token::ScalarChange { value, id } => {
                    num_changes += 1;
                    self.apply(&id, &[value], cursor)?;
                }
                Token::VectorChange { bits, id } => {
                    num_changes += 1;
                    self.apply(&id, &bits, cursor)?;
                }
                // real and string values have no place in the buffer
                Token::RealChange { id, .. } | Token::StringChange { id, .. } => {
                    num_changes += 1;
                    tracing::trace!(id = id.as_str(), "skipping non binary value change");
                }
                Token::Directive { .. } => {}
                Token::EndOfInput => {
                    return Ok((num_changes > 0).then(|| self.cycle_index()));
                }
                other @ (Token::ScopeOpen { .. }
                | Token::ScopeClose
                | Token::VarDecl(_)
                | Token::HeaderEnd) => {
                    return Err(WaveError::Parse {
                        cursor,
                        message: format!("found {other:?} after `$enddefinitions`"),
                    })
                }
            }
        }
    }

    fn cycle_index(&self) -> i64 {
        self.time.unwrap_or(-1)
    }

    fn apply(&mut self, id: &str, bits: &[LogicValue], cursor: Cursor) -> Result<(), WaveError> {
        let Some(slot) = self.offsets.slot(id) else {
            if !self.offsets.is_declared(id) {
                tracing::debug!(%cursor, id, "value change for an undeclared id");
            }
            return Ok(());
        };
        apply_bits(
            &mut self.buffer,
            slot.offset,
            slot.width as usize,
            bits,
            &mut self.journal,
        )
        .map_err(|message| WaveError::Parse {
            cursor,
            message: format!("in value change for `{id}`: {message}"),
        })
    }

    /// JSON-ready description of the header and, once allocated, of the
    /// buffer layout.
    pub fn header_info(&self) -> Result<HeaderInfo, WaveError> {
        let Some(schema) = &self.schema else {
            return Err(WaveError::InvalidState {
                operation: "header_info",
                state: self.sim_state,
            });
        };
        let offsets = match self.sim_state {
            SimState::Created | SimState::HeaderLoaded => None,
            _ => Some(&self.offsets),
        };
        Ok(HeaderInfo::new(schema, offsets))
    }

    pub fn schema(&self) -> Option<&Schema> {
        self.schema.as_ref()
    }

    pub fn offsets(&self) -> &OffsetTable {
        &self.offsets
    }

    pub fn state(&self) -> &StateBuffer {
        &self.buffer
    }

    pub fn sim_state(&self) -> SimState {
        self.sim_state
    }

    /// Index of the last cycle returned by `advance`.
    pub fn cycle(&self) -> Option<i64> {
        self.cycle
    }
}

/// The buffer as it stands at the end of one batch of value changes.
#[derive(Debug, Clone, Copy)]
pub struct Cycle<'a> {
    index: i64,
    state: &'a StateBuffer,
    offsets: &'a OffsetTable,
    schema: &'a Schema,
}

impl<'a> Cycle<'a> {
    /// The timestamp the batch was recorded at, `-1` for the changes that
    /// precede the first timestamp.
    pub fn index(&self) -> i64 {
        self.index
    }

    pub fn state(&self) -> &'a StateBuffer {
        self.state
    }

    pub fn as_raw(&self) -> &'a [i8] {
        self.state.as_raw()
    }

    pub fn decode(&self, variable: &Variable) -> Result<BigUint, DecodeError> {
        decode_variable(self.state, variable, self.offsets)
    }

    pub fn decode_id(&self, id: &str) -> Result<BigUint, DecodeError> {
        let variable = self
            .schema
            .variable_by_id(id)
            .ok_or_else(|| DecodeError::Untracked { id: id.to_string() })?;
        self.decode(variable)
    }

    pub fn decode_path(&self, path: &str) -> Result<BigUint, DecodeError> {
        let variable = self
            .schema
            .variable_by_path(path)
            .ok_or_else(|| DecodeError::Untracked {
                id: path.to_string(),
            })?;
        self.decode(variable)
    }

    /// The cells of `id` rendered as value characters, e.g. `01XZ`.
    pub fn render_id(&self, id: &str) -> Option<String> {
        let slot = self.offsets.slot(id)?;
        self.state.render(slot.range())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLK: &str = "\
$timescale 1ns $end
$scope module top $end
$var wire 1 ! clk $end
$var wire 4 # count [3:0] $end
$upscope $end
$enddefinitions $end
";

    fn simulation(body: &str) -> Simulation<std::io::Cursor<Vec<u8>>> {
        let input = format!("{CLK}{body}").into_bytes();
        let mut sim = Simulation::with_options(
            std::io::Cursor::new(input),
            SimOptions::default().read_capacity(8),
        );
        sim.load_header().unwrap();
        sim.allocate_state(None).unwrap();
        sim
    }

    fn indices(sim: &mut Simulation<std::io::Cursor<Vec<u8>>>) -> Vec<i64> {
        let mut indices = vec![];
        while let Some(cycle) = sim.advance().unwrap() {
            indices.push(cycle.index());
        }
        indices
    }

    #[test]
    fn lifecycle_is_enforced() {
        let mut sim = Simulation::new(CLK.as_bytes());
        assert_eq!(sim.sim_state(), SimState::Created);
        assert!(matches!(
            sim.advance(),
            Err(WaveError::InvalidState {
                operation: "advance",
                state: SimState::Created
            })
        ));
        assert!(sim.allocate_state(None).is_err());
        assert!(sim.header_info().is_err());

        sim.load_header().unwrap();
        assert!(sim.load_header().is_err());
        assert!(sim.advance().is_err());

        sim.allocate_state(Some(&["clk"])).unwrap();
        assert_eq!(sim.state().len(), 1);
        // reallocating before the first advance is allowed
        sim.allocate_state(None).unwrap();
        assert_eq!(sim.state().len(), 5);

        assert!(sim.advance().unwrap().is_none());
        assert_eq!(sim.sim_state(), SimState::Exhausted);
        assert!(sim.allocate_state(None).is_err());
    }

    #[test]
    fn batches_end_at_timestamps() {
        let mut sim = simulation("#0\n0!\nb0 #\n#5\n1!\n#10\nb11 #\n0!\n#15\n");
        let cycle = sim.advance().unwrap().unwrap();
        assert_eq!(cycle.index(), 0);
        assert_eq!(cycle.as_raw(), &[0, 0, 0, 0, 0]);

        let cycle = sim.advance().unwrap().unwrap();
        assert_eq!(cycle.index(), 5);
        assert_eq!(cycle.decode_id("!"), Ok(BigUint::from(1u8)));

        let cycle = sim.advance().unwrap().unwrap();
        assert_eq!(cycle.index(), 10);
        assert_eq!(cycle.decode_path("top.count"), Ok(BigUint::from(3u8)));
        assert_eq!(cycle.render_id("#"), Some("0011".to_string()));
        assert_eq!(sim.cycle(), Some(10));

        assert!(sim.advance().unwrap().is_none());
        assert!(sim.advance().unwrap().is_none());
        assert_eq!(sim.sim_state(), SimState::Exhausted);
    }

    #[test]
    fn changes_before_the_first_timestamp_are_cycle_minus_one() {
        let mut sim = simulation("$dumpvars\nx!\nbz #\n$end\n#3\n1!\n");
        let cycle = sim.advance().unwrap().unwrap();
        assert_eq!(cycle.index(), -1);
        assert_eq!(cycle.as_raw(), &[-4, -3, -3, -3, -3]);
        assert!(cycle.decode_id("!").is_err());
        assert_eq!(indices(&mut sim), [3]);
    }

    #[test]
    fn timestamps_without_changes_are_skipped() {
        let mut sim = simulation("#0\n#1\n#2\n1!\n#3\n#3\n#4\n0!\n");
        assert_eq!(indices(&mut sim), [2, 4]);
    }

    #[test]
    fn untracked_changes_still_close_a_batch() {
        let input = format!("{CLK}#0\n1!\n#1\nb1 #\n#2\n");
        let mut sim = Simulation::new(input.as_bytes());
        sim.load_header().unwrap();
        sim.allocate_state(Some(&["clk"])).unwrap();

        let cycle = sim.advance().unwrap().unwrap();
        assert_eq!((cycle.index(), cycle.as_raw()), (0, &[1i8][..]));
        assert!(matches!(
            cycle.decode_id("#"),
            Err(DecodeError::Untracked { .. })
        ));
        let cycle = sim.advance().unwrap().unwrap();
        assert_eq!((cycle.index(), cycle.as_raw()), (1, &[1i8][..]));
    }

    #[test]
    fn failed_batches_are_rolled_back() {
        let mut sim = simulation("#0\n0!\nb0101 #\n#1\n1!\nb1111 #\nb10000 #\n#2\n");
        sim.advance().unwrap().unwrap();

        let res = sim.advance();
        assert!(matches!(res, Err(WaveError::Parse { .. })), "{:?}", res.err());
        assert_eq!(sim.state().as_raw(), &[0, 0, 1, 0, 1]);
        assert_eq!(sim.cycle(), Some(0));
    }

    #[test]
    fn timestamps_beyond_i64_are_rejected() {
        let mut sim = simulation(
            "#9223372036854775806\n1!\n#9223372036854775808\n0!\n#9223372036854775809\n",
        );
        let res = sim.advance();
        assert!(matches!(res, Err(WaveError::Parse { .. })), "{:?}", res.err());
        assert_eq!(sim.state().as_raw()[0], -1);

        // the next oversized timestamp fails the same way
        let res = sim.advance();
        assert!(matches!(res, Err(WaveError::Parse { .. })), "{:?}", res.err());
        assert!(sim.advance().unwrap().is_none());
        assert_eq!(sim.cycle(), None);
    }

    #[test]
    fn rollback_keeps_consumed_timestamps() {
        let mut sim = simulation("#0\n1!\n#1\n#2\n?!\n0!\n#3\n");
        assert_eq!(sim.advance().unwrap().unwrap().index(), 0);
        assert!(matches!(sim.advance(), Err(WaveError::Parse { .. })));

        let cycle = sim.advance().unwrap().unwrap();
        assert_eq!(cycle.index(), 2);
        assert_eq!(cycle.decode_id("!"), Ok(BigUint::from(0u8)));
    }

    #[test]
    fn timestamps_must_not_decrease() {
        let mut sim = simulation("#5\n1!\n#4\n0!\n");
        let res = sim.advance();
        assert!(matches!(res, Err(WaveError::Parse { .. })), "{:?}", res.err());
    }

    #[test]
    fn header_info_reports_offsets_once_allocated() {
        let mut sim = Simulation::new(CLK.as_bytes());
        sim.load_header().unwrap();
        let info = sim.header_info().unwrap();
        assert_eq!(info.buffer_len, 0);
        assert!(info.variables.iter().all(|var| var.offset.is_none()));

        sim.allocate_state(None).unwrap();
        let info = sim.header_info().unwrap();
        assert_eq!(info.buffer_len, 5);
        let offsets: Vec<Option<usize>> = info.variables.iter().map(|var| var.offset).collect();
        assert_eq!(offsets, [Some(0), Some(1)]);
    }
}
