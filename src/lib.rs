// Copyright (C) 2022 Yehowshua Immanuel
// This program is distributed under both the GPLV3 license
// and the YEHOWSHUA license, both of which can be found at
// the root of the folder containing the sources for this program.

mod vcd;
pub use vcd::parse_header;
pub use vcd::{ByteOffset, Cursor, Line, Word};
pub use vcd::{Cycle, SimState, Simulation};
pub use vcd::{Declaration, Lexer, Token};
pub use vcd::{BitOrder, LogicValue, VarRange, VarType, Variable};
pub use vcd::{HeaderInfo, VariableInfo};
pub use vcd::{Metadata, Timescale, Version};
pub use vcd::{OffsetTable, Slot, StateBuffer};
pub use vcd::{Schema, Scope, ScopeIdx, ScopeKind, VarIdx};
pub use vcd::{decode, decode_variable};

pub mod error;
pub use error::{DecodeError, Status, WaveError};

pub mod handle;
pub use handle::{Engine, Handle};

pub mod options;
pub use options::SimOptions;

pub use num::BigUint;
