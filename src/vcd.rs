// Copyright (C) 2022 Yehowshua Immanuel
// This program is distributed under both the GPLV3 license
// and the YEHOWSHUA license, both of which can be found at
// the root of the folder containing the sources for this program.
mod reader;
pub use reader::{ByteOffset, Cursor, Line, Word};

mod lexer;
pub use lexer::{Declaration, Lexer, Token};

mod signal;
pub use signal::{BitOrder, LogicValue, VarRange, VarType, Variable};

mod types;
pub use types::{Metadata, Schema, Scope, ScopeIdx, ScopeKind, Timescale, VarIdx, Version};

mod parse;
pub use parse::parse_header;

mod offsets;
pub use offsets::{OffsetTable, Slot};

mod state;
pub use state::StateBuffer;

mod simulation;
pub use simulation::{Cycle, SimState, Simulation};

mod utilities;
pub use utilities::{decode, decode_variable};

mod header_info;
pub use header_info::{HeaderInfo, VariableInfo};
