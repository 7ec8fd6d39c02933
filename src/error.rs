// Copyright (C) 2022 Yehowshua Immanuel
// This program is distributed under both the GPLV3 license
// and the YEHOWSHUA license, both of which can be found at
// the root of the folder containing the sources for this program.

//! Error types and the status-code taxonomy used at the handle boundary.

use std::io;

use crate::vcd::{Cursor, LogicValue, SimState};

/// Reasons a buffer slice cannot be turned into an integer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// A cell holds something other than `0` or `1`.
    #[error("bit {index} is `{value}`, only 0 and 1 can be decoded")]
    Undefined { index: usize, value: LogicValue },

    /// The variable has no slot in the state buffer.
    #[error("variable `{id}` is not tracked in the state buffer")]
    Untracked { id: String },

    /// The slice does not fit inside the buffer.
    #[error("cells {offset}..{end} are outside of a buffer of {len} cells")]
    OutOfBounds { offset: usize, end: usize, len: usize },
}

#[derive(Debug, thiserror::Error)]
pub enum WaveError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid UTF-8 at {cursor}")]
    Utf8 { cursor: Cursor },

    #[error("parse error at {cursor}: {message}")]
    Parse { cursor: Cursor, message: String },

    /// The input ended before `$enddefinitions`.
    #[error("input ended at {cursor} before the header was complete")]
    PartialHeader { cursor: Cursor },

    /// An operation was called in a state that does not allow it.
    #[error("`{operation}` cannot be called while the simulation is {state:?}")]
    InvalidState {
        operation: &'static str,
        state: SimState,
    },

    /// Restriction names that match no declared variable, in strict mode.
    #[error("no variable is named {0:?}")]
    UnknownVariables(Vec<String>),

    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("failed to (de)serialize the header description: {0}")]
    Json(#[from] serde_json::Error),

    /// Every cycle has been consumed.
    #[error("end of input")]
    EndOfInput,
}

impl WaveError {
    pub fn status(&self) -> Status {
        Status::from(self)
    }
}

/// Outcome classes reported across the handle boundary.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Status {
    Ok = 0,
    IoError = 1,
    ParseError = 2,
    MissingData = 3,
    PartialHeader = 4,
    Utf8Error = 5,
    EndOfInput = 6,
    Unknown = 255,
}

impl Status {
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn is_ok(self) -> bool {
        self == Status::Ok
    }
}

impl From<&WaveError> for Status {
    fn from(err: &WaveError) -> Status {
        match err {
            WaveError::Io(_) => Status::IoError,
            WaveError::Utf8 { .. } => Status::Utf8Error,
            WaveError::Parse { .. } => Status::ParseError,
            WaveError::PartialHeader { .. } => Status::PartialHeader,
            WaveError::InvalidState { .. }
            | WaveError::UnknownVariables(_)
            | WaveError::Decode(_) => Status::MissingData,
            WaveError::EndOfInput => Status::EndOfInput,
            WaveError::Json(_) => Status::Unknown,
        }
    }
}

impl From<DecodeError> for Status {
    fn from(_: DecodeError) -> Status {
        Status::MissingData
    }
}
