// Copyright (C) 2022 Yehowshua Immanuel
// This program is distributed under both the GPLV3 license
// and the YEHOWSHUA license, both of which can be found at
// the root of the folder containing the sources for this program.
use std::fmt;

use serde::{Deserialize, Serialize};

/// The value of a single bit in the state buffer.
///
/// The discriminants are the signed byte encoding exposed through
/// `StateBuffer::as_raw`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i8)]
pub enum LogicValue {
    Zero = 0,
    One = 1,
    /// uninitialized
    U = -1,
    /// weak
    W = -2,
    /// high impedance
    Z = -3,
    /// unknown
    X = -4,
}

impl LogicValue {
    /// Maps a VCD value character. `H`/`L` (VHDL weak levels) become `W`
    /// and the don't-care `-` becomes `X`.
    pub fn from_char(chr: u8) -> Option<LogicValue> {
        match chr {
            b'0' => Some(LogicValue::Zero),
            b'1' => Some(LogicValue::One),
            b'u' | b'U' => Some(LogicValue::U),
            b'w' | b'W' | b'h' | b'H' | b'l' | b'L' => Some(LogicValue::W),
            b'z' | b'Z' => Some(LogicValue::Z),
            b'x' | b'X' | b'-' => Some(LogicValue::X),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            LogicValue::Zero => '0',
            LogicValue::One => '1',
            LogicValue::U => 'U',
            LogicValue::W => 'W',
            LogicValue::Z => 'Z',
            LogicValue::X => 'X',
        }
    }

    /// Only `0` and `1` carry a numeric value.
    pub fn is_defined(self) -> bool {
        matches!(self, LogicValue::Zero | LogicValue::One)
    }

    pub fn as_i8(self) -> i8 {
        self as i8
    }
}

impl TryFrom<i8> for LogicValue {
    type Error = i8;

    fn try_from(raw: i8) -> Result<Self, Self::Error> {
        match raw {
            0 => Ok(LogicValue::Zero),
            1 => Ok(LogicValue::One),
            -1 => Ok(LogicValue::U),
            -2 => Ok(LogicValue::W),
            -3 => Ok(LogicValue::Z),
            -4 => Ok(LogicValue::X),
            other => Err(other),
        }
    }
}

impl fmt::Display for LogicValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum VarType {
    Event,
    Integer,
    Parameter,
    Real,
    RealParameter,
    RealTime,
    Reg,
    Str,
    Supply0,
    Supply1,
    Tri,
    TriAnd,
    TriOr,
    TriReg,
    Tri0,
    Tri1,
    WAnd,
    Wire,
    WOr,
    Time,
    Port,
    SparseArray,
    SVInt,
    SVShortInt,
    SVLongInt,
    SVChar,
    SVBit,
    SVLogic,
    SVShortReal,
    SVEnum,
}

impl VarType {
    pub const KEYWORDS: [&'static str; 33] = [
        "event",
        "integer",
        "parameter",
        "real",
        "real_parameter",
        "realtime",
        "reg",
        "string",
        "supply0",
        "supply1",
        "tri",
        "triand",
        "trior",
        "trireg",
        "tri0",
        "tri1",
        "wand",
        "wire",
        "wor",
        "time",
        "port",
        "sparray",
        "int",
        "int_s",
        "shortint",
        "int_l",
        "longint",
        "char",
        "byte",
        "logic",
        "bit",
        "shortreal",
        "enum",
    ];

    // $var parameter 3 a IDLE $end
    //      ^^^^^^^^^ - var_type
    pub fn from_keyword(word: &str) -> Option<VarType> {
        let var_type = match word {
            "event" => VarType::Event,
            "integer" => VarType::Integer,
            "parameter" => VarType::Parameter,
            "real" => VarType::Real,
            "real_parameter" => VarType::RealParameter,
            "realtime" => VarType::RealTime,
            "reg" => VarType::Reg,
            "string" => VarType::Str,
            "supply0" => VarType::Supply0,
            "supply1" => VarType::Supply1,
            "tri" => VarType::Tri,
            "triand" => VarType::TriAnd,
            "trior" => VarType::TriOr,
            "trireg" => VarType::TriReg,
            "tri0" => VarType::Tri0,
            "tri1" => VarType::Tri1,
            "wand" => VarType::WAnd,
            "wire" => VarType::Wire,
            "wor" => VarType::WOr,
            "time" => VarType::Time,
            "port" => VarType::Port,
            "sparray" => VarType::SparseArray,
            "int" => VarType::SVInt,
            "int_s" | "shortint" => VarType::SVShortInt,
            "int_l" | "longint" => VarType::SVLongInt,
            "char" | "byte" => VarType::SVChar,
            "logic" => VarType::SVLogic,
            "bit" => VarType::SVBit,
            "shortreal" => VarType::SVShortReal,
            "enum" => VarType::SVEnum,
            _ => return None,
        };
        Some(var_type)
    }
}

/// Index range as written after the reference in a `$var` declaration,
/// e.g. `[7:0]` or `[3]`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum VarRange {
    Bit(i64),
    Range(i64, i64),
}

/// Order of the cells of a variable in the state buffer relative to the
/// numeric significance of its bits.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BitOrder {
    /// cell `i` holds bit `i` (declared as `[0:7]`)
    Ascending,
    /// cell `0` holds the most significant bit (declared as `[7:0]`, or
    /// without a range)
    Descending,
}

impl BitOrder {
    pub fn from_range(range: Option<VarRange>) -> BitOrder {
        match range {
            Some(VarRange::Range(left, right)) if left < right => BitOrder::Ascending,
            _ => BitOrder::Descending,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    pub id: String,
    pub name: String,
    /// names of the enclosing scopes, outermost first
    pub scope: Vec<String>,
    pub width: u32,
    pub var_type: VarType,
    pub range: Option<VarRange>,
    pub bit_order: BitOrder,
}

impl Variable {
    /// Dotted hierarchical name, e.g. `tb.dut.clk`.
    pub fn path(&self) -> String {
        self.scope
            .iter()
            .map(String::as_str)
            .chain([self.name.as_str()])
            .collect::<Vec<&str>>()
            .join(".")
    }
}
