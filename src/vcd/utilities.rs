// Copyright (C) 2022 Yehowshua Immanuel
// This program is distributed under both the GPLV3 license
// and the YEHOWSHUA license, both of which can be found at
// the root of the folder containing the sources for this program.
use num::BigUint;

use super::offsets::OffsetTable;
use super::signal::{BitOrder, LogicValue, Variable};
use super::state::StateBuffer;
use crate::error::DecodeError;

const BIT_LUT: [u8; 8] = [
    0b0000_0001u8,
    0b0000_0010u8,
    0b0000_0100u8,
    0b0000_1000u8,
    0b0001_0000u8,
    0b0010_0000u8,
    0b0100_0000u8,
    0b1000_0000u8,
];

/// Packs a run of cells into an unsigned integer of arbitrary width.
///
/// With `BitOrder::Ascending` cell `i` is bit `i`; with
/// `BitOrder::Descending` the first cell is the most significant bit.
/// Fails on the first cell that is neither `0` nor `1`.
pub fn decode(cells: &[LogicValue], bit_order: BitOrder) -> Result<BigUint, DecodeError> {
    let width = cells.len();
    // little endian bytes, as BigUint::from_bytes_le expects them
    let mut bytes = vec![0u8; width.div_ceil(8)];

    for (index, cell) in cells.iter().enumerate() {
        let bit = match bit_order {
            BitOrder::Ascending => index,
            BitOrder::Descending => width - 1 - index,
        };
        match cell {
            LogicValue::One => bytes[bit / 8] |= BIT_LUT[bit % 8],
            LogicValue::Zero => {}
            other => {
                return Err(DecodeError::Undefined {
                    index,
                    value: *other,
                })
            }
        }
    }

    Ok(BigUint::from_bytes_le(&bytes))
}

/// Decodes the cells `variable` occupies in `buffer`.
pub fn decode_variable(
    buffer: &StateBuffer,
    variable: &Variable,
    offsets: &OffsetTable,
) -> Result<BigUint, DecodeError> {
    let slot = offsets
        .slot(&variable.id)
        .ok_or_else(|| DecodeError::Untracked {
            id: variable.id.clone(),
        })?;
    let range = slot.range();
    let cells = buffer
        .get(range.clone())
        .ok_or(DecodeError::OutOfBounds {
            offset: range.start,
            end: range.end,
            len: buffer.len(),
        })?;
    decode(cells, variable.bit_order)
}
