// Copyright (C) 2022 Yehowshua Immanuel
// This program is distributed under both the GPLV3 license
// and the YEHOWSHUA license, both of which can be found at
// the root of the folder containing the sources for this program.

//! part of the vcd parser that writes value changes into the state buffer
use super::super::signal::LogicValue;
use super::super::state::{StateBuffer, UndoJournal};

/// Writes `bits` into the `width` cells starting at `offset`, left-extending
/// values shorter than the variable: a leading `0` or `1` is padded with
/// `0`, anything else with copies of itself.
///
/// Returns an error message when the value is wider than the variable.
pub(crate) fn apply_bits(
    buffer: &mut StateBuffer,
    offset: usize,
    width: usize,
    bits: &[LogicValue],
    journal: &mut UndoJournal,
) -> Result<(), String> {
    let observed_num_bits = bits.len();
    if observed_num_bits > width {
        return Err(format!(
            "value has {observed_num_bits} bits but the variable is {width} bits wide"
        ));
    }

    let pad = match bits.first() {
        Some(LogicValue::One) | Some(LogicValue::Zero) | None => LogicValue::Zero,
        Some(other) => *other,
    };
    let num_pad = width - observed_num_bits;

    let cells = buffer.cells_mut();
    let values = std::iter::repeat(pad).take(num_pad).chain(bits.iter().copied());
    for (cell_idx, value) in (offset..offset + width).zip(values) {
        journal.record(cell_idx, cells[cell_idx]);
        cells[cell_idx] = value;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use LogicValue::*;

    fn applied(width: usize, bits: &[LogicValue]) -> Result<Vec<LogicValue>, String> {
        let mut buffer = StateBuffer::new(width + 2);
        let mut journal = UndoJournal::default();
        apply_bits(&mut buffer, 1, width, bits, &mut journal)?;
        let cells = buffer.as_slice();
        assert_eq!((cells[0], cells[width + 1]), (U, U), "neighbours untouched");
        Ok(cells[1..=width].to_vec())
    }

    #[test]
    fn full_width_values_are_copied() {
        assert_eq!(applied(4, &[One, Zero, X, Z]), Ok(vec![One, Zero, X, Z]));
    }

    #[test]
    fn short_values_are_left_extended() {
        assert_eq!(applied(4, &[One]), Ok(vec![Zero, Zero, Zero, One]));
        assert_eq!(applied(4, &[Zero, One]), Ok(vec![Zero, Zero, Zero, One]));
        assert_eq!(applied(3, &[X]), Ok(vec![X, X, X]));
        assert_eq!(applied(3, &[Z, One]), Ok(vec![Z, Z, One]));
    }

    #[test]
    fn wide_values_are_rejected() {
        assert!(applied(2, &[One, One, One]).is_err());
    }
}
