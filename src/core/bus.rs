//
//  Copyright (C) 2022-2024  Chase Ruskin
//
//  This program is free software: you can redistribute it and/or modify
//  it under the terms of the GNU General Public License as published by
//  the Free Software Foundation, either version 3 of the License, or
//  (at your option) any later version.
//
//  This program is distributed in the hope that it will be useful,
//  but WITHOUT ANY WARRANTY; without even the implied warranty of
//  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
//  GNU General Public License for more details.
//
//  You should have received a copy of the GNU General Public License
//  along with this program.  If not, see <http://www.gnu.org/licenses/>.
//

//! Two-state bit-vector values and the buses that hold them.
//!
//! Buses are stored in a dense arena (see [`crate::core::component::Component`])
//! and referenced by [`BusHandle`] rather than by name or reference, so that
//! feedback cycles (an RS latch referencing its own output) need no reference
//! counting.

use super::ir::IrNode;
use std::fmt;

/// An index into a [`Component`](super::component::Component)'s bus arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BusHandle(pub usize);

/// A fixed-width two-state bit vector, MSB-first.
///
/// Width is fixed at construction; all elementwise operators panic if given
/// operands of differing width; width compatibility is instead enforced once,
/// at elaboration time, by the semantic builder (see [`crate::core::builder`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusValue {
    bits: Vec<bool>,
}

impl BusValue {
    /// Builds a value from MSB-first booleans.
    pub fn new(bits: Vec<bool>) -> Self {
        Self { bits }
    }

    /// The default (all-zero) value of the given width.
    pub fn zeroed(width: usize) -> Self {
        Self { bits: vec![false; width.max(1)] }
    }

    /// Parses a bit-field lexeme's inner text (no surrounding quotes) such as
    /// `"1010"` into a `BusValue`, MSB-first.
    ///
    /// Panics if any character is not `0` or `1`; callers must only pass text
    /// already validated by the scanner's bit-field classification.
    pub fn from_bit_string(s: &str) -> Self {
        Self {
            bits: s
                .chars()
                .map(|c| match c {
                    '0' => false,
                    '1' => true,
                    other => panic!("not a bit character: {:?}", other),
                })
                .collect(),
        }
    }

    pub fn width(&self) -> usize {
        self.bits.len()
    }

    pub fn bits(&self) -> &[bool] {
        &self.bits
    }

    /// Renders the value as a VCD `b<bits>` payload, MSB-first.
    pub fn to_vcd_repr(&self) -> String {
        self.bits.iter().map(|b| if *b { '1' } else { '0' }).collect()
    }

    fn assert_same_width(&self, other: &Self, op: &str) {
        assert_eq!(
            self.width(),
            other.width(),
            "mismatched widths in {} ({} vs {})",
            op,
            self.width(),
            other.width()
        );
    }

    pub fn not(&self) -> Self {
        Self { bits: self.bits.iter().map(|b| !b).collect() }
    }

    pub fn and(&self, other: &Self) -> Self {
        self.assert_same_width(other, "and");
        Self { bits: self.bits.iter().zip(&other.bits).map(|(a, b)| *a && *b).collect() }
    }

    pub fn or(&self, other: &Self) -> Self {
        self.assert_same_width(other, "or");
        Self { bits: self.bits.iter().zip(&other.bits).map(|(a, b)| *a || *b).collect() }
    }

    pub fn xor(&self, other: &Self) -> Self {
        self.assert_same_width(other, "xor");
        Self { bits: self.bits.iter().zip(&other.bits).map(|(a, b)| *a != *b).collect() }
    }

    pub fn nand(&self, other: &Self) -> Self {
        self.and(other).not()
    }

    pub fn nor(&self, other: &Self) -> Self {
        self.or(other).not()
    }

    pub fn xnor(&self, other: &Self) -> Self {
        self.xor(other).not()
    }

    /// Concatenation: `self` becomes the high-order bits, `other` the low-order
    /// bits.
    pub fn concat(&self, other: &Self) -> Self {
        let mut bits = self.bits.clone();
        bits.extend_from_slice(&other.bits);
        Self { bits }
    }

    /// Slices `[begin, end)` from the MSB-first bit sequence.
    ///
    /// Panics if the range is out of bounds or empty; bounds-checking a
    /// slice is a build-time concern for whatever constructs the IR, not a
    /// runtime one here.
    pub fn slice(&self, begin: usize, end: usize) -> Self {
        assert!(begin < end && end <= self.width(), "slice [{}, {}) out of bounds for width {}", begin, end, self.width());
        Self { bits: self.bits[begin..end].to_vec() }
    }
}

impl fmt::Display for BusValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_vcd_repr())
    }
}

/// A named signal: its current value, optional driving expression, and the
/// reverse-sensitivity list used by the stabilization kernel.
#[derive(Debug, Clone)]
pub struct Bus {
    pub id: String,
    pub value: BusValue,
    pub assignment: Option<IrNode>,
    pub influence_list: Vec<BusHandle>,
}

impl Bus {
    pub fn new(id: impl Into<String>, width: usize) -> Self {
        Self {
            id: id.into(),
            value: BusValue::zeroed(width),
            assignment: None,
            influence_list: Vec::new(),
        }
    }

    pub fn width(&self) -> usize {
        self.value.width()
    }

    /// Re-evaluates the assignment (if any) against the component's bus
    /// arena and stores the result as the bus's new value.
    pub fn assign(&mut self, arena: &[Bus]) {
        if let Some(node) = &self.assignment {
            self.value = node.evaluate(arena);
        }
    }
}
