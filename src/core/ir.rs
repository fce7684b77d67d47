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

//! Intermediate representation of boolean expressions.
//!
//! A closed enum dispatching through a single `evaluate` method, rather than
//! a class hierarchy of evaluator objects: traversal for width inference and
//! sensitivity collection is a `match` on the variant.

use super::bus::{Bus, BusHandle, BusValue};

#[derive(Debug, Clone, PartialEq)]
pub enum IrNode {
    Const(BusValue),
    BusRef(BusHandle),
    Not(Box<IrNode>),
    And(Box<IrNode>, Box<IrNode>),
    Or(Box<IrNode>, Box<IrNode>),
    Xor(Box<IrNode>, Box<IrNode>),
    Nand(Box<IrNode>, Box<IrNode>),
    Nor(Box<IrNode>, Box<IrNode>),
    Xnor(Box<IrNode>, Box<IrNode>),
}

impl IrNode {
    /// Evaluates the expression against the given bus arena. Pure: never
    /// mutates any bus, only reads their current values.
    pub fn evaluate(&self, arena: &[Bus]) -> BusValue {
        match self {
            Self::Const(v) => v.clone(),
            Self::BusRef(h) => arena[h.0].value.clone(),
            Self::Not(e) => e.evaluate(arena).not(),
            Self::And(l, r) => l.evaluate(arena).and(&r.evaluate(arena)),
            Self::Or(l, r) => l.evaluate(arena).or(&r.evaluate(arena)),
            Self::Xor(l, r) => l.evaluate(arena).xor(&r.evaluate(arena)),
            Self::Nand(l, r) => l.evaluate(arena).nand(&r.evaluate(arena)),
            Self::Nor(l, r) => l.evaluate(arena).nor(&r.evaluate(arena)),
            Self::Xnor(l, r) => l.evaluate(arena).xnor(&r.evaluate(arena)),
        }
    }

    /// The bit width this node produces, given the already-built arena (bus
    /// widths are fixed by the time IR is constructed).
    pub fn width(&self, arena: &[Bus]) -> usize {
        match self {
            Self::Const(v) => v.width(),
            Self::BusRef(h) => arena[h.0].width(),
            Self::Not(e) => e.width(arena),
            Self::And(l, _)
            | Self::Or(l, _)
            | Self::Xor(l, _)
            | Self::Nand(l, _)
            | Self::Nor(l, _)
            | Self::Xnor(l, _) => l.width(arena),
        }
    }

    /// Walks the tree collecting the ordered set (first-occurrence order,
    /// duplicates skipped) of buses this expression reads.
    pub fn sensitivity(&self) -> Vec<BusHandle> {
        let mut out = Vec::new();
        self.collect_sensitivity(&mut out);
        out
    }

    fn collect_sensitivity(&self, out: &mut Vec<BusHandle>) {
        match self {
            Self::Const(_) => {}
            Self::BusRef(h) => {
                if !out.contains(h) {
                    out.push(*h);
                }
            }
            Self::Not(e) => e.collect_sensitivity(out),
            Self::And(l, r)
            | Self::Or(l, r)
            | Self::Xor(l, r)
            | Self::Nand(l, r)
            | Self::Nor(l, r)
            | Self::Xnor(l, r) => {
                l.collect_sensitivity(out);
                r.collect_sensitivity(out);
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn arena_with(values: Vec<&str>) -> Vec<Bus> {
        values
            .into_iter()
            .enumerate()
            .map(|(i, v)| {
                let mut b = Bus::new(format!("b{}", i), v.len());
                b.value = BusValue::from_bit_string(v);
                b
            })
            .collect()
    }

    #[test]
    fn evaluates_each_operator() {
        let arena = arena_with(vec!["1", "0"]);
        let a = IrNode::BusRef(BusHandle(0));
        let b = IrNode::BusRef(BusHandle(1));
        assert_eq!(
            IrNode::And(Box::new(a.clone()), Box::new(b.clone())).evaluate(&arena),
            BusValue::from_bit_string("0")
        );
        assert_eq!(
            IrNode::Or(Box::new(a.clone()), Box::new(b.clone())).evaluate(&arena),
            BusValue::from_bit_string("1")
        );
        assert_eq!(
            IrNode::Xor(Box::new(a.clone()), Box::new(b.clone())).evaluate(&arena),
            BusValue::from_bit_string("1")
        );
        assert_eq!(IrNode::Not(Box::new(a.clone())).evaluate(&arena), BusValue::from_bit_string("0"));
    }

    #[test]
    fn sensitivity_dedups_in_first_occurrence_order() {
        let a = IrNode::BusRef(BusHandle(0));
        let expr = IrNode::And(Box::new(a.clone()), Box::new(a));
        assert_eq!(expr.sensitivity(), vec![BusHandle(0)]);
    }

    #[test]
    fn evaluation_does_not_mutate_arena() {
        let arena = arena_with(vec!["1", "0"]);
        let before = arena[0].value.clone();
        let expr = IrNode::Not(Box::new(IrNode::BusRef(BusHandle(0))));
        let _ = expr.evaluate(&arena);
        assert_eq!(arena[0].value, before);
    }
}
