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

//! Work-list driven fixed-point propagation over a component's influence
//! graph.

use super::bus::BusHandle;
use super::component::Component;
use crate::config::DEFAULT_CAP_MULTIPLIER;
use crate::error::{Hint, SimulationError};
use std::collections::VecDeque;

/// Propagates value changes to a fixed point.
///
/// The initial pass enqueues every bus (in declaration order) so internal
/// buses reach their assignment-determined value on the first stabilization
/// after construction. Cyclic graphs (feedback loops) terminate only if they
/// settle on a stable point; `cap` bounds total reassignments to guard
/// against oscillation.
///
/// `cap_is_explicit` distinguishes a user-configured cap from the derived
/// default, so an exceeded cap can hint at raising it when the caller never
/// set one, rather than assuming a genuine oscillation either way.
pub fn stabilize(component: &mut Component, cap: usize, cap_is_explicit: bool) -> Result<(), SimulationError> {
    let mut work: VecDeque<BusHandle> = component.order().iter().copied().collect();
    let mut queued: std::collections::HashSet<BusHandle> = work.iter().copied().collect();

    let mut iterations = 0usize;
    while let Some(handle) = work.pop_front() {
        queued.remove(&handle);

        iterations += 1;
        if iterations > cap {
            let hint = if cap_is_explicit { Hint::CheckForOscillation } else { Hint::RaiseIterationCap };
            return Err(SimulationError::IterationCapExceeded(cap, hint));
        }

        let old = component.bus(handle).value.clone();
        let arena_snapshot: Vec<_> = component.buses().to_vec();
        component.bus_mut(handle).assign(&arena_snapshot);
        let new = &component.bus(handle).value;

        if new != &old {
            let influenced = component.bus(handle).influence_list.clone();
            for u in influenced {
                if queued.insert(u) {
                    work.push_back(u);
                }
            }
        }
    }
    Ok(())
}

/// The default iteration cap: `10 * bus_count * total_width`.
pub fn default_cap(component: &Component) -> usize {
    (DEFAULT_CAP_MULTIPLIER * component.bus_count() * component.total_width().max(1))
        .max(DEFAULT_CAP_MULTIPLIER)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::core::bus::{Bus, BusValue};

    fn handle_for(component: &Component, id: &str) -> BusHandle {
        component.handle_of(id).unwrap()
    }

    #[test]
    fn acyclic_stabilizes_in_one_pass() {
        use crate::core::ir::IrNode;
        let mut component = Component::new("c");
        let a = component.add_bus(Bus::new("a", 1));
        let b = component.add_bus(Bus::new("b", 1));
        component.bus_mut(a).value = BusValue::from_bit_string("1");
        component.bus_mut(b).assignment = Some(IrNode::Not(Box::new(IrNode::BusRef(a))));
        component.bus_mut(a).influence_list.push(b);

        stabilize(&mut component, 100, false).unwrap();
        assert_eq!(component.bus(handle_for(&component, "b")).value, BusValue::from_bit_string("0"));
    }

    #[test]
    fn oscillator_exceeds_cap() {
        use crate::core::ir::IrNode;
        let mut component = Component::new("c");
        let a = component.add_bus(Bus::new("a", 1));
        component.bus_mut(a).assignment = Some(IrNode::Not(Box::new(IrNode::BusRef(a))));
        component.bus_mut(a).influence_list.push(a);

        let err = stabilize(&mut component, 20, false).unwrap_err();
        assert!(matches!(err, SimulationError::IterationCapExceeded(20, Hint::RaiseIterationCap)));
    }

    #[test]
    fn oscillator_with_explicit_cap_hints_at_oscillation_not_raising_cap() {
        use crate::core::ir::IrNode;
        let mut component = Component::new("c");
        let a = component.add_bus(Bus::new("a", 1));
        component.bus_mut(a).assignment = Some(IrNode::Not(Box::new(IrNode::BusRef(a))));
        component.bus_mut(a).influence_list.push(a);

        let err = stabilize(&mut component, 20, true).unwrap_err();
        assert!(matches!(err, SimulationError::IterationCapExceeded(20, Hint::CheckForOscillation)));
    }

    #[test]
    fn second_stabilize_without_input_change_is_a_no_op() {
        use crate::core::ir::IrNode;
        let mut component = Component::new("c");
        let a = component.add_bus(Bus::new("a", 1));
        let b = component.add_bus(Bus::new("b", 1));
        component.bus_mut(a).value = BusValue::from_bit_string("1");
        component.bus_mut(b).assignment = Some(IrNode::Not(Box::new(IrNode::BusRef(a))));
        component.bus_mut(a).influence_list.push(b);

        stabilize(&mut component, 100, false).unwrap();
        let before = component.bus(b).value.clone();
        stabilize(&mut component, 100, false).unwrap();
        assert_eq!(component.bus(b).value, before);
    }
}
