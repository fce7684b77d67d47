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

//! The elaborated circuit: a dense arena of buses plus the bookkeeping the
//! simulator and VCD emitter need (inputs, influence lists, a VCD log).

use super::bus::{Bus, BusHandle, BusValue};
use std::collections::HashMap;

/// A single recorded change for the VCD emitter: the tick it happened at,
/// which bus changed, and its new value.
#[derive(Debug, Clone, PartialEq)]
pub struct VcdRecord {
    pub tick: u64,
    pub bus: BusHandle,
    pub value: BusValue,
}

pub struct Component {
    pub id: String,
    buses: Vec<Bus>,
    index: HashMap<String, BusHandle>,
    /// Insertion order of bus ids, for trace layout and tie-break determinism.
    order: Vec<BusHandle>,
    pub inputs: Vec<BusHandle>,
    pub sim_time: u64,
    pub vcd_log: Vec<VcdRecord>,
}

impl Component {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            buses: Vec::new(),
            index: HashMap::new(),
            order: Vec::new(),
            inputs: Vec::new(),
            sim_time: 0,
            vcd_log: Vec::new(),
        }
    }

    /// Adds a new bus to the arena, returning its handle. The builder is the
    /// only caller; handles are stable for the component's lifetime.
    pub fn add_bus(&mut self, bus: Bus) -> BusHandle {
        let handle = BusHandle(self.buses.len());
        self.index.insert(bus.id.clone(), handle);
        self.order.push(handle);
        self.buses.push(bus);
        handle
    }

    pub fn handle_of(&self, id: &str) -> Option<BusHandle> {
        self.index.get(id).copied()
    }

    pub fn bus(&self, handle: BusHandle) -> &Bus {
        &self.buses[handle.0]
    }

    pub fn bus_mut(&mut self, handle: BusHandle) -> &mut Bus {
        &mut self.buses[handle.0]
    }

    pub fn buses(&self) -> &[Bus] {
        &self.buses
    }

    /// Bus handles in declaration order.
    pub fn order(&self) -> &[BusHandle] {
        &self.order
    }

    pub fn bus_count(&self) -> usize {
        self.buses.len()
    }

    pub fn total_width(&self) -> usize {
        self.buses.iter().map(|b| b.width()).sum()
    }

    /// Snapshots the current values of every bus by id, for diagnostics and
    /// testing convenience.
    pub fn values(&self) -> HashMap<String, BusValue> {
        self.buses.iter().map(|b| (b.id.clone(), b.value.clone())).collect()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn add_bus_assigns_sequential_handles() {
        let mut comp = Component::new("c");
        let a = comp.add_bus(Bus::new("a", 1));
        let b = comp.add_bus(Bus::new("b", 1));
        assert_eq!(a, BusHandle(0));
        assert_eq!(b, BusHandle(1));
        assert_eq!(comp.handle_of("a"), Some(a));
        assert_eq!(comp.handle_of("b"), Some(b));
        assert_eq!(comp.order(), &[a, b]);
    }

    #[test]
    fn total_width_sums_all_buses() {
        let mut comp = Component::new("c");
        comp.add_bus(Bus::new("a", 4));
        comp.add_bus(Bus::new("b", 1));
        assert_eq!(comp.total_width(), 5);
    }
}
