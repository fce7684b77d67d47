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

//! Renders a component's recorded value changes as a conforming subset of
//! the Value Change Dump text format.

use super::component::Component;

/// Emits the VCD text for `component`'s current `vcd_log`.
///
/// Unchanged buses are not emitted for a tick; the log itself only ever
/// contains recorded changes (see [`crate::testbench::Testbench::update`]),
/// so rendering is a straight walk grouping consecutive records by tick.
pub fn render(component: &Component, timescale: &str) -> String {
    let mut out = String::new();
    out.push_str(&format!("$timescale {} $end\n", timescale));
    out.push_str(&format!("$scope module {} $end\n", component.id));
    for handle in component.order() {
        let bus = component.bus(*handle);
        out.push_str(&format!("$var wire {} {} {} $end\n", bus.width(), bus.id, bus.id));
    }
    out.push_str("$upscope $end\n");
    out.push_str("$enddefinitions $end\n");

    let mut last_tick: Option<u64> = None;
    for record in &component.vcd_log {
        if last_tick != Some(record.tick) {
            out.push_str(&format!("#{}\n", record.tick));
            last_tick = Some(record.tick);
        }
        let bus_id = &component.bus(record.bus).id;
        out.push_str(&format!("b{} {}\n", record.value.to_vcd_repr(), bus_id));
    }
    out
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::core::bus::{Bus, BusValue};
    use crate::core::component::VcdRecord;

    #[test]
    fn header_has_one_var_per_bus() {
        let mut component = Component::new("top");
        component.add_bus(Bus::new("a", 1));
        component.add_bus(Bus::new("b", 4));
        let text = render(&component, "1 ns");
        assert_eq!(text.matches("$var wire").count(), 2);
        assert!(text.contains("$var wire 4 b b $end"));
    }

    #[test]
    fn groups_records_under_one_tick_header() {
        let mut component = Component::new("top");
        let a = component.add_bus(Bus::new("a", 1));
        let b = component.add_bus(Bus::new("b", 1));
        component.vcd_log.push(VcdRecord { tick: 0, bus: a, value: BusValue::from_bit_string("1") });
        component.vcd_log.push(VcdRecord { tick: 0, bus: b, value: BusValue::from_bit_string("0") });
        component.vcd_log.push(VcdRecord { tick: 10, bus: a, value: BusValue::from_bit_string("0") });

        let text = render(&component, "1 ns");
        assert_eq!(text.matches('#').count(), 2);
        assert!(text.contains("#0\nb1 a\nb0 b\n#10\nb0 a\n"));
    }
}
