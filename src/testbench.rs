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

//! The public façade: elaborate source into a [`Testbench`], drive it with
//! stimulus, and pull a VCD trace back out.

use crate::config::Config;
use crate::core::bus::BusValue;
use crate::core::builder::Builder;
use crate::core::component::{Component, VcdRecord};
use crate::core::lexer::Tokenize;
use crate::core::parser::Parser;
use crate::core::scanner::FloteTokenizer;
use crate::core::sim;
use crate::core::vcd;
use crate::error::{ElaborationError, SimulationError, Warning};
use std::collections::HashMap;
use std::path::Path;

pub struct Testbench {
    component: Component,
    config: Config,
    warnings: Vec<Warning>,
}

impl Testbench {
    fn new(component: Component, warnings: Vec<Warning>, config: Config) -> Self {
        let mut tb = Self { component, config, warnings };
        tb.dump_initial_state();
        tb
    }

    /// Emits the full initial state at tick 0, so a trace reader can
    /// reconstruct complete state without needing a prior snapshot.
    fn dump_initial_state(&mut self) {
        let records: Vec<VcdRecord> = self
            .component
            .order()
            .iter()
            .map(|h| VcdRecord { tick: 0, bus: *h, value: self.component.bus(*h).value.clone() })
            .collect();
        self.component.vcd_log.extend(records);
    }

    /// Applies a stimulus map to input buses, stabilizes, and records any
    /// resulting changes into the VCD log at the current `sim_time`.
    pub fn update(&mut self, stimulus: &HashMap<String, String>) -> Result<(), SimulationError> {
        let before: HashMap<_, _> = self
            .component
            .order()
            .iter()
            .map(|h| (*h, self.component.bus(*h).value.clone()))
            .collect();

        for (id, bits) in stimulus {
            let handle = self
                .component
                .handle_of(id)
                .filter(|h| self.component.inputs.contains(h))
                .ok_or_else(|| SimulationError::NotAnInput(id.clone()))?;

            if !bits.chars().all(|c| c == '0' || c == '1') {
                return Err(SimulationError::InvalidBitString(bits.clone(), id.clone()));
            }

            let width = self.component.bus(handle).width();
            if bits.len() != width {
                return Err(SimulationError::WidthMismatch(id.clone(), bits.len(), width));
            }

            self.component.bus_mut(handle).value = BusValue::from_bit_string(bits);
        }

        let cap = self.config.cap_for(sim::default_cap(&self.component));
        sim::stabilize(&mut self.component, cap, self.config.iteration_cap.is_some())?;

        let tick = self.component.sim_time;
        for handle in self.component.order().iter().copied() {
            let new_value = self.component.bus(handle).value.clone();
            if before.get(&handle) != Some(&new_value) {
                self.component.vcd_log.push(VcdRecord { tick, bus: handle, value: new_value });
            }
        }
        Ok(())
    }

    /// Advances simulated time; has no other effect.
    pub fn wait(&mut self, ticks: u64) {
        self.component.sim_time += ticks;
    }

    pub fn dump_vcd(&self) -> String {
        vcd::render(&self.component, &self.config.timescale)
    }

    pub fn save_vcd(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        std::fs::write(path, self.dump_vcd())
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Current values of every bus, keyed by id.
    pub fn values(&self) -> HashMap<String, BusValue> {
        self.component.values()
    }

    pub fn sim_time(&self) -> u64 {
        self.component.sim_time
    }
}

/// Elaborates `source` into a [`Testbench`].
pub fn elaborate(source: &str) -> Result<Testbench, ElaborationError> {
    elaborate_with_config(source, Config::default())
}

pub fn elaborate_with_config(source: &str, config: Config) -> Result<Testbench, ElaborationError> {
    let mut tokens = Vec::new();
    for result in FloteTokenizer::tokenize(source) {
        match result {
            Ok(token) => tokens.push(token),
            Err(err) => return Err(ElaborationError::from_lexical(&err)),
        }
    }

    let module = Parser::parse(tokens)?;
    let (component, _symtab, warnings) = Builder::build(&module)?;

    Ok(Testbench::new(component, warnings, config))
}

/// Reads `path` and elaborates its contents.
pub fn elaborate_file(path: impl AsRef<Path>) -> Result<Testbench, ElaborationError> {
    let path = path.as_ref();
    let source = std::fs::read_to_string(path)
        .map_err(|e| ElaborationError::Io(path.display().to_string(), e.to_string()))?;
    elaborate(&source)
}

#[cfg(test)]
mod test {
    use super::*;

    fn stimulus(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    const HALF_ADDER: &str = r#"
        comp half_adder {
            in bit a;
            in bit b;
            out bit s = a xor b;
            out bit c = a and b;
        }
    "#;

    #[test]
    fn half_adder_truth_table() {
        let mut tb = elaborate(HALF_ADDER).unwrap();
        let cases = [("0", "0", "0", "0"), ("0", "1", "1", "0"), ("1", "0", "1", "0"), ("1", "1", "0", "1")];
        for (a, b, s, c) in cases {
            tb.update(&stimulus(&[("a", a), ("b", b)])).unwrap();
            let values = tb.values();
            assert_eq!(values["s"].to_vcd_repr(), s);
            assert_eq!(values["c"].to_vcd_repr(), c);
        }
    }

    #[test]
    fn rs_latch_holds_state() {
        let src = r#"
            comp rs_latch {
                in bit set;
                in bit rst;
                bit not_q;
                bit q = rst nor not_q;
                not_q = set nor q;
            }
        "#;
        let mut tb = elaborate(src).unwrap();
        tb.update(&stimulus(&[("rst", "1"), ("set", "0")])).unwrap();
        assert_eq!(tb.values()["q"].to_vcd_repr(), "0");
        assert_eq!(tb.values()["not_q"].to_vcd_repr(), "1");

        tb.update(&stimulus(&[("rst", "0"), ("set", "0")])).unwrap();
        assert_eq!(tb.values()["q"].to_vcd_repr(), "0");

        tb.update(&stimulus(&[("set", "1"), ("rst", "0")])).unwrap();
        assert_eq!(tb.values()["q"].to_vcd_repr(), "1");
        assert_eq!(tb.values()["not_q"].to_vcd_repr(), "0");

        tb.update(&stimulus(&[("set", "0"), ("rst", "0")])).unwrap();
        assert_eq!(tb.values()["q"].to_vcd_repr(), "1");

        tb.update(&stimulus(&[("set", "0"), ("rst", "1")])).unwrap();
        assert_eq!(tb.values()["q"].to_vcd_repr(), "0");
        assert_eq!(tb.values()["not_q"].to_vcd_repr(), "1");
    }

    #[test]
    fn inverter_via_bit_field() {
        let src = r#"comp c { out bit o = not "1"; }"#;
        let tb = elaborate(src).unwrap();
        assert_eq!(tb.values()["o"].to_vcd_repr(), "0");
    }

    #[test]
    fn oscillator_raises_simulation_error_on_update() {
        let src = r#"comp c { in bit go; bit x = not x; }"#;
        let mut tb = elaborate(src).unwrap();
        let err = tb.update(&stimulus(&[("go", "1")])).unwrap_err();
        assert!(matches!(err, SimulationError::IterationCapExceeded(..)));
    }

    #[test]
    fn stimulus_to_non_input_is_simulation_error() {
        let mut tb = elaborate(HALF_ADDER).unwrap();
        let err = tb.update(&stimulus(&[("s", "1")])).unwrap_err();
        assert!(matches!(err, SimulationError::NotAnInput(_)));
    }

    #[test]
    fn stimulus_width_mismatch_is_simulation_error() {
        let mut tb = elaborate(HALF_ADDER).unwrap();
        let err = tb.update(&stimulus(&[("a", "11")])).unwrap_err();
        assert!(matches!(err, SimulationError::WidthMismatch(..)));
    }

    #[test]
    fn second_update_with_same_inputs_changes_nothing() {
        let mut tb = elaborate(HALF_ADDER).unwrap();
        tb.update(&stimulus(&[("a", "1"), ("b", "0")])).unwrap();
        let before = tb.values();
        tb.update(&stimulus(&[("a", "1"), ("b", "0")])).unwrap();
        assert_eq!(tb.values(), before);
    }

    #[test]
    fn vcd_contains_one_var_per_bus_and_records_changes() {
        let mut tb = elaborate(HALF_ADDER).unwrap();
        for (a, b) in [("0", "0"), ("0", "1"), ("1", "0"), ("1", "1")] {
            tb.update(&stimulus(&[("a", a), ("b", b)])).unwrap();
            tb.wait(10);
        }
        let text = tb.dump_vcd();
        assert_eq!(text.matches("$var wire").count(), 4);
        assert!(text.starts_with("$timescale 1 ns $end\n"));
        assert!(text.contains("#0\n"));
        assert!(text.contains("#10\n"));
    }
}
