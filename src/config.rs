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

//! The two knobs this system exposes: the stabilization iteration cap and
//! the VCD timescale string. Loadable from a `toml` file, or used with
//! their library defaults.

use serde_derive::Deserialize;

/// `10 * bus_count * width` per-component, used when no fixed cap is given.
pub const DEFAULT_CAP_MULTIPLIER: usize = 10;

pub const DEFAULT_TIMESCALE: &str = "1 ns";

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// If set, overrides the derived `10 * #buses * width` cap.
    pub iteration_cap: Option<usize>,
    pub timescale: String,
}

impl Default for Config {
    fn default() -> Self {
        Self { iteration_cap: None, timescale: DEFAULT_TIMESCALE.to_string() }
    }
}

impl Config {
    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    pub fn cap_for(&self, derived_default: usize) -> usize {
        self.iteration_cap.unwrap_or(derived_default)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn default_config_uses_derived_cap_and_ns_timescale() {
        let cfg = Config::default();
        assert_eq!(cfg.timescale, "1 ns");
        assert_eq!(cfg.cap_for(500), 500);
    }

    #[test]
    fn toml_override_wins_over_derived_cap() {
        let cfg = Config::from_toml("iteration_cap = 42\n").unwrap();
        assert_eq!(cfg.cap_for(500), 42);
    }
}
