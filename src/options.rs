// Copyright (C) 2022 Yehowshua Immanuel
// This program is distributed under both the GPLV3 license
// and the YEHOWSHUA license, both of which can be found at
// the root of the folder containing the sources for this program.
use serde::Deserialize;

/// Knobs for a simulation session. Deserializable so a front end can hand
/// them over as JSON; missing fields take their default.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SimOptions {
    /// capacity in bytes of the buffered reader over the dump
    pub read_capacity: usize,
    /// fail `allocate_state` when a restriction name matches no variable
    /// instead of ignoring it
    pub strict_restriction: bool,
}

impl Default for SimOptions {
    fn default() -> Self {
        SimOptions {
            read_capacity: 64 * 1024,
            strict_restriction: false,
        }
    }
}

impl SimOptions {
    pub fn read_capacity(mut self, read_capacity: usize) -> Self {
        self.read_capacity = read_capacity.max(1);
        self
    }

    pub fn strict_restriction(mut self, strict: bool) -> Self {
        self.strict_restriction = strict;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let options: SimOptions = serde_json::from_str(r#"{"strict_restriction": true}"#).unwrap();
        assert!(options.strict_restriction);
        assert_eq!(options.read_capacity, SimOptions::default().read_capacity);
    }

    #[test]
    fn builder_clamps_capacity() {
        let options = SimOptions::default().read_capacity(0);
        assert_eq!(options.read_capacity, 1);
    }
}
