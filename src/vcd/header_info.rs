// Copyright (C) 2022 Yehowshua Immanuel
// This program is distributed under both the GPLV3 license
// and the YEHOWSHUA license, both of which can be found at
// the root of the folder containing the sources for this program.
use serde::{Deserialize, Serialize};

use super::offsets::OffsetTable;
use super::signal::Variable;
use super::types::{Metadata, Schema, Scope, ScopeIdx};
use crate::error::WaveError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableInfo {
    #[serde(flatten)]
    pub variable: Variable,
    /// first cell in the state buffer, `None` when untracked
    pub offset: Option<usize>,
}

/// Serializable description of a dump header together with the layout of
/// the state buffer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderInfo {
    pub metadata: Metadata,
    pub scopes: Vec<Scope>,
    pub root_scopes: Vec<ScopeIdx>,
    pub buffer_len: usize,
    pub variables: Vec<VariableInfo>,
}

impl HeaderInfo {
    /// Without `offsets` every variable is reported as untracked and the
    /// buffer as empty.
    pub fn new(schema: &Schema, offsets: Option<&OffsetTable>) -> HeaderInfo {
        let variables = schema
            .variables
            .iter()
            .map(|var| VariableInfo {
                variable: var.clone(),
                offset: offsets.and_then(|offsets| offsets.offset(&var.id)),
            })
            .collect();

        HeaderInfo {
            metadata: schema.metadata.clone(),
            scopes: schema.scopes.clone(),
            root_scopes: schema.root_scopes.clone(),
            buffer_len: offsets.map_or(0, OffsetTable::len),
            variables,
        }
    }

    pub fn to_json(&self) -> Result<String, WaveError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, WaveError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<HeaderInfo, WaveError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Drops the buffer layout and gives back the schema it was built from.
    pub fn into_schema(self) -> Schema {
        Schema {
            metadata: self.metadata,
            scopes: self.scopes,
            root_scopes: self.root_scopes,
            variables: self
                .variables
                .into_iter()
                .map(|info| info.variable)
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vcd::{parse_header, Lexer};

    const HEADER: &str = "\
$date Mon Feb 14 09:12:45 2022 $end
$version Synopsys VCS $end
$timescale 10ps $end
$scope module tb $end
$var reg 1 ! clk $end
$var wire 16 # addr [0:15] $end
$var real 64 % temp $end
$scope task check $end
$var integer 32 & errors $end
$upscope $end
$upscope $end
$enddefinitions $end
";

    fn schema() -> Schema {
        parse_header(&mut Lexer::new(HEADER.as_bytes())).unwrap()
    }

    #[test]
    fn json_round_trips_into_the_schema() {
        let schema = schema();
        let offsets = OffsetTable::allocate(&schema, Some(&["addr", "errors"]), false).unwrap();
        let info = HeaderInfo::new(&schema, Some(&offsets));

        let json = info.to_json().unwrap();
        let decoded = HeaderInfo::from_json(&json).unwrap();
        assert_eq!(decoded, info);
        assert_eq!(decoded.into_schema(), schema);
    }

    #[test]
    fn variables_are_flattened() {
        let schema = schema();
        let offsets = OffsetTable::allocate(&schema, None, false).unwrap();
        let info = HeaderInfo::new(&schema, Some(&offsets));
        let value: serde_json::Value = serde_json::from_str(&info.to_json().unwrap()).unwrap();

        assert_eq!(value["buffer_len"], 1 + 16 + 64 + 32);
        let addr = &value["variables"][1];
        assert_eq!(addr["name"], "addr");
        assert_eq!(addr["width"], 16);
        assert_eq!(addr["offset"], 1);
        assert_eq!(addr["bit_order"], "Ascending");
        assert_eq!(addr["scope"][0], "tb");
        assert_eq!(value["variables"][3]["scope"][1], "check");
    }

    #[test]
    fn malformed_json_is_an_error() {
        let res = HeaderInfo::from_json("{\"metadata\": 3}");
        assert!(matches!(res, Err(WaveError::Json(_))));
    }
}
