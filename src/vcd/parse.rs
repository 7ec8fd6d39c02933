// Copyright (C) 2022 Yehowshua Immanuel
// This program is distributed under both the GPLV3 license
// and the YEHOWSHUA license, both of which can be found at
// the root of the folder containing the sources for this program.
use std::io::Read;

use super::lexer::{Lexer, Token};
use super::types::Schema;
use crate::error::WaveError;

mod combinator_atoms;
mod types;

mod metadata;
use metadata::apply_directive;

mod scopes;
use scopes::SchemaBuilder;

pub(crate) mod events;

/// Consumes tokens up to and including `$enddefinitions` and builds the
/// schema they declare. The lexer is left positioned on the first token of
/// the body.
pub fn parse_header<R: Read>(lexer: &mut Lexer<R>) -> Result<Schema, WaveError> {
    let mut builder = SchemaBuilder::new();

    loop {
        let (token, cursor) = lexer.next_token()?;
        match token {
            Token::Directive { keyword, body } => {
                if let Err(msg) = apply_directive(&mut builder.metadata, &keyword, &body) {
                    tracing::debug!(%cursor, keyword = keyword.as_str(), "ignoring malformed header directive: {msg}");
                }
            }
            Token::ScopeOpen { kind, name } => builder.open_scope(&kind, name, cursor)?,
            Token::ScopeClose => builder.close_scope(cursor)?,
            Token::VarDecl(decl) => builder.declare(decl, cursor)?,
            Token::HeaderEnd => return Ok(builder.finish()),
            Token::EndOfInput => return Err(WaveError::PartialHeader { cursor }),
            other => {
                return Err(WaveError::Parse {
                    cursor,
                    message: format!("found {other:?} before `$enddefinitions`"),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vcd::{BitOrder, ScopeIdx, Timescale, VarRange, VarType, Version};

    fn header(input: &str) -> Result<Schema, WaveError> {
        parse_header(&mut Lexer::with_capacity(32, input.as_bytes()))
    }

    const HEADER: &str = "\
$date
    Tue Aug 23 10:44:04 2022
$end
$version Icarus Verilog $end
$timescale 1ps $end
$var wire 1 ~ orphan $end
$scope module tb $end
$var reg 1 ! clk $end
$scope module dut $end
$var wire 8 \" data [7:0] $end
$var wire 4 # nibble[0:3] $end
$var reg 1 ! clk $end
$scope begin $end
$var integer 32 $ count $end
$upscope $end
$upscope $end
$upscope $end
$enddefinitions $end
#0
";

    #[test]
    fn builds_schema() {
        let schema = header(HEADER).unwrap();

        assert_eq!(
            schema.metadata.version,
            Some(Version("Icarus Verilog".to_string()))
        );
        assert_eq!(schema.metadata.timescale, (Some(1), Timescale::Ps));
        assert!(schema.metadata.date.is_some());

        let paths: Vec<String> = schema.variables.iter().map(|var| var.path()).collect();
        assert_eq!(
            paths,
            [
                "orphan",
                "tb.clk",
                "tb.dut.data",
                "tb.dut.nibble",
                "tb.dut.clk",
                "tb.dut.count"
            ]
        );

        let data = schema.variable_by_path("tb.dut.data").unwrap();
        assert_eq!(data.id, "\"");
        assert_eq!(data.width, 8);
        assert_eq!(data.var_type, VarType::Wire);
        assert_eq!(data.range, Some(VarRange::Range(7, 0)));
        assert_eq!(data.bit_order, BitOrder::Descending);

        let nibble = schema.variable_by_path("tb.dut.nibble").unwrap();
        assert_eq!(nibble.bit_order, BitOrder::Ascending);

        // the nameless `begin` scope is transparent
        assert_eq!(schema.scopes.len(), 2);
        assert_eq!(schema.root_scopes.len(), 1);
        let dut = &schema.scopes[1];
        assert_eq!(dut.name, "dut");
        assert_eq!(dut.parent_idx, Some(ScopeIdx(0)));
        assert_eq!(schema.scopes[0].child_scopes, [ScopeIdx(1)]);
        assert_eq!(dut.child_variables.len(), 4);
        assert_eq!(schema.variables_named("clk").count(), 2);

        assert_eq!(
            schema.scope_tree(),
            [
                "scope: tb",
                " - var: clk (1)",
                "    scope: dut",
                "     - var: data (8)",
                "     - var: nibble (4)",
                "     - var: clk (1)",
                "     - var: count (32)",
            ]
        );
    }

    #[test]
    fn assigns_ids_to_declarations_without_one() {
        let schema = header(
            "$var wire 1 0 a $end\n$var wire 1 b $end\n$var wire 2 c $end\n$enddefinitions $end",
        )
        .unwrap();
        let ids: Vec<&str> = schema.variables.iter().map(|var| var.id.as_str()).collect();
        assert_eq!(ids, ["0", "1", "2"]);
    }

    #[test]
    fn generated_ids_avoid_later_source_ids() {
        for width in [1, 4] {
            let schema = header(&format!(
                "$var wire 1 a $end\n$var wire {width} 0 b $end\n$enddefinitions $end"
            ))
            .unwrap();
            let ids: Vec<&str> = schema.variables.iter().map(|var| var.id.as_str()).collect();
            assert_eq!(ids, ["1", "0"]);
            assert_eq!(schema.variable_by_id("0").unwrap().name, "b");
            assert_eq!(schema.variable_by_id("1").unwrap().name, "a");
        }
    }

    #[test]
    fn duplicate_id_in_one_scope_is_an_error() {
        let res = header(
            "$scope module top $end\n\
             $var wire 1 ! a $end\n\
             $var wire 1 ! b $end\n\
             $upscope $end\n\
             $enddefinitions $end",
        );
        assert!(matches!(res, Err(WaveError::Parse { .. })), "{res:?}");
    }

    #[test]
    fn alias_with_other_width_is_an_error() {
        let res = header(
            "$scope module a $end $var wire 1 ! x $end $upscope $end\n\
             $scope module b $end $var wire 2 ! x $end $upscope $end\n\
             $enddefinitions $end",
        );
        assert!(matches!(res, Err(WaveError::Parse { .. })), "{res:?}");
    }

    #[test]
    fn malformed_declarations() {
        for input in [
            "$var wyre 1 ! a $end $enddefinitions $end",
            "$var wire 0 ! a $end $enddefinitions $end",
            "$var wire eight ! a $end $enddefinitions $end",
            "$scope modul top $end $enddefinitions $end",
            "$upscope $end $enddefinitions $end",
            "$var wire 1 ! a $end 1! $enddefinitions $end",
        ] {
            assert!(
                matches!(header(input), Err(WaveError::Parse { .. })),
                "{input}"
            );
        }
    }

    #[test]
    fn missing_enddefinitions_is_a_partial_header() {
        let res = header("$scope module top $end\n$var wire 1 ! a $end\n");
        assert!(matches!(res, Err(WaveError::PartialHeader { .. })), "{res:?}");
        let res = header("");
        assert!(matches!(res, Err(WaveError::PartialHeader { .. })), "{res:?}");
    }

    #[test]
    fn malformed_metadata_is_ignored() {
        let schema = header(
            "$date sometime last week $end\n$timescale 1 parsec $end\n$enddefinitions $end",
        )
        .unwrap();
        assert_eq!(schema.metadata.date, None);
        assert_eq!(schema.metadata.timescale, (None, Timescale::Unit));
    }
}
