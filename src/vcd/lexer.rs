// Copyright (C) 2022 Yehowshua Immanuel
// This program is distributed under both the GPLV3 license
// and the YEHOWSHUA license, both of which can be found at
// the root of the folder containing the sources for this program.

//! Turns the words of a dump into structural tokens.
//!
//! The lexer only checks that records are well formed. It knows nothing
//! about widths, scopes or whether an id was declared; that is left to
//! the header builder and the simulator.
use std::io::Read;

use super::reader::{next_word, Cursor, WordReader};
use super::signal::LogicValue;
use crate::error::WaveError;

/// The raw fields of a `$var` declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub var_type: String,
    pub width: String,
    /// `None` when the declaration only carries a reference
    pub id: Option<String>,
    /// the reference, possibly followed by an index range
    pub reference: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    ScopeOpen {
        kind: String,
        name: Option<String>,
    },
    ScopeClose,
    VarDecl(Declaration),
    HeaderEnd,
    /// `$date`, `$version`, `$timescale`, `$comment` and any other command
    /// with a body, or one of the body markers (`$dumpvars`, `$end`, ...)
    /// which carry no body.
    Directive {
        keyword: String,
        body: Vec<String>,
    },
    ScalarChange {
        value: LogicValue,
        id: String,
    },
    VectorChange {
        bits: Vec<LogicValue>,
        id: String,
    },
    RealChange {
        value: String,
        id: String,
    },
    StringChange {
        value: String,
        id: String,
    },
    Timestamp(u64),
    EndOfInput,
}

// markers that open or close a block of value changes in the body
const BODY_MARKERS: [&str; 5] = ["dumpvars", "dumpall", "dumpon", "dumpoff", "end"];

pub struct Lexer<R> {
    words: WordReader<R>,
    done: bool,
}

impl<R: Read> Lexer<R> {
    pub fn new(inner: R) -> Lexer<R> {
        Lexer::with_capacity(64 * 1024, inner)
    }

    pub fn with_capacity(capacity: usize, inner: R) -> Lexer<R> {
        Lexer {
            words: WordReader::with_capacity(capacity, inner),
            done: false,
        }
    }

    /// Next token and the position of its first word. Once the input is
    /// exhausted every call returns `Token::EndOfInput`.
    pub fn next_token(&mut self) -> Result<(Token, Cursor), WaveError> {
        if self.done {
            return Ok((Token::EndOfInput, self.words.end_cursor()));
        }

        let (word, cursor) = match self.words.next_word()? {
            Some(next) => next,
            None => {
                self.done = true;
                return Ok((Token::EndOfInput, self.words.end_cursor()));
            }
        };

        // words are never empty, and every prefix we slice off is ascii
        let first = word.as_bytes()[0];
        let token = match first {
            b'$' => {
                let keyword = word[1..].to_string();
                self.command(keyword, cursor)?
            }
            b'#' => {
                let time = word[1..].parse::<u64>().map_err(|e| WaveError::Parse {
                    cursor,
                    message: format!("failed to parse timestamp `{word}`: {e}"),
                })?;
                Token::Timestamp(time)
            }
            b'b' | b'B' => {
                let bits = word[1..].to_string();
                self.vector_change(bits, cursor)?
            }
            b'r' | b'R' => {
                let value = word[1..].to_string();
                let (value, id) = self.value_and_id(value, "a real value change")?;
                Token::RealChange { value, id }
            }
            b's' | b'S' => {
                let value = word[1..].to_string();
                let (value, id) = self.value_and_id(value, "a string value change")?;
                Token::StringChange { value, id }
            }
            _ => match LogicValue::from_char(first) {
                Some(value) => {
                    let id = word[1..].to_string();
                    let id = if id.is_empty() {
                        let (id, _) = next_word!(self.words, "a scalar value change");
                        id.to_string()
                    } else {
                        id
                    };
                    Token::ScalarChange { value, id }
                }
                None => {
                    return Err(WaveError::Parse {
                        cursor,
                        message: format!(
                            "found `{word}` but expected a command, a timestamp \
                             or a value change"
                        ),
                    })
                }
            },
        };

        Ok((token, cursor))
    }

    fn command(&mut self, keyword: String, cursor: Cursor) -> Result<Token, WaveError> {
        let token = match keyword.as_str() {
            // $scope module reg_mag_i $end
            "scope" => {
                let mut body = self.until_end("a `$scope` command")?;
                if body.is_empty() {
                    return Err(WaveError::Parse {
                        cursor,
                        message: "`$scope` is missing its kind".to_string(),
                    });
                }
                let kind = body.remove(0);
                let name = if body.is_empty() {
                    None
                } else {
                    Some(body.join(" "))
                };
                Token::ScopeOpen { kind, name }
            }
            "upscope" => {
                self.until_end("an `$upscope` command")?;
                Token::ScopeClose
            }
            // $var parameter 3 a IDLE $end
            "var" => {
                let mut body = self.until_end("a `$var` declaration")?.into_iter();
                let (var_type, width) = match (body.next(), body.next()) {
                    (Some(var_type), Some(width)) => (var_type, width),
                    _ => {
                        return Err(WaveError::Parse {
                            cursor,
                            message: "expected `$var <type> <width> <id> <reference> $end`"
                                .to_string(),
                        })
                    }
                };
                let mut rest: Vec<String> = body.collect();
                let id = match rest.len() {
                    0 => {
                        return Err(WaveError::Parse {
                            cursor,
                            message: "`$var` declaration has no reference".to_string(),
                        })
                    }
                    1 => None,
                    _ => Some(rest.remove(0)),
                };
                Token::VarDecl(Declaration {
                    var_type,
                    width,
                    id,
                    reference: rest,
                })
            }
            "enddefinitions" => {
                self.until_end("an `$enddefinitions` command")?;
                Token::HeaderEnd
            }
            marker if BODY_MARKERS.contains(&marker) => Token::Directive {
                keyword,
                body: vec![],
            },
            _ => {
                let body = self.until_end("a command")?;
                Token::Directive { keyword, body }
            }
        };
        Ok(token)
    }

    fn vector_change(&mut self, bits: String, cursor: Cursor) -> Result<Token, WaveError> {
        // tolerate `b 1010 !`
        let (bits, id) = self.value_and_id(bits, "a vector value change")?;
        let bits = bits
            .bytes()
            .map(|chr| {
                LogicValue::from_char(chr).ok_or_else(|| WaveError::Parse {
                    cursor,
                    message: format!("`{}` is not a valid bit in `b{bits}`", chr as char),
                })
            })
            .collect::<Result<Vec<LogicValue>, WaveError>>()?;
        Ok(Token::VectorChange { bits, id })
    }

    fn value_and_id(&mut self, value: String, record: &str) -> Result<(String, String), WaveError> {
        let value = if value.is_empty() {
            let (value, _) = next_word!(self.words, record);
            value.to_string()
        } else {
            value
        };
        let (id, _) = next_word!(self.words, record);
        Ok((value, id.to_string()))
    }

    /// Collects the words of a command body up to its `$end`.
    fn until_end(&mut self, record: &str) -> Result<Vec<String>, WaveError> {
        let mut body = vec![];
        loop {
            let (word, _) = next_word!(self.words, record);
            if word == "$end" {
                return Ok(body);
            }
            body.push(word.to_string());
        }
    }
}
