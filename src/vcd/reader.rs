// Copyright (C) 2022 Yehowshua Immanuel
// This program is distributed under both the GPLV3 license
// and the YEHOWSHUA license, both of which can be found at
// the root of the folder containing the sources for this program.
use std::collections::VecDeque;
use std::fmt;
use std::io;
use std::io::prelude::*;

use crate::error::WaveError;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Line(pub usize);
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Word(pub usize);
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ByteOffset(pub u64);

/// Position of a word in the dump: line and word index within that line
/// (both 1-based) plus the absolute offset of its first byte.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Cursor(pub Line, pub Word, pub ByteOffset);

impl Cursor {
    pub fn byte_offset(&self) -> u64 {
        let Cursor(_, _, ByteOffset(offset)) = self;
        *offset
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Cursor(Line(line), Word(word), ByteOffset(byte)) = self;
        write!(f, "line {line}, word {word} (byte {byte})")
    }
}

#[derive(Debug, Clone)]
struct WordSpan {
    start: usize,
    end: usize,
    cursor: Cursor,
}

/// Splits a byte source into whitespace delimited words, one line at a time.
///
/// Lines are validated as UTF-8 when they are read, so every word handed
/// out is a `&str` borrowed from the line buffer. A word stays valid until
/// the next call to `next_word`.
pub(crate) struct WordReader<R> {
    reader: io::BufReader<R>,
    eof: bool,
    line: String,
    words: VecDeque<WordSpan>,
    curr_line: usize,
    // byte offset of the first byte of the next line to be read
    next_line_start: u64,
}

impl<R: Read> WordReader<R> {
    pub(crate) fn with_capacity(capacity: usize, inner: R) -> WordReader<R> {
        WordReader {
            // a zero capacity BufReader reports end of input immediately
            reader: io::BufReader::with_capacity(capacity.max(1), inner),
            eof: false,
            line: String::new(),
            words: VecDeque::new(),
            curr_line: 0,
            next_line_start: 0,
        }
    }

    /// Returns `Ok(None)` once the source is exhausted.
    pub(crate) fn next_word(&mut self) -> Result<Option<(&str, Cursor)>, WaveError> {
        // if there are no more words in the buffer, attempt to read more
        // content from the source
        while self.words.is_empty() {
            if self.eof {
                return Ok(None);
            }
            self.fill_line()?;
        }

        match self.words.pop_front() {
            Some(WordSpan { start, end, cursor }) => Ok(Some((&self.line[start..end], cursor))),
            None => Ok(None),
        }
    }

    /// Cursor just past the last byte read so far. Used to report records
    /// that were cut off by the end of the input.
    pub(crate) fn end_cursor(&self) -> Cursor {
        Cursor(
            Line(self.curr_line),
            Word(0),
            ByteOffset(self.next_line_start),
        )
    }

    fn fill_line(&mut self) -> Result<(), WaveError> {
        // recycle the allocation of the previous line
        let mut raw = std::mem::take(&mut self.line).into_bytes();
        raw.clear();

        let line_start = self.next_line_start;
        let bytes_read = self.reader.read_until(b'\n', &mut raw)?;
        if bytes_read == 0 {
            self.eof = true;
            return Ok(());
        }
        self.curr_line += 1;
        self.next_line_start += bytes_read as u64;

        self.line = String::from_utf8(raw).map_err(|e| {
            let valid_up_to = e.utf8_error().valid_up_to() as u64;
            WaveError::Utf8 {
                cursor: Cursor(
                    Line(self.curr_line),
                    Word(0),
                    ByteOffset(line_start + valid_up_to),
                ),
            }
        })?;

        // splitting on ascii whitespace always lands on char boundaries
        let bytes = self.line.as_bytes();
        let mut idx = 0usize;
        let mut word_idx = 0usize;
        while idx < bytes.len() {
            if bytes[idx].is_ascii_whitespace() {
                idx += 1;
                continue;
            }
            let start = idx;
            while idx < bytes.len() && !bytes[idx].is_ascii_whitespace() {
                idx += 1;
            }
            word_idx += 1;
            let cursor = Cursor(
                Line(self.curr_line),
                Word(word_idx),
                ByteOffset(line_start + start as u64),
            );
            self.words.push_back(WordSpan {
                start,
                end: idx,
                cursor,
            });
        }

        Ok(())
    }
}

/// Fetches the next word, turning the end of the input into a parse error
/// that names the record being read.
macro_rules! next_word {
    ($word_reader:expr, $record:expr) => {
        match $word_reader.next_word()? {
            Some((word, cursor)) => (word, cursor),
            None => {
                let cursor = $word_reader.end_cursor();
                return Err($crate::error::WaveError::Parse {
                    cursor,
                    message: format!("input ended in the middle of {}", $record),
                });
            }
        }
    };
}

pub(crate) use next_word;
