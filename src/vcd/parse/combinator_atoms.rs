// Copyright (C) 2022 Yehowshua Immanuel
// This program is distributed under both the GPLV3 license
// and the YEHOWSHUA license, both of which can be found at
// the root of the folder containing the sources for this program.
use super::types::ParseResult;

pub(super) fn digit(chr: u8) -> bool {
    chr.is_ascii_digit()
}

pub(super) fn take_until(word: &str, pattern: u8) -> ParseResult<'_> {
    let new_start = word
        .bytes()
        .position(|chr| chr == pattern)
        .unwrap_or(word.len());

    ParseResult {
        matched: &word[0..new_start],
        residual: &word[new_start..],
    }
}

pub(super) fn take_while(word: &str, cond: fn(u8) -> bool) -> ParseResult<'_> {
    // cond only ever accepts ascii, so the split is a char boundary
    let new_start = word
        .bytes()
        .position(|chr| !cond(chr))
        .unwrap_or(word.len());

    ParseResult {
        matched: &word[0..new_start],
        residual: &word[new_start..],
    }
}

pub(super) fn tag<'a>(word: &'a str, pattern: &str) -> ParseResult<'a> {
    if word.starts_with(pattern) {
        ParseResult {
            matched: &word[0..pattern.len()],
            residual: &word[pattern.len()..],
        }
    } else {
        ParseResult {
            matched: "",
            residual: word,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn atoms() {
        let res = take_until("12:34:56", b':');
        assert_eq!((res.matched, res.residual), ("12", ":34:56"));

        let res = take_while("100ps", digit);
        assert_eq!((res.matched, res.residual), ("100", "ps"));
        assert!(take_while("ps", digit).assert_match().is_err());

        let res = tag("[7:0]", "[");
        assert_eq!((res.matched, res.residual), ("[", "7:0]"));
        assert!(tag("7:0]", "[").assert_match().is_err());
        assert!(tag("[", "[").assert_residual().is_err());
    }
}
