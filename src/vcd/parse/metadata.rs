// Copyright (C) 2022 Yehowshua Immanuel
// This program is distributed under both the GPLV3 license
// and the YEHOWSHUA license, both of which can be found at
// the root of the folder containing the sources for this program.

//! `$date`, `$version` and `$timescale`. Metadata is informational, so
//! the header builder logs and drops anything that fails to parse here.
use chrono::prelude::*;
use itertools::Itertools;

use super::super::types::{Metadata, Timescale, Version};
use super::combinator_atoms::{digit, take_until, take_while};
use super::types::ParseResult;

fn parse_date(
    word1: &str,
    word2: &str,
    word3: &str,
    word4: &str,
    word5: &str,
) -> Result<DateTime<Utc>, String> {
    let day = {
        let days = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];
        if !days.contains(&word1) {
            return Err(format!(
                "{word1} is not a valid weekday : expected one of {days:?}"
            ));
        }
        word1
    };

    let month = {
        let months = [
            "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Sept", "Oct", "Nov",
            "Dec",
        ];
        if !months.contains(&word2) {
            return Err(format!(
                "{word2} is not a valid month : expected one of {months:?}"
            ));
        }
        // chrono only knows the three letter abbreviation
        &word2[0..3]
    };

    let date = {
        let date: u8 = word3.parse().map_err(|e| format!("{word3} : {e}"))?;
        if date > 31 {
            return Err(format!(
                "{word3} is not a valid date : must be between 0 and 31"
            ));
        }
        date
    };

    let (hh, mm, ss) = {
        // get hour
        let res = take_until(word4, b':');
        res.assert_match()?;
        let hh: u8 = res.matched.parse().map_err(|e| format!("{word4} : {e}"))?;
        if hh > 23 {
            return Err(format!("{hh} is not a valid hour : must be between 0 and 23"));
        }

        // get minute
        let word = &res.assert_residual()?[1..]; // chop off colon which is at index 0
        let res = take_until(word, b':');
        res.assert_match()?;
        let mm: u8 = res.matched.parse().map_err(|e| format!("{word4} : {e}"))?;
        if mm > 60 {
            return Err(format!("{mm} is not a valid minute : must be between 0 and 60"));
        }

        // get second
        let residual = &res.assert_residual()?[1..]; // chop off colon which is at index 0
        let ss: u8 = residual.parse().map_err(|e| format!("{word4} : {e}"))?;
        if ss > 60 {
            return Err(format!("{ss} is not a valid second : must be between 0 and 60"));
        }
        (hh, mm, ss)
    };

    let year = word5;

    let full_date = format!("{day} {month} {date} {hh}:{mm}:{ss} {year}");
    let naive = NaiveDateTime::parse_from_str(full_date.as_str(), "%a %b %d %H:%M:%S %Y")
        .map_err(|e| format!("failed to parse date `{full_date}` : {e}"))?;
    Ok(Utc.from_utc_datetime(&naive))
}

/// A date is typically composed of the 5 following words which can occur
/// in any order: {Day, Month, Date(number in month), hh:mm:ss, year}.
/// We try the parser on all 5! = 120 orderings of the words.
pub(super) fn parse_date_words(body: &[String]) -> Result<DateTime<Utc>, String> {
    if body.len() != 5 {
        return Err(format!(
            "expected 5 words in `$date` but found {}",
            body.len()
        ));
    }

    for words in body.iter().permutations(body.len()) {
        let parsed_date = parse_date(words[0], words[1], words[2], words[3], words[4]);
        if parsed_date.is_ok() {
            return parsed_date;
        }
    }

    Err(format!("failed to parse date `{}`", body.join(" ")))
}

pub(super) fn parse_version(body: &[String]) -> Result<Version, String> {
    if body.is_empty() {
        return Err("empty `$version`".to_string());
    }
    Ok(Version(body.join(" ")))
}

fn parse_unit(unit: &str) -> Result<Timescale, String> {
    match unit {
        "fs" => Ok(Timescale::Fs),
        "ps" => Ok(Timescale::Ps),
        "ns" => Ok(Timescale::Ns),
        "us" => Ok(Timescale::Us),
        "ms" => Ok(Timescale::Ms),
        "s" => Ok(Timescale::S),
        _ => Err(format!("unknown unit {unit}")),
    }
}

pub(super) fn parse_timescale(body: &[String]) -> Result<(Option<u32>, Timescale), String> {
    // we might see `1ps $end` or `1 ps $end`
    let word = body.first().ok_or("empty `$timescale`")?;
    let ParseResult { matched, residual } = take_while(word, digit);
    let scalar: u32 = matched
        .parse()
        .map_err(|e| format!("failed to parse timescale `{word}` : {e}"))?;

    let unit = if residual.is_empty() {
        let unit = body.get(1).ok_or("`$timescale` is missing its unit")?;
        parse_unit(unit)?
    } else {
        parse_unit(residual)?
    };

    Ok((Some(scalar), unit))
}

/// Folds one header directive into the metadata. Returns an error message
/// when a recognized directive could not be parsed.
pub(super) fn apply_directive(
    metadata: &mut Metadata,
    keyword: &str,
    body: &[String],
) -> Result<(), String> {
    match keyword {
        "date" => metadata.date = Some(parse_date_words(body)?),
        "version" => metadata.version = Some(parse_version(body)?),
        "timescale" => metadata.timescale = parse_timescale(body)?,
        // we ignore comments
        "comment" => {}
        _ => tracing::debug!(keyword, "ignoring header directive"),
    }
    Ok(())
}
