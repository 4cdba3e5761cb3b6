#[cfg(test)]
mod lexer_test;

use std::fmt;
use std::fmt::Display;

use super::error::{Error, Result};

pub(crate) const END_LINE: &str = "\r\n";

/// Line is a single trimmed, non-empty line of SDP text together with its
/// 1-based position in the document it was read from.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Line<'a> {
    number: usize,
    text: &'a str,
}

impl<'a> Line<'a> {
    pub fn new(number: usize, text: &'a str) -> Self {
        Line { number, text }
    }

    pub fn number(&self) -> usize {
        self.number
    }

    pub fn as_str(&self) -> &'a str {
        self.text
    }

    /// The line type, i.e. the character before the first `=`.
    pub fn kind(&self) -> Option<char> {
        self.text.chars().next()
    }

    /// has reports whether `sub` occurs anywhere in the line.
    pub fn has(&self, sub: &str) -> bool {
        self.text.contains(sub)
    }

    /// value_after returns everything following the first occurrence of
    /// `marker`, or None if the marker is absent.
    pub fn value_after(&self, marker: &str) -> Option<&'a str> {
        self.text
            .find(marker)
            .map(|i| &self.text[i + marker.len()..])
    }

    /// decode extracts `N` fields from the line using a scan pattern.
    ///
    /// The pattern is literal text interleaved with `%s` (a run of
    /// non-whitespace) and `%d` (an optionally signed run of digits). A run
    /// of whitespace in the pattern matches any amount of whitespace in the
    /// line. Input left over after the pattern is exhausted is ignored.
    pub fn decode<const N: usize>(&self, pattern: &str) -> Result<[&'a str; N]> {
        scan(self.text, pattern)
            .and_then(|fields| fields.try_into().ok())
            .ok_or_else(|| Error::line_format(pattern, self.text))
    }

    /// decode_if_has is `decode` gated on `marker`: it yields None when the
    /// marker does not occur in the line at all.
    pub fn decode_if_has<const N: usize>(
        &self,
        marker: &str,
        pattern: &str,
    ) -> Option<Result<[&'a str; N]>> {
        if !self.has(marker) {
            return None;
        }
        Some(self.decode(pattern))
    }
}

impl Display for Line<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}

fn scan<'a>(text: &'a str, pattern: &str) -> Option<Vec<&'a str>> {
    let mut fields = vec![];
    let mut rest = text;
    let mut pat = pattern;

    while let Some(c) = pat.chars().next() {
        if let Some(p) = pat.strip_prefix("%s") {
            rest = rest.trim_start();
            let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
            if end == 0 {
                return None;
            }
            fields.push(&rest[..end]);
            rest = &rest[end..];
            pat = p;
        } else if let Some(p) = pat.strip_prefix("%d") {
            rest = rest.trim_start();
            let bytes = rest.as_bytes();
            let start = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
            let end = start + bytes[start..].iter().take_while(|b| b.is_ascii_digit()).count();
            if end == start {
                return None;
            }
            fields.push(&rest[..end]);
            rest = &rest[end..];
            pat = p;
        } else if c.is_whitespace() {
            pat = pat.trim_start();
            rest = rest.trim_start();
        } else {
            rest = rest.strip_prefix(c)?;
            pat = &pat[c.len_utf8()..];
        }
    }

    Some(fields)
}

/// split_lines breaks a text blob into trimmed, non-empty lines. Both CRLF
/// and bare LF terminators are accepted.
pub fn split_lines(text: &str) -> Vec<Line<'_>> {
    text.lines()
        .enumerate()
        .filter_map(|(i, raw)| {
            let trimmed = raw.trim_matches(|c| c == ' ' || c == '\t' || c == '\r');
            if trimmed.is_empty() {
                None
            } else {
                Some(Line::new(i + 1, trimmed))
            }
        })
        .collect()
}

/// Unset marks the values that suppress an encoded fragment: empty strings,
/// false flags and the unspecified variants of the enums in this crate.
pub trait Unset {
    fn is_unset(&self) -> bool;
}

impl Unset for str {
    fn is_unset(&self) -> bool {
        self.is_empty()
    }
}

impl Unset for String {
    fn is_unset(&self) -> bool {
        self.is_empty()
    }
}

impl Unset for bool {
    fn is_unset(&self) -> bool {
        !*self
    }
}

impl<T> Unset for Option<T> {
    fn is_unset(&self) -> bool {
        self.is_none()
    }
}

impl<T: Unset + ?Sized> Unset for &T {
    fn is_unset(&self) -> bool {
        (**self).is_unset()
    }
}

/// append writes `fragment` unless the value driving it is unset.
pub fn append<W: fmt::Write, V: Unset + ?Sized>(
    writer: &mut W,
    driver: &V,
    fragment: fmt::Arguments<'_>,
) -> fmt::Result {
    if driver.is_unset() {
        return Ok(());
    }
    writer.write_fmt(fragment)
}

pub fn write_key_value<W: fmt::Write, V: Display + Unset>(
    writer: &mut W,
    key: &str,
    value: V,
) -> fmt::Result {
    if value.is_unset() {
        return Ok(());
    }

    write!(writer, "{key}{value}{END_LINE}")
}

pub fn write_flag<W: fmt::Write>(writer: &mut W, key: &str, flag: bool) -> fmt::Result {
    if !flag {
        return Ok(());
    }

    write!(writer, "{key}{END_LINE}")
}

pub fn write_key_slice_of_values<W: fmt::Write, V: Display + Unset>(
    writer: &mut W,
    key: &str,
    value: &[V],
) -> fmt::Result {
    if value.iter().all(Unset::is_unset) {
        return Ok(());
    }

    let mut first = true;

    write!(writer, "{key}")?;
    for val in value.iter().filter(|v| !v.is_unset()) {
        if first {
            first = false;
            write!(writer, "{val}")?;
        } else {
            write!(writer, " {val}")?;
        }
    }
    write!(writer, "{END_LINE}")?;

    Ok(())
}

pub(crate) fn parse_u16(field: &str) -> Result<u16> {
    Ok(field.parse::<u16>()?)
}

pub(crate) fn parse_u32(field: &str) -> Result<u32> {
    Ok(field.parse::<u32>()?)
}

pub(crate) fn parse_u64(field: &str) -> Result<u64> {
    Ok(field.parse::<u64>()?)
}
