use memchr::memchr2;
use tracing::trace;

use crate::arena::Region;
use crate::constants::{is_whitespace, starts_number};
use crate::text::string::unescape_into;
use crate::value::{Array, Dict, JsonStr, Value};
use crate::{EscapePolicy, Error, Location, ParseOptions, Result};

/// Recursive-descent parser over a single input buffer.
///
/// Strings without escapes come back as views into `input`; everything the
/// tree needs beyond that is placed in `region`.
pub(crate) struct Parser<'a> {
    input: &'a str,
    bytes: &'a [u8],
    pos: usize,
    depth: usize,
    region: &'a Region,
    options: ParseOptions,
    scratch: String,
    /// Members of the objects still open, innermost last, tagged with the
    /// offset of their key.
    pending: Vec<(JsonStr<'a>, Value<'a>, usize)>,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str, region: &'a Region, options: &ParseOptions) -> Self {
        Self {
            input,
            bytes: input.as_bytes(),
            pos: 0,
            depth: 0,
            region,
            options: *options,
            scratch: String::new(),
            pending: Vec::new(),
        }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    /// Parses exactly one root value; only whitespace may follow it.
    pub fn parse(&mut self) -> Result<Value<'a>> {
        let value = self.parse_value()?;
        self.skip_whitespace();
        if self.pos < self.bytes.len() {
            return Err(self.error_at(
                self.pos,
                format!("trailing characters after root value: {}", self.describe(self.pos)),
            ));
        }
        trace!(bytes = self.bytes.len(), kind = value.type_name(), "parsed root value");
        Ok(value)
    }

    fn parse_value(&mut self) -> Result<Value<'a>> {
        self.skip_whitespace();
        let Some(byte) = self.peek() else {
            return Err(self.error_at(self.pos, "unexpected end of input"));
        };
        match byte {
            b'n' => self.parse_literal("null", Value::Null),
            b't' => self.parse_literal("true", Value::Bool(true)),
            b'f' => self.parse_literal("false", Value::Bool(false)),
            b'"' => Ok(Value::String(self.parse_string()?)),
            b'[' => self.parse_array(),
            b'{' => self.parse_dict(),
            byte if starts_number(byte) => self.parse_number(),
            _ => Err(self.error_at(
                self.pos,
                format!("expected value, found {}", self.describe(self.pos)),
            )),
        }
    }

    fn parse_array(&mut self) -> Result<Value<'a>> {
        let open = self.pos;
        self.enter(open)?;
        self.pos += 1;
        let mut array = Array::new_in(self.region);

        self.skip_whitespace();
        if self.peek() == Some(b']') {
            self.pos += 1;
            self.leave();
            return Ok(Value::Array(array));
        }

        loop {
            let item = self.parse_value()?;
            array
                .push(item)
                .map_err(|err| err.with_location(self.location(self.pos)))?;
            self.skip_whitespace();
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(b']') => {
                    self.pos += 1;
                    break;
                }
                None => return Err(self.error_at(self.pos, "unterminated array")),
                Some(_) => {
                    return Err(self.error_at(
                        self.pos,
                        format!("expected ',' or ']', found {}", self.describe(self.pos)),
                    ))
                }
            }
        }

        self.leave();
        Ok(Value::Array(array))
    }

    fn parse_dict(&mut self) -> Result<Value<'a>> {
        let open = self.pos;
        self.enter(open)?;
        self.pos += 1;

        self.skip_whitespace();
        if self.peek() == Some(b'}') {
            self.pos += 1;
            self.leave();
            return Ok(Value::Dict(Dict::new_in(self.region)));
        }

        let base = self.pending.len();

        loop {
            self.skip_whitespace();
            let key_offset = self.pos;
            match self.peek() {
                Some(b'"') => {}
                None => return Err(self.error_at(self.pos, "unterminated object")),
                Some(_) => {
                    return Err(self.error_at(
                        self.pos,
                        format!("expected string key, found {}", self.describe(self.pos)),
                    ))
                }
            }
            let key = self.parse_string()?;

            self.skip_whitespace();
            self.expect(b':', "expected ':' after object key")?;

            let value = self.parse_value()?;
            self.pending.push((key, value, key_offset));

            self.skip_whitespace();
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(b'}') => {
                    self.pos += 1;
                    break;
                }
                None => return Err(self.error_at(self.pos, "unterminated object")),
                Some(_) => {
                    return Err(self.error_at(
                        self.pos,
                        format!("expected ',' or '}}', found {}", self.describe(self.pos)),
                    ))
                }
            }
        }

        let dict = self.finish_dict(open, base)?;
        self.leave();
        Ok(Value::Dict(dict))
    }

    /// Sorts the members pushed since `base` once and moves them into a
    /// `Dict`. A repeated key is reported at its second occurrence in the
    /// input.
    fn finish_dict(&mut self, open: usize, base: usize) -> Result<Dict<'a>> {
        let members = &mut self.pending[base..];
        members.sort_by(|a, b| a.0.as_str().cmp(b.0.as_str()));
        let repeated = members
            .windows(2)
            .filter(|pair| pair[0].0.as_str() == pair[1].0.as_str())
            .map(|pair| (pair[1].2, pair[1].0))
            .min_by_key(|(offset, _)| *offset);
        if let Some((offset, key)) = repeated {
            return Err(Error::duplicate_key(key.as_str()).with_location(self.location(offset)));
        }

        let members = self.pending.drain(base..).map(|(key, value, _)| (key, value));
        Dict::from_sorted(self.region, members)
            .map_err(|err| err.with_location(self.location(open)))
    }

    fn parse_string(&mut self) -> Result<JsonStr<'a>> {
        let open = self.pos;
        let start = open + 1;
        let mut idx = start;
        let mut escaped = false;
        let end = loop {
            let Some(offset) = memchr2(b'"', b'\\', &self.bytes[idx..]) else {
                return Err(self.error_at(open, "unterminated string"));
            };
            let pos = idx + offset;
            if self.bytes[pos] == b'"' {
                break pos;
            }
            escaped = true;
            idx = pos + 2;
            if idx > self.bytes.len() {
                return Err(self.error_at(open, "unterminated string"));
            }
        };
        self.pos = end + 1;

        let body = &self.input[start..end];
        if !escaped {
            return Ok(JsonStr::Span(body));
        }
        match self.options.escapes {
            EscapePolicy::Raw => Ok(JsonStr::Raw(body)),
            EscapePolicy::Decode => {
                self.scratch.clear();
                if let Err(err) = unescape_into(&mut self.scratch, body) {
                    return Err(self.error_at(start + err.offset, err.message));
                }
                let region = self.region;
                let decoded = region
                    .alloc_str(&self.scratch)
                    .map_err(|err| err.with_location(self.location(open)))?;
                Ok(JsonStr::Decoded(decoded))
            }
        }
    }

    fn parse_number(&mut self) -> Result<Value<'a>> {
        let start = self.pos;
        let Some(end) = scan_number(self.bytes, start) else {
            return Err(self.error_at(start, "malformed number"));
        };
        let text = &self.input[start..end];
        let number = text
            .parse::<f64>()
            .map_err(|_| self.error_at(start, format!("malformed number '{text}'")))?;
        if !number.is_finite() {
            return Err(self.error_at(start, format!("number out of range '{text}'")));
        }
        self.pos = end;
        Ok(Value::Number(number))
    }

    fn parse_literal(&mut self, literal: &'static str, value: Value<'a>) -> Result<Value<'a>> {
        if self.bytes[self.pos..].starts_with(literal.as_bytes()) {
            self.pos += literal.len();
            Ok(value)
        } else {
            Err(self.error_at(self.pos, format!("invalid literal, expected '{literal}'")))
        }
    }

    fn enter(&mut self, offset: usize) -> Result<()> {
        self.depth += 1;
        if self.depth > self.options.max_depth {
            return Err(self.error_at(
                offset,
                format!("nesting too deep (max depth {})", self.options.max_depth),
            ));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn skip_whitespace(&mut self) {
        while self.pos < self.bytes.len() && is_whitespace(self.bytes[self.pos]) {
            self.pos += 1;
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn expect(&mut self, byte: u8, message: &str) -> Result<()> {
        match self.peek() {
            Some(found) if found == byte => {
                self.pos += 1;
                Ok(())
            }
            _ => Err(self.error_at(
                self.pos,
                format!("{message}, found {}", self.describe(self.pos)),
            )),
        }
    }

    fn describe(&self, offset: usize) -> String {
        match self.input.get(offset..).and_then(|rest| rest.chars().next()) {
            Some(ch) => format!("{ch:?}"),
            None => "end of input".to_string(),
        }
    }

    fn location(&self, offset: usize) -> Location {
        Location::from_offset(self.bytes, offset)
    }

    fn error_at(&self, offset: usize, message: impl Into<String>) -> Error {
        Error::parse(message).with_location(self.location(offset))
    }
}

/// Longest prefix at `start` shaped like `[+-]? digits* ('.' digits*)? ([eE][+-]? digits+)?`.
/// `None` when the mantissa has no digit.
///
/// Only the plain decimal form is accepted. Unlike `strtod` this rejects
/// `inf`, `-inf` and `nan`, and hexadecimal input such as `0x1A` stops after
/// the leading `0` so the `x` is reported by the caller. A mantissa that
/// overflows `f64` is rejected when the text is converted, not here.
fn scan_number(bytes: &[u8], start: usize) -> Option<usize> {
    let digits_from = |mut idx: usize| {
        while idx < bytes.len() && bytes[idx].is_ascii_digit() {
            idx += 1;
        }
        idx
    };

    let mut idx = start;
    if matches!(bytes.get(idx), Some(b'+' | b'-')) {
        idx += 1;
    }
    let int_end = digits_from(idx);
    let mut mantissa_digits = int_end - idx;
    idx = int_end;

    if bytes.get(idx) == Some(&b'.') {
        let frac_end = digits_from(idx + 1);
        mantissa_digits += frac_end - (idx + 1);
        idx = frac_end;
    }
    if mantissa_digits == 0 {
        return None;
    }

    if matches!(bytes.get(idx), Some(b'e' | b'E')) {
        let mut exp = idx + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_end = digits_from(exp);
        if exp_end > exp {
            idx = exp_end;
        }
    }
    Some(idx)
}
