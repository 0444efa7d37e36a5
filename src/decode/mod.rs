mod parser;

use tracing::debug;

use crate::arena::Region;
use crate::value::Value;
use crate::{Error, Location, ParseOptions, Result};

use parser::Parser;

/// Parses one JSON document from `input`.
///
/// The returned tree borrows both `input` (escape-free strings are views
/// into it) and `region` (containers and decoded strings live there).
pub fn parse<'a>(input: &'a str, region: &'a Region, options: &ParseOptions) -> Result<Value<'a>> {
    let mut parser = Parser::new(input, region, options);
    let value = parser.parse()?;
    debug!(
        input_bytes = input.len(),
        consumed = parser.position(),
        region_bytes = region.used_bytes(),
        "document parsed"
    );
    Ok(value)
}

pub fn from_slice<'a>(
    input: &'a [u8],
    region: &'a Region,
    options: &ParseOptions,
) -> Result<Value<'a>> {
    let text = std::str::from_utf8(input).map_err(|err| {
        Error::parse(format!("invalid utf-8: {err}"))
            .with_location(Location::from_offset(input, err.valid_up_to()))
    })?;
    parse(text, region, options)
}
