//! JSON documents parsed into a tree whose nodes live in a bulk-reset
//! memory region.
//!
//! Escape-free strings in the tree are views into the caller's input
//! buffer; containers and decoded strings are placed in a [`Region`].
//! Dropping the tree costs nothing; [`Region::reset`] reclaims every node
//! at once and keeps the blocks for the next document.
//!
//! ```
//! use arena_json::{parse, Region};
//!
//! let mut region = Region::new();
//! {
//!     let value = parse(r#"{"name": "Ada", "tags": ["x", "y"]}"#, &region)?;
//!     assert_eq!(value.get("name").and_then(|v| v.as_str()), Some("Ada"));
//!     assert_eq!(value.get("tags").and_then(|v| v.as_array()).map(|a| a.len()), Some(2));
//! }
//! region.reset();
//! # Ok::<(), arena_json::Error>(())
//! ```

pub mod arena;
pub mod constants;
pub mod decode;
pub mod encode;
pub mod error;
pub mod num;
pub mod options;
pub mod text;
pub mod value;

use std::io::Write;

pub use crate::arena::{Region, RegionAlloc, RegionStats};
pub use crate::error::{Error, ErrorKind, Location};
pub use crate::options::{EscapePolicy, Indent, ParseOptions, PrintOptions, RegionOptions};
pub use crate::value::{Array, Dict, FromValue, JsonStr, Value};

pub type Result<T> = std::result::Result<T, Error>;

pub fn parse<'a>(input: &'a str, region: &'a Region) -> Result<Value<'a>> {
    parse_with_options(input, region, &ParseOptions::default())
}

pub fn parse_with_options<'a>(
    input: &'a str,
    region: &'a Region,
    options: &ParseOptions,
) -> Result<Value<'a>> {
    decode::parse(input, region, options)
}

pub fn from_slice<'a>(input: &'a [u8], region: &'a Region) -> Result<Value<'a>> {
    from_slice_with_options(input, region, &ParseOptions::default())
}

pub fn from_slice_with_options<'a>(
    input: &'a [u8],
    region: &'a Region,
    options: &ParseOptions,
) -> Result<Value<'a>> {
    decode::from_slice(input, region, options)
}

pub fn to_string(value: &Value<'_>) -> String {
    to_string_with_options(value, &PrintOptions::default())
}

pub fn to_string_with_options(value: &Value<'_>, options: &PrintOptions) -> String {
    encode::to_string(value, options)
}

pub fn to_vec(value: &Value<'_>) -> Vec<u8> {
    to_vec_with_options(value, &PrintOptions::default())
}

pub fn to_vec_with_options(value: &Value<'_>, options: &PrintOptions) -> Vec<u8> {
    encode::to_vec(value, options)
}

pub fn to_writer<W: Write>(writer: W, value: &Value<'_>) -> Result<()> {
    to_writer_with_options(writer, value, &PrintOptions::default())
}

pub fn to_writer_with_options<W: Write>(
    writer: W,
    value: &Value<'_>,
    options: &PrintOptions,
) -> Result<()> {
    encode::to_writer(writer, value, options)
}
