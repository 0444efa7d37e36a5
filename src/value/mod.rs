//! Tagged JSON value tree.
//!
//! `Value<'a>` ties two lifetimes together: the input buffer its strings
//! borrow from and the [`Region`] its containers are allocated in. Neither
//! can be dropped, modified, reset or released while a value is alive.

mod array;
mod dict;

use std::fmt;

use serde::ser::{Serialize, Serializer};

pub use array::Array;
pub use dict::Dict;

use crate::arena::Region;
use crate::num::number::is_safe_integer;
use crate::{Error, Result};

/// A string payload.
///
/// `Span` and `Raw` point into the parsed input buffer; `Decoded` holds
/// escape-decoded text copied into the region.
#[derive(Debug, Clone, Copy)]
pub enum JsonStr<'a> {
    /// Escape-free text borrowed from the input.
    Span(&'a str),
    /// Text borrowed from the input with its escape sequences left as written.
    Raw(&'a str),
    /// Decoded text living in the region.
    Decoded(&'a str),
}

impl<'a> JsonStr<'a> {
    pub fn as_str(&self) -> &'a str {
        match *self {
            JsonStr::Span(text) | JsonStr::Raw(text) | JsonStr::Decoded(text) => text,
        }
    }

    /// True when the bytes are a subslice of the parsed input.
    pub fn is_borrowed(&self) -> bool {
        matches!(self, JsonStr::Span(_) | JsonStr::Raw(_))
    }

    pub fn is_raw(&self) -> bool {
        matches!(self, JsonStr::Raw(_))
    }
}

impl PartialEq for JsonStr<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for JsonStr<'_> {}

impl PartialEq<str> for JsonStr<'_> {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for JsonStr<'_> {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl AsRef<str> for JsonStr<'_> {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl<'a> From<&'a str> for JsonStr<'a> {
    fn from(text: &'a str) -> Self {
        JsonStr::Span(text)
    }
}

impl fmt::Display for JsonStr<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for JsonStr<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, PartialEq, Default)]
pub enum Value<'a> {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    String(JsonStr<'a>),
    Array(Array<'a>),
    Dict(Dict<'a>),
}

impl<'a> Value<'a> {
    pub fn array_in(region: &'a Region) -> Self {
        Value::Array(Array::new_in(region))
    }

    pub fn dict_in(region: &'a Region) -> Self {
        Value::Dict(Dict::new_in(region))
    }

    pub const fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub const fn is_bool(&self) -> bool {
        matches!(self, Value::Bool(_))
    }

    pub const fn is_number(&self) -> bool {
        matches!(self, Value::Number(_))
    }

    pub const fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }

    pub const fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    pub const fn is_dict(&self) -> bool {
        matches!(self, Value::Dict(_))
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&'a str> {
        match self {
            Value::String(text) => Some(text.as_str()),
            _ => None,
        }
    }

    pub fn as_json_str(&self) -> Option<&JsonStr<'a>> {
        match self {
            Value::String(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Array<'a>> {
        match self {
            Value::Array(arr) => Some(arr),
            _ => None,
        }
    }

    pub fn as_array_mut(&mut self) -> Option<&mut Array<'a>> {
        match self {
            Value::Array(arr) => Some(arr),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&Dict<'a>> {
        match self {
            Value::Dict(dict) => Some(dict),
            _ => None,
        }
    }

    pub fn as_dict_mut(&mut self) -> Option<&mut Dict<'a>> {
        match self {
            Value::Dict(dict) => Some(dict),
            _ => None,
        }
    }

    /// Typed extraction; fails with `TypeMismatch` unless the active variant
    /// is exactly the requested one.
    pub fn extract<'v, T>(&'v self) -> Result<T>
    where
        T: FromValue<'v, 'a>,
    {
        T::from_value(self)
    }

    pub fn get(&self, key: &str) -> Option<&Value<'a>> {
        match self {
            Value::Dict(dict) => dict.get(key),
            _ => None,
        }
    }

    pub fn get_index(&self, index: usize) -> Option<&Value<'a>> {
        match self {
            Value::Array(arr) => arr.get(index),
            _ => None,
        }
    }

    /// Keyed access on a dict, inserting `Null` when the key is absent.
    pub fn entry(&mut self, key: impl Into<JsonStr<'a>>) -> Result<&mut Value<'a>> {
        match self {
            Value::Dict(dict) => dict.entry(key),
            other => Err(Error::type_mismatch("dict", other.type_name())),
        }
    }

    pub fn take(&mut self) -> Value<'a> {
        std::mem::take(self)
    }

    /// Deep copy; containers are re-allocated in the region they came from.
    pub fn try_clone(&self) -> Result<Value<'a>> {
        Ok(match self {
            Value::Null => Value::Null,
            Value::Bool(b) => Value::Bool(*b),
            Value::Number(n) => Value::Number(*n),
            Value::String(text) => Value::String(*text),
            Value::Array(arr) => Value::Array(arr.try_clone()?),
            Value::Dict(dict) => Value::Dict(dict.try_clone()?),
        })
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Dict(_) => "dict",
        }
    }
}

impl From<bool> for Value<'_> {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value<'_> {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl<'a> From<&'a str> for Value<'a> {
    fn from(text: &'a str) -> Self {
        Value::String(JsonStr::Span(text))
    }
}

impl<'a> From<JsonStr<'a>> for Value<'a> {
    fn from(text: JsonStr<'a>) -> Self {
        Value::String(text)
    }
}

impl<'a> From<Array<'a>> for Value<'a> {
    fn from(arr: Array<'a>) -> Self {
        Value::Array(arr)
    }
}

impl<'a> From<Dict<'a>> for Value<'a> {
    fn from(dict: Dict<'a>) -> Self {
        Value::Dict(dict)
    }
}

impl fmt::Display for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::to_string(self))
    }
}

impl Serialize for Value<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Number(n) if is_safe_integer(*n) => serializer.serialize_i64(*n as i64),
            Value::Number(n) => serializer.serialize_f64(*n),
            Value::String(text) => text.serialize(serializer),
            Value::Array(arr) => arr.serialize(serializer),
            Value::Dict(dict) => dict.serialize(serializer),
        }
    }
}

/// Conversion used by [`Value::extract`].
pub trait FromValue<'v, 'a>: Sized {
    fn from_value(value: &'v Value<'a>) -> Result<Self>;
}

impl<'v, 'a> FromValue<'v, 'a> for () {
    fn from_value(value: &'v Value<'a>) -> Result<Self> {
        match value {
            Value::Null => Ok(()),
            other => Err(Error::type_mismatch("null", other.type_name())),
        }
    }
}

impl<'v, 'a> FromValue<'v, 'a> for bool {
    fn from_value(value: &'v Value<'a>) -> Result<Self> {
        value
            .as_bool()
            .ok_or_else(|| Error::type_mismatch("boolean", value.type_name()))
    }
}

impl<'v, 'a> FromValue<'v, 'a> for f64 {
    fn from_value(value: &'v Value<'a>) -> Result<Self> {
        value
            .as_f64()
            .ok_or_else(|| Error::type_mismatch("number", value.type_name()))
    }
}

impl<'v, 'a: 'v> FromValue<'v, 'a> for &'v str {
    fn from_value(value: &'v Value<'a>) -> Result<Self> {
        value
            .as_str()
            .ok_or_else(|| Error::type_mismatch("string", value.type_name()))
    }
}

impl<'v, 'a: 'v> FromValue<'v, 'a> for &'v JsonStr<'a> {
    fn from_value(value: &'v Value<'a>) -> Result<Self> {
        value
            .as_json_str()
            .ok_or_else(|| Error::type_mismatch("string", value.type_name()))
    }
}

impl<'v, 'a: 'v> FromValue<'v, 'a> for &'v Array<'a> {
    fn from_value(value: &'v Value<'a>) -> Result<Self> {
        value
            .as_array()
            .ok_or_else(|| Error::type_mismatch("array", value.type_name()))
    }
}

impl<'v, 'a: 'v> FromValue<'v, 'a> for &'v Dict<'a> {
    fn from_value(value: &'v Value<'a>) -> Result<Self> {
        value
            .as_dict()
            .ok_or_else(|| Error::type_mismatch("dict", value.type_name()))
    }
}
