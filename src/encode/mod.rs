mod writer;

use std::io::Write;

use crate::value::Value;
use crate::{Error, PrintOptions, Result};

use writer::Writer;

/// Renders `value` as indented JSON text.
///
/// Empty containers stay inline (`[]`, `{}`); every other container puts
/// one entry per line, one indentation unit deeper than its parent. Dict
/// entries follow the dict's key order.
///
/// # Examples
/// ```
/// use arena_json::{encode, parse, PrintOptions, Region};
///
/// let region = Region::new();
/// let value = parse(r#"{"b":[],"a":[1,true]}"#, &region)?;
/// let text = encode::to_string(&value, &PrintOptions::default());
/// assert_eq!(text, "{\n\t\"a\": [\n\t\t1,\n\t\ttrue\n\t],\n\t\"b\": []\n}");
/// # Ok::<(), arena_json::Error>(())
/// ```
pub fn to_string(value: &Value<'_>, options: &PrintOptions) -> String {
    let mut writer = Writer::new(options);
    write_value(&mut writer, value, 0);
    writer.finish()
}

pub fn to_vec(value: &Value<'_>, options: &PrintOptions) -> Vec<u8> {
    let mut writer = Writer::new(options);
    write_value(&mut writer, value, 0);
    writer.finish_bytes()
}

pub fn to_writer<W: Write>(mut sink: W, value: &Value<'_>, options: &PrintOptions) -> Result<()> {
    let bytes = to_vec(value, options);
    sink.write_all(&bytes).map_err(Error::io)?;
    sink.flush().map_err(Error::io)
}

fn write_value(writer: &mut Writer, value: &Value<'_>, depth: usize) {
    match value {
        Value::Null => writer.write_str("null"),
        Value::Bool(true) => writer.write_str("true"),
        Value::Bool(false) => writer.write_str("false"),
        Value::Number(n) => writer.write_number(*n),
        Value::String(text) => writer.write_string(text),
        Value::Array(arr) => {
            if arr.is_empty() {
                writer.write_str("[]");
                return;
            }
            writer.write_byte(b'[');
            for (idx, item) in arr.iter().enumerate() {
                if idx > 0 {
                    writer.write_byte(b',');
                }
                writer.write_newline();
                writer.write_indent(depth + 1);
                write_value(writer, item, depth + 1);
            }
            writer.write_newline();
            writer.write_indent(depth);
            writer.write_byte(b']');
        }
        Value::Dict(dict) => {
            if dict.is_empty() {
                writer.write_str("{}");
                return;
            }
            writer.write_byte(b'{');
            for (idx, (key, item)) in dict.iter().enumerate() {
                if idx > 0 {
                    writer.write_byte(b',');
                }
                writer.write_newline();
                writer.write_indent(depth + 1);
                writer.write_string(key);
                writer.write_str(": ");
                write_value(writer, item, depth + 1);
            }
            writer.write_newline();
            writer.write_indent(depth);
            writer.write_byte(b'}');
        }
    }
}
