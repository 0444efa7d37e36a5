use crate::num::number::write_number_into;
use crate::text::string::{escape_string_into, needs_escape};
use crate::value::JsonStr;
use crate::PrintOptions;

pub(crate) struct Writer {
    buffer: Vec<u8>,
    indent_unit: String,
    indent_cache: Vec<String>,
}

impl Writer {
    pub fn new(options: &PrintOptions) -> Self {
        Self {
            buffer: Vec::new(),
            indent_unit: options.indent.unit(),
            indent_cache: vec![String::new()],
        }
    }

    pub fn finish(self) -> String {
        match String::from_utf8(self.buffer) {
            Ok(text) => text,
            Err(err) => String::from_utf8_lossy(err.as_bytes()).into_owned(),
        }
    }

    pub fn finish_bytes(self) -> Vec<u8> {
        self.buffer
    }

    pub fn write_str(&mut self, s: &str) {
        self.buffer.extend_from_slice(s.as_bytes());
    }

    pub fn write_byte(&mut self, byte: u8) {
        self.buffer.push(byte);
    }

    pub fn write_newline(&mut self) {
        self.buffer.push(b'\n');
    }

    pub fn write_indent(&mut self, depth: usize) {
        if depth == 0 || self.indent_unit.is_empty() {
            return;
        }
        if depth >= self.indent_cache.len() {
            self.extend_indent_cache(depth);
        }
        self.buffer
            .extend_from_slice(self.indent_cache[depth].as_bytes());
    }

    pub fn write_number(&mut self, value: f64) {
        write_number_into(&mut self.buffer, value);
    }

    /// Quoted string. Raw views already hold their escapes and are copied as-is.
    pub fn write_string(&mut self, text: &JsonStr<'_>) {
        self.buffer.push(b'"');
        match text {
            JsonStr::Raw(raw) => self.buffer.extend_from_slice(raw.as_bytes()),
            other => {
                let text = other.as_str();
                if needs_escape(text) {
                    escape_string_into(&mut self.buffer, text);
                } else {
                    self.buffer.extend_from_slice(text.as_bytes());
                }
            }
        }
        self.buffer.push(b'"');
    }

    fn extend_indent_cache(&mut self, depth: usize) {
        while self.indent_cache.len() <= depth {
            let next = match self.indent_cache.last() {
                Some(prev) => format!("{prev}{}", self.indent_unit),
                None => String::new(),
            };
            self.indent_cache.push(next);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Indent;

    #[rstest::rstest]
    fn test_indent_cache_grows() {
        let mut writer = Writer::new(&PrintOptions::default());
        writer.write_indent(3);
        writer.write_indent(1);
        writer.write_indent(0);
        assert_eq!(writer.finish(), "\t\t\t\t");
    }

    #[rstest::rstest]
    fn test_space_indent() {
        let mut writer = Writer::new(&PrintOptions::new().with_indent(Indent::Spaces(2)));
        writer.write_indent(2);
        writer.write_byte(b'x');
        assert_eq!(writer.finish(), "    x");
    }

    #[rstest::rstest]
    fn test_write_string_forms() {
        let mut writer = Writer::new(&PrintOptions::default());
        writer.write_string(&JsonStr::Span("plain"));
        writer.write_byte(b' ');
        writer.write_string(&JsonStr::Decoded("a\"b"));
        writer.write_byte(b' ');
        writer.write_string(&JsonStr::Raw(r#"a\"b"#));
        assert_eq!(writer.finish(), r#""plain" "a\"b" "a\"b""#);
    }
}
