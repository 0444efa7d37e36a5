use memchr::memchr;

const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct EscapeError {
    /// Byte offset of the offending backslash inside the string body.
    pub offset: usize,
    pub message: &'static str,
}

impl EscapeError {
    fn new(offset: usize, message: &'static str) -> Self {
        Self { offset, message }
    }
}

pub fn needs_escape(value: &str) -> bool {
    value
        .bytes()
        .any(|byte| byte == b'"' || byte == b'\\' || byte < 0x20)
}

pub fn escape_string_into(out: &mut Vec<u8>, value: &str) {
    let bytes = value.as_bytes();
    let mut start = 0;
    for (idx, &byte) in bytes.iter().enumerate() {
        if !(byte == b'"' || byte == b'\\' || byte < 0x20) {
            continue;
        }
        out.extend_from_slice(&bytes[start..idx]);
        match byte {
            b'"' => out.extend_from_slice(b"\\\""),
            b'\\' => out.extend_from_slice(b"\\\\"),
            b'\n' => out.extend_from_slice(b"\\n"),
            b'\r' => out.extend_from_slice(b"\\r"),
            b'\t' => out.extend_from_slice(b"\\t"),
            0x08 => out.extend_from_slice(b"\\b"),
            0x0c => out.extend_from_slice(b"\\f"),
            _ => {
                out.extend_from_slice(b"\\u00");
                out.push(HEX_DIGITS[(byte >> 4) as usize]);
                out.push(HEX_DIGITS[(byte & 0x0f) as usize]);
            }
        }
        start = idx + 1;
    }
    out.extend_from_slice(&bytes[start..]);
}

/// Decodes the backslash escapes of a JSON string body into `out`.
pub(crate) fn unescape_into(out: &mut String, body: &str) -> Result<(), EscapeError> {
    let bytes = body.as_bytes();
    let mut idx = 0;
    while idx < bytes.len() {
        let Some(offset) = memchr(b'\\', &bytes[idx..]) else {
            out.push_str(&body[idx..]);
            break;
        };
        let pos = idx + offset;
        out.push_str(&body[idx..pos]);
        let next = *bytes
            .get(pos + 1)
            .ok_or_else(|| EscapeError::new(pos, "unterminated escape"))?;
        idx = pos + 2;
        match next {
            b'"' => out.push('"'),
            b'\\' => out.push('\\'),
            b'/' => out.push('/'),
            b'b' => out.push('\u{8}'),
            b'f' => out.push('\u{c}'),
            b'n' => out.push('\n'),
            b'r' => out.push('\r'),
            b't' => out.push('\t'),
            b'u' => {
                let (ch, consumed) = decode_unicode(bytes, pos)?;
                out.push(ch);
                idx = pos + consumed;
            }
            _ => return Err(EscapeError::new(pos, "invalid escape")),
        }
    }
    Ok(())
}

fn hex4(bytes: &[u8], at: usize) -> Option<u32> {
    let digits = bytes.get(at..at + 4)?;
    digits.iter().try_fold(0u32, |acc, &digit| {
        let value = (digit as char).to_digit(16)?;
        Some(acc * 16 + value)
    })
}

/// Decodes `\uXXXX` (or a surrogate pair) starting at the backslash at `pos`.
/// Returns the character and the number of bytes consumed.
fn decode_unicode(bytes: &[u8], pos: usize) -> Result<(char, usize), EscapeError> {
    let high =
        hex4(bytes, pos + 2).ok_or_else(|| EscapeError::new(pos, "invalid unicode escape"))?;
    match high {
        0xD800..=0xDBFF => {
            let paired = bytes.get(pos + 6) == Some(&b'\\') && bytes.get(pos + 7) == Some(&b'u');
            let low = if paired { hex4(bytes, pos + 8) } else { None };
            match low {
                Some(low @ 0xDC00..=0xDFFF) => {
                    let code = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
                    char::from_u32(code)
                        .map(|ch| (ch, 12))
                        .ok_or_else(|| EscapeError::new(pos, "invalid unicode escape"))
                }
                _ => Err(EscapeError::new(pos, "unpaired surrogate in unicode escape")),
            }
        }
        0xDC00..=0xDFFF => Err(EscapeError::new(
            pos,
            "unpaired surrogate in unicode escape",
        )),
        _ => char::from_u32(high)
            .map(|ch| (ch, 6))
            .ok_or_else(|| EscapeError::new(pos, "invalid unicode escape")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unescape(body: &str) -> Result<String, EscapeError> {
        let mut out = String::new();
        unescape_into(&mut out, body).map(|_| out)
    }

    fn escape(value: &str) -> String {
        let mut out = Vec::new();
        escape_string_into(&mut out, value);
        String::from_utf8(out).unwrap()
    }

    #[rstest::rstest]
    #[case(r"plain", "plain")]
    #[case(r#"say \"hi\""#, "say \"hi\"")]
    #[case(r"a\\b", "a\\b")]
    #[case(r"a\/b", "a/b")]
    #[case(r"line\nbreak\ttab\r", "line\nbreak\ttab\r")]
    #[case(r"\b\f", "\u{8}\u{c}")]
    #[case(r"\u0041\u00e9", "Aé")]
    #[case(r"\ud83d\ude00", "😀")]
    #[case(r"tail!", "tail!")]
    fn test_unescape(#[case] body: &str, #[case] expected: &str) {
        assert_eq!(unescape(body).unwrap(), expected);
    }

    #[rstest::rstest]
    #[case(r"bad\q", 3, "invalid escape")]
    #[case(r"\u12", 0, "invalid unicode escape")]
    #[case(r"\uzzzz", 0, "invalid unicode escape")]
    #[case(r"x\ud83d", 1, "unpaired surrogate in unicode escape")]
    #[case(r"\ude00", 0, "unpaired surrogate in unicode escape")]
    #[case("end\\", 3, "unterminated escape")]
    fn test_unescape_errors(#[case] body: &str, #[case] offset: usize, #[case] message: &str) {
        let err = unescape(body).unwrap_err();
        assert_eq!(err.offset, offset);
        assert_eq!(err.message, message);
    }

    #[rstest::rstest]
    fn test_escape_string() {
        assert_eq!(escape("plain"), "plain");
        assert_eq!(escape("say \"hi\""), r#"say \"hi\""#);
        assert_eq!(escape("a\\b\nc\td"), r"a\\b\nc\td");
        assert_eq!(escape("\u{1}"), r"\u0001");
        assert_eq!(escape("\u{1f}x"), r"\u001fx");
        assert_eq!(escape("é😀"), "é😀");
    }

    #[rstest::rstest]
    fn test_needs_escape() {
        assert!(!needs_escape("hello world"));
        assert!(needs_escape("quote\""));
        assert!(needs_escape("back\\slash"));
        assert!(needs_escape("new\nline"));
    }

    #[rstest::rstest]
    fn test_escape_then_unescape_restores_text() {
        let original = "mixed \"quotes\", \\slashes\\ and\ncontrol \u{7}";
        assert_eq!(unescape(&escape(original)).unwrap(), original);
    }
}
