use crate::constants::MAX_SAFE_INTEGER;

/// Appends the textual form of `value`.
///
/// Integral values inside the exactly representable range print without a
/// fraction; other finite values use the shortest text that reads back to
/// the same f64. JSON has no spelling for NaN or infinities, so those print
/// as `null`.
pub fn write_number_into(out: &mut Vec<u8>, value: f64) {
    if !value.is_finite() {
        out.extend_from_slice(b"null");
        return;
    }
    if is_safe_integer(value) {
        let mut buffer = itoa::Buffer::new();
        out.extend_from_slice(buffer.format(value as i64).as_bytes());
        return;
    }
    let mut buffer = ryu::Buffer::new();
    out.extend_from_slice(buffer.format_finite(value).as_bytes());
}

pub fn format_number(value: f64) -> String {
    let mut out = Vec::with_capacity(24);
    write_number_into(&mut out, value);
    String::from_utf8_lossy(&out).into_owned()
}

pub(crate) fn is_safe_integer(value: f64) -> bool {
    value.is_finite() && value.fract() == 0.0 && value.abs() < MAX_SAFE_INTEGER
}
