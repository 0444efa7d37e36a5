/// Default capacity of a freshly acquired region block.
pub const DEFAULT_BLOCK_SIZE: usize = 64 * 1024;

/// Alignment of every region allocation (the platform's `max_align_t`).
pub const REGION_ALIGN: usize = 16;

pub const MAX_DEPTH: usize = 256;

/// Largest magnitude at which every integer is exactly representable in an f64.
pub const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

#[inline]
pub fn is_whitespace(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\n' | b'\r')
}

#[inline]
pub fn starts_number(byte: u8) -> bool {
    byte.is_ascii_digit() || byte == b'+' || byte == b'-'
}
