//! C-style numeric literal parsing for command arguments.
//!
//! Accepts `0x`/`0X` hex, leading-`0` octal, and decimal. Unlike `strtoul`,
//! trailing junk and overflow are rejected instead of silently ignored.

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum NumberError {
    #[error("'{0}': invalid numeric value")]
    Malformed(String),
    #[error("'{0}': value out of range")]
    OutOfRange(String),
}

pub fn parse_u64(arg: &str) -> Result<u64, NumberError> {
    let (digits, radix) = if let Some(hex) = arg.strip_prefix("0x").or_else(|| arg.strip_prefix("0X")) {
        (hex, 16)
    } else if arg.len() > 1 && arg.starts_with('0') {
        (&arg[1..], 8)
    } else {
        (arg, 10)
    };

    u64::from_str_radix(digits, radix).map_err(|err| match err.kind() {
        std::num::IntErrorKind::PosOverflow => NumberError::OutOfRange(arg.to_string()),
        _ => NumberError::Malformed(arg.to_string()),
    })
}

pub fn parse_u32(arg: &str) -> Result<u32, NumberError> {
    u32::try_from(parse_u64(arg)?).map_err(|_| NumberError::OutOfRange(arg.to_string()))
}

pub fn parse_u8(arg: &str) -> Result<u8, NumberError> {
    u8::try_from(parse_u64(arg)?).map_err(|_| NumberError::OutOfRange(arg.to_string()))
}

pub fn parse_usize(arg: &str) -> Result<usize, NumberError> {
    usize::try_from(parse_u64(arg)?).map_err(|_| NumberError::OutOfRange(arg.to_string()))
}

/// Exactly two hex digits, no prefix. Used for block-value byte pairs.
pub fn parse_hex_byte(arg: &str) -> Result<u8, NumberError> {
    u8::from_str_radix(arg, 16).map_err(|_| NumberError::Malformed(arg.to_string()))
}
