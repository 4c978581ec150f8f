/// GREASE placeholder inserted at the head of client-built lists, the
/// position Chrome uses.
pub const GREASE_PLACEHOLDER: u16 = 0x0a0a;

/// Check if a u16 value is a GREASE value (RFC 8701).
///
/// GREASE values follow the pattern 0x?A?A where both nibble pairs are
/// identical: 0x0A0A, 0x1A1A, 0x2A2A, ..., 0xFAFA
pub fn is_grease_u16(val: u16) -> bool {
    let hi = (val >> 8) as u8;
    let lo = val as u8;
    hi == lo && (hi & 0x0F) == 0x0A
}
