//! Format and version information codewords.

use crate::qrcode::{Mask, QrCodeEcc, Version};

/// XOR mask applied to every format codeword so it is never all zero.
pub const FORMAT_MASK: u32 = 0x5412;

const FORMAT_GENERATOR: u32 = 0x537;
const VERSION_GENERATOR: u32 = 0x1f25;

/// 15-bit format information: 2-bit level, 3-bit mask, 10-bit BCH(15,5) remainder, masked.
pub fn format_bits(ecl: QrCodeEcc, mask: Mask) -> u32 {
    let data = u32::from((ecl.format_bits() << 3) | mask.value());
    let mut rem: u32 = data;
    for _ in 0..10 {
        rem = (rem << 1) ^ ((rem >> 9) * FORMAT_GENERATOR);
    }
    ((data << 10) | (rem & 0x3ff)) ^ FORMAT_MASK
}

/// 18-bit version information: 6-bit version and 12-bit Golay(18,6) remainder.
///
/// Versions below 7 carry no version information.
pub fn version_bits(ver: Version) -> Option<u32> {
    let ver = u32::from(ver.value());
    if ver < 7 {
        return None;
    }
    let mut rem: u32 = ver;
    for _ in 0..12 {
        rem = (rem << 1) ^ ((rem >> 11) * VERSION_GENERATOR);
    }
    Some((ver << 12) | (rem & 0xfff))
}
