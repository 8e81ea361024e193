//! Per-version, per-level block tables and the capacity formulas derived from them.

use crate::qrcode::{QrCodeEcc, Version};

/// Number of modules available for data, ECC and remainder bits, i.e. everything except the
/// finder, separator, timing, alignment, format and version areas.
pub fn total_data_modules(ver: Version) -> usize {
    let ver = usize::from(ver.value());
    let mut result: usize = (16 * ver + 128) * ver + 64;
    if ver >= 2 {
        let numalign: usize = ver / 7 + 2;
        result -= (25 * numalign - 10) * numalign - 55;
        if ver >= 7 {
            result -= 36;
        }
    }
    result
}

/// Number of 8-bit data codewords left once ECC codewords are taken out.
pub fn num_data_codewords(ver: Version, ecl: QrCodeEcc) -> usize {
    total_data_modules(ver) / 8 - ecc_codewords_per_block(ver, ecl) * ecc_block_count(ver, ecl)
}

/// Data capacity in bits.
pub fn data_capacity(ver: Version, ecl: QrCodeEcc) -> usize {
    num_data_codewords(ver, ecl) * 8
}

pub fn ecc_block_count(ver: Version, ecl: QrCodeEcc) -> usize {
    table_get(&NUM_ERROR_CORRECTION_BLOCKS, ver, ecl)
}

pub fn ecc_codewords_per_block(ver: Version, ecl: QrCodeEcc) -> usize {
    table_get(&ECC_CODEWORDS_PER_BLOCK, ver, ecl)
}

fn table_get(table: &'static [[u8; 41]; 4], ver: Version, ecl: QrCodeEcc) -> usize {
    usize::from(table[ecl.ordinal()][usize::from(ver.value())])
}

// Index: [ecl.ordinal()][version]; column 0 is unused.
static ECC_CODEWORDS_PER_BLOCK: [[u8; 41]; 4] = [
    [
        0, 7, 10, 15, 20, 26, 18, 20, 24, 30, 18, 20, 24, 26, 30, 22, 24, 28, 30, 28, 28, 28, 28, 30,
        30, 26, 28, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    ], // Low
    [
        0, 10, 16, 26, 18, 24, 16, 18, 22, 22, 26, 30, 22, 22, 24, 24, 28, 28, 26, 26, 26, 26, 28,
        28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28,
    ], // Medium
    [
        0, 13, 22, 18, 26, 18, 24, 18, 22, 20, 24, 28, 26, 24, 20, 30, 24, 28, 28, 26, 30, 28, 30,
        30, 30, 30, 28, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    ], // Quartile
    [
        0, 17, 28, 22, 16, 22, 28, 26, 26, 24, 28, 24, 28, 22, 24, 24, 30, 28, 28, 26, 28, 30, 24,
        30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    ], // High
];

static NUM_ERROR_CORRECTION_BLOCKS: [[u8; 41]; 4] = [
    [
        0, 1, 1, 1, 1, 1, 2, 2, 2, 2, 4, 4, 4, 4, 4, 6, 6, 6, 6, 7, 8, 8, 9, 9, 10, 12, 12, 12, 13,
        14, 15, 16, 17, 18, 19, 19, 20, 21, 22, 24, 25,
    ], // Low
    [
        0, 1, 1, 1, 2, 2, 4, 4, 4, 5, 5, 5, 8, 9, 9, 10, 10, 11, 13, 14, 16, 17, 17, 18, 20, 21, 23,
        25, 26, 28, 29, 31, 33, 35, 37, 38, 40, 43, 45, 47, 49,
    ], // Medium
    [
        0, 1, 1, 2, 2, 4, 4, 6, 6, 8, 8, 8, 10, 12, 16, 12, 17, 16, 18, 21, 20, 23, 23, 25, 27, 29,
        34, 34, 35, 38, 40, 43, 45, 48, 51, 53, 56, 59, 62, 65, 68,
    ], // Quartile
    [
        0, 1, 1, 2, 4, 4, 4, 5, 6, 8, 8, 11, 11, 16, 16, 18, 16, 19, 21, 25, 25, 25, 34, 30, 32, 35,
        37, 40, 42, 45, 48, 51, 54, 57, 60, 63, 66, 70, 74, 77, 81,
    ], // High
];

#[cfg(test)]
mod tests {
    use super::*;

    fn versions() -> impl Iterator<Item = Version> {
        (Version::MIN.value()..=Version::MAX.value()).map(Version::new)
    }

    #[test]
    fn test_total_data_modules() {
        assert_eq!(total_data_modules(Version::new(1)), 208);
        assert_eq!(total_data_modules(Version::new(2)), 359);
        assert_eq!(total_data_modules(Version::new(7)), 1568);
        assert_eq!(total_data_modules(Version::new(40)), 29648);
    }

    #[test]
    fn test_known_data_codewords() {
        assert_eq!(num_data_codewords(Version::new(1), QrCodeEcc::Low), 19);
        assert_eq!(num_data_codewords(Version::new(1), QrCodeEcc::Medium), 16);
        assert_eq!(num_data_codewords(Version::new(1), QrCodeEcc::Quartile), 13);
        assert_eq!(num_data_codewords(Version::new(1), QrCodeEcc::High), 9);
        assert_eq!(num_data_codewords(Version::new(40), QrCodeEcc::Low), 2956);
        assert_eq!(num_data_codewords(Version::new(40), QrCodeEcc::High), 1276);
    }

    #[test]
    fn test_capacity_monotonic_in_version() {
        for ecl in QrCodeEcc::RANKING {
            let mut previous = 0;
            for ver in versions() {
                let capacity = data_capacity(ver, ecl);
                assert!(capacity > 0);
                assert!(capacity >= previous, "{:?} version {}", ecl, ver.value());
                previous = capacity;
            }
        }
    }

    #[test]
    fn test_capacity_decreases_with_robustness() {
        for ver in versions() {
            let caps: Vec<usize> = QrCodeEcc::RANKING
                .iter()
                .map(|&ecl| data_capacity(ver, ecl))
                .collect();
            assert!(caps.windows(2).all(|w| w[0] > w[1]), "version {}", ver.value());
        }
    }
}
