use crate::bitbuffer::BitBuffer;
use crate::error::{QrError, Result};
use crate::qrcode::Version;

/// Characters accepted by alphanumeric mode, in code order.
pub static ALPHANUMERIC_CHARSET: &str = "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ $%*+-./:";

/// Width of the mode indicator that starts every segment.
pub const MODE_BITS: u8 = 4;

/// The encoding mode of a segment.
///
/// Variants are listed in descending order of coding efficiency, which is also the order in which
/// [`QrSegment::new`] tries them.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum QrSegmentMode {
    Numeric,
    Alphanumeric,
    Byte,
}

impl QrSegmentMode {
    pub const PRIORITY: [QrSegmentMode; 3] = [
        QrSegmentMode::Numeric,
        QrSegmentMode::Alphanumeric,
        QrSegmentMode::Byte,
    ];

    /// The 4-bit mode indicator.
    pub fn mode_bits(self) -> u32 {
        use QrSegmentMode::*;
        match self {
            Numeric => 0x1,
            Alphanumeric => 0x2,
            Byte => 0x4,
        }
    }

    /// Whether every character of `text` is in this mode's character set.
    pub fn can_encode(self, text: &str) -> bool {
        use QrSegmentMode::*;
        match self {
            Numeric => text.chars().all(|c| c.is_ascii_digit()),
            Alphanumeric => text.chars().all(|c| ALPHANUMERIC_CHARSET.contains(c)),
            Byte => text.chars().all(|c| u32::from(c) <= 0xFF),
        }
    }

    /// Payload length in bits for `numchars` characters.
    pub fn payload_size(self, numchars: usize) -> usize {
        use QrSegmentMode::*;
        match self {
            Numeric => 10 * (numchars / 3) + [0, 4, 7][numchars % 3],
            Alphanumeric => 11 * (numchars / 2) + 6 * (numchars % 2),
            Byte => 8 * numchars,
        }
    }

    /// Width of the character count field.
    pub fn num_char_count_bits(self, ver: Version) -> u8 {
        use QrSegmentMode::*;
        (match self {
            Numeric => [10, 12, 14],
            Alphanumeric => [9, 11, 13],
            Byte => [8, 16, 16],
        })[usize::from((ver.value() + 7) / 17)]
    }
}

/// A fragment of input text bound to the first mode able to encode all of it.
#[derive(Clone, Debug)]
pub struct QrSegment<'a> {
    mode: QrSegmentMode,
    text: &'a str,
    numchars: usize,
}

impl<'a> QrSegment<'a> {
    /// Picks numeric, then alphanumeric, then byte mode; fails if none accepts the whole text.
    pub fn new(text: &'a str) -> Result<Self> {
        let mode = QrSegmentMode::PRIORITY
            .into_iter()
            .find(|mode| mode.can_encode(text))
            .ok_or_else(|| QrError::Encoding {
                text: text.to_string(),
            })?;
        Ok(Self {
            mode,
            text,
            numchars: text.chars().count(),
        })
    }

    pub fn mode(&self) -> QrSegmentMode {
        self.mode
    }

    pub fn text(&self) -> &'a str {
        self.text
    }

    pub fn num_chars(&self) -> usize {
        self.numchars
    }

    /// Bits taken by this segment at `version`: mode indicator, count field and payload.
    ///
    /// Returns `None` if the character count does not fit the count field.
    pub fn total_bits(&self, version: Version) -> Option<usize> {
        let ccbits: u8 = self.mode.num_char_count_bits(version);
        if self.numchars >= 1usize << ccbits {
            return None;
        }
        Some(usize::from(MODE_BITS) + usize::from(ccbits) + self.mode.payload_size(self.numchars))
    }

    /// Writes mode indicator, character count and payload.
    pub fn encode(&self, bb: &mut BitBuffer, version: Version) {
        bb.append_bits(self.mode.mode_bits(), MODE_BITS);
        bb.append_bits(self.numchars as u32, self.mode.num_char_count_bits(version));
        match self.mode {
            QrSegmentMode::Numeric => {
                let mut accumdata: u32 = 0;
                let mut accumcount: u8 = 0;
                for b in self.text.bytes() {
                    accumdata = accumdata * 10 + u32::from(b - b'0');
                    accumcount += 1;
                    if accumcount == 3 {
                        bb.append_bits(accumdata, 10);
                        accumdata = 0;
                        accumcount = 0;
                    }
                }
                if accumcount > 0 {
                    bb.append_bits(accumdata, accumcount * 3 + 1);
                }
            }
            QrSegmentMode::Alphanumeric => {
                let mut accumdata: u32 = 0;
                let mut accumcount: u8 = 0;
                for i in self.text.chars().filter_map(alphanumeric_index) {
                    accumdata = accumdata * 45 + i;
                    accumcount += 1;
                    if accumcount == 2 {
                        bb.append_bits(accumdata, 11);
                        accumdata = 0;
                        accumcount = 0;
                    }
                }
                if accumcount > 0 {
                    bb.append_bits(accumdata, 6);
                }
            }
            QrSegmentMode::Byte => {
                for c in self.text.chars() {
                    bb.append_bits(u32::from(c), 8);
                }
            }
        }
    }
}

fn alphanumeric_index(c: char) -> Option<u32> {
    ALPHANUMERIC_CHARSET.find(c).map(|i| i as u32)
}

/// Sum of [`QrSegment::total_bits`] over all segments, or `None` if any count field overflows.
pub fn get_total_bits(segs: &[QrSegment], version: Version) -> Option<usize> {
    segs.iter()
        .try_fold(0usize, |acc, seg| acc.checked_add(seg.total_bits(version)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoded(text: &str, version: Version) -> (BitBuffer, usize) {
        let seg = QrSegment::new(text).unwrap();
        let bits = seg.total_bits(version).unwrap();
        let mut bb = BitBuffer::new(bits);
        seg.encode(&mut bb, version);
        (bb, bits)
    }

    #[test]
    fn test_mode_priority() {
        assert_eq!(QrSegment::new("1234567890").unwrap().mode(), QrSegmentMode::Numeric);
        assert_eq!(QrSegment::new("HELLO WORLD").unwrap().mode(), QrSegmentMode::Alphanumeric);
        assert_eq!(QrSegment::new("Hello World").unwrap().mode(), QrSegmentMode::Byte);
        assert_eq!(QrSegment::new("caf\u{e9}").unwrap().mode(), QrSegmentMode::Byte);
        assert_eq!(QrSegment::new("").unwrap().mode(), QrSegmentMode::Numeric);
    }

    #[test]
    fn test_unsupported_characters() {
        let err = QrSegment::new("snow \u{2603}").unwrap_err();
        assert_eq!(
            err,
            QrError::Encoding {
                text: "snow \u{2603}".to_string()
            }
        );
    }

    #[test]
    fn test_payload_sizes() {
        use QrSegmentMode::*;
        assert_eq!(Numeric.payload_size(5), 17);
        assert_eq!(Numeric.payload_size(6), 20);
        assert_eq!(Numeric.payload_size(7), 24);
        assert_eq!(Alphanumeric.payload_size(11), 61);
        assert_eq!(Byte.payload_size(3), 24);
    }

    #[test]
    fn test_count_bits_tiers() {
        use QrSegmentMode::*;
        assert_eq!(Numeric.num_char_count_bits(Version::new(9)), 10);
        assert_eq!(Numeric.num_char_count_bits(Version::new(10)), 12);
        assert_eq!(Alphanumeric.num_char_count_bits(Version::new(26)), 11);
        assert_eq!(Alphanumeric.num_char_count_bits(Version::new(27)), 13);
        assert_eq!(Byte.num_char_count_bits(Version::new(1)), 8);
        assert_eq!(Byte.num_char_count_bits(Version::new(40)), 16);
    }

    #[test]
    fn test_numeric_encoding() {
        // 0001 0000000101 0001111011 0101101 -> "12345"
        let (bb, bits) = encoded("12345", Version::new(1));
        assert_eq!(bits, 4 + 10 + 17);
        assert_eq!(bb.len(), bits);
        assert_eq!(&bb.as_bytes()[..3], &[0b0001_0000, 0b0001_0100, 0b0111_1011]);
    }

    #[test]
    fn test_alphanumeric_encoding() {
        // "AC-42": (10*45+12)=462, (41*45+4)=1849, '2'=2
        let (bb, bits) = encoded("AC-42", Version::new(1));
        assert_eq!(bits, 4 + 9 + 28);
        let mut expected = BitBuffer::new(bits);
        expected.append_bits(0x2, 4);
        expected.append_bits(5, 9);
        expected.append_bits(462, 11);
        expected.append_bits(1849, 11);
        expected.append_bits(2, 6);
        assert_eq!(bb.as_bytes(), expected.as_bytes());
    }

    #[test]
    fn test_byte_encoding_uses_code_points() {
        let (bb, _) = encoded("\u{e9}a", Version::new(1));
        // 0100 00000010 11101001 01100001
        assert_eq!(bb.as_bytes(), &[0x40, 0x2E, 0x96, 0x10]);
    }

    #[test]
    fn test_count_field_overflow() {
        let text = "1".repeat(1024);
        let seg = QrSegment::new(&text).unwrap();
        assert_eq!(seg.total_bits(Version::new(9)), None);
        assert!(seg.total_bits(Version::new(10)).is_some());
    }
}
