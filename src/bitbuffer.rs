/// A fixed-capacity buffer of bits, written most significant bit first.
///
/// One buffer holds the whole bitstream of a symbol: segment headers and payloads, terminator,
/// padding and finally the error correction codewords. The backing storage is allocated once at
/// `(capacity + 7) / 8` bytes. Writes past the declared capacity are a caller bug; they are only
/// checked in debug builds.
pub struct BitBuffer {
    data: Vec<u8>,
    capacity: usize,
    length: usize,
}

impl BitBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            data: vec![0u8; (capacity + 7) / 8],
            capacity,
            length: 0,
        }
    }

    /// Declared capacity in bits.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Current write offset in bits.
    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Appends the low `len` bits of `val`, most significant of those bits first.
    pub fn append_bits(&mut self, val: u32, len: u8) {
        assert!(len <= 32);
        debug_assert!(
            self.length + usize::from(len) <= self.capacity,
            "Bit buffer capacity exceeded"
        );
        for i in (0..len).rev() {
            let index: usize = self.length >> 3;
            let shift: usize = 7 - (self.length & 7);
            let bit: u8 = ((val >> i) as u8) & 1;
            self.data[index] = (self.data[index] & !(1u8 << shift)) | (bit << shift);
            self.length += 1;
        }
    }

    /// Returns the bit stored at an absolute bit position.
    pub fn read_bit(&self, position: usize) -> bool {
        get_bit(self.data[position >> 3].into(), 7 - ((position & 7) as u8))
    }

    /// The backing bytes; codeword `i` is `as_bytes()[i]`.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

pub(crate) fn get_bit(x: u32, i: u8) -> bool {
    ((x >> i) & 1) != 0
}
