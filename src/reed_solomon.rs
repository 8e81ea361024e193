/// Reed-Solomon ECC over GF(2^8) with the reduction polynomial x^8 + x^4 + x^3 + x^2 + 1 (0x11D).
///
/// Holds the generator polynomial for one degree, so a symbol with many blocks of the same ECC
/// length builds it once.
pub struct ReedSolomonGenerator {
    divisor: [u8; 30],
    degree: usize,
}

impl ReedSolomonGenerator {
    /// Largest ECC codeword count per block in any version.
    pub const MAX_DEGREE: usize = 30;

    /// Builds the generator polynomial (x - r^0)(x - r^1)...(x - r^{degree-1}) with r = 0x02,
    /// stored highest to lowest power without the leading 1 term.
    pub fn new(degree: usize) -> Self {
        let mut result = Self {
            divisor: [0u8; Self::MAX_DEGREE],
            degree,
        };
        assert!((1..=Self::MAX_DEGREE).contains(&degree), "Degree out of range");
        let divisor: &mut [u8] = &mut result.divisor[..degree];
        divisor[degree - 1] = 1;
        let mut root: u8 = 1;
        for _ in 0..degree {
            for j in 0..degree {
                divisor[j] = Self::multiply(divisor[j], root);
                if j + 1 < degree {
                    divisor[j] ^= divisor[j + 1];
                }
            }
            root = Self::multiply(root, 0x02);
        }
        result
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    pub fn divisor(&self) -> &[u8] {
        &self.divisor[..self.degree]
    }

    /// Remainder of `data` divided by the generator, written to `result` (`degree` bytes).
    pub fn compute_remainder(&self, data: &[u8], result: &mut [u8]) {
        assert_eq!(result.len(), self.degree);
        result.fill(0);
        for b in data {
            let factor: u8 = b ^ result[0];
            result.copy_within(1.., 0);
            result[result.len() - 1] = 0;
            for (x, &y) in result.iter_mut().zip(self.divisor.iter()) {
                *x ^= Self::multiply(y, factor);
            }
        }
    }

    /// Product of two field elements, Russian-peasant style.
    pub fn multiply(x: u8, y: u8) -> u8 {
        let mut z: u8 = 0;
        for i in (0..8).rev() {
            z = (z << 1) ^ ((z >> 7) * 0x1d);
            z ^= ((y >> i) & 1) * x;
        }
        z
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multiply() {
        assert_eq!(ReedSolomonGenerator::multiply(0, 0x53), 0);
        assert_eq!(ReedSolomonGenerator::multiply(1, 0x53), 0x53);
        assert_eq!(ReedSolomonGenerator::multiply(0x02, 0x80), 0x1d);
        assert_eq!(ReedSolomonGenerator::multiply(0x02, 0x8e), 0x01);
        for a in 0..=255u8 {
            for b in [0x03u8, 0x1d, 0xb7] {
                assert_eq!(
                    ReedSolomonGenerator::multiply(a, b),
                    ReedSolomonGenerator::multiply(b, a)
                );
            }
        }
    }

    #[test]
    fn test_small_divisors() {
        assert_eq!(ReedSolomonGenerator::new(1).divisor(), &[1]);
        // (x - 1)(x - 2) = x^2 + 3x + 2
        assert_eq!(ReedSolomonGenerator::new(2).divisor(), &[3, 2]);
    }

    #[test]
    fn test_hello_world_1m_remainder() {
        let data: [u8; 16] = [
            32, 91, 11, 120, 209, 114, 220, 77, 67, 64, 236, 17, 236, 17, 236, 17,
        ];
        let rs = ReedSolomonGenerator::new(10);
        let mut ecc = [0u8; 10];
        rs.compute_remainder(&data, &mut ecc);
        assert_eq!(ecc, [196, 35, 39, 119, 235, 215, 231, 226, 93, 23]);
    }

    #[test]
    #[should_panic(expected = "Degree out of range")]
    fn test_degree_out_of_range() {
        ReedSolomonGenerator::new(31);
    }
}
