#![forbid(unsafe_code)]
//! QR code encoding pipeline.
//!
//! Turns one or more text strings into a fully populated module [`Matrix`]: segment mode
//! selection, version and error correction level selection, bitstream assembly, Reed-Solomon ECC,
//! interleaved data placement, mask selection and format/version information.

use tracing::{debug, trace};

use crate::bitbuffer::BitBuffer;
use crate::error::{QrError, Result};
use crate::matrix::{FunctionPattern, Matrix};
use crate::metadata;
use crate::reed_solomon::ReedSolomonGenerator;
use crate::segment::{self, QrSegment, QrSegmentMode, MODE_BITS};
use crate::tables;

/// Pad codewords 0b11101100, 0b00010001, repeated to fill unused data capacity.
const PAD_CODEWORDS: u32 = 0xec11;

/// Quiet zone width recommended by the standard.
pub const QUIET_STANDARD: u8 = 4;

/// An encoded QR code symbol.
///
/// Wraps the finished [`Matrix`] together with the parameters chosen while encoding and the
/// rendering hints (`quiet`, `invert`) passed in through [`QrOptions`]. Instances are immutable.
///
/// # Example
///
/// ```rust
/// use qrmatrix::qrcode::{QrCode, QrOptions};
///
/// let qr = QrCode::encode_text("Hello, World!", &QrOptions::default()).unwrap();
/// println!("Version: {}", qr.version().value());
/// assert_eq!(qr.dimension(), 17 + 4 * i32::from(qr.version().value()));
/// ```
#[derive(Clone, Debug)]
pub struct QrCode {
    matrix: Matrix,
    ecl: QrCodeEcc,
    mask: Mask,
    modes: Vec<QrSegmentMode>,
    quiet: u8,
    invert: bool,
}

impl QrCode {
    /// Encodes a single text string. See [`QrCode::generate`].
    pub fn encode_text(text: &str, options: &QrOptions) -> Result<Self> {
        Self::generate(&[text], options)
    }

    /// Encodes a sequence of text strings, each as its own segment, in order.
    ///
    /// Each string gets the most compact mode able to encode all of it (numeric, then
    /// alphanumeric, then byte). The smallest version in `options.min_version..=options.max_version`
    /// that fits is chosen; with `options.optimize_ecc` the error correction level is then raised
    /// as far as that version allows. The mask is `options.mask`, or the lowest-penalty one.
    ///
    /// # Errors
    ///
    /// - [`QrError::Encoding`] if a string contains a character above U+00FF.
    /// - [`QrError::Capacity`] if the data fits no allowed version.
    /// - [`QrError::InvalidVersionRange`] if `min_version > max_version`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use qrmatrix::qrcode::{QrCode, QrOptions};
    /// use qrmatrix::segment::QrSegmentMode;
    ///
    /// let qr = QrCode::generate(&["ORDER-", "1234567", "/abc"], &QrOptions::default()).unwrap();
    /// assert_eq!(
    ///     qr.segment_modes(),
    ///     &[QrSegmentMode::Alphanumeric, QrSegmentMode::Numeric, QrSegmentMode::Byte]
    /// );
    /// ```
    pub fn generate<S: AsRef<str>>(texts: &[S], options: &QrOptions) -> Result<Self> {
        if options.min_version > options.max_version {
            return Err(QrError::InvalidVersionRange {
                min_version: options.min_version.value(),
                max_version: options.max_version.value(),
            });
        }

        let segs: Vec<QrSegment> = texts
            .iter()
            .map(|text| QrSegment::new(text.as_ref()))
            .collect::<Result<_>>()?;

        let version = find_minimum_version(
            &segs,
            options.ecl,
            options.min_version,
            options.max_version,
        )?;
        let ecl = if options.optimize_ecc {
            improve_error_correction_level(&segs, version, options.ecl)
        } else {
            options.ecl
        };
        debug!(
            version = version.value(),
            ecl = ?ecl,
            segments = segs.len(),
            "selected symbol version"
        );

        // Data bitstream: segments, terminator, padding
        let mut bb = BitBuffer::new(tables::data_capacity(version, ecl));
        for seg in &segs {
            seg.encode(&mut bb, version);
        }
        write_padding(&mut bb, version, ecl);
        let codewords = interleave_codewords(bb.as_bytes(), version, ecl);

        let mut matrix = Matrix::new(version);
        matrix.draw_function_patterns();
        fill_matrix(&codewords, version, &mut matrix);

        let mask = match options.mask {
            Some(mask) => mask,
            None => find_optimal_mask(&mut matrix),
        };
        debug!(mask = mask.value(), forced = options.mask.is_some(), "applying mask");
        matrix.apply_mask(mask);
        matrix.draw_version_info(metadata::version_bits(version));
        matrix.draw_format_info(metadata::format_bits(ecl, mask));

        Ok(Self {
            matrix,
            ecl,
            mask,
            modes: segs.iter().map(|seg| seg.mode()).collect(),
            quiet: options.quiet,
            invert: options.invert,
        })
    }

    /// Returns this QR Code's version, in the range [1, 40].
    pub fn version(&self) -> Version {
        self.matrix.version()
    }

    /// Returns this QR Code's side length in modules, in the range [21, 177].
    pub fn dimension(&self) -> i32 {
        self.matrix.dimension()
    }

    /// `Some(true)` for dark, `Some(false)` for light, `None` outside the symbol.
    pub fn get_module(&self, x: i32, y: i32) -> Option<bool> {
        self.matrix.get_module(x, y)
    }

    /// The function pattern a module belongs to, `None` for data modules.
    pub fn identify_module(&self, x: i32, y: i32) -> Option<FunctionPattern> {
        self.matrix.identify_module(x, y)
    }

    /// Returns the error correction level actually used, which may exceed the requested one.
    pub fn error_correction_level(&self) -> QrCodeEcc {
        self.ecl
    }

    /// Returns this QR Code's mask, in the range [0, 7].
    pub fn mask(&self) -> Mask {
        self.mask
    }

    /// The mode chosen for each input string, in input order.
    pub fn segment_modes(&self) -> &[QrSegmentMode] {
        &self.modes
    }

    /// Quiet zone width requested for rendering.
    pub fn quiet(&self) -> u8 {
        self.quiet
    }

    /// Whether renderers should swap dark and light.
    pub fn invert(&self) -> bool {
        self.invert
    }

    /// The underlying module matrix, with function-pattern tags.
    pub fn matrix(&self) -> &Matrix {
        &self.matrix
    }
}

impl PartialEq for QrCode {
    fn eq(&self, other: &QrCode) -> bool {
        let size = self.dimension();
        size == other.dimension()
            && (0..size).all(|y| (0..size).all(|x| self.get_module(x, y) == other.get_module(x, y)))
    }
}

impl Eq for QrCode {}

/// Options for [`QrCode::generate`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QrOptions {
    /// Requested error correction level.
    pub ecl: QrCodeEcc,
    /// Smallest version to consider.
    pub min_version: Version,
    /// Largest version to consider.
    pub max_version: Version,
    /// Raise the error correction level while the chosen version still fits the data.
    pub optimize_ecc: bool,
    /// Force a mask instead of choosing the lowest-penalty one.
    pub mask: Option<Mask>,
    /// Rendering hint: swap dark and light.
    pub invert: bool,
    /// Rendering hint: quiet zone width in modules.
    pub quiet: u8,
}

impl Default for QrOptions {
    fn default() -> Self {
        Self {
            ecl: QrCodeEcc::Medium,
            min_version: Version::MIN,
            max_version: Version::MAX,
            optimize_ecc: true,
            mask: None,
            invert: false,
            quiet: QUIET_STANDARD,
        }
    }
}

/// Returns the smallest version in `minversion..=maxversion` whose data capacity at `ecl` holds
/// all segments.
pub fn find_minimum_version(
    segs: &[QrSegment],
    ecl: QrCodeEcc,
    minversion: Version,
    maxversion: Version,
) -> Result<Version> {
    (minversion.value()..=maxversion.value())
        .map(Version::new)
        .find(|&version| segments_fit(segs, version, ecl))
        .ok_or(QrError::Capacity {
            min_version: minversion.value(),
            max_version: maxversion.value(),
        })
}

/// Walks the levels above `ecl` in ascending robustness and adopts each one that still fits
/// `version`. Never lowers the level or changes the version.
pub fn improve_error_correction_level(
    segs: &[QrSegment],
    version: Version,
    mut ecl: QrCodeEcc,
) -> QrCodeEcc {
    let requested = ecl;
    for &newecl in QrCodeEcc::RANKING.iter().filter(|&&newecl| newecl > requested) {
        if !segments_fit(segs, version, newecl) {
            break;
        }
        trace!(from = ?ecl, to = ?newecl, "raising error correction level");
        ecl = newecl;
    }
    ecl
}

fn segments_fit(segs: &[QrSegment], version: Version, ecl: QrCodeEcc) -> bool {
    segment::get_total_bits(segs, version)
        .map_or(false, |n| n <= tables::data_capacity(version, ecl))
}

/// Terminator, zero bits to a byte boundary, then alternating pad codewords up to data capacity.
fn write_padding(bb: &mut BitBuffer, version: Version, ecl: QrCodeEcc) {
    let datacapacitybits: usize = tables::data_capacity(version, ecl);

    let numzerobits: usize = (datacapacitybits - bb.len()).min(usize::from(MODE_BITS));
    bb.append_bits(0, numzerobits as u8);
    let numzerobits: usize = (datacapacitybits - bb.len()).min(bb.len().wrapping_neg() & 7);
    bb.append_bits(0, numzerobits as u8);

    loop {
        let remaining: usize = (datacapacitybits - bb.len()).min(16);
        if remaining == 0 {
            break;
        }
        bb.append_bits(PAD_CODEWORDS >> (16 - remaining), remaining as u8);
    }
    debug_assert_eq!(bb.len(), datacapacitybits, "Data region not exactly filled");
}

/// Splits the data codewords into blocks, computes each block's ECC and returns the final
/// codeword sequence: data codewords interleaved across blocks, then ECC codewords interleaved
/// across blocks.
pub(crate) fn interleave_codewords(data: &[u8], version: Version, ecl: QrCodeEcc) -> Vec<u8> {
    let numblocks: usize = tables::ecc_block_count(version, ecl);
    let blockecclen: usize = tables::ecc_codewords_per_block(version, ecl);
    let datalen: usize = tables::num_data_codewords(version, ecl);
    debug_assert_eq!(data.len(), datalen, "ECC offset mismatch");

    // The first numshortblocks blocks hold one data codeword fewer than the rest
    let numshortblocks: usize = numblocks - datalen % numblocks;
    let shortblockdatalen: usize = datalen / numblocks;
    let block_offset = |i: usize| i * shortblockdatalen + i.saturating_sub(numshortblocks);

    let rs = ReedSolomonGenerator::new(blockecclen);
    let mut ecc = vec![0u8; numblocks * blockecclen];
    for (i, block_ecc) in ecc.chunks_exact_mut(blockecclen).enumerate() {
        let datlen: usize = shortblockdatalen + usize::from(i >= numshortblocks);
        let start = block_offset(i);
        rs.compute_remainder(&data[start..start + datlen], block_ecc);
    }

    let mut result: Vec<u8> = Vec::with_capacity(data.len() + ecc.len());
    for j in 0..=shortblockdatalen {
        for i in 0..numblocks {
            if j == shortblockdatalen && i < numshortblocks {
                continue;
            }
            result.push(data[block_offset(i) + j]);
        }
    }
    for j in 0..blockecclen {
        for i in 0..numblocks {
            result.push(ecc[i * blockecclen + j]);
        }
    }
    result
}

/// Writes the codeword sequence at the placement cursor, then light remainder bits up to the
/// version's raw module count.
fn fill_matrix(codewords: &[u8], version: Version, matrix: &mut Matrix) {
    let rawmodules: usize = tables::total_data_modules(version);
    let mut bb = BitBuffer::new(codewords.len() * 8);
    for &b in codewords {
        bb.append_bits(b.into(), 8);
    }

    matrix.cursor_reset();
    let mut written: usize = matrix.cursor_write(&bb, 0, bb.len());
    written += matrix.cursor_pad(rawmodules - written);
    debug_assert_eq!(written, rawmodules, "Data modules not exactly filled");
}

/// Trial-applies every mask and returns the one with the lowest penalty; ties go to the lower index.
fn find_optimal_mask(matrix: &mut Matrix) -> Mask {
    let mut best: Option<(u32, Mask)> = None;
    for i in 0u8..8 {
        let mask = Mask::new(i);
        let penalty: u32 = matrix.trial_mask(mask).penalty_score();
        trace!(mask = i, penalty, "scored mask");
        if best.map_or(true, |(minpenalty, _)| penalty < minpenalty) {
            best = Some((penalty, mask));
        }
    }
    best.map_or(Mask::new(0), |(_, mask)| mask)
}

/// Error correction level for a QR code.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub enum QrCodeEcc {
    /// Tolerates ~7% erroneous codewords.
    Low,
    /// Tolerates ~15% erroneous codewords.
    Medium,
    /// Tolerates ~25% erroneous codewords.
    Quartile,
    /// Tolerates ~30% erroneous codewords.
    High,
}

impl QrCodeEcc {
    /// All levels in ascending order of robustness.
    pub const RANKING: [QrCodeEcc; 4] = [
        QrCodeEcc::Low,
        QrCodeEcc::Medium,
        QrCodeEcc::Quartile,
        QrCodeEcc::High,
    ];

    /// Returns the table row index (in the range 0 to 3).
    pub(crate) fn ordinal(self) -> usize {
        use QrCodeEcc::*;
        match self {
            Low => 0,
            Medium => 1,
            Quartile => 2,
            High => 3,
        }
    }

    /// Returns the 2-bit code used in format information.
    pub(crate) fn format_bits(self) -> u8 {
        use QrCodeEcc::*;
        match self {
            Low => 1,
            Medium => 0,
            Quartile => 3,
            High => 2,
        }
    }
}

/// A QR code version (1–40).
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub struct Version(u8);

impl Version {
    /// The minimum version number supported in the QR Code Model 2 standard.
    pub const MIN: Version = Version(1);

    /// The maximum version number supported in the QR Code Model 2 standard.
    pub const MAX: Version = Version(40);

    /// Creates a version object from the given number.
    ///
    /// # Panics
    ///
    /// Panics if the number is outside the range [1, 40].
    pub const fn new(ver: u8) -> Self {
        assert!(
            Version::MIN.value() <= ver && ver <= Version::MAX.value(),
            "Version number out of range"
        );
        Self(ver)
    }

    /// Returns the value, which is in the range [1, 40].
    pub const fn value(self) -> u8 {
        self.0
    }

    /// Side length of a symbol of this version: 21 for version 1 up to 177 for version 40.
    pub const fn dimension(self) -> i32 {
        17 + 4 * (self.0 as i32)
    }

    /// Alignment pattern center coordinates, ascending; every pairing is a candidate center.
    pub fn alignment_pattern_positions(self) -> Vec<i32> {
        let ver = i32::from(self.0);
        if ver == 1 {
            return Vec::new();
        }
        let numalign: i32 = ver / 7 + 2;
        let step: i32 = if ver == 32 {
            26
        } else {
            ((ver * 4 + numalign * 2 + 1) / (numalign * 2 - 2)) * 2
        };
        let mut result: Vec<i32> = (0..numalign - 1)
            .map(|i| self.dimension() - 7 - i * step)
            .collect();
        result.push(6);
        result.reverse();
        result
    }
}

/// A mask pattern (0–7).
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub struct Mask(u8);

impl Mask {
    /// Creates a mask object from the given number.
    ///
    /// # Panics
    ///
    /// Panics if the number is outside the range [0, 7].
    pub const fn new(mask: u8) -> Self {
        assert!(mask <= 7, "Mask value out of range");
        Self(mask)
    }

    /// Returns the value, which is in the range [0, 7].
    pub const fn value(self) -> u8 {
        self.0
    }

    /// Whether this mask flips the module at column `x`, row `y`.
    pub fn inverts(self, x: i32, y: i32) -> bool {
        match self.0 {
            0 => (x + y) % 2 == 0,
            1 => y % 2 == 0,
            2 => x % 3 == 0,
            3 => (x + y) % 3 == 0,
            4 => (x / 3 + y / 2) % 2 == 0,
            5 => ((x * y) % 2) + ((x * y) % 3) == 0,
            6 => (((x * y) % 2) + ((x * y) % 3)) % 2 == 0,
            7 => (((x + y) % 2) + ((x * y) % 3)) % 2 == 0,
            _ => unreachable!(),
        }
    }
}
