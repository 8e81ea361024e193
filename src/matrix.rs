use core::ops::Deref;

use crate::bitbuffer::{get_bit, BitBuffer};
use crate::qrcode::{Mask, Version};

const FINDER_SIZE: i32 = 7;
const TIMING_OFFSET: i32 = 6;
const VERSION_SIZE: i32 = 3;
const ALIGNMENT_RADIUS: i32 = 2;

const PENALTY_N1: u32 = 3;
const PENALTY_N3: u32 = 40;
const PENALTY_N4: u32 = 10;

/// The kind of function pattern a module belongs to.
///
/// Modules without a tag carry data, ECC or remainder bits and are the only ones touched by
/// masking.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum FunctionPattern {
    /// Finder pattern and its light separator.
    Finder,
    Timing,
    Alignment,
    /// Format information, including the fixed dark module.
    Format,
    Version,
}

impl FunctionPattern {
    /// Two-letter tag used by debug renderings.
    pub fn code(self) -> &'static str {
        use FunctionPattern::*;
        match self {
            Finder => "Fi",
            Timing => "Ti",
            Alignment => "Al",
            Format => "Fo",
            Version => "Ve",
        }
    }
}

/// The square grid of modules of one symbol.
///
/// Module values and function-pattern tags are kept in two parallel arrays indexed by
/// `y * dimension + x`. The matrix also carries the data placement cursor, which walks the
/// untagged modules in the standard two-column zigzag starting at the bottom-right corner.
#[derive(Clone, Debug)]
pub struct Matrix {
    version: Version,
    size: i32,
    modules: Vec<bool>,
    identity: Vec<Option<FunctionPattern>>,
    cursor_x: i32,
    cursor_y: i32,
    upward: bool,
    exhausted: bool,
}

impl Matrix {
    /// An all-light matrix with no function patterns drawn.
    pub fn new(version: Version) -> Self {
        let size = version.dimension();
        let capacity = (size * size) as usize;
        Self {
            version,
            size,
            modules: vec![false; capacity],
            identity: vec![None; capacity],
            cursor_x: size - 1,
            cursor_y: size - 1,
            upward: true,
            exhausted: false,
        }
    }

    /// Version the matrix was sized for.
    pub fn version(&self) -> Version {
        self.version
    }

    /// Side length in modules, `17 + 4 * version`.
    pub fn dimension(&self) -> i32 {
        self.size
    }

    /// `Some(true)` for dark, `Some(false)` for light, `None` outside the matrix.
    pub fn get_module(&self, x: i32, y: i32) -> Option<bool> {
        self.index(x, y).map(|i| self.modules[i])
    }

    /// The function pattern covering a module, `None` for data modules and out-of-bounds positions.
    pub fn identify_module(&self, x: i32, y: i32) -> Option<FunctionPattern> {
        self.index(x, y).and_then(|i| self.identity[i])
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        let range = 0..self.size;
        (range.contains(&x) && range.contains(&y)).then(|| (y * self.size + x) as usize)
    }

    /// Sets a module, ignoring out-of-bounds positions. A tag, if given, marks it as a function module.
    fn set_module(&mut self, x: i32, y: i32, isdark: bool, tag: Option<FunctionPattern>) {
        if let Some(i) = self.index(x, y) {
            self.modules[i] = isdark;
            if tag.is_some() {
                self.identity[i] = tag;
            }
        }
    }

    /// Draws finders, timing strips, alignment patterns and placeholder format and version info.
    pub fn draw_function_patterns(&mut self) {
        let center = FINDER_SIZE / 2;
        self.draw_finder(center, center);
        self.draw_finder(self.size - 1 - center, center);
        self.draw_finder(center, self.size - 1 - center);

        self.draw_timing();

        let size = self.size;
        let near = |p: i32| p <= FINDER_SIZE;
        let far = |p: i32| p >= size - 1 - FINDER_SIZE;
        let alignpatpos = self.version.alignment_pattern_positions();
        for &h in &alignpatpos {
            for &v in &alignpatpos {
                if (near(h) && near(v)) || (far(h) && near(v)) || (near(h) && far(v)) {
                    continue;
                }
                self.draw_alignment(h, v);
            }
        }

        // Placeholders, so masking leaves these areas alone
        self.draw_format_info(0);
        self.draw_version_info((self.version.value() >= 7).then_some(0));
    }

    /// A 7x7 finder centered at (`ox`, `oy`) plus its one-module light separator.
    pub fn draw_finder(&mut self, ox: i32, oy: i32) {
        let tag = Some(FunctionPattern::Finder);
        let reach = FINDER_SIZE / 2 + 1;
        for dy in -reach..=reach {
            for dx in -reach..=reach {
                let dist: i32 = dx.abs().max(dy.abs());
                self.set_module(ox + dx, oy + dy, dist == 0 || dist % 2 == 1, tag);
            }
        }
    }

    pub fn draw_timing(&mut self) {
        let tag = Some(FunctionPattern::Timing);
        for i in FINDER_SIZE + 1..self.size - FINDER_SIZE - 1 {
            let isdark = i % 2 == 0;
            self.set_module(i, TIMING_OFFSET, isdark, tag);
            self.set_module(TIMING_OFFSET, i, isdark, tag);
        }
    }

    /// A 5x5 alignment pattern centered at (`ox`, `oy`).
    pub fn draw_alignment(&mut self, ox: i32, oy: i32) {
        let tag = Some(FunctionPattern::Alignment);
        for dy in -ALIGNMENT_RADIUS..=ALIGNMENT_RADIUS {
            for dx in -ALIGNMENT_RADIUS..=ALIGNMENT_RADIUS {
                let dist: i32 = dx.abs().max(dy.abs());
                self.set_module(ox + dx, oy + dy, dist % 2 == 0, tag);
            }
        }
    }

    /// Draws both copies of the 15-bit format information and the dark module.
    pub fn draw_format_info(&mut self, bits: u32) {
        let tag = Some(FunctionPattern::Format);
        let size = self.size;
        for i in 0..15u8 {
            let bit = get_bit(bits, i);
            let i = i32::from(i);

            // Around the top-left finder, skipping the timing strips
            match i {
                0..=5 => self.set_module(FINDER_SIZE + 1, i, bit, tag),
                6 => self.set_module(FINDER_SIZE + 1, FINDER_SIZE, bit, tag),
                7 => self.set_module(FINDER_SIZE + 1, FINDER_SIZE + 1, bit, tag),
                8 => self.set_module(FINDER_SIZE, FINDER_SIZE + 1, bit, tag),
                _ => self.set_module(14 - i, FINDER_SIZE + 1, bit, tag),
            }

            // Low 8 bits under the top-right finder, high 7 bits beside the bottom-left finder
            if i < 8 {
                self.set_module(size - 1 - i, FINDER_SIZE + 1, bit, tag);
            } else {
                self.set_module(FINDER_SIZE + 1, size - FINDER_SIZE - 8 + i, bit, tag);
            }
        }
        self.set_module(FINDER_SIZE + 1, size - 1 - FINDER_SIZE, true, tag);
    }

    /// Draws both 3x6 copies of the 18-bit version information; nothing for `None`.
    pub fn draw_version_info(&mut self, bits: Option<u32>) {
        let Some(bits) = bits else {
            return;
        };
        let tag = Some(FunctionPattern::Version);
        let base = self.size - 1 - FINDER_SIZE - VERSION_SIZE;
        for i in 0..18u8 {
            let bit = get_bit(bits, i);
            let col = i32::from(i) / VERSION_SIZE;
            let row = i32::from(i) % VERSION_SIZE;
            self.set_module(col, base + row, bit, tag);
            self.set_module(base + row, col, bit, tag);
        }
    }

    /// Moves the placement cursor back to the bottom-right corner.
    pub fn cursor_reset(&mut self) {
        self.cursor_x = self.size - 1;
        self.cursor_y = self.size - 1;
        self.upward = true;
        self.exhausted = false;
    }

    /// Current cursor position as (`x`, `y`).
    pub fn cursor(&self) -> (i32, i32) {
        (self.cursor_x, self.cursor_y)
    }

    /// Advances to the next untagged module. Returns `false` once every module has been visited.
    pub fn cursor_advance(&mut self) -> bool {
        while !self.exhausted {
            let right = if self.cursor_x > TIMING_OFFSET {
                self.cursor_x % 2 == 0
            } else {
                self.cursor_x % 2 == 1
            };
            if right {
                self.cursor_x -= 1;
            } else {
                self.cursor_x += 1;
                let edge = if self.upward { 0 } else { self.size - 1 };
                if self.cursor_y == edge {
                    self.cursor_x -= 2;
                    self.upward = !self.upward;
                    if self.cursor_x == TIMING_OFFSET {
                        self.cursor_x -= 1;
                    }
                } else if self.upward {
                    self.cursor_y -= 1;
                } else {
                    self.cursor_y += 1;
                }
            }
            if self.cursor_x < 0 {
                self.exhausted = true;
            } else if self.identify_module(self.cursor_x, self.cursor_y).is_none() {
                return true;
            }
        }
        false
    }

    /// Copies `count` bits starting at `source_bit` to consecutive cursor positions.
    ///
    /// Returns the number of modules written, which is short only if the cursor runs out.
    pub fn cursor_write(&mut self, bb: &BitBuffer, source_bit: usize, count: usize) -> usize {
        self.cursor_fill((source_bit..source_bit + count).map(|i| bb.read_bit(i)))
    }

    /// Writes `count` light remainder modules at the cursor.
    pub fn cursor_pad(&mut self, count: usize) -> usize {
        self.cursor_fill(core::iter::repeat(false).take(count))
    }

    fn cursor_fill(&mut self, bits: impl Iterator<Item = bool>) -> usize {
        let mut written = 0;
        for bit in bits {
            if self.exhausted {
                break;
            }
            self.set_module(self.cursor_x, self.cursor_y, bit, None);
            written += 1;
            self.cursor_advance();
        }
        written
    }

    /// XORs the mask pattern onto every untagged module. Applying the same mask twice restores the matrix.
    pub fn apply_mask(&mut self, mask: Mask) {
        for y in 0..self.size {
            for x in 0..self.size {
                let i = (y * self.size + x) as usize;
                if self.identity[i].is_none() && mask.inverts(x, y) {
                    self.modules[i] = !self.modules[i];
                }
            }
        }
    }

    /// Applies `mask` for the lifetime of the returned guard, which reverts it on drop.
    pub fn trial_mask(&mut self, mask: Mask) -> MaskTrial<'_> {
        self.apply_mask(mask);
        MaskTrial { matrix: self, mask }
    }

    /// Penalty score of the current module values (lower is better).
    ///
    /// Sums adjacent-run (N1), finder-like run ratio (N3) and dark balance (N4) penalties over the
    /// whole grid. The 2x2 block penalty is not scored.
    ///
    /// Rows are scanned top to bottom, then columns left to right. Each pass keeps a single run
    /// history, so a ratio can span the end of one line and the start of the next.
    pub fn penalty_score(&self) -> u32 {
        let size = self.size;
        let module = |x: i32, y: i32| self.modules[(y * size + x) as usize];
        let mut result: u32 = 0;

        let mut history = RunHistory::default();
        for y in 0..size {
            result += line_penalty(&mut history, (0..size).map(|x| module(x, y)));
        }
        let mut history = RunHistory::default();
        for x in 0..size {
            result += line_penalty(&mut history, (0..size).map(|y| module(x, y)));
        }

        let dark = self.modules.iter().filter(|&&m| m).count();
        let total = self.modules.len();
        // Deviation from 50% dark, rounded to whole percent, in 5% steps
        let doubled = (200 * dark + total).abs_diff(100 * total);
        let k = doubled / (10 * total);
        result += k as u32 * PENALTY_N4;
        result
    }
}

/// A mask applied on trial. Derefs to the masked matrix and removes the mask when dropped.
pub struct MaskTrial<'a> {
    matrix: &'a mut Matrix,
    mask: Mask,
}

impl Deref for MaskTrial<'_> {
    type Target = Matrix;

    fn deref(&self) -> &Matrix {
        self.matrix
    }
}

impl Drop for MaskTrial<'_> {
    fn drop(&mut self) {
        self.matrix.apply_mask(self.mask);
    }
}

/// Scores one row or column, closing runs into the pass-wide `history`.
///
/// A run is closed when the color changes and when the last module is reached. A color change on
/// the last module leaves that one-module run unrecorded.
fn line_penalty(history: &mut RunHistory, line: impl ExactSizeIterator<Item = bool>) -> u32 {
    let last = line.len().saturating_sub(1);
    let mut result: u32 = 0;
    let mut runcolor: Option<bool> = None;
    let mut runlen: usize = 0;
    for (i, color) in line.enumerate() {
        if runcolor == Some(color) {
            runlen += 1;
        }
        if runcolor != Some(color) || i == last {
            if runcolor.is_some() {
                result += history.close_run(runlen);
            }
            runcolor = Some(color);
            runlen = 1;
        }
    }
    result
}

/// Lengths of the last five closed runs, oldest first.
#[derive(Default)]
struct RunHistory {
    runs: [usize; 5],
    count: usize,
}

impl RunHistory {
    /// Records a finished run and returns the N1 and N3 points it completes.
    ///
    /// N3 fires when four equal runs are followed by one three times as long.
    fn close_run(&mut self, runlen: usize) -> u32 {
        let mut result: u32 = 0;
        if runlen >= 5 {
            result += PENALTY_N1 + (runlen - 5) as u32;
        }
        self.runs.copy_within(1.., 0);
        self.runs[4] = runlen;
        self.count += 1;
        if self.count >= 5 {
            let n = self.runs[0];
            if self.runs[1..4].iter().all(|&run| run == n) && self.runs[4] == 3 * n {
                result += PENALTY_N3;
            }
        }
        result
    }
}
