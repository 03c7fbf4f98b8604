use std::fmt::{Display, Error, Formatter};
use std::ops::{Deref, Not};

use crate::common::codec::Mode;

// Color of a module
//------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Dark,
    Light,
}

impl Color {
    pub fn select<T>(&self, dark: T, light: T) -> T {
        match self {
            Self::Dark => dark,
            Self::Light => light,
        }
    }
}

impl Not for Color {
    type Output = Self;

    fn not(self) -> Self::Output {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }
}

// Error correction level
//------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ECLevel {
    L = 0,
    M = 1,
    Q = 2,
    H = 3,
}

impl ECLevel {
    /// 2-bit value stored in the format information, which is not the
    /// same order as the recovery strength ordering.
    pub fn format_bits(&self) -> u32 {
        match self {
            Self::L => 1,
            Self::M => 0,
            Self::Q => 3,
            Self::H => 2,
        }
    }
}

impl Display for ECLevel {
    fn fmt(&self, f: &mut Formatter) -> Result<(), Error> {
        let s = match self {
            Self::L => "L",
            Self::M => "M",
            Self::Q => "Q",
            Self::H => "H",
        };
        f.write_str(s)
    }
}

// Version
//------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Version(i16);

impl Deref for Version {
    type Target = i16;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Display for Version {
    fn fmt(&self, f: &mut Formatter) -> Result<(), Error> {
        write!(f, "{}", self.0)
    }
}

impl Version {
    pub const MIN: Version = Version(1);
    pub const MAX: Version = Version(40);

    pub fn new(version: i16) -> Self {
        debug_assert!((1..=40).contains(&version), "Invalid version {version}");
        Self(version)
    }

    /// Side length of the symbol in modules.
    pub fn width(&self) -> i16 {
        self.0 * 4 + 17
    }

    pub fn mode_bits(&self) -> usize {
        4
    }

    /// Width of the character count field for `mode` at this version.
    pub fn char_cnt_bits(&self, mode: Mode) -> usize {
        let band = match self.0 {
            1..=9 => 0,
            10..=26 => 1,
            _ => 2,
        };
        match mode {
            Mode::Numeric => [10, 12, 14][band],
            Mode::Alphanumeric => [9, 11, 13][band],
            Mode::Byte => [8, 16, 16][band],
            Mode::Kanji => [8, 10, 12][band],
        }
    }

    /// Number of modules available for codewords and remainder bits,
    /// after all function patterns and info areas are excluded.
    pub fn raw_data_modules(&self) -> usize {
        let v = self.0 as usize;
        let mut result = (16 * v + 128) * v + 64;
        if v >= 2 {
            let align = v / 7 + 2;
            result -= (25 * align - 10) * align - 55;
            if v >= 7 {
                result -= 36;
            }
        }
        result
    }

    pub fn total_codewords(&self) -> usize {
        self.raw_data_modules() / 8
    }

    /// Leftover modules in the encoding region that hold no codeword bits.
    pub fn remainder_bits(&self) -> usize {
        self.raw_data_modules() % 8
    }

    pub fn ecc_per_block(&self, ecl: ECLevel) -> usize {
        ECC_PER_BLOCK[ecl as usize][self.0 as usize] as usize
    }

    pub fn block_count(&self, ecl: ECLevel) -> usize {
        BLOCK_COUNT[ecl as usize][self.0 as usize] as usize
    }

    pub fn total_data_codewords(&self, ecl: ECLevel) -> usize {
        self.total_codewords() - self.ecc_per_block(ecl) * self.block_count(ecl)
    }

    pub fn data_bit_capacity(&self, ecl: ECLevel) -> usize {
        self.total_data_codewords(ecl) * 8
    }

    /// Data codeword layout as (short size, short count, long size, long
    /// count). Short blocks precede long blocks in the interleaving order.
    pub fn data_codewords_per_block(&self, ecl: ECLevel) -> (usize, usize, usize, usize) {
        let total = self.total_data_codewords(ecl);
        let blocks = self.block_count(ecl);
        let short_size = total / blocks;
        let long_count = total % blocks;
        (short_size, blocks - long_count, short_size + 1, long_count)
    }

    /// Center coordinates of alignment patterns along one axis.
    pub fn alignment_pattern(&self) -> Vec<i16> {
        let v = self.0;
        if v == 1 {
            return Vec::new();
        }
        let num_align = v / 7 + 2;
        let step = if v == 32 {
            26
        } else {
            (v * 4 + num_align * 2 + 1) / (num_align * 2 - 2) * 2
        };
        let mut result = vec![6];
        let mut pos = self.width() - 7;
        for _ in 1..num_align {
            result.insert(1, pos);
            pos -= step;
        }
        result
    }

    /// 18-bit version information, BCH(18, 6) with generator 0x1F25.
    /// Present only for versions 7 and up.
    pub fn info(&self) -> u32 {
        debug_assert!(self.0 >= 7, "Version {} has no version info", self.0);

        let v = self.0 as u32;
        let mut rem = v;
        for _ in 0..12 {
            rem = (rem << 1) ^ ((rem >> 11) * 0x1F25);
        }
        (v << 12) | rem
    }
}

/// 15-bit format information for (`ecl`, `mask`): BCH(15, 5) over the
/// 5 data bits, XOR-ed with the 0x5412 mask.
pub fn format_info(ecl: ECLevel, mask: u32) -> u32 {
    let data = (ecl.format_bits() << 3) | mask;
    let mut rem = data;
    for _ in 0..10 {
        rem = (rem << 1) ^ ((rem >> 9) * 0x537);
    }
    ((data << 10) | rem) ^ 0x5412
}

pub const FORMAT_INFO_BIT_LEN: usize = 15;
pub const VERSION_INFO_BIT_LEN: usize = 18;

// Coordinates of the format info copy around the top left finder,
// most significant bit first. Negative values wrap from the far edge.
pub const FORMAT_INFO_COORDS_MAIN: [(i16, i16); 15] = [
    (8, 0),
    (8, 1),
    (8, 2),
    (8, 3),
    (8, 4),
    (8, 5),
    (8, 7),
    (8, 8),
    (7, 8),
    (5, 8),
    (4, 8),
    (3, 8),
    (2, 8),
    (1, 8),
    (0, 8),
];

// Second copy, split between the bottom left and top right finders.
pub const FORMAT_INFO_COORDS_SIDE: [(i16, i16); 15] = [
    (-1, 8),
    (-2, 8),
    (-3, 8),
    (-4, 8),
    (-5, 8),
    (-6, 8),
    (-7, 8),
    (8, -8),
    (8, -7),
    (8, -6),
    (8, -5),
    (8, -4),
    (8, -3),
    (8, -2),
    (8, -1),
];

// Version info block beside the top right finder, MSB first.
pub const VERSION_INFO_COORDS_TR: [(i16, i16); 18] = [
    (5, -9),
    (5, -10),
    (5, -11),
    (4, -9),
    (4, -10),
    (4, -11),
    (3, -9),
    (3, -10),
    (3, -11),
    (2, -9),
    (2, -10),
    (2, -11),
    (1, -9),
    (1, -10),
    (1, -11),
    (0, -9),
    (0, -10),
    (0, -11),
];

// Transposed copy above the bottom left finder.
pub const VERSION_INFO_COORDS_BL: [(i16, i16); 18] = [
    (-9, 5),
    (-10, 5),
    (-11, 5),
    (-9, 4),
    (-10, 4),
    (-11, 4),
    (-9, 3),
    (-10, 3),
    (-11, 3),
    (-9, 2),
    (-10, 2),
    (-11, 2),
    (-9, 1),
    (-10, 1),
    (-11, 1),
    (-9, 0),
    (-10, 0),
    (-11, 0),
];

// ECC codewords per block, indexed by [ec level][version]. Index 0 is
// a placeholder so versions index directly.
static ECC_PER_BLOCK: [[u8; 41]; 4] = [
    [
        0, 7, 10, 15, 20, 26, 18, 20, 24, 30, 18, 20, 24, 26, 30, 22, 24, 28, 30, 28, 28, 28, 28,
        30, 30, 26, 28, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    ],
    [
        0, 10, 16, 26, 18, 24, 16, 18, 22, 22, 26, 30, 22, 22, 24, 24, 28, 28, 26, 26, 26, 26, 28,
        28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28,
    ],
    [
        0, 13, 22, 18, 26, 18, 24, 18, 22, 20, 24, 28, 26, 24, 20, 30, 24, 28, 28, 26, 30, 28, 30,
        30, 30, 30, 28, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    ],
    [
        0, 17, 28, 22, 16, 22, 28, 26, 26, 24, 28, 24, 28, 22, 24, 24, 30, 28, 28, 26, 28, 30, 24,
        30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    ],
];

// Error correction blocks, indexed by [ec level][version].
static BLOCK_COUNT: [[u8; 41]; 4] = [
    [
        0, 1, 1, 1, 1, 1, 2, 2, 2, 2, 4, 4, 4, 4, 4, 6, 6, 6, 6, 7, 8, 8, 9, 9, 10, 12, 12, 12,
        13, 14, 15, 16, 17, 18, 19, 19, 20, 21, 22, 24, 25,
    ],
    [
        0, 1, 1, 1, 2, 2, 4, 4, 4, 5, 5, 5, 8, 9, 9, 10, 10, 11, 13, 14, 16, 17, 17, 18, 20, 21,
        23, 25, 26, 28, 29, 31, 33, 35, 37, 38, 40, 43, 45, 47, 49,
    ],
    [
        0, 1, 1, 2, 2, 4, 4, 6, 6, 8, 8, 8, 10, 12, 16, 12, 17, 16, 18, 21, 20, 23, 23, 25, 27,
        29, 34, 34, 35, 38, 40, 43, 45, 48, 51, 53, 56, 59, 62, 65, 68,
    ],
    [
        0, 1, 1, 2, 4, 4, 4, 5, 6, 8, 8, 11, 11, 16, 16, 18, 16, 19, 21, 25, 25, 25, 34, 30, 32,
        35, 37, 40, 42, 45, 48, 51, 54, 57, 60, 63, 66, 70, 74, 77, 81,
    ],
];

#[cfg(test)]
mod metadata_tests {
    use test_case::test_case;

    use super::*;

    #[test_case(Version::new(1), 21)]
    #[test_case(Version::new(7), 45)]
    #[test_case(Version::new(40), 177)]
    fn test_width(version: Version, expected: i16) {
        assert_eq!(version.width(), expected);
    }

    #[test_case(Version::new(1), ECLevel::L, 19)]
    #[test_case(Version::new(1), ECLevel::H, 9)]
    #[test_case(Version::new(2), ECLevel::M, 28)]
    #[test_case(Version::new(7), ECLevel::L, 156)]
    #[test_case(Version::new(40), ECLevel::L, 2956)]
    #[test_case(Version::new(40), ECLevel::H, 1276)]
    fn test_data_codewords(version: Version, ecl: ECLevel, expected: usize) {
        assert_eq!(version.total_data_codewords(ecl), expected);
    }

    #[test_case(Version::new(1), 0)]
    #[test_case(Version::new(2), 7)]
    #[test_case(Version::new(7), 0)]
    #[test_case(Version::new(21), 4)]
    fn test_remainder_bits(version: Version, expected: usize) {
        assert_eq!(version.remainder_bits(), expected);
    }

    #[test]
    fn test_char_cnt_bits() {
        assert_eq!(Version::new(1).char_cnt_bits(Mode::Numeric), 10);
        assert_eq!(Version::new(9).char_cnt_bits(Mode::Byte), 8);
        assert_eq!(Version::new(10).char_cnt_bits(Mode::Byte), 16);
        assert_eq!(Version::new(27).char_cnt_bits(Mode::Alphanumeric), 13);
        assert_eq!(Version::new(40).char_cnt_bits(Mode::Kanji), 12);
    }

    #[test]
    fn test_alignment_pattern() {
        assert!(Version::new(1).alignment_pattern().is_empty());
        assert_eq!(Version::new(2).alignment_pattern(), vec![6, 18]);
        assert_eq!(Version::new(7).alignment_pattern(), vec![6, 22, 38]);
        assert_eq!(
            Version::new(32).alignment_pattern(),
            vec![6, 34, 60, 86, 112, 138]
        );
        assert_eq!(
            Version::new(40).alignment_pattern(),
            vec![6, 30, 58, 86, 114, 142, 170]
        );
    }

    #[test]
    fn test_version_info() {
        assert_eq!(Version::new(7).info(), 0x07C94);
        assert_eq!(Version::new(21).info(), 0x15683);
    }

    #[test]
    fn test_format_info() {
        assert_eq!(format_info(ECLevel::M, 5), 0x40CE);
        assert_eq!(format_info(ECLevel::L, 0), 0x77C4);
        assert_eq!(format_info(ECLevel::H, 7), 0x083B);
    }

    #[test]
    fn test_data_codewords_per_block() {
        assert_eq!(
            Version::new(5).data_codewords_per_block(ECLevel::Q),
            (15, 2, 16, 2)
        );
        assert_eq!(
            Version::new(1).data_codewords_per_block(ECLevel::M),
            (16, 1, 17, 0)
        );
    }
}
