use crate::common::{
    bitstream::BitStream,
    error::{QRError, QRResult},
    metadata::Version,
};

// Encoding mode
//------------------------------------------------------------------------------

/// Data encoding mode. The discriminants are the 4-bit mode indicators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Numeric = 0b0001,
    Alphanumeric = 0b0010,
    Byte = 0b0100,
    Kanji = 0b1000,
}

const ALPHANUMERIC_CHARSET: &[u8; 45] =
    b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ $%*+-./:";

impl Mode {
    pub fn indicator(&self) -> u32 {
        *self as u32
    }

    fn numeric_digit(byte: u8) -> u32 {
        debug_assert!(byte.is_ascii_digit(), "Invalid numeric byte {byte}");
        (byte - b'0') as u32
    }

    fn alphanumeric_digit(byte: u8) -> u32 {
        match ALPHANUMERIC_CHARSET.iter().position(|&b| b == byte) {
            Some(pos) => pos as u32,
            None => unreachable!("Invalid alphanumeric byte {byte}"),
        }
    }

    /// Reports whether every byte of `data` is encodable in this mode.
    /// Byte mode accepts anything; Kanji is checked per character by
    /// its constructor instead.
    pub fn contains(&self, data: &[u8]) -> bool {
        match self {
            Self::Numeric => data.iter().all(|b| b.is_ascii_digit()),
            Self::Alphanumeric => data.iter().all(|b| ALPHANUMERIC_CHARSET.contains(b)),
            Self::Byte | Self::Kanji => true,
        }
    }
}

// Segment
//------------------------------------------------------------------------------

/// A run of characters encoded in one mode. The payload bits exclude
/// the mode indicator and character count, which depend on the version
/// and are written during assembly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    mode: Mode,
    char_count: usize,
    data: BitStream,
}

impl Segment {
    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn char_count(&self) -> usize {
        self.char_count
    }

    pub fn data(&self) -> &BitStream {
        &self.data
    }

    pub fn make_bytes(data: &[u8]) -> Self {
        let mut bs = BitStream::with_capacity(data.len() * 8);
        for b in data {
            bs.push_bits(*b as u32, 8);
        }
        Self { mode: Mode::Byte, char_count: data.len(), data: bs }
    }

    pub fn make_numeric(text: &str) -> QRResult<Self> {
        let data = text.as_bytes();
        if !Mode::Numeric.contains(data) {
            return Err(QRError::InvalidChar);
        }

        // Groups of 3 digits in 10 bits, 2 in 7, 1 in 4.
        let mut bs = BitStream::with_capacity((data.len() * 10 + 2) / 3);
        for chunk in data.chunks(3) {
            let value = chunk.iter().fold(0, |acc, &b| acc * 10 + Mode::numeric_digit(b));
            bs.push_bits(value, chunk.len() * 3 + 1);
        }
        Ok(Self { mode: Mode::Numeric, char_count: data.len(), data: bs })
    }

    pub fn make_alphanumeric(text: &str) -> QRResult<Self> {
        let data = text.as_bytes();
        if !Mode::Alphanumeric.contains(data) {
            return Err(QRError::InvalidChar);
        }

        // Pairs in 11 bits, a trailing single in 6.
        let mut bs = BitStream::with_capacity(data.len() / 2 * 11 + data.len() % 2 * 6);
        for chunk in data.chunks(2) {
            let value = match chunk {
                [a, b] => Mode::alphanumeric_digit(*a) * 45 + Mode::alphanumeric_digit(*b),
                [a] => Mode::alphanumeric_digit(*a),
                _ => unreachable!(),
            };
            bs.push_bits(value, chunk.len() * 5 + 1);
        }
        Ok(Self { mode: Mode::Alphanumeric, char_count: data.len(), data: bs })
    }

    /// Encodes `text` as Shift JIS double byte characters, 13 bits each.
    pub fn make_kanji(text: &str) -> QRResult<Self> {
        let mut bs = BitStream::new();
        let mut char_count = 0;
        for ch in text.chars() {
            let mut buf = [0u8; 4];
            let (encoded, _, had_errors) =
                encoding_rs::SHIFT_JIS.encode(ch.encode_utf8(&mut buf));
            if had_errors || encoded.len() != 2 {
                return Err(QRError::InvalidChar);
            }

            let sjw = ((encoded[0] as u32) << 8) | encoded[1] as u32;
            let diff = match sjw {
                0x8140..=0x9FFC => sjw - 0x8140,
                0xE040..=0xEBBF => sjw - 0xC140,
                _ => return Err(QRError::InvalidChar),
            };
            bs.push_bits((diff >> 8) * 0xC0 + (diff & 0xFF), 13);
            char_count += 1;
        }
        Ok(Self { mode: Mode::Kanji, char_count, data: bs })
    }

    /// Splits `text` into segments by picking the densest mode that
    /// covers the whole text. Empty text yields no segments.
    pub fn make_segments(text: &str) -> Vec<Segment> {
        if text.is_empty() {
            return Vec::new();
        }
        let data = text.as_bytes();
        if Mode::Numeric.contains(data) {
            vec![Self::make_numeric(text).unwrap()]
        } else if Mode::Alphanumeric.contains(data) {
            vec![Self::make_alphanumeric(text).unwrap()]
        } else {
            vec![Self::make_bytes(data)]
        }
    }

    /// Bit length of the segment at `version` including its header, or
    /// None if the character count overflows the count field.
    pub fn encoded_len(&self, version: Version) -> Option<usize> {
        let ccbits = version.char_cnt_bits(self.mode);
        if self.char_count >= 1 << ccbits {
            return None;
        }
        Some(version.mode_bits() + ccbits + self.data.len())
    }
}

/// Total encoded bit length of `segs` at `version`, or None if any
/// segment cannot be represented.
pub fn total_bits(segs: &[Segment], version: Version) -> Option<usize> {
    segs.iter().try_fold(0usize, |acc, seg| Some(acc + seg.encoded_len(version)?))
}

pub(crate) fn push_segment(seg: &Segment, version: Version, out: &mut BitStream) {
    out.push_bits(seg.mode.indicator(), version.mode_bits());
    out.push_bits(seg.char_count as u32, version.char_cnt_bits(seg.mode));
    out.extend(&seg.data);
}

pub(crate) fn push_terminator(out: &mut BitStream, bit_capacity: usize) {
    debug_assert!(out.len() <= bit_capacity, "Data overflows capacity");

    let term_len = std::cmp::min(4, bit_capacity - out.len());
    out.push_bits(0, term_len);
}

const PADDING_CODEWORDS: [u8; 2] = [0b1110_1100, 0b0001_0001];

pub(crate) fn pad_remaining_capacity(out: &mut BitStream, bit_capacity: usize) {
    push_padding_bits(out);
    push_padding_codewords(out, bit_capacity);
}

fn push_padding_bits(out: &mut BitStream) {
    let offset = out.len() & 7;
    if offset > 0 {
        out.push_bits(0, 8 - offset);
    }
}

fn push_padding_codewords(out: &mut BitStream, bit_capacity: usize) {
    debug_assert!(out.len() & 7 == 0, "Padding codewords on unaligned stream");

    let remain = (bit_capacity - out.len()) >> 3;
    for pad in PADDING_CODEWORDS.iter().cycle().take(remain) {
        out.push_bits(*pad as u32, 8);
    }
}
