// BitStream
//------------------------------------------------------------------------------

/// Append-only bit sequence. Bits are packed MSB first within each byte.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BitStream {
    data: Vec<u8>,
    len: usize,
}

impl BitStream {
    pub fn new() -> Self {
        Self { data: Vec::new(), len: 0 }
    }

    pub fn with_capacity(bit_capacity: usize) -> Self {
        Self { data: Vec::with_capacity(bit_capacity.div_ceil(8)), len: 0 }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Packed bytes. The last byte is zero padded past `len` bits.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn push(&mut self, bit: bool) {
        let off = self.len & 7;
        if off == 0 {
            self.data.push(0);
        }
        if bit {
            *self.data.last_mut().unwrap() |= 0x80 >> off;
        }
        self.len += 1;
    }

    /// Appends the `size` low bits of `bits`, most significant first.
    pub fn push_bits(&mut self, bits: u32, size: usize) {
        debug_assert!(size <= 31, "Bit count {size} out of range");
        debug_assert!(
            size == 31 || bits >> size == 0,
            "Value {bits} exceeds {size} bits"
        );

        for i in (0..size).rev() {
            self.push((bits >> i) & 1 == 1);
        }
    }

    pub fn extend(&mut self, other: &BitStream) {
        for bit in other.iter() {
            self.push(bit);
        }
    }

    pub fn iter(&self) -> Bits<'_> {
        Bits { stream: self, pos: 0 }
    }
}

pub struct Bits<'a> {
    stream: &'a BitStream,
    pos: usize,
}

impl Iterator for Bits<'_> {
    type Item = bool;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.stream.len {
            return None;
        }
        let byte = self.stream.data[self.pos >> 3];
        let bit = byte >> (7 - (self.pos & 7)) & 1 == 1;
        self.pos += 1;
        Some(bit)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let rem = self.stream.len - self.pos;
        (rem, Some(rem))
    }
}

impl ExactSizeIterator for Bits<'_> {}
