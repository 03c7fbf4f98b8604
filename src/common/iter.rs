use crate::common::metadata::Version;

// Encoding region iterator
//------------------------------------------------------------------------------

/// Yields every (row, column) of the symbol in codeword placement
/// order: column pairs from the right edge, alternating the vertical
/// direction, with the timing column 6 skipped. Cells occupied by
/// function patterns are emitted too and must be filtered by the
/// caller.
pub struct EncRegionIter {
    width: i16,
    right: i16,
    vert: i16,
}

impl EncRegionIter {
    pub fn new(version: Version) -> Self {
        let width = version.width();
        Self { width, right: width - 1, vert: 0 }
    }
}

impl Iterator for EncRegionIter {
    type Item = (i16, i16);

    fn next(&mut self) -> Option<Self::Item> {
        if self.right < 1 {
            return None;
        }

        let v = self.vert >> 1;
        let upward = (self.right + 1) & 2 == 0;
        let r = if upward { self.width - 1 - v } else { v };
        let c = self.right - (self.vert & 1);

        self.vert += 1;
        if self.vert == self.width * 2 {
            self.vert = 0;
            self.right -= 2;
            if self.right == 6 {
                self.right = 5;
            }
        }
        Some((r, c))
    }
}
