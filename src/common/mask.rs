use std::ops::Deref;

// Mask pattern
//------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaskPattern(u8);

impl MaskPattern {
    pub fn new(pattern: u8) -> Self {
        debug_assert!(pattern < 8, "Invalid mask pattern {pattern}");
        Self(pattern)
    }

    /// Predicate deciding which data modules the pattern flips.
    pub fn mask_function(&self) -> fn(i16, i16) -> bool {
        match self.0 {
            0 => mask_functions::checkerboard,
            1 => mask_functions::horizontal_lines,
            2 => mask_functions::vertical_lines,
            3 => mask_functions::diagonal_lines,
            4 => mask_functions::large_checkerboard,
            5 => mask_functions::fields,
            6 => mask_functions::diamonds,
            7 => mask_functions::meadow,
            _ => unreachable!("Invalid mask pattern"),
        }
    }
}

impl Deref for MaskPattern {
    type Target = u8;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

mod mask_functions {
    pub fn checkerboard(r: i16, c: i16) -> bool {
        (r + c) & 1 == 0
    }

    pub fn horizontal_lines(r: i16, _: i16) -> bool {
        r & 1 == 0
    }

    pub fn vertical_lines(_: i16, c: i16) -> bool {
        c % 3 == 0
    }

    pub fn diagonal_lines(r: i16, c: i16) -> bool {
        (r + c) % 3 == 0
    }

    pub fn large_checkerboard(r: i16, c: i16) -> bool {
        ((r >> 1) + (c / 3)) & 1 == 0
    }

    pub fn fields(r: i16, c: i16) -> bool {
        ((r * c) & 1) + ((r * c) % 3) == 0
    }

    pub fn diamonds(r: i16, c: i16) -> bool {
        (((r * c) & 1) + ((r * c) % 3)) & 1 == 0
    }

    pub fn meadow(r: i16, c: i16) -> bool {
        (((r + c) & 1) + ((r * c) % 3)) & 1 == 0
    }
}

#[cfg(test)]
mod mask_tests {
    use super::MaskPattern;

    #[test]
    fn test_checkerboard() {
        let f = MaskPattern::new(0).mask_function();
        assert!(f(0, 0));
        assert!(!f(0, 1));
        assert!(f(1, 1));
    }

    #[test]
    fn test_horizontal_lines() {
        let f = MaskPattern::new(1).mask_function();
        assert!(f(0, 5));
        assert!(!f(1, 5));
        assert!(f(2, 5));
    }

    #[test]
    fn test_vertical_lines() {
        let f = MaskPattern::new(2).mask_function();
        assert!(f(4, 0));
        assert!(!f(4, 1));
        assert!(f(4, 3));
    }

    #[test]
    fn test_fields() {
        let f = MaskPattern::new(5).mask_function();
        assert!(f(0, 0));
        assert!(f(0, 3));
        assert!(!f(1, 1));
        assert!(f(2, 3));
    }

    #[test]
    fn test_each_pattern_flips_some_and_spares_some() {
        for p in 0..8 {
            let f = MaskPattern::new(p).mask_function();
            let mut dark = 0;
            for r in 0..21 {
                for c in 0..21 {
                    if f(r, c) {
                        dark += 1;
                    }
                }
            }
            assert!(dark > 0 && dark < 441, "Mask {p} is degenerate");
        }
    }
}
