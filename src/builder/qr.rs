use std::ops::Deref;

use image::{GrayImage, Luma};

use crate::common::{
    iter::EncRegionIter,
    mask::MaskPattern,
    metadata::{
        format_info, Color, ECLevel, Version, FORMAT_INFO_BIT_LEN, FORMAT_INFO_COORDS_MAIN,
        FORMAT_INFO_COORDS_SIDE, VERSION_INFO_BIT_LEN, VERSION_INFO_COORDS_BL,
        VERSION_INFO_COORDS_TR,
    },
    BitStream,
};

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Module {
    Empty,
    Func(Color),
    Version(Color),
    Format(Color),
    Data(Color),
}

impl Deref for Module {
    type Target = Color;
    fn deref(&self) -> &Self::Target {
        match self {
            Module::Empty => &Color::Light,
            Module::Func(c) => c,
            Module::Version(c) => c,
            Module::Format(c) => c,
            Module::Data(c) => c,
        }
    }
}

// QR symbol
//------------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct QrCode {
    grid: Vec<Module>,
    w: i16,
    ver: Version,
    ecl: ECLevel,
    mask: Option<MaskPattern>,
}

impl QrCode {
    pub(crate) fn new(ver: Version, ecl: ECLevel) -> Self {
        let w = ver.width();
        Self { grid: vec![Module::Empty; (w * w) as usize], w, ver, ecl, mask: None }
    }

    pub fn version(&self) -> Version {
        self.ver
    }

    /// Side length of the symbol in modules.
    pub fn size(&self) -> usize {
        self.w as usize
    }

    pub fn ec_level(&self) -> ECLevel {
        self.ecl
    }

    pub fn mask(&self) -> Option<MaskPattern> {
        self.mask
    }

    /// Color of the module at column `x`, row `y`; true is dark. Out of
    /// range coordinates read as light.
    pub fn get_module(&self, x: i32, y: i32) -> bool {
        let w = self.w as i32;
        if !(0..w).contains(&x) || !(0..w).contains(&y) {
            return false;
        }
        matches!(*self.get(y as i16, x as i16), Color::Dark)
    }

    pub fn count_dark_modules(&self) -> usize {
        self.grid.iter().filter(|&m| matches!(**m, Color::Dark)).count()
    }

    #[cfg(test)]
    pub fn to_debug_str(&self) -> String {
        let w = self.w;
        let mut res = String::with_capacity((w * (w + 1)) as usize);
        res.push('\n');
        for i in 0..w {
            for j in 0..w {
                let c = match self.get(i, j) {
                    Module::Empty => '.',
                    Module::Func(Color::Dark) => 'f',
                    Module::Func(Color::Light) => 'F',
                    Module::Version(Color::Dark) => 'v',
                    Module::Version(Color::Light) => 'V',
                    Module::Format(Color::Dark) => 'm',
                    Module::Format(Color::Light) => 'M',
                    Module::Data(Color::Dark) => 'd',
                    Module::Data(Color::Light) => 'D',
                };
                res.push(c);
            }
            res.push('\n');
        }
        res
    }

    fn coord_to_index(&self, r: i16, c: i16) -> usize {
        let w = self.w;
        debug_assert!(-w <= r && r < w, "row {r} out of range for width {w}");
        debug_assert!(-w <= c && c < w, "column {c} out of range for width {w}");

        let r = if r < 0 { r + w } else { r };
        let c = if c < 0 { c + w } else { c };
        (r * w + c) as _
    }

    fn get(&self, r: i16, c: i16) -> Module {
        self.grid[self.coord_to_index(r, c)]
    }

    fn set(&mut self, r: i16, c: i16, module: Module) {
        let index = self.coord_to_index(r, c);
        self.grid[index] = module;
    }
}


// Finder pattern
//------------------------------------------------------------------------------

impl QrCode {
    fn draw_finder_patterns(&mut self) {
        self.draw_finder_pattern_at(3, 3);
        self.draw_finder_pattern_at(3, -4);
        self.draw_finder_pattern_at(-4, 3);
    }

    fn draw_finder_pattern_at(&mut self, r: i16, c: i16) {
        let (dr_left, dr_right) = if r > 0 { (-3, 4) } else { (-4, 3) };
        let (dc_top, dc_bottom) = if c > 0 { (-3, 4) } else { (-4, 3) };
        for i in dr_left..=dr_right {
            for j in dc_top..=dc_bottom {
                self.set(
                    r + i,
                    c + j,
                    match (i, j) {
                        (4 | -4, _) | (_, 4 | -4) => Module::Func(Color::Light),
                        (3 | -3, _) | (_, 3 | -3) => Module::Func(Color::Dark),
                        (2 | -2, _) | (_, 2 | -2) => Module::Func(Color::Light),
                        _ => Module::Func(Color::Dark),
                    },
                );
            }
        }
    }
}


// Timing pattern
//------------------------------------------------------------------------------

impl QrCode {
    fn draw_timing_pattern(&mut self) {
        let w = self.w;
        self.draw_line(6, 8, 6, w - 9);
        self.draw_line(8, 6, w - 9, 6);
    }

    fn draw_line(&mut self, r1: i16, c1: i16, r2: i16, c2: i16) {
        debug_assert!(r1 == r2 || c1 == c2, "Line is neither vertical nor horizontal");

        if r1 == r2 {
            for j in c1..=c2 {
                let m =
                    if j & 1 == 0 { Module::Func(Color::Dark) } else { Module::Func(Color::Light) };
                self.set(r1, j, m);
            }
        } else {
            for i in r1..=r2 {
                let m =
                    if i & 1 == 0 { Module::Func(Color::Dark) } else { Module::Func(Color::Light) };
                self.set(i, c1, m);
            }
        }
    }
}

// Alignment pattern
//------------------------------------------------------------------------------

impl QrCode {
    fn draw_alignment_patterns(&mut self) {
        let poses = self.ver.alignment_pattern();
        for &r in &poses {
            for &c in &poses {
                self.draw_alignment_pattern_at(r, c)
            }
        }
    }

    fn draw_alignment_pattern_at(&mut self, r: i16, c: i16) {
        let w = self.w;
        if (r == 6 && (c == 6 || c - w == -7)) || (r - w == -7 && c == 6) {
            return;
        }
        for i in -2..=2 {
            for j in -2..=2 {
                self.set(
                    r + i,
                    c + j,
                    match (i, j) {
                        (-2 | 2, _) | (_, -2 | 2) | (0, 0) => Module::Func(Color::Dark),
                        _ => Module::Func(Color::Light),
                    },
                )
            }
        }
    }
}


// All function patterns
//------------------------------------------------------------------------------

impl QrCode {
    pub(crate) fn draw_all_function_patterns(&mut self) {
        self.draw_finder_patterns();
        self.draw_timing_pattern();
        self.draw_alignment_patterns();
    }
}

#[cfg(test)]
mod all_function_patterns_test {
    use super::QrCode;
    use crate::common::metadata::{ECLevel, Version};

    #[test]
    fn test_all_function_patterns() {
        let mut qr = QrCode::new(Version::new(3), ECLevel::L);
        qr.draw_all_function_patterns();
        assert_eq!(
            qr.to_debug_str(),
            "\n\
             fffffffF.............Ffffffff\n\
             fFFFFFfF.............FfFFFFFf\n\
             fFfffFfF.............FfFfffFf\n\
             fFfffFfF.............FfFfffFf\n\
             fFfffFfF.............FfFfffFf\n\
             fFFFFFfF.............FfFFFFFf\n\
             fffffffFfFfFfFfFfFfFfFfffffff\n\
             FFFFFFFF.............FFFFFFFF\n\
             ......f......................\n\
             ......F......................\n\
             ......f......................\n\
             ......F......................\n\
             ......f......................\n\
             ......F......................\n\
             ......f......................\n\
             ......F......................\n\
             ......f......................\n\
             ......F......................\n\
             ......f......................\n\
             ......F......................\n\
             ......f.............fffff....\n\
             FFFFFFFF............fFFFf....\n\
             fffffffF............fFfFf....\n\
             fFFFFFfF............fFFFf....\n\
             fFfffFfF............fffff....\n\
             fFfffFfF.....................\n\
             fFfffFfF.....................\n\
             fFFFFFfF.....................\n\
             fffffffF.....................\n"
        );
    }
}

// Format & version info
//------------------------------------------------------------------------------

impl QrCode {
    fn reserve_format_area(&mut self) {
        self.draw_format_info((1 << FORMAT_INFO_BIT_LEN) - 1);
    }

    fn draw_format_info(&mut self, format_info: u32) {
        self.draw_number(
            format_info,
            FORMAT_INFO_BIT_LEN,
            Module::Format(Color::Light),
            Module::Format(Color::Dark),
            &FORMAT_INFO_COORDS_MAIN,
        );
        self.draw_number(
            format_info,
            FORMAT_INFO_BIT_LEN,
            Module::Format(Color::Light),
            Module::Format(Color::Dark),
            &FORMAT_INFO_COORDS_SIDE,
        );
        // Dark module above the bottom left finder.
        self.set(-8, 8, Module::Format(Color::Dark));
    }

    fn draw_version_info(&mut self) {
        if *self.ver < 7 {
            return;
        }
        let ver_info = self.ver.info();
        self.draw_number(
            ver_info,
            VERSION_INFO_BIT_LEN,
            Module::Version(Color::Light),
            Module::Version(Color::Dark),
            &VERSION_INFO_COORDS_BL,
        );
        self.draw_number(
            ver_info,
            VERSION_INFO_BIT_LEN,
            Module::Version(Color::Light),
            Module::Version(Color::Dark),
            &VERSION_INFO_COORDS_TR,
        );
    }

    fn draw_number(
        &mut self,
        number: u32,
        bit_len: usize,
        off_clr: Module,
        on_clr: Module,
        coords: &[(i16, i16)],
    ) {
        let mut mask = 1 << (bit_len - 1);
        for (r, c) in coords {
            if number & mask == 0 {
                self.set(*r, *c, off_clr);
            } else {
                self.set(*r, *c, on_clr);
            }
            mask >>= 1;
        }
    }
}

// Encoding region
//------------------------------------------------------------------------------

impl QrCode {
    pub(crate) fn draw_encoding_region(&mut self, payload: &BitStream) {
        self.reserve_format_area();
        self.draw_version_info();
        self.draw_payload(payload);

        debug_assert!(!self.grid.contains(&Module::Empty), "Empty module found after placement");
    }

    fn draw_payload(&mut self, payload: &BitStream) {
        let mut coords = EncRegionIter::new(self.ver);
        for bit in payload.iter() {
            let module = Module::Data(if bit { Color::Dark } else { Color::Light });
            for (r, c) in coords.by_ref() {
                if matches!(self.get(r, c), Module::Empty) {
                    self.set(r, c, module);
                    break;
                }
            }
        }
        self.fill_remainder_bits(coords);
    }

    fn fill_remainder_bits(&mut self, coords: impl Iterator<Item = (i16, i16)>) {
        for (r, c) in coords {
            if matches!(self.get(r, c), Module::Empty) {
                self.set(r, c, Module::Data(Color::Light));
            }
        }
    }
}

// Masking
//------------------------------------------------------------------------------

impl QrCode {
    pub(crate) fn apply_mask(&mut self, pattern: MaskPattern) {
        self.toggle_mask(pattern);
        self.mask = Some(pattern);
        self.draw_format_info(format_info(self.ecl, *pattern as u32));
    }

    /// Scores all 8 patterns and keeps the one with the lowest total
    /// penalty, preferring the lower index on ties.
    pub(crate) fn apply_best_mask(&mut self) -> MaskPattern {
        let mut best = MaskPattern::new(0);
        let mut best_penalty = i32::MAX;
        for p in 0..8 {
            let pattern = MaskPattern::new(p);
            self.toggle_mask(pattern);
            self.draw_format_info(format_info(self.ecl, p as u32));
            let penalty = self.compute_total_penalty();
            if penalty < best_penalty {
                best_penalty = penalty;
                best = pattern;
            }
            self.toggle_mask(pattern);
        }
        self.apply_mask(best);
        best
    }

    // XOR is its own inverse, so toggling twice restores the grid.
    fn toggle_mask(&mut self, pattern: MaskPattern) {
        let mask_fn = pattern.mask_function();
        let w = self.w;
        for r in 0..w {
            for c in 0..w {
                if mask_fn(r, c) {
                    if let Module::Data(clr) = self.get(r, c) {
                        self.set(r, c, Module::Data(!clr))
                    }
                }
            }
        }
    }
}

// Penalty score
//------------------------------------------------------------------------------

const PENALTY_N1: i32 = 3;
const PENALTY_N2: i32 = 3;
const PENALTY_N3: i32 = 40;
const PENALTY_N4: i32 = 10;

impl QrCode {
    fn compute_total_penalty(&self) -> i32 {
        self.compute_run_penalty()
            + self.compute_block_penalty()
            + self.compute_balance_penalty()
    }

    // Adjacent same-color runs and finder lookalikes, scored per row
    // and per column in one pass each.
    fn compute_run_penalty(&self) -> i32 {
        let w = self.w;
        let mut penalty = 0;
        for r in 0..w {
            penalty += self.line_run_penalty(|i| matches!(*self.get(r, i), Color::Dark));
        }
        for c in 0..w {
            penalty += self.line_run_penalty(|i| matches!(*self.get(i, c), Color::Dark));
        }
        penalty
    }

    fn line_run_penalty(&self, at: impl Fn(i16) -> bool) -> i32 {
        let size = self.w as i32;
        let mut penalty = 0;
        let mut run_color = false;
        let mut run_len: i32 = 0;
        let mut history = [0i32; 7];
        for i in 0..self.w {
            if at(i) == run_color {
                run_len += 1;
                if run_len == 5 {
                    penalty += PENALTY_N1;
                } else if run_len > 5 {
                    penalty += 1;
                }
            } else {
                push_run(&mut history, run_len, size);
                if !run_color {
                    penalty += count_finder_patterns(&history) * PENALTY_N3;
                }
                run_color = !run_color;
                run_len = 1;
            }
        }
        penalty += terminate_runs(&mut history, run_color, run_len, size) * PENALTY_N3;
        penalty
    }

    fn compute_block_penalty(&self) -> i32 {
        let w = self.w;
        let mut penalty = 0;
        for r in 0..w - 1 {
            for c in 0..w - 1 {
                let clr = *self.get(r, c);
                if clr == *self.get(r, c + 1)
                    && clr == *self.get(r + 1, c)
                    && clr == *self.get(r + 1, c + 1)
                {
                    penalty += PENALTY_N2;
                }
            }
        }
        penalty
    }

    // 10 points per 5% deviation from an even dark/light split.
    fn compute_balance_penalty(&self) -> i32 {
        let dark = self.count_dark_modules() as i32;
        let total = (self.w as i32) * (self.w as i32);
        let k = ((dark * 20 - total * 10).abs() + total - 1) / total - 1;
        k * PENALTY_N4
    }
}

// Runs adjacent to the symbol edge count a light border of `size`.
fn push_run(history: &mut [i32; 7], mut run_len: i32, size: i32) {
    if history[0] == 0 {
        run_len += size;
    }
    history.copy_within(0..6, 1);
    history[0] = run_len;
}

// A finder lookalike is a 1:1:3:1:1 dark-light sequence flanked by
// light whitespace at least 4 units wide on either side.
fn count_finder_patterns(history: &[i32; 7]) -> i32 {
    let n = history[1];
    let core = n > 0
        && history[2] == n
        && history[3] == n * 3
        && history[4] == n
        && history[5] == n;
    let mut count = 0;
    if core && history[0] >= n * 4 && history[6] >= n {
        count += 1;
    }
    if core && history[6] >= n * 4 && history[0] >= n {
        count += 1;
    }
    count
}

fn terminate_runs(history: &mut [i32; 7], run_color: bool, mut run_len: i32, size: i32) -> i32 {
    if run_color {
        push_run(history, run_len, size);
        run_len = 0;
    }
    run_len += size;
    push_run(history, run_len, size);
    count_finder_patterns(history)
}


// Render
//------------------------------------------------------------------------------

impl QrCode {
    /// Renders the symbol with a 4 module quiet zone, `module_sz`
    /// pixels per module.
    pub fn to_image(&self, module_sz: u32) -> GrayImage {
        let qz_sz = 4 * module_sz;
        let qr_sz = self.w as u32 * module_sz;
        let total_sz = qz_sz + qr_sz + qz_sz;

        let mut canvas = GrayImage::new(total_sz, total_sz);
        for i in 0..total_sz {
            for j in 0..total_sz {
                if i < qz_sz || i >= qz_sz + qr_sz || j < qz_sz || j >= qz_sz + qr_sz {
                    canvas.put_pixel(j, i, Luma([255]));
                    continue;
                }
                let r = (i - qz_sz) / module_sz;
                let c = (j - qz_sz) / module_sz;
                let pixel = self.get(r as i16, c as i16).select(Luma([0]), Luma([255]));
                canvas.put_pixel(j, i, pixel);
            }
        }
        canvas
    }

    /// Unicode block rendering for terminals, quiet zone included.
    pub fn to_str(&self, module_sz: usize) -> String {
        let qz_sz = 4 * module_sz;
        let qr_sz = self.w as usize * module_sz;
        let total_sz = qz_sz + qr_sz + qz_sz;

        let mut canvas = String::new();
        for i in 0..total_sz {
            for j in 0..total_sz {
                if i < qz_sz || i >= qz_sz + qr_sz || j < qz_sz || j >= qz_sz + qr_sz {
                    canvas.push('█');
                    continue;
                }
                let r = ((i - qz_sz) / module_sz) as i16;
                let c = ((j - qz_sz) / module_sz) as i16;
                canvas.push(self.get(r, c).select(' ', '█'));
            }
            canvas.push('\n');
        }
        canvas
    }
}
