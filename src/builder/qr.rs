use std::ops::Deref;

use tracing::error;

use crate::common::bitstream::BitStream;
use crate::common::error::{QRError, QRResult};
use crate::common::iter::EncRegionIter;
use crate::common::mask::MaskPattern;
use crate::common::metadata::{Color, ECLevel, Version};
use crate::common::tables::{SpecTables, FORMAT_INFO_BIT_LEN, VERSION_INFO_BIT_LEN};

// Module
//------------------------------------------------------------------------------

/// Who may still write a module.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Access {
    Writable,
    ReadOnly,
    Protected,
    ReservedFormat,
    ReservedVersion,
}

/// What a module belongs to. Alignment patterns count as finders.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum ModuleKind {
    None,
    Data,
    Format,
    Version,
    Timing,
    Dark,
    Finder,
    Separator,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Module {
    pub color: Color,
    pub access: Access,
    pub kind: ModuleKind,
}

impl Module {
    pub const EMPTY: Module =
        Module { color: Color::Light, access: Access::Writable, kind: ModuleKind::None };

    pub const fn new(color: Color, access: Access, kind: ModuleKind) -> Self {
        Self { color, access, kind }
    }

    pub(crate) const fn data(color: Color) -> Self {
        Self::new(color, Access::Writable, ModuleKind::Data)
    }

    const fn func(color: Color, kind: ModuleKind) -> Self {
        Self::new(color, Access::ReadOnly, kind)
    }

    const fn format(color: Color) -> Self {
        Self::new(color, Access::ReservedFormat, ModuleKind::Format)
    }

    const fn version(color: Color) -> Self {
        Self::new(color, Access::ReservedVersion, ModuleKind::Version)
    }

    pub fn is_dark(&self) -> bool {
        self.color == Color::Dark
    }
}

impl Deref for Module {
    type Target = Color;
    fn deref(&self) -> &Self::Target {
        &self.color
    }
}

// Build stage
//------------------------------------------------------------------------------

/// Construction progress of a symbol. Each step only runs from the stage before it.
#[derive(Debug, PartialEq, Eq, Clone, Copy, PartialOrd, Ord)]
pub enum Stage {
    Empty,
    FunctionPatterns,
    Reserved,
    DataPlaced,
    VersionPlaced,
    Masked,
    FormatPlaced,
    Finalized,
}

#[derive(Debug, Clone)]
pub struct QR {
    grid: Vec<Module>,
    w: usize,
    ver: Version,
    ecl: ECLevel,
    mask: Option<MaskPattern>,
    stage: Stage,
}

// QR type for builder
//------------------------------------------------------------------------------

impl QR {
    pub fn new(ver: Version, ecl: ECLevel) -> Self {
        let w = ver.width();
        Self { grid: vec![Module::EMPTY; w * w], w, ver, ecl, mask: None, stage: Stage::Empty }
    }

    pub fn grid(&self) -> &[Module] {
        &self.grid
    }

    pub fn version(&self) -> Version {
        self.ver
    }

    pub fn width(&self) -> usize {
        self.w
    }

    pub fn ec_level(&self) -> ECLevel {
        self.ecl
    }

    pub fn mask(&self) -> Option<MaskPattern> {
        self.mask
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn is_finalized(&self) -> bool {
        self.stage == Stage::Finalized
    }

    pub fn count_dark_modules(&self) -> usize {
        self.grid.iter().filter(|m| m.is_dark()).count()
    }

    fn expect_stage(&self, exp: Stage, msg: &'static str) -> QRResult<()> {
        if self.stage != exp {
            return Err(QRError::InvalidState(msg));
        }
        Ok(())
    }

    #[cfg(test)]
    pub fn to_debug_str(&self) -> String {
        let w = self.w as i16;
        let mut res = String::with_capacity((w * (w + 1)) as usize);
        res.push('\n');
        for i in 0..w {
            for j in 0..w {
                let m = self.get(i, j);
                let c = match m.kind {
                    ModuleKind::None => '.',
                    ModuleKind::Finder
                    | ModuleKind::Separator
                    | ModuleKind::Timing
                    | ModuleKind::Dark => m.select('F', 'f'),
                    ModuleKind::Version => m.select('V', 'v'),
                    ModuleKind::Format => m.select('M', 'm'),
                    ModuleKind::Data => m.select('D', 'd'),
                };
                res.push(c);
            }
            res.push('\n');
        }
        res
    }

    fn coord_to_index(&self, r: i16, c: i16) -> usize {
        let w = self.w as i16;
        debug_assert!(-w <= r && r < w, "row should be greater than or equal to w");
        debug_assert!(-w <= c && c < w, "column should be greater than or equal to w");

        let r = if r < 0 { r + w } else { r };
        let c = if c < 0 { c + w } else { c };
        (r as usize) * self.w + c as usize
    }

    pub fn get(&self, r: i16, c: i16) -> Module {
        self.grid[self.coord_to_index(r, c)]
    }

    pub(crate) fn get_mut(&mut self, r: i16, c: i16) -> &mut Module {
        let index = self.coord_to_index(r, c);
        &mut self.grid[index]
    }

    pub(crate) fn set(&mut self, r: i16, c: i16, module: Module) {
        *self.get_mut(r, c) = module;
    }
}


// Finder pattern
//------------------------------------------------------------------------------

impl QR {
    fn draw_finder_patterns(&mut self) {
        self.draw_finder_pattern_at(3, 3);
        self.draw_finder_pattern_at(3, -4);
        self.draw_finder_pattern_at(-4, 3);
    }

    // Draws the 7x7 finder centred at (r, c) along with its separator on the inner sides
    fn draw_finder_pattern_at(&mut self, r: i16, c: i16) {
        let (dr_left, dr_right) = if r > 0 { (-3, 4) } else { (-4, 3) };
        let (dc_top, dc_bottom) = if c > 0 { (-3, 4) } else { (-4, 3) };
        for i in dr_left..=dr_right {
            for j in dc_top..=dc_bottom {
                self.set(
                    r + i,
                    c + j,
                    match (i, j) {
                        (4 | -4, _) | (_, 4 | -4) => {
                            Module::func(Color::Light, ModuleKind::Separator)
                        }
                        (3 | -3, _) | (_, 3 | -3) => Module::func(Color::Dark, ModuleKind::Finder),
                        (2 | -2, _) | (_, 2 | -2) => {
                            Module::func(Color::Light, ModuleKind::Finder)
                        }
                        _ => Module::func(Color::Dark, ModuleKind::Finder),
                    },
                );
            }
        }
    }
}


// Timing pattern
//------------------------------------------------------------------------------

impl QR {
    fn draw_timing_pattern(&mut self) {
        let w = self.w as i16;
        let (off, last) = (6, w - 9);
        self.draw_line(off, 8, off, last);
        self.draw_line(8, off, last, off);
    }

    fn draw_line(&mut self, r1: i16, c1: i16, r2: i16, c2: i16) {
        debug_assert!(r1 == r2 || c1 == c2, "Line is neither vertical nor horizontal");

        let timing = |i: i16| {
            let clr = if i & 1 == 0 { Color::Dark } else { Color::Light };
            Module::new(clr, Access::Protected, ModuleKind::Timing)
        };
        if r1 == r2 {
            for j in c1..=c2 {
                self.set(r1, j, timing(j));
            }
        } else {
            for i in r1..=r2 {
                self.set(i, c1, timing(i));
            }
        }
    }
}

#[cfg(test)]
mod timing_pattern_tests {
    use crate::builder::{qr::Access, QR};
    use crate::common::metadata::{ECLevel, Version};

    #[test]
    fn test_timing_pattern_1() {
        let mut qr = QR::new(Version(1), ECLevel::L);
        qr.draw_timing_pattern();
        assert_eq!(
            qr.to_debug_str(),
            "\n\
             .....................\n\
             .....................\n\
             .....................\n\
             .....................\n\
             .....................\n\
             .....................\n\
             ........fFfFf........\n\
             .....................\n\
             ......f..............\n\
             ......F..............\n\
             ......f..............\n\
             ......F..............\n\
             ......f..............\n\
             .....................\n\
             .....................\n\
             .....................\n\
             .....................\n\
             .....................\n\
             .....................\n\
             .....................\n\
             .....................\n"
        );
        assert_eq!(qr.get(6, 10).access, Access::Protected);
    }
}

// Alignment pattern
//------------------------------------------------------------------------------

impl QR {
    fn draw_alignment_patterns(&mut self, tables: &SpecTables) {
        let poses = tables.alignment_pattern(self.ver);
        for &r in poses {
            for &c in poses {
                self.draw_alignment_pattern_at(r, c)
            }
        }
    }

    // Centres overlapping a finder are skipped
    fn draw_alignment_pattern_at(&mut self, r: i16, c: i16) {
        if self.get(r, c).access == Access::ReadOnly {
            return;
        }
        for i in -2..=2 {
            for j in -2..=2 {
                self.set(
                    r + i,
                    c + j,
                    match (i, j) {
                        (-2 | 2, _) | (_, -2 | 2) | (0, 0) => {
                            Module::func(Color::Dark, ModuleKind::Finder)
                        }
                        _ => Module::func(Color::Light, ModuleKind::Finder),
                    },
                )
            }
        }
    }
}


// All function patterns
//------------------------------------------------------------------------------

impl QR {
    pub fn draw_function_patterns(&mut self, tables: &SpecTables) -> QRResult<()> {
        self.expect_stage(Stage::Empty, "function patterns need an empty grid")?;

        self.draw_finder_patterns();
        self.draw_timing_pattern();
        self.draw_alignment_patterns(tables);
        self.draw_dark_module();
        self.stage = Stage::FunctionPatterns;
        Ok(())
    }

    fn draw_dark_module(&mut self) {
        let r = (*self.ver * 4 + 9) as i16;
        self.set(r, 8, Module::func(Color::Dark, ModuleKind::Dark));
    }
}


// Format & version info
//------------------------------------------------------------------------------

impl QR {
    pub fn reserve_info_areas(&mut self) -> QRResult<()> {
        self.expect_stage(Stage::FunctionPatterns, "reservation needs function patterns")?;

        self.reserve_format_area();
        if *self.ver >= 7 {
            self.reserve_version_area();
        }
        self.stage = Stage::Reserved;
        Ok(())
    }

    fn reserve_format_area(&mut self) {
        for (r, c) in FORMAT_INFO_COORDS_QR_MAIN.iter().chain(FORMAT_INFO_COORDS_QR_SIDE.iter()) {
            let m = self.get_mut(*r, *c);
            if m.access == Access::Writable {
                *m = Module::format(Color::Light);
            }
        }
    }

    fn reserve_version_area(&mut self) {
        for (r, c) in self.version_info_coords() {
            self.set(r, c, Module::version(Color::Light));
        }
    }

    /// Writes the format information of the applied mask into both copies.
    pub fn draw_format_info(&mut self, tables: &SpecTables) -> QRResult<()> {
        self.expect_stage(Stage::Masked, "format info needs a masked grid")?;
        let mask = self.mask.ok_or(QRError::InvalidState("format info needs a mask"))?;

        let format_info = tables.format_info(self.ecl, mask);
        self.draw_format_bits(format_info);
        self.stage = Stage::FormatPlaced;
        Ok(())
    }

    fn draw_format_bits(&mut self, format_info: u32) {
        self.draw_number(
            format_info,
            FORMAT_INFO_BIT_LEN,
            Module::format(Color::Light),
            Module::format(Color::Dark),
            &FORMAT_INFO_COORDS_QR_MAIN,
        );
        self.draw_number(
            format_info,
            FORMAT_INFO_BIT_LEN,
            Module::format(Color::Light),
            Module::format(Color::Dark),
            &FORMAT_INFO_COORDS_QR_SIDE,
        );
    }

    pub fn draw_version_info(&mut self, tables: &SpecTables) -> QRResult<()> {
        self.expect_stage(Stage::DataPlaced, "version info needs placed data")?;
        let ver_info =
            tables.version_info(self.ver).ok_or(QRError::InvalidState("version info below 7"))?;

        self.draw_version_bits(ver_info);
        self.stage = Stage::VersionPlaced;
        Ok(())
    }

    fn draw_version_bits(&mut self, ver_info: u32) {
        let coords = self.version_info_coords();
        for (i, pair) in coords.chunks_exact(2).enumerate() {
            let clr = Color::from((ver_info >> i) & 1 == 1);
            for (r, c) in pair {
                self.set(*r, *c, Module::version(clr));
            }
        }
    }

    // Bit i, LSB first, at (w - 11 + i % 3, i / 3) and its transpose
    fn version_info_coords(&self) -> Vec<(i16, i16)> {
        let w = self.w as i16;
        (0..VERSION_INFO_BIT_LEN as i16)
            .flat_map(|i| {
                let (a, b) = (w - 11 + i % 3, i / 3);
                [(a, b), (b, a)]
            })
            .collect()
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

impl QR {
    /// Modules still open to data bits.
    pub fn writable_count(&self) -> usize {
        self.grid.iter().filter(|m| m.access == Access::Writable && m.kind == ModuleKind::None).count()
    }

    /// Places `payload` along the zigzag scan into writable modules. The payload has to fill the
    /// encoding region exactly.
    pub fn place_data(&mut self, payload: &BitStream) -> QRResult<()> {
        self.expect_stage(Stage::Reserved, "data placement needs reserved info areas")?;

        let mut bits = payload.iter();
        for (r, c) in EncRegionIter::new(self.ver) {
            let m = self.get_mut(r, c);
            if m.access != Access::Writable || m.kind != ModuleKind::None {
                continue;
            }
            match bits.next() {
                Some(bit) => *m = Module::data(Color::from(bit)),
                None => {
                    error!(row = r, col = c, "Ran out of data bits");
                    return Err(QRError::InvariantViolation("data bits exhausted before region"));
                }
            }
        }
        if bits.len() > 0 {
            error!(left = bits.len(), "Data bits left over after placement");
            return Err(QRError::InvariantViolation("data bits left after region"));
        }

        self.stage = Stage::DataPlaced;
        Ok(())
    }

    /// XORs the mask predicate into data modules.
    pub fn apply_mask(&mut self, pattern: MaskPattern) -> QRResult<()> {
        let exp = if *self.ver >= 7 { Stage::VersionPlaced } else { Stage::DataPlaced };
        self.expect_stage(exp, "masking needs placed data and version info")?;

        self.mask = Some(pattern);
        let mask_fn = pattern.mask_function();
        let w = self.w as i16;
        for r in 0..w {
            for c in 0..w {
                let m = self.get_mut(r, c);
                if m.kind == ModuleKind::Data && mask_fn(r, c) {
                    m.color = !m.color;
                }
            }
        }
        self.stage = Stage::Masked;
        Ok(())
    }

    pub fn finalize(&mut self) -> QRResult<()> {
        self.expect_stage(Stage::FormatPlaced, "finalizing needs format info")?;
        self.stage = Stage::Finalized;
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn empty_payload(&self) -> BitStream {
        let n = self.writable_count();
        let mut bs = BitStream::new(n);
        (0..n).for_each(|_| bs.push(false));
        bs
    }
}


// Text render
//------------------------------------------------------------------------------

impl QR {
    pub fn to_str(&self, module_sz: usize) -> String {
        let qz_sz = QUIET_ZONE_WIDTH * module_sz;
        let qr_sz = self.w * module_sz;
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
                canvas.push(self.get(r, c).select('█', ' '));
            }
            canvas.push('\n');
        }

        canvas
    }
}

#[cfg(test)]
mod text_render_tests {
    use crate::QRBuilder;

    #[test]
    fn test_to_str() {
        let qr = QRBuilder::new(b"text").build().unwrap();
        let s = qr.to_str(1);
        let lines = s.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), 29);
        assert!(lines.iter().all(|l| l.chars().count() == 29));
        assert!(lines[..4].iter().all(|l| l.chars().all(|ch| ch == '█')));
        // Dark modules print as blanks on the light background
        assert_eq!(lines[4].chars().nth(4), Some(' '));
        assert_eq!(lines[5].chars().nth(5), Some('█'));

        let s = qr.to_str(2);
        assert_eq!(s.lines().count(), 58);
    }
}

// Global constants
//------------------------------------------------------------------------------

pub static QUIET_ZONE_WIDTH: usize = 4;

// Most significant bit first
static FORMAT_INFO_COORDS_QR_MAIN: [(i16, i16); 15] = [
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

static FORMAT_INFO_COORDS_QR_SIDE: [(i16, i16); 15] = [
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
