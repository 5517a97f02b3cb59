use std::sync::OnceLock;

use super::ec::Gf256;
use super::mask::MaskPattern;
use super::metadata::{ECLevel, Version};

// Block layout
//------------------------------------------------------------------------------

/// Reed-Solomon block structure of one (version, level) pair.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub struct BlockLayout {
    pub total_data_codewords: usize,
    pub ecc_per_block: usize,
    pub group1_blocks: usize,
    pub group1_data_codewords: usize,
    pub group2_blocks: usize,
    pub group2_data_codewords: usize,
}

impl BlockLayout {
    pub fn total_blocks(&self) -> usize {
        self.group1_blocks + self.group2_blocks
    }

    pub fn total_ecc_codewords(&self) -> usize {
        self.total_blocks() * self.ecc_per_block
    }

    pub fn required_bits(&self) -> usize {
        self.total_data_codewords << 3
    }

    pub fn max_data_codewords(&self) -> usize {
        self.group1_data_codewords.max(self.group2_data_codewords)
    }
}

// Lookup tables
//------------------------------------------------------------------------------

/// Read-only lookup data shared by every stage of the encoder.
///
/// Built once per process by [`SpecTables::global`] and handed to each component by reference.
/// Derived entries (block layouts, byte capacities, field tables) are computed at construction
/// and never mutated afterwards.
#[derive(Debug)]
pub struct SpecTables {
    gf: Gf256,
    layouts: [[BlockLayout; 40]; 4],
    capacities: [[usize; 40]; 4],
}

impl SpecTables {
    pub fn global() -> &'static SpecTables {
        static TABLES: OnceLock<SpecTables> = OnceLock::new();
        TABLES.get_or_init(SpecTables::new)
    }

    fn new() -> Self {
        let mut layouts = [[BlockLayout::default(); 40]; 4];
        let mut capacities = [[0; 40]; 4];

        for ecl in ECLevel::ALL {
            let l = ecl.index();
            for v in 1..=40 {
                let layout = Self::compute_layout(v, ecl);
                let cci_bits = Version(v).cci_bits();
                let payload_bits = layout.required_bits() - MODE_INDICATOR_BITS - cci_bits;
                layouts[l][v - 1] = layout;
                capacities[l][v - 1] = payload_bits >> 3;
            }
        }

        Self { gf: Gf256::new(), layouts, capacities }
    }

    // Short blocks come first and long blocks carry one extra data codeword
    fn compute_layout(v: usize, ecl: ECLevel) -> BlockLayout {
        let l = ecl.index();
        let total = TOTAL_CODEWORDS[v - 1];
        let blocks = NUM_BLOCKS[l][v - 1];
        let ecc_per_block = ECC_PER_BLOCK[l][v - 1];

        let group2_blocks = total % blocks;
        let group1_blocks = blocks - group2_blocks;
        let group1_data_codewords = total / blocks - ecc_per_block;
        let group2_data_codewords = if group2_blocks > 0 { group1_data_codewords + 1 } else { 0 };

        BlockLayout {
            total_data_codewords: total - blocks * ecc_per_block,
            ecc_per_block,
            group1_blocks,
            group1_data_codewords,
            group2_blocks,
            group2_data_codewords,
        }
    }

    pub fn gf(&self) -> &Gf256 {
        &self.gf
    }

    pub fn block_layout(&self, ver: Version, ecl: ECLevel) -> BlockLayout {
        self.layouts[ecl.index()][*ver - 1]
    }

    /// Byte-mode character capacity
    pub fn capacity(&self, ver: Version, ecl: ECLevel) -> usize {
        self.capacities[ecl.index()][*ver - 1]
    }

    pub fn total_codewords(&self, ver: Version) -> usize {
        TOTAL_CODEWORDS[*ver - 1]
    }

    pub fn alignment_pattern(&self, ver: Version) -> &'static [i16] {
        ALIGNMENT_PATTERN_POSITIONS[*ver - 1]
    }

    pub fn format_info(&self, ecl: ECLevel, mask: MaskPattern) -> u32 {
        FORMAT_INFOS[ecl.index()][*mask as usize]
    }

    pub fn version_info(&self, ver: Version) -> Option<u32> {
        match *ver {
            7..=40 => Some(VERSION_INFOS[*ver - 7]),
            _ => None,
        }
    }

    pub fn remainder_bits(&self, ver: Version) -> usize {
        REMAINDER_BITS.iter().rev().find(|(from, _)| *from <= *ver).map_or(0, |(_, bits)| *bits)
    }
}

#[cfg(test)]
mod tables_tests {
    use test_case::test_case;

    use super::{SpecTables, ALIGNMENT_PATTERN_POSITIONS, FORMAT_INFOS, VERSION_INFOS};
    use crate::common::mask::MaskPattern;
    use crate::common::metadata::{ECLevel, Version};

    #[test]
    fn test_global_is_shared() {
        let a = SpecTables::global() as *const SpecTables;
        let b = SpecTables::global() as *const SpecTables;
        assert_eq!(a, b);
    }

    #[test]
    fn test_block_layout_sums() {
        let tables = SpecTables::global();
        for v in 1..=40 {
            let ver = Version(v);
            for ecl in ECLevel::ALL {
                let layout = tables.block_layout(ver, ecl);
                let data = layout.group1_blocks * layout.group1_data_codewords
                    + layout.group2_blocks * layout.group2_data_codewords;
                assert_eq!(data, layout.total_data_codewords, "Version {v}, Level {ecl:?}");
                assert_eq!(
                    layout.total_data_codewords + layout.total_ecc_codewords(),
                    tables.total_codewords(ver),
                    "Version {v}, Level {ecl:?}"
                );
            }
        }
    }

    #[test_case(1, ECLevel::M, (16, 10, 1, 16, 0, 0))]
    #[test_case(5, ECLevel::Q, (62, 18, 2, 15, 2, 16))]
    #[test_case(7, ECLevel::L, (156, 20, 2, 78, 0, 0))]
    #[test_case(15, ECLevel::H, (223, 24, 11, 12, 7, 13))]
    #[test_case(40, ECLevel::H, (1276, 30, 20, 15, 61, 16))]
    fn test_block_layout(
        v: usize,
        ecl: ECLevel,
        exp: (usize, usize, usize, usize, usize, usize),
    ) {
        let layout = SpecTables::global().block_layout(Version(v), ecl);
        let got = (
            layout.total_data_codewords,
            layout.ecc_per_block,
            layout.group1_blocks,
            layout.group1_data_codewords,
            layout.group2_blocks,
            layout.group2_data_codewords,
        );
        assert_eq!(got, exp);
    }

    #[test_case(1, ECLevel::L, 17)]
    #[test_case(1, ECLevel::M, 14)]
    #[test_case(1, ECLevel::Q, 11)]
    #[test_case(1, ECLevel::H, 7)]
    #[test_case(9, ECLevel::L, 230)]
    #[test_case(10, ECLevel::L, 271)]
    #[test_case(10, ECLevel::M, 213)]
    #[test_case(27, ECLevel::Q, 805)]
    #[test_case(40, ECLevel::L, 2953)]
    #[test_case(40, ECLevel::M, 2331)]
    #[test_case(40, ECLevel::Q, 1663)]
    #[test_case(40, ECLevel::H, 1273)]
    fn test_capacity(v: usize, ecl: ECLevel, exp: usize) {
        assert_eq!(SpecTables::global().capacity(Version(v), ecl), exp);
    }

    #[test]
    fn test_alignment_positions_follow_spacing_rule() {
        for v in 2..=40usize {
            let w = 17 + 4 * v as i16;
            let count = v / 7 + 2;
            let step = if v == 32 { 26 } else { ((w - 13) as usize).div_ceil(count * 2 - 2) * 2 };
            let mut exp = vec![6i16];
            exp.extend((0..count - 1).rev().map(|i| w - 7 - (i * step) as i16));
            assert_eq!(ALIGNMENT_PATTERN_POSITIONS[v - 1], &exp[..], "Version {v}");
        }
        assert!(ALIGNMENT_PATTERN_POSITIONS[0].is_empty());
    }

    fn bch_remainder(data: u32, poly: u32, poly_deg: u32) -> u32 {
        let mut rem = data << poly_deg;
        let top = 31 - poly.leading_zeros();
        while rem != 0 && 31 - rem.leading_zeros() >= top {
            rem ^= poly << (31 - rem.leading_zeros() - top);
        }
        rem
    }

    #[test]
    fn test_format_infos_are_bch_codes() {
        let level_bits = [0b01, 0b00, 0b11, 0b10];
        for (l, bits) in level_bits.iter().enumerate() {
            for m in 0..8u32 {
                let data = (bits << 3) | m;
                let exp = ((data << 10) | bch_remainder(data, 0x537, 10)) ^ 0x5412;
                assert_eq!(FORMAT_INFOS[l][m as usize], exp, "Level {l}, Mask {m}");
            }
        }
        assert_eq!(
            SpecTables::global().format_info(ECLevel::L, MaskPattern::new(0).unwrap()),
            0b111011111000100
        );
    }

    #[test]
    fn test_version_infos_are_bch_codes() {
        for (i, info) in VERSION_INFOS.iter().enumerate() {
            let v = i as u32 + 7;
            assert_eq!(*info, (v << 12) | bch_remainder(v, 0x1F25, 12), "Version {v}");
        }
        assert_eq!(SpecTables::global().version_info(Version(6)), None);
        assert_eq!(SpecTables::global().version_info(Version(7)), Some(0x07C94));
    }

    #[test_case(1, 0)]
    #[test_case(2, 7)]
    #[test_case(6, 7)]
    #[test_case(7, 0)]
    #[test_case(13, 0)]
    #[test_case(14, 3)]
    #[test_case(20, 3)]
    #[test_case(21, 4)]
    #[test_case(27, 4)]
    #[test_case(28, 3)]
    #[test_case(34, 3)]
    #[test_case(35, 0)]
    #[test_case(40, 0)]
    fn test_remainder_bits(v: usize, exp: usize) {
        assert_eq!(SpecTables::global().remainder_bits(Version(v)), exp);
    }
}

// Global constants
//------------------------------------------------------------------------------

pub static MODE_INDICATOR_BITS: usize = 4;

pub static FORMAT_INFO_BIT_LEN: usize = 15;

pub static VERSION_INFO_BIT_LEN: usize = 18;

static TOTAL_CODEWORDS: [usize; 40] = [
    26, 44, 70, 100, 134, 172, 196, 242, 292, 346, 404, 466, 532, 581, 655, 733, 815, 901, 991,
    1085, 1156, 1258, 1364, 1474, 1588, 1706, 1828, 1921, 2051, 2185, 2323, 2465, 2611, 2761, 2876,
    3034, 3196, 3362, 3532, 3706,
];

// Indexed by level (L, M, Q, H), then version - 1
static ECC_PER_BLOCK: [[usize; 40]; 4] = [
    [
        7, 10, 15, 20, 26, 18, 20, 24, 30, 18, 20, 24, 26, 30, 22, 24, 28, 30, 28, 28, 28, 28, 30,
        30, 26, 28, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    ],
    [
        10, 16, 26, 18, 24, 16, 18, 22, 22, 26, 30, 22, 22, 24, 24, 28, 28, 26, 26, 26, 26, 28, 28,
        28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28,
    ],
    [
        13, 22, 18, 26, 18, 24, 18, 22, 20, 24, 28, 26, 24, 20, 30, 24, 28, 28, 26, 30, 28, 30, 30,
        30, 30, 28, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    ],
    [
        17, 28, 22, 16, 22, 28, 26, 26, 24, 28, 24, 28, 22, 24, 24, 30, 28, 28, 26, 28, 30, 24, 30,
        30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    ],
];

static NUM_BLOCKS: [[usize; 40]; 4] = [
    [
        1, 1, 1, 1, 1, 2, 2, 2, 2, 4, 4, 4, 4, 4, 6, 6, 6, 6, 7, 8, 8, 9, 9, 10, 12, 12, 12, 13, 14,
        15, 16, 17, 18, 19, 19, 20, 21, 22, 24, 25,
    ],
    [
        1, 1, 1, 2, 2, 4, 4, 4, 5, 5, 5, 8, 9, 9, 10, 10, 11, 13, 14, 16, 17, 17, 18, 20, 21, 23,
        25, 26, 28, 29, 31, 33, 35, 37, 38, 40, 43, 45, 47, 49,
    ],
    [
        1, 1, 2, 2, 4, 4, 6, 6, 8, 8, 8, 10, 12, 16, 12, 17, 16, 18, 21, 20, 23, 23, 25, 27, 29,
        34, 34, 35, 38, 40, 43, 45, 48, 51, 53, 56, 59, 62, 65, 68,
    ],
    [
        1, 1, 2, 4, 4, 4, 5, 6, 8, 8, 11, 11, 16, 16, 18, 16, 19, 21, 25, 25, 25, 34, 30, 32, 35,
        37, 40, 42, 45, 48, 51, 54, 57, 60, 63, 66, 70, 74, 77, 81,
    ],
];

static ALIGNMENT_PATTERN_POSITIONS: [&[i16]; 40] = [
    &[],
    &[6, 18],
    &[6, 22],
    &[6, 26],
    &[6, 30],
    &[6, 34],
    &[6, 22, 38],
    &[6, 24, 42],
    &[6, 26, 46],
    &[6, 28, 50],
    &[6, 30, 54],
    &[6, 32, 58],
    &[6, 34, 62],
    &[6, 26, 46, 66],
    &[6, 26, 48, 70],
    &[6, 26, 50, 74],
    &[6, 30, 54, 78],
    &[6, 30, 56, 82],
    &[6, 30, 58, 86],
    &[6, 34, 62, 90],
    &[6, 28, 50, 72, 94],
    &[6, 26, 50, 74, 98],
    &[6, 30, 54, 78, 102],
    &[6, 28, 54, 80, 106],
    &[6, 32, 58, 84, 110],
    &[6, 30, 58, 86, 114],
    &[6, 34, 62, 90, 118],
    &[6, 26, 50, 74, 98, 122],
    &[6, 30, 54, 78, 102, 126],
    &[6, 26, 52, 78, 104, 130],
    &[6, 30, 56, 82, 108, 134],
    &[6, 34, 60, 86, 112, 138],
    &[6, 30, 58, 86, 114, 142],
    &[6, 34, 62, 90, 118, 146],
    &[6, 30, 54, 78, 102, 126, 150],
    &[6, 24, 50, 76, 102, 128, 154],
    &[6, 28, 54, 80, 106, 132, 158],
    &[6, 32, 58, 84, 110, 136, 162],
    &[6, 26, 54, 82, 110, 138, 166],
    &[6, 30, 58, 86, 114, 142, 170],
];

// Indexed by level (L, M, Q, H), then mask pattern
static FORMAT_INFOS: [[u32; 8]; 4] = [
    [0x77C4, 0x72F3, 0x7DAA, 0x789D, 0x662F, 0x6318, 0x6C41, 0x6976],
    [0x5412, 0x5125, 0x5E7C, 0x5B4B, 0x45F9, 0x40CE, 0x4F97, 0x4AA0],
    [0x355F, 0x3068, 0x3F31, 0x3A06, 0x24B4, 0x2183, 0x2EDA, 0x2BED],
    [0x1689, 0x13BE, 0x1CE7, 0x19D0, 0x0762, 0x0255, 0x0D0C, 0x083B],
];

// Versions 7 to 40
static VERSION_INFOS: [u32; 34] = [
    0x07C94, 0x085BC, 0x09A99, 0x0A4D3, 0x0BBF6, 0x0C762, 0x0D847, 0x0E60D, 0x0F928, 0x10B78,
    0x1145D, 0x12A17, 0x13532, 0x149A6, 0x15683, 0x168C9, 0x177EC, 0x18EC4, 0x191E1, 0x1AFAB,
    0x1B08E, 0x1CC1A, 0x1D33F, 0x1ED75, 0x1F250, 0x209D5, 0x216F0, 0x228BA, 0x2379F, 0x24B0B,
    0x2542E, 0x26A64, 0x27541, 0x28C69,
];

// (First version of bucket, remainder bits)
static REMAINDER_BITS: [(usize, usize); 7] =
    [(1, 0), (2, 7), (7, 0), (14, 3), (21, 4), (28, 3), (35, 0)];
