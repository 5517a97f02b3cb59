use std::ops::Deref;

use tracing::error;

use crate::common::{
    bitstream::BitStream,
    ec::{ecc_per_block, generator_polynomial},
    error::{QRError, QRResult},
    metadata::{ECLevel, Version},
    tables::{BlockLayout, SpecTables},
};

// ECC: Error Correction Codeword generator
pub fn ecc<'a>(
    data: &'a [u8],
    layout: &BlockLayout,
    tables: &SpecTables,
) -> QRResult<(Vec<&'a [u8]>, Vec<Vec<u8>>)> {
    let data_blocks = blockify(data, layout)?;

    let gf = tables.gf();
    let generator = generator_polynomial(layout.ecc_per_block, gf)?;
    let ecc_blocks = data_blocks
        .iter()
        .map(|b| ecc_per_block(b, &generator, layout.ecc_per_block, gf))
        .collect::<QRResult<Vec<_>>>()?;

    Ok((data_blocks, ecc_blocks))
}

/// Splits the data codewords into the short group 1 blocks followed by the group 2 blocks.
pub fn blockify<'a>(data: &'a [u8], layout: &BlockLayout) -> QRResult<Vec<&'a [u8]>> {
    let BlockLayout {
        group1_blocks,
        group1_data_codewords,
        group2_blocks,
        group2_data_codewords,
        ..
    } = *layout;

    let total_group1_size = group1_blocks * group1_data_codewords;
    let total_size = total_group1_size + group2_blocks * group2_data_codewords;
    if total_size != data.len() {
        error!(data_len = data.len(), total_size, "Data length doesn't match block layout");
        return Err(QRError::InvariantViolation("data length doesn't match block layout"));
    }

    let mut data_blocks = Vec::with_capacity(layout.total_blocks());
    data_blocks.extend(data[..total_group1_size].chunks(group1_data_codewords));
    if group2_blocks > 0 {
        data_blocks.extend(data[total_group1_size..].chunks(group2_data_codewords));
    }
    Ok(data_blocks)
}

/// Column-wise merge of blocks, skipping blocks that are already exhausted.
pub fn interleave<T: Copy, V: Deref<Target = [T]>>(blocks: &[V]) -> Vec<T> {
    let max_block_size = blocks.iter().map(|b| b.len()).max().unwrap_or(0);
    let total_size = blocks.iter().map(|b| b.len()).sum::<usize>();
    let mut res = Vec::with_capacity(total_size);
    for i in 0..max_block_size {
        for b in blocks {
            if i < b.len() {
                res.push(b[i]);
            }
        }
    }
    res
}

/// Final codeword sequence: interleaved data, interleaved ecc and the zero remainder bits.
pub fn interleave_message(
    data_blocks: &[&[u8]],
    ecc_blocks: &[Vec<u8>],
    remainder_bits: usize,
) -> BitStream {
    let data = interleave(data_blocks);
    let ecc = interleave(ecc_blocks);
    let mut payload = BitStream::new(((data.len() + ecc.len()) << 3) + remainder_bits);
    payload.extend(&data);
    payload.extend(&ecc);
    for _ in 0..remainder_bits {
        payload.push(false);
    }
    payload
}

/// Number of codeword errors the symbol can correct, less the misdecode protection codewords of
/// the smallest symbols
pub fn error_correction_capacity(layout: &BlockLayout, ver: Version, ecl: ECLevel) -> usize {
    let p = match (*ver, ecl) {
        (1, ECLevel::L) => 3,
        (2, ECLevel::L) | (1, ECLevel::M) => 2,
        (1, _) | (3, ECLevel::L) => 1,
        _ => 0,
    };

    (layout.total_ecc_codewords() - p) / 2
}

#[cfg(test)]
mod ec_tests {
    use test_case::test_case;

    use super::{blockify, ecc, error_correction_capacity, interleave, interleave_message};
    use crate::common::error::QRError;
    use crate::common::metadata::{ECLevel, Version};
    use crate::common::tables::SpecTables;

    fn run_ecc(msg: &[u8], v: usize, ecl: ECLevel) -> Vec<Vec<u8>> {
        let tables = SpecTables::global();
        let layout = tables.block_layout(Version(v), ecl);
        ecc(msg, &layout, tables).unwrap().1
    }

    #[test]
    fn test_add_ec_simple() {
        let msg = b" [\x0bx\xd1r\xdcMC@\xec\x11\xec\x11\xec\x11";
        let expected_ecc = [b"\xc4\x23\x27\x77\xeb\xd7\xe7\xe2\x5d\x17"];
        let ecc = run_ecc(msg, 1, ECLevel::M);
        assert_eq!(&*ecc, expected_ecc);
    }

    #[test]
    fn test_add_ec_complex() {
        let msg = b"CUF\x86W&U\xc2w2\x06\x12\x06g&\xf6\xf6B\x07v\x86\xf2\x07&V\x16\xc6\xc7\x92\x06\
                    \xb6\xe6\xf7w2\x07v\x86W&R\x06\x86\x972\x07F\xf7vV\xc2\x06\x972\x10\xec\x11\xec\
                    \x11\xec\x11\xec";
        let expected_ec = [
            b"\xd5\xc7\x0b\x2d\x73\xf7\xf1\xdf\xe5\xf8\x9a\x75\x9a\x6f\x56\xa1\x6f\x27",
            b"\x57\xcc\x60\x3c\xca\xb6\x7c\x9d\xc8\x86\x1b\x81\xd1\x11\xa3\xa3\x78\x85",
            b"\x94\x74\xb1\xd4\x4c\x85\x4b\xf2\xee\x4c\xc3\xe6\xbd\x0a\x6c\xf0\xc0\x8d",
            b"\xeb\x9f\x05\xad\x18\x93\x3b\x21\x6a\x28\xff\xac\x52\x02\x83\x20\xb2\xec",
        ];
        let ecc = run_ecc(msg, 5, ECLevel::Q);
        assert_eq!(&*ecc, &expected_ec[..]);
    }

    #[test]
    fn test_blockify() {
        let layout = SpecTables::global().block_layout(Version(5), ECLevel::Q);
        let data = (0..62).collect::<Vec<u8>>();
        let blocks = blockify(&data, &layout).unwrap();
        assert_eq!(blocks.iter().map(|b| b.len()).collect::<Vec<_>>(), vec![15, 15, 16, 16]);
        assert_eq!(blocks[0][0], 0);
        assert_eq!(blocks[1][0], 15);
        assert_eq!(blocks[2][0], 30);
        assert_eq!(blocks[3][0], 46);
        assert_eq!(blocks[3][15], 61);
    }

    #[test]
    fn test_blockify_length_mismatch() {
        let layout = SpecTables::global().block_layout(Version(1), ECLevel::L);
        let res = blockify(&[0; 18], &layout);
        assert!(matches!(res, Err(QRError::InvariantViolation(_))));
    }

    #[test]
    fn test_interleave() {
        let blocks = vec![vec![1, 2, 3], vec![4, 5, 6], vec![7, 8, 9, 0]];
        let interleaved = interleave(&blocks);
        let exp_interleaved = vec![1, 4, 7, 2, 5, 8, 3, 6, 9, 0];
        assert_eq!(interleaved, exp_interleaved);
    }

    #[test]
    fn test_interleave_single_block() {
        let data: [&[u8]; 1] = [&[1, 2, 3]];
        let ecc = vec![vec![9, 8]];
        let payload = interleave_message(&data, &ecc, 7);
        assert_eq!(payload.len(), 5 * 8 + 7);
        assert_eq!(&payload.data()[..5], &[1, 2, 3, 9, 8]);
        assert_eq!(payload.data()[5], 0);
    }

    #[test]
    fn test_interleave_message() {
        let data: [&[u8]; 4] = [&[1, 2], &[3, 4], &[5, 6, 7], &[8, 9, 10]];
        let ecc = vec![vec![11, 12], vec![13, 14], vec![15, 16], vec![17, 18]];
        let payload = interleave_message(&data, &ecc, 0);
        assert_eq!(payload.data(), &[1, 3, 5, 8, 2, 4, 6, 9, 7, 10, 11, 13, 15, 17, 12, 14, 16, 18]);
    }

    #[test_case(1, ECLevel::L, 2)]
    #[test_case(1, ECLevel::M, 4)]
    #[test_case(1, ECLevel::H, 8)]
    #[test_case(3, ECLevel::L, 7)]
    #[test_case(5, ECLevel::Q, 36)]
    #[test_case(40, ECLevel::H, 1215)]
    fn test_error_correction_capacity(v: usize, ecl: ECLevel, exp: usize) {
        let layout = SpecTables::global().block_layout(Version(v), ecl);
        assert_eq!(error_correction_capacity(&layout, Version(v), ecl), exp);
    }
}
