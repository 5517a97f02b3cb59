use super::galois::Gf256;
use super::poly::Polynomial;
use crate::common::error::QRResult;

/// Error correction codewords of one data block.
///
/// The block is read as a message polynomial with its first byte as the highest power and divided
/// by the generator. The remainder coefficients, highest power first, are the codewords.
pub fn ecc_per_block(
    block: &[u8],
    generator: &Polynomial,
    ecc_len: usize,
    gf: &Gf256,
) -> QRResult<Vec<u8>> {
    debug_assert!(generator.degree() == ecc_len, "Generator degree should match ecc length");

    Polynomial::from_block(block).remainder(generator, ecc_len, gf)
}
